use crate::error::HistoryError;
use crate::pipeline::types::{
    ClassificationRecord, FeedbackKind, FeedbackRecord, POINTS_PER_CLASSIFICATION,
    POINTS_PER_FEEDBACK,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Persistence boundary for classification history, feedback and eco points.
/// Implementations serialize writes per user themselves.
pub trait HistoryWriter: Send + Sync {
    /// Store a classification and return the user's new points total.
    fn record_classification(
        &mut self,
        record: ClassificationRecord,
    ) -> Result<u32, HistoryError>;
    /// Store feedback and return the user's new points total.
    fn record_feedback(
        &mut self,
        user: &str,
        kind: FeedbackKind,
        message: &str,
    ) -> Result<u32, HistoryError>;
    fn points(&self, user: &str) -> u32;
}

/// In-memory history (for testing and development)
#[derive(Default)]
pub struct InMemoryHistory {
    classifications: Vec<ClassificationRecord>,
    feedback: Vec<FeedbackRecord>,
    points: HashMap<String, u32>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifications_for<'a>(
        &'a self,
        user: &'a str,
    ) -> impl Iterator<Item = &'a ClassificationRecord> {
        self.classifications.iter().filter(move |r| r.user == user)
    }

    pub fn feedback(&self) -> &[FeedbackRecord] {
        &self.feedback
    }

    /// Number of feedback entries of one kind left by `user`.
    pub fn feedback_count(&self, user: &str, kind: FeedbackKind) -> usize {
        self.feedback
            .iter()
            .filter(|f| f.user == user && f.kind == kind)
            .count()
    }

    fn award(&mut self, user: &str, points: u32) -> u32 {
        let total = self.points.entry(user.to_string()).or_insert(0);
        *total += points;
        *total
    }
}

impl HistoryWriter for InMemoryHistory {
    fn record_classification(
        &mut self,
        record: ClassificationRecord,
    ) -> Result<u32, HistoryError> {
        let user = record.user.clone();
        self.classifications.push(record);
        Ok(self.award(&user, POINTS_PER_CLASSIFICATION))
    }

    fn record_feedback(
        &mut self,
        user: &str,
        kind: FeedbackKind,
        message: &str,
    ) -> Result<u32, HistoryError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(HistoryError::EmptyFeedback);
        }

        self.feedback.push(FeedbackRecord {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            user: user.to_string(),
            kind,
            message: message.to_string(),
        });
        Ok(self.award(user, POINTS_PER_FEEDBACK))
    }

    fn points(&self, user: &str) -> u32 {
        self.points.get(user).copied().unwrap_or(0)
    }
}
