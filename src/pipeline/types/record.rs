use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use super::category::Category;
use super::classification::Classification;

/// Eco points awarded for each classification.
pub const POINTS_PER_CLASSIFICATION: u32 = 3;
/// Eco points awarded for each feedback submission.
pub const POINTS_PER_FEEDBACK: u32 = 1;

/// History entry handed to the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub user: String,
    pub category: Category,
    pub item: String,
}

impl ClassificationRecord {
    pub fn new(user: impl Into<String>, category: Category, item: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            user: user.into(),
            category,
            item: item.into(),
        }
    }

    /// Record for a finished classification of the image at `image_path`.
    pub fn for_item(
        user: impl Into<String>,
        classification: &Classification,
        image_path: &Path,
        description: &str,
    ) -> Self {
        Self::new(
            user,
            classification.most_likely,
            item_label(image_path, description),
        )
    }
}

/// Item label: the image file name, followed by the description in parentheses when present.
pub fn item_label(image_path: &Path, description: &str) -> String {
    let name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let description = description.trim();
    if description.is_empty() {
        name
    } else {
        format!("{name} ({description})")
    }
}

/// The user's verdict on a prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FeedbackKind {
    #[default]
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub user: String,
    pub kind: FeedbackKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_label_without_description() {
        let label = item_label(Path::new("/tmp/uploads/bottle.jpg"), "   ");
        assert_eq!(label, "bottle.jpg");
    }

    #[test]
    fn test_item_label_with_description() {
        let label = item_label(Path::new("peel.png"), " banana peel ");
        assert_eq!(label, "peel.png (banana peel)");
    }

    #[test]
    fn test_feedback_kind_defaults_to_correct() {
        assert_eq!(FeedbackKind::default(), FeedbackKind::Correct);
        let json = serde_json::to_string(&FeedbackKind::Incorrect).unwrap();
        assert_eq!(json, "\"Incorrect\"");
    }

    #[test]
    fn test_record_for_degraded_item() {
        let record = ClassificationRecord::for_item(
            "ana",
            &Classification::degraded(),
            Path::new("blurry.jpg"),
            "",
        );
        assert_eq!(record.category, Category::Trash);
        assert_eq!(record.item, "blurry.jpg");
        assert_eq!(record.user, "ana");
    }
}
