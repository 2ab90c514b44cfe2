use serde::{Deserialize, Serialize};

use super::category::{Category, PerCategory};
use super::feature_vector::FeatureVector;

/// Raw, unnormalized per-category accumulators.
pub type RawScores = PerCategory<u32>;

/// Integer percentages; always sums to 100.
pub type Distribution = PerCategory<u8>;

impl RawScores {
    /// Sum over all categories, widened so four full accumulators cannot overflow.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, score)| score as u64).sum()
    }

    /// Per-category sum, saturating at `u32::MAX`.
    pub fn combine(&self, other: &RawScores) -> RawScores {
        RawScores {
            recyclable: self.recyclable.saturating_add(other.recyclable),
            reusable: self.reusable.saturating_add(other.reusable),
            compostable: self.compostable.saturating_add(other.compostable),
            trash: self.trash.saturating_add(other.trash),
        }
    }
}

impl Distribution {
    pub fn uniform() -> Self {
        PerCategory::splat(25)
    }

    pub fn sum(&self) -> u32 {
        self.iter().map(|(_, p)| p as u32).sum()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassificationStatus {
    /// Features were measured and scored.
    Scored,
    /// The image could not be read or decoded; the distribution is the uniform sentinel.
    Degraded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub most_likely: Category,
    pub distribution: Distribution,
    pub status: ClassificationStatus,
}

impl Classification {
    /// 25/25/25/25 with Trash selected.
    pub fn degraded() -> Self {
        Self {
            most_likely: Category::Trash,
            distribution: Distribution::uniform(),
            status: ClassificationStatus::Degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == ClassificationStatus::Degraded
    }
}

/// Where each point of the raw score came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub visual: RawScores,
    pub keyword: RawScores,
    pub base: RawScores,
    pub penalty_factor: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> RawScores {
        self.visual.combine(&self.keyword).combine(&self.base)
    }
}

/// Full trace of one classification, for callers that want more than the verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationReport {
    pub classification: Classification,
    pub features: FeatureVector,
    pub scores: ScoreBreakdown,
    pub matched_keywords: PerCategory<bool>,
}
