mod category;
mod classification;
mod feature_vector;
mod record;

pub use category::{Category, PerCategory};
pub use classification::{
    Classification, ClassificationReport, ClassificationStatus, Distribution, RawScores,
    ScoreBreakdown,
};
pub use feature_vector::{Feature, FeatureVector};
pub use record::{
    item_label, ClassificationRecord, FeedbackKind, FeedbackRecord, POINTS_PER_CLASSIFICATION,
    POINTS_PER_FEEDBACK,
};
