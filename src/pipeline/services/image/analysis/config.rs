/// Rule tables for waste classification. Built once, shared read-only.
use crate::pipeline::types::{Category, Feature, FeatureVector, PerCategory};
use serde::{Deserialize, Serialize};

/// How keyword matches influence the verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Keyword matches add a fixed bonus per category.
    #[default]
    Weighted,
    /// Keyword matches add nothing to the scores but force the matched category as the verdict.
    KeywordPriority,
}

/// Upper bound for any single tier weight, keyword bonus or base score.
pub const MAX_WEIGHT: u32 = 10_000;
/// Upper bound for the side of the canonical raster.
pub const MAX_CANONICAL_SIZE: u32 = 4096;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    pub colors: ColorRanges,
    pub thresholds: FeatureThresholds,
    pub rules: Vec<Rule>,
    pub penalty_tiers: Vec<PenaltyTier>,
    pub keywords: KeywordTable,
    pub base_score: u32,
}

/// Inclusive HSV box in OpenCV 8-bit units (H 0..180, S and V 0..255).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorRanges {
    pub green: HsvRange,
    pub yellow: HsvRange,
    pub blue: HsvRange,
    pub brown: HsvRange,
    pub black: HsvRange,
    pub grey: HsvRange,
    pub low_saturation: HsvRange,
    /// Red wraps around hue 0, so it is a union of ranges.
    pub red: Vec<HsvRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureThresholds {
    pub canonical_size: u32,
    pub white_intensity: u8,
    pub canny_low: f32,
    pub canny_high: f32,
    pub histogram_peak_floor: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Feature(Feature),
    /// The penalty factor chosen for this image, for rules gated on contamination.
    PenaltyFactor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    Below,
}

/// Strict comparison of one signal against a threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bound {
    pub signal: Signal,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Bound {
    pub fn above(feature: Feature, threshold: f64) -> Self {
        Self {
            signal: Signal::Feature(feature),
            comparison: Comparison::Above,
            threshold,
        }
    }

    pub fn below(feature: Feature, threshold: f64) -> Self {
        Self {
            signal: Signal::Feature(feature),
            comparison: Comparison::Below,
            threshold,
        }
    }

    pub fn penalty_above(threshold: f64) -> Self {
        Self {
            signal: Signal::PenaltyFactor,
            comparison: Comparison::Above,
            threshold,
        }
    }

    pub fn holds(&self, features: &FeatureVector, penalty_factor: f64) -> bool {
        let value = match self.signal {
            Signal::Feature(feature) => features.get(feature),
            Signal::PenaltyFactor => penalty_factor,
        };
        match self.comparison {
            Comparison::Above => value > self.threshold,
            Comparison::Below => value < self.threshold,
        }
    }
}

/// A conjunction of bounds and the weight it earns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    pub all_of: Vec<Bound>,
    pub weight: u32,
}

impl Tier {
    pub fn new(all_of: Vec<Bound>, weight: u32) -> Self {
        Self { all_of, weight }
    }

    pub fn holds(&self, features: &FeatureVector, penalty_factor: f64) -> bool {
        self.all_of
            .iter()
            .all(|bound| bound.holds(features, penalty_factor))
    }
}

/// Scoring rule. Only the first satisfied tier contributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub name: String,
    pub category: Category,
    pub tiers: Vec<Tier>,
    /// Scale the weight by the penalty factor (truncated).
    #[serde(default)]
    pub penalized: bool,
}

impl Rule {
    pub fn new(name: &str, category: Category, tiers: Vec<Tier>) -> Self {
        Self {
            name: name.to_string(),
            category,
            tiers,
            penalized: false,
        }
    }

    pub fn single(name: &str, category: Category, all_of: Vec<Bound>, weight: u32) -> Self {
        Self::new(name, category, vec![Tier::new(all_of, weight)])
    }

    pub fn penalized(mut self) -> Self {
        self.penalized = true;
        self
    }

    /// Weight of the first tier that holds, before any penalty.
    pub fn matched_weight(&self, features: &FeatureVector, penalty_factor: f64) -> Option<u32> {
        self.tiers
            .iter()
            .find(|tier| tier.holds(features, penalty_factor))
            .map(|tier| tier.weight)
    }
}

/// Penalty factor applied when any bound fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PenaltyTier {
    pub factor: f64,
    pub any_of: Vec<Bound>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordTable {
    pub words: PerCategory<Vec<String>>,
    pub bonus: PerCategory<u32>,
    pub penalized: PerCategory<bool>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for ColorRanges {
    fn default() -> Self {
        Self {
            green: HsvRange::new([30, 40, 40], [85, 255, 255]),
            yellow: HsvRange::new([15, 60, 60], [35, 255, 255]),
            blue: HsvRange::new([90, 60, 60], [130, 255, 255]),
            brown: HsvRange::new([5, 30, 30], [20, 200, 200]),
            black: HsvRange::new([0, 0, 0], [180, 255, 50]),
            grey: HsvRange::new([0, 0, 50], [180, 30, 150]),
            low_saturation: HsvRange::new([0, 0, 0], [180, 50, 255]),
            red: vec![
                HsvRange::new([0, 60, 60], [10, 255, 255]),
                HsvRange::new([170, 60, 60], [180, 255, 255]),
            ],
        }
    }
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self {
            canonical_size: 300,
            white_intensity: 200,
            canny_low: 100.0,
            canny_high: 200.0,
            histogram_peak_floor: 500,
        }
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            words: PerCategory {
                recyclable: words(&[
                    "plastic", "bottle", "paper", "box", "aluminum", "metal", "cardboard",
                    "glass", "can", "container", "clean", "empty",
                ]),
                // "cardboard" also appears under Recyclable on purpose.
                reusable: words(&[
                    "jar", "bag", "clothes", "book", "toy", "furniture", "intact", "cardboard",
                    "good condition", "working", "reuse", "donate", "functional",
                ]),
                compostable: words(&[
                    "food", "organic", "banana", "apple", "fruit", "vegetable", "leaves",
                    "grass", "coffee grounds", "tea bags", "eggshells", "biodegradable",
                    "compost", "natural", "plant",
                ]),
                trash: words(&[
                    "broken", "cracked", "torn", "burnt", "melted", "dirty", "damaged",
                    "rotten", "moldy", "waste", "garbage", "rubbish", "spoiled",
                    "contaminated", "stained", "smelly", "decomposed", "rusty", "corroded",
                    "shattered", "destroyed", "unusable",
                ]),
            },
            bonus: PerCategory {
                recyclable: 20,
                reusable: 20,
                compostable: 30,
                trash: 40,
            },
            penalized: PerCategory {
                recyclable: true,
                reusable: true,
                compostable: false,
                trash: false,
            },
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            colors: ColorRanges::default(),
            thresholds: FeatureThresholds::default(),
            rules: default_rules(),
            penalty_tiers: default_penalty_tiers(),
            keywords: KeywordTable::default(),
            base_score: 5,
        }
    }
}

fn default_penalty_tiers() -> Vec<PenaltyTier> {
    use Feature::*;
    vec![
        PenaltyTier {
            factor: 0.3,
            any_of: vec![
                Bound::above(BlackRatio, 0.12),
                Bound::above(GreyRatio, 0.18),
                Bound::above(ColorDiversity, 7.0),
            ],
        },
        PenaltyTier {
            factor: 0.6,
            any_of: vec![
                Bound::above(BlackRatio, 0.08),
                Bound::above(GreyRatio, 0.12),
                Bound::above(ColorDiversity, 5.0),
            ],
        },
    ]
}

fn default_rules() -> Vec<Rule> {
    use Category::*;
    use Feature::*;

    let above = Bound::above;
    let below = Bound::below;

    vec![
        // Trash
        Rule::new(
            "dark_pixels",
            Trash,
            vec![
                Tier::new(vec![above(BlackRatio, 0.15)], 40),
                Tier::new(vec![above(BlackRatio, 0.08)], 25),
            ],
        ),
        Rule::new(
            "grey_pixels",
            Trash,
            vec![
                Tier::new(vec![above(GreyRatio, 0.20)], 35),
                Tier::new(vec![above(GreyRatio, 0.12)], 20),
            ],
        ),
        Rule::new(
            "color_diversity",
            Trash,
            vec![
                Tier::new(vec![above(ColorDiversity, 8.0)], 30),
                Tier::new(vec![above(ColorDiversity, 5.0)], 15),
            ],
        ),
        Rule::new(
            "rough_texture",
            Trash,
            vec![
                Tier::new(vec![above(TextureVariance, 70.0)], 35),
                Tier::new(vec![above(TextureVariance, 50.0)], 20),
            ],
        ),
        Rule::new(
            "uneven_brightness",
            Trash,
            vec![
                Tier::new(vec![above(BrightnessStd, 60.0)], 25),
                Tier::new(vec![above(BrightnessStd, 40.0)], 15),
            ],
        ),
        Rule::new(
            "faded",
            Trash,
            vec![
                Tier::new(vec![above(LowSaturationRatio, 0.60)], 30),
                Tier::new(vec![above(LowSaturationRatio, 0.40)], 15),
            ],
        ),
        Rule::new(
            "noisy",
            Trash,
            vec![
                Tier::new(vec![above(NoiseLevel, 800.0)], 25),
                Tier::new(vec![above(NoiseLevel, 500.0)], 15),
            ],
        ),
        Rule::single(
            "dark_and_grey",
            Trash,
            vec![above(BlackRatio, 0.10), above(GreyRatio, 0.15)],
            50,
        ),
        Rule::single(
            "mixed_and_rough",
            Trash,
            vec![above(ColorDiversity, 6.0), above(TextureVariance, 60.0)],
            40,
        ),
        Rule::single(
            "faded_and_uneven",
            Trash,
            vec![above(LowSaturationRatio, 0.50), above(BrightnessStd, 50.0)],
            35,
        ),
        Rule::single("warning_red", Trash, vec![above(RedRatio, 0.05)], 10),
        Rule::single("formless", Trash, vec![below(EdgeRatio, 0.10)], 10),
        // Compostable
        Rule::new(
            "green_yellow_matter",
            Compostable,
            vec![
                Tier::new(vec![above(GreenRatio, 0.20), above(YellowRatio, 0.15)], 40),
                Tier::new(vec![above(GreenRatio, 0.15)], 25),
                Tier::new(vec![above(YellowRatio, 0.20)], 20),
            ],
        ),
        Rule::new(
            "brown_matter",
            Compostable,
            vec![
                Tier::new(vec![above(BrownRatio, 0.15), above(TextureVariance, 30.0)], 30),
                Tier::new(vec![above(BrownRatio, 0.10)], 15),
            ],
        ),
        Rule::single(
            "organic_texture",
            Compostable,
            vec![above(TextureVariance, 25.0), below(TextureVariance, 55.0)],
            15,
        ),
        // Recyclable
        Rule::single(
            "blue_plastic",
            Recyclable,
            vec![above(BlueRatio, 0.08), Bound::penalty_above(0.5)],
            25,
        )
        .penalized(),
        Rule::single(
            "clean_paper",
            Recyclable,
            vec![above(WhiteRatio, 0.15), below(TextureVariance, 50.0)],
            20,
        )
        .penalized(),
        Rule::single(
            "manufactured_edges",
            Recyclable,
            vec![above(EdgeRatio, 0.20), below(TextureVariance, 60.0)],
            15,
        )
        .penalized(),
        Rule::single(
            "green_container",
            Recyclable,
            vec![
                above(GreenRatio, 0.05),
                below(GreenRatio, 0.15),
                below(BlackRatio, 0.08),
            ],
            20,
        )
        .penalized(),
        // Reusable
        Rule::single(
            "wood_or_leather",
            Reusable,
            vec![above(BrownRatio, 0.08), below(TextureVariance, 45.0)],
            25,
        )
        .penalized(),
        Rule::single(
            "smooth_intact",
            Reusable,
            vec![
                below(TextureVariance, 35.0),
                above(EdgeRatio, 0.15),
                below(BlackRatio, 0.05),
            ],
            20,
        )
        .penalized(),
        Rule::single(
            "clear_well_lit",
            Reusable,
            vec![
                above(EdgeRatio, 0.25),
                below(TextureVariance, 40.0),
                below(BrightnessStd, 30.0),
            ],
            15,
        )
        .penalized(),
        Rule::single(
            "clean_vibrant",
            Reusable,
            vec![
                above(WhiteRatio, 0.20),
                below(TextureVariance, 30.0),
                below(LowSaturationRatio, 0.30),
            ],
            10,
        )
        .penalized(),
    ]
}

impl RuleSet {
    /// Validate rule tables loaded from outside the crate.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_score == 0 {
            return Err("Base score must be greater than 0".to_string());
        }

        if self.base_score > MAX_WEIGHT {
            return Err(format!("Base score must not exceed {}", MAX_WEIGHT));
        }

        if !(3..=MAX_CANONICAL_SIZE).contains(&self.thresholds.canonical_size) {
            return Err(format!(
                "Canonical size must be between 3 and {} pixels",
                MAX_CANONICAL_SIZE
            ));
        }

        if self.thresholds.canny_low > self.thresholds.canny_high {
            return Err("Canny low threshold must not exceed the high threshold".to_string());
        }

        for rule in &self.rules {
            if rule.tiers.is_empty() {
                return Err(format!("Rule '{}' has no tiers", rule.name));
            }
            if rule.tiers.iter().any(|tier| tier.weight > MAX_WEIGHT) {
                return Err(format!(
                    "Rule '{}' has a weight above {}",
                    rule.name, MAX_WEIGHT
                ));
            }
        }

        for tier in &self.penalty_tiers {
            if !(tier.factor > 0.0 && tier.factor <= 1.0) {
                return Err("Penalty factors must be in (0.0, 1.0]".to_string());
            }
        }

        for (category, bonus) in self.keywords.bonus.iter() {
            if bonus > MAX_WEIGHT {
                return Err(format!(
                    "Keyword bonus for {} must not exceed {}",
                    category, MAX_WEIGHT
                ));
            }
        }

        for (category, list) in self.keywords.words.iter_ref() {
            if list.iter().any(|w| w.is_empty() || *w != w.to_lowercase()) {
                return Err(format!(
                    "Keywords for {} must be non-empty and lowercase",
                    category
                ));
            }
        }

        Ok(())
    }
}
