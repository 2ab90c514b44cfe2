/// Score accumulation: applies the rule table and keyword bonuses to raw per-category scores.
use super::config::{KeywordTable, RuleSet, ScoringStrategy};
use crate::pipeline::types::{Category, FeatureVector, PerCategory, RawScores, ScoreBreakdown};
use tracing::trace;

/// Weight after the penalty factor, truncated toward zero.
pub fn scaled(weight: u32, factor: f64) -> u32 {
    (weight as f64 * factor).trunc() as u32
}

/// Factor of the first penalty tier with any firing bound, 1.0 when none fire.
pub fn penalty_factor(rules: &RuleSet, features: &FeatureVector) -> f64 {
    rules
        .penalty_tiers
        .iter()
        .find(|tier| tier.any_of.iter().any(|bound| bound.holds(features, 1.0)))
        .map(|tier| tier.factor)
        .unwrap_or(1.0)
}

/// Feature-derived part of the raw scores.
pub fn visual_scores(rules: &RuleSet, features: &FeatureVector, penalty: f64) -> RawScores {
    let mut scores = RawScores::default();

    for rule in &rules.rules {
        if let Some(weight) = rule.matched_weight(features, penalty) {
            let weight = if rule.penalized {
                scaled(weight, penalty)
            } else {
                weight
            };
            trace!("rule {} -> {} +{}", rule.name, rule.category, weight);
            let score = scores.get_mut(rule.category);
            *score = score.saturating_add(weight);
        }
    }

    scores
}

/// One bonus per matched category, regardless of how many words matched.
pub fn keyword_scores(table: &KeywordTable, matched: &PerCategory<bool>, penalty: f64) -> RawScores {
    let mut scores = RawScores::default();

    for category in Category::ALL {
        if matched.get(category) {
            let bonus = table.bonus.get(category);
            *scores.get_mut(category) = if table.penalized.get(category) {
                scaled(bonus, penalty)
            } else {
                bonus
            };
        }
    }

    scores
}

/// Accumulate every score component. Keyword bonuses only apply under the weighted strategy.
pub fn accumulate(
    rules: &RuleSet,
    features: &FeatureVector,
    matched: &PerCategory<bool>,
    strategy: ScoringStrategy,
) -> ScoreBreakdown {
    let penalty = penalty_factor(rules, features);
    let visual = visual_scores(rules, features, penalty);
    let keyword = match strategy {
        ScoringStrategy::Weighted => keyword_scores(&rules.keywords, matched, penalty),
        ScoringStrategy::KeywordPriority => RawScores::default(),
    };

    ScoreBreakdown {
        visual,
        keyword,
        base: RawScores::splat(rules.base_score),
        penalty_factor: penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_features() -> FeatureVector {
        FeatureVector {
            black_ratio: 1.0,
            low_saturation_ratio: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_scaled_truncates() {
        assert_eq!(scaled(25, 1.0), 25);
        assert_eq!(scaled(25, 0.6), 15);
        assert_eq!(scaled(25, 0.3), 7);
        assert_eq!(scaled(15, 0.3), 4);
        assert_eq!(scaled(20, 0.3), 6);
    }

    #[test]
    fn test_penalty_tiers() {
        let rules = RuleSet::default();
        assert_eq!(penalty_factor(&rules, &FeatureVector::default()), 1.0);

        let moderate = FeatureVector {
            grey_ratio: 0.13,
            ..Default::default()
        };
        assert_eq!(penalty_factor(&rules, &moderate), 0.6);

        let heavy = FeatureVector {
            color_diversity: 7.5,
            ..Default::default()
        };
        assert_eq!(penalty_factor(&rules, &heavy), 0.3);
    }

    #[test]
    fn test_huge_weights_saturate() {
        let mut rules = RuleSet::default();
        for rule in &mut rules.rules {
            for tier in &mut rule.tiers {
                tier.weight = u32::MAX / 2;
            }
        }
        let scores = visual_scores(&rules, &black_features(), 1.0);
        assert_eq!(scores.trash, u32::MAX);
    }

    #[test]
    fn test_black_image_visual_scores() {
        let rules = RuleSet::default();
        let features = black_features();
        let penalty = penalty_factor(&rules, &features);
        assert_eq!(penalty, 0.3);

        let scores = visual_scores(&rules, &features, penalty);
        // dark_pixels 40 + faded 30 + formless 10
        assert_eq!(scores.trash, 80);
        assert_eq!(scores.recyclable, 0);
        assert_eq!(scores.reusable, 0);
        assert_eq!(scores.compostable, 0);
    }

    #[test]
    fn test_compound_rule_needs_both_signals() {
        let rules = RuleSet::default();
        let edges = FeatureVector {
            edge_ratio: 0.5,
            ..Default::default()
        };

        let black_only = FeatureVector {
            black_ratio: 0.11,
            ..edges
        };
        let both = FeatureVector {
            black_ratio: 0.11,
            grey_ratio: 0.16,
            ..edges
        };

        let alone = visual_scores(&rules, &black_only, 1.0).trash;
        let together = visual_scores(&rules, &both, 1.0).trash;
        // grey tier 20 plus the dark_and_grey bonus 50
        assert_eq!(alone, 25);
        assert_eq!(together, 25 + 20 + 50);
    }

    #[test]
    fn test_compostable_rules() {
        let rules = RuleSet::default();
        let organic = FeatureVector {
            green_ratio: 0.25,
            yellow_ratio: 0.2,
            brown_ratio: 0.2,
            texture_variance: 40.0,
            edge_ratio: 0.12,
            ..Default::default()
        };
        let scores = visual_scores(&rules, &organic, 1.0);
        assert_eq!(scores.compostable, 40 + 30 + 15);
    }

    #[test]
    fn test_texture_band_is_exclusive() {
        let rules = RuleSet::default();
        let at_edge = FeatureVector {
            texture_variance: 55.0,
            edge_ratio: 0.5,
            ..Default::default()
        };
        assert_eq!(visual_scores(&rules, &at_edge, 1.0).compostable, 0);
    }

    #[test]
    fn test_penalty_scales_recyclable_rules() {
        let rules = RuleSet::default();
        let paper = FeatureVector {
            white_ratio: 0.5,
            texture_variance: 10.0,
            edge_ratio: 0.3,
            ..Default::default()
        };
        let clean = visual_scores(&rules, &paper, 1.0);
        // clean_paper 20 + manufactured_edges 15
        assert_eq!(clean.recyclable, 35);

        let contaminated = visual_scores(&rules, &paper, 0.3);
        assert_eq!(contaminated.recyclable, 6 + 4);
    }

    #[test]
    fn test_blue_rule_gated_by_penalty() {
        let rules = RuleSet::default();
        let blue = FeatureVector {
            blue_ratio: 0.5,
            texture_variance: 80.0,
            edge_ratio: 0.12,
            ..Default::default()
        };
        assert_eq!(visual_scores(&rules, &blue, 0.6).recyclable, 15);
        assert_eq!(visual_scores(&rules, &blue, 0.3).recyclable, 0);
    }

    #[test]
    fn test_keyword_bonus_is_once_per_category() {
        let rules = RuleSet::default();
        let matched = PerCategory {
            compostable: true,
            trash: true,
            ..PerCategory::splat(false)
        };
        let scores = keyword_scores(&rules.keywords, &matched, 1.0);
        assert_eq!(scores.compostable, 30);
        assert_eq!(scores.trash, 40);
        assert_eq!(scores.recyclable, 0);
    }

    #[test]
    fn test_keyword_bonus_penalized_for_recyclable() {
        let rules = RuleSet::default();
        let matched = PerCategory {
            recyclable: true,
            compostable: true,
            ..PerCategory::splat(false)
        };
        let scores = keyword_scores(&rules.keywords, &matched, 0.3);
        assert_eq!(scores.recyclable, 6);
        assert_eq!(scores.compostable, 30);
    }

    #[test]
    fn test_priority_strategy_adds_no_keyword_score() {
        let rules = RuleSet::default();
        let matched = PerCategory::splat(true);
        let breakdown = accumulate(
            &rules,
            &black_features(),
            &matched,
            ScoringStrategy::KeywordPriority,
        );
        assert_eq!(breakdown.keyword, RawScores::default());
        assert_eq!(breakdown.base, RawScores::splat(5));
    }
}
