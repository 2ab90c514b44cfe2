/// Probability normalization and category selection.
use crate::pipeline::types::{Category, Distribution, PerCategory, RawScores};

/// Integer percentages. Recyclable, Reusable and Compostable are floored;
/// Trash takes whatever remains so the total is exactly 100.
pub fn normalize(scores: &RawScores) -> Distribution {
    let total = scores.total();
    if total == 0 {
        return Distribution::uniform();
    }

    let percent = |raw: u32| (raw as u64 * 100 / total) as u8;
    let recyclable = percent(scores.recyclable);
    let reusable = percent(scores.reusable);
    let compostable = percent(scores.compostable);

    Distribution {
        recyclable,
        reusable,
        compostable,
        trash: 100 - recyclable - reusable - compostable,
    }
}

/// Highest raw score; ties go to the earliest category in enumeration order.
pub fn select(scores: &RawScores) -> Category {
    select_among(scores, |_| true).unwrap_or(Category::Trash)
}

/// Highest raw score among the matched categories, if any matched.
pub fn select_matched(scores: &RawScores, matched: &PerCategory<bool>) -> Option<Category> {
    select_among(scores, |category| matched.get(category))
}

fn select_among(scores: &RawScores, eligible: impl Fn(Category) -> bool) -> Option<Category> {
    let mut best: Option<(Category, u32)> = None;
    for (category, score) in scores.iter() {
        if !eligible(category) {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((category, score)),
        }
    }
    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(recyclable: u32, reusable: u32, compostable: u32, trash: u32) -> RawScores {
        RawScores {
            recyclable,
            reusable,
            compostable,
            trash,
        }
    }

    #[test]
    fn test_trash_absorbs_remainder() {
        let distribution = normalize(&scores(1, 1, 1, 0));
        assert_eq!(distribution.recyclable, 33);
        assert_eq!(distribution.reusable, 33);
        assert_eq!(distribution.compostable, 33);
        assert_eq!(distribution.trash, 1);
    }

    #[test]
    fn test_black_image_distribution() {
        let distribution = normalize(&scores(5, 5, 5, 85));
        assert_eq!(distribution, scores_to_distribution(5, 5, 5, 85));
    }

    fn scores_to_distribution(a: u8, b: u8, c: u8, d: u8) -> Distribution {
        Distribution {
            recyclable: a,
            reusable: b,
            compostable: c,
            trash: d,
        }
    }

    #[test]
    fn test_distribution_always_sums_to_100() {
        for r in [0u32, 1, 7, 33, 250] {
            for u in [0u32, 3, 19, 101] {
                for c in [0u32, 5, 44] {
                    for t in [1u32, 6, 999] {
                        let distribution = normalize(&scores(r, u, c, t));
                        assert_eq!(distribution.sum(), 100);
                    }
                }
            }
        }
    }

    #[test]
    fn test_saturated_scores_normalize() {
        let distribution = normalize(&scores(u32::MAX, u32::MAX, 0, u32::MAX));
        assert_eq!(distribution.recyclable, 33);
        assert_eq!(distribution.reusable, 33);
        assert_eq!(distribution.compostable, 0);
        assert_eq!(distribution.trash, 34);
    }

    #[test]
    fn test_select_tie_breaks_in_enumeration_order() {
        assert_eq!(select(&scores(10, 10, 10, 10)), Category::Recyclable);
        assert_eq!(select(&scores(1, 9, 9, 9)), Category::Reusable);
        assert_eq!(select(&scores(1, 2, 9, 9)), Category::Compostable);
        assert_eq!(select(&scores(1, 2, 3, 9)), Category::Trash);
    }

    #[test]
    fn test_select_uses_raw_scores_not_percentages() {
        // Percentages are 33/33/33/1, raw scores tie across the first three.
        assert_eq!(select(&scores(1, 1, 1, 0)), Category::Recyclable);
    }

    #[test]
    fn test_select_matched() {
        let matched = PerCategory {
            reusable: true,
            compostable: true,
            ..PerCategory::splat(false)
        };
        let raw = scores(50, 5, 20, 90);
        assert_eq!(select_matched(&raw, &matched), Some(Category::Compostable));
        assert_eq!(select_matched(&raw, &PerCategory::splat(false)), None);
    }
}
