/// Description keyword matching.
use super::config::KeywordTable;
use crate::pipeline::types::{Category, PerCategory};

/// Categories with at least one keyword contained in the description.
/// Case-insensitive substring containment, no tokenization.
pub fn match_keywords(table: &KeywordTable, description: &str) -> PerCategory<bool> {
    let description = description.to_lowercase();
    let mut matched = PerCategory::splat(false);

    for category in Category::ALL {
        *matched.get_mut(category) = table
            .words
            .get_ref(category)
            .iter()
            .any(|word| description.contains(word.as_str()));
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_description_matches_nothing() {
        let matched = match_keywords(&KeywordTable::default(), "");
        assert_eq!(matched, PerCategory::splat(false));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let matched = match_keywords(&KeywordTable::default(), "A BANANA Peel");
        assert!(matched.compostable);
        assert!(!matched.trash);
    }

    #[test]
    fn test_substring_containment() {
        // "can" is inside "scanned"; no tokenization is applied.
        let matched = match_keywords(&KeywordTable::default(), "scanned receipt");
        assert!(matched.recyclable);
    }

    #[test]
    fn test_overlapping_word_matches_both_categories() {
        let matched = match_keywords(&KeywordTable::default(), "flattened cardboard");
        assert!(matched.recyclable);
        assert!(matched.reusable);
        assert!(!matched.compostable);
    }

    #[test]
    fn test_multi_word_keyword() {
        let matched = match_keywords(&KeywordTable::default(), "used coffee grounds");
        assert!(matched.compostable);
    }
}
