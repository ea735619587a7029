use std::collections::HashSet;

/// Trigram similarity between two comparison keys, matching the semantics
/// of Postgres pg_trgm: each string is padded with two leading and one
/// trailing space before trigram extraction, and the score is the Jaccard
/// ratio of the two trigram sets. Returns a value in [0, 1].
///
/// Inputs are expected to already be normalized keys (lowercase
/// alphanumeric); callers pass `name_normalized` values.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let ta = trigrams(a);
    let tb = trigrams(b);
    let shared = ta.intersection(&tb).count();
    let total = ta.union(&tb).count();
    if total == 0 {
        return 0.0;
    }
    shared as f64 / total as f64
}

fn trigrams(s: &str) -> HashSet<[char; 3]> {
    let padded: Vec<char> = std::iter::repeat(' ')
        .take(2)
        .chain(s.chars())
        .chain(std::iter::once(' '))
        .collect();

    padded
        .windows(3)
        .map(|w| [w[0], w[1], w[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(trigram_similarity("cafeluna", "cafeluna"), 1.0);
    }

    #[test]
    fn empty_string_scores_zero() {
        assert_eq!(trigram_similarity("", "cafeluna"), 0.0);
        assert_eq!(trigram_similarity("cafeluna", ""), 0.0);
    }

    #[test]
    fn similar_names_clear_the_default_floor() {
        // "Cafe Luna" vs "Café Luna GmbH" after normalization.
        let sim = trigram_similarity("cafeluna", "cafelunagmbh");
        assert!(sim > 0.3, "got {sim}");
    }

    #[test]
    fn unrelated_names_score_low() {
        let sim = trigram_similarity("cafeluna", "zahnarztpraxismueller");
        assert!(sim < 0.1, "got {sim}");
    }

    #[test]
    fn symmetric() {
        let ab = trigram_similarity("backhauskrause", "backhaus");
        let ba = trigram_similarity("backhaus", "backhauskrause");
        assert!((ab - ba).abs() < 1e-12);
    }
}
