//! Fuzzy name matching for free-text location input.

use serde::{Deserialize, Serialize};

use rankscope_core::LocationEntry;

pub const DEFAULT_THRESHOLD: f64 = 0.6;
const SUGGESTION_THRESHOLD: f64 = 0.4;
const MAX_SUGGESTIONS: usize = 3;
const WORD_SIMILARITY: f64 = 0.8;

/// Which rule produced a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    PrefixSuffix,
    Substring,
    WordOverlap,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch {
    pub index: usize,
    pub score: f64,
    pub method: MatchMethod,
}

/// `(maxLen - editDistance) / maxLen` over lowercased input; `1.0` for two
/// empty strings.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Best candidate for `query` scoring at least `threshold`.
///
/// An exact (case-insensitive, trimmed) name returns immediately with score
/// `1.0`. Among equal scores the earliest candidate wins.
#[must_use]
pub fn best_match(candidates: &[LocationEntry], query: &str, threshold: f64) -> Option<ScoredMatch> {
    let needle = query.trim().to_lowercase();
    let mut best: Option<ScoredMatch> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let name = candidate.name.to_lowercase();
        if name == needle {
            return Some(ScoredMatch {
                index,
                score: 1.0,
                method: MatchMethod::Exact,
            });
        }

        let (mut score, mut method) = rule_score(&name, &needle);

        let fuzzy = similarity(&needle, &name);
        if fuzzy > score && fuzzy > threshold {
            score = fuzzy;
            method = Some(MatchMethod::Fuzzy);
        }

        let Some(method) = method else { continue };
        let beats_best = best.is_none_or(|b| score > b.score);
        if score >= threshold && beats_best {
            best = Some(ScoredMatch { index, score, method });
        }
    }

    best
}

/// Up to three candidate names with similarity above 0.4, best first.
#[must_use]
pub fn suggestions(candidates: &[LocationEntry], query: &str) -> Vec<String> {
    let needle = query.trim();
    let mut scored: Vec<(f64, &str)> = candidates
        .iter()
        .map(|c| (similarity(needle, &c.name), c.name.as_str()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

fn rule_score(name: &str, needle: &str) -> (f64, Option<MatchMethod>) {
    if needle.is_empty() {
        return (0.0, None);
    }
    if name.starts_with(needle) || name.ends_with(needle) {
        return (0.9, Some(MatchMethod::PrefixSuffix));
    }
    if name.contains(needle) || needle.contains(name) {
        return (0.8, Some(MatchMethod::Substring));
    }

    let query_words: Vec<&str> = needle.split_whitespace().collect();
    let name_words: Vec<&str> = name.split_whitespace().collect();
    let matched = query_words
        .iter()
        .filter(|qw| {
            name_words.iter().any(|nw| {
                nw.contains(**qw) || qw.contains(*nw) || similarity(qw, nw) > WORD_SIMILARITY
            })
        })
        .count();

    if matched == 0 {
        return (0.0, None);
    }
    #[allow(clippy::cast_precision_loss)]
    let score = matched as f64 / query_words.len().max(name_words.len()) as f64;
    (score, Some(MatchMethod::WordOverlap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<LocationEntry> {
        names
            .iter()
            .zip(1..)
            .map(|(name, code)| LocationEntry {
                name: (*name).to_string(),
                code,
                full_name: format!("{name},United States"),
            })
            .collect()
    }

    #[test]
    fn similarity_of_identical_and_empty_strings() {
        assert!((similarity("Texas", "texas") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("abc", "xyz")).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_match_ignores_case_and_whitespace() {
        let states = entries(&["Arkansas", "California", "Colorado"]);
        for query in ["California", "california ", "CALIFORNIA", "  CaLiFoRnIa"] {
            let found = best_match(&states, query, DEFAULT_THRESHOLD).unwrap();
            assert_eq!(found.index, 1);
            assert!((found.score - 1.0).abs() < f64::EPSILON);
            assert_eq!(found.method, MatchMethod::Exact);
        }
    }

    #[test]
    fn prefix_beats_substring() {
        let states = entries(&["North Carolina", "Carolina Beach"]);
        let found = best_match(&states, "carolina", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.method, MatchMethod::PrefixSuffix);
        assert_eq!(found.index, 0);
    }

    #[test]
    fn misspelling_matches_by_edit_distance() {
        let states = entries(&["Tennessee", "Texas"]);
        let found = best_match(&states, "Tenesse", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(found.method, MatchMethod::Fuzzy);
    }

    #[test]
    fn close_single_word_counts_as_word_overlap() {
        let states = entries(&["Massachusetts"]);
        let found = best_match(&states, "Masachusets", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.method, MatchMethod::WordOverlap);
        assert!((found.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn word_overlap_scores_fraction_of_words() {
        let (score, method) = rule_score("salt lake city", "lake town");
        assert_eq!(method, Some(MatchMethod::WordOverlap));
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn equal_scores_keep_first_candidate() {
        let cities = entries(&["Springfield", "Springdale"]);
        let found = best_match(&cities, "spring", DEFAULT_THRESHOLD).unwrap();
        assert!((found.score - 0.9).abs() < f64::EPSILON);
        assert_eq!(found.index, 0);

        let reversed = entries(&["Springdale", "Springfield"]);
        let found = best_match(&reversed, "spring", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn nonsense_is_rejected() {
        let states = entries(&["Alabama", "Alaska", "Arizona", "Texas", "Utah"]);
        assert!(best_match(&states, "Zzzqq", DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn suggestions_are_capped_and_above_floor() {
        let states = entries(&["Iowa", "Ohio", "Idaho", "Indiana", "Utah"]);
        let names = suggestions(&states, "Idwa");
        assert!(names.len() <= 3);
        assert_eq!(names.first().map(String::as_str), Some("Iowa"));
        for name in &names {
            assert!(similarity("Idwa", name) > 0.4);
        }
    }
}
