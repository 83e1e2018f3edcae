//! Name similarity scoring.
//!
//! Rules are tried in strict precedence and the first one that applies decides
//! the score:
//!
//! 1. Either side normalizes to nothing: 0
//! 2. Identical after normalization: 100
//! 3. Shared words: share of common words relative to the longer word list
//! 4. Levenshtein distance relative to the longer string, floored to 0 below 20

use std::collections::{BTreeSet, HashMap};

use fireems_model::SimilarityResult;
use rapidfuzz::distance::levenshtein;

use crate::normalize::normalize_name;

pub const EXACT_MATCH_SCORE: u8 = 100;
/// Edit-distance scores under this value are reported as 0.
pub const EDIT_DISTANCE_FLOOR: u8 = 20;

/// Scores the similarity of two raw names on a 0-100 scale.
pub fn score(a: &str, b: &str) -> SimilarityResult {
    score_normalized(&normalize_name(a), &normalize_name(b))
}

/// Same as [`score`] for names that are already normalized.
pub fn score_normalized(a: &str, b: &str) -> SimilarityResult {
    if a.is_empty() || b.is_empty() {
        return SimilarityResult::none();
    }

    if a == b {
        return SimilarityResult::new(EXACT_MATCH_SCORE, "Exact match");
    }

    let words_a: Vec<&str> = a.split(' ').collect();
    let words_b: Vec<&str> = b.split(' ').collect();
    let lookup_b: BTreeSet<&str> = words_b.iter().copied().collect();
    let mut seen = BTreeSet::new();
    let common: Vec<&str> = words_a
        .iter()
        .copied()
        .filter(|word| lookup_b.contains(word) && seen.insert(*word))
        .collect();

    if !common.is_empty() {
        let longest = words_a.len().max(words_b.len());
        return SimilarityResult::new(
            percentage(common.len(), longest),
            format!("Common words: {}", common.join(", ")),
        );
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    let distance = levenshtein::distance(a.chars(), b.chars());
    let value = percentage(max_len.saturating_sub(distance), max_len);
    if value < EDIT_DISTANCE_FLOOR {
        return SimilarityResult::none();
    }
    SimilarityResult::new(value, format!("Edit distance: {distance}"))
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let ratio = part as f64 / whole as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Memo of scores keyed by normalized name pairs.
///
/// Lives for a single suggestion pass; dropping it never changes results.
#[derive(Debug, Default)]
pub struct ScoreCache {
    entries: HashMap<(String, String), SimilarityResult>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&mut self, a: &str, b: &str) -> SimilarityResult {
        let key = (normalize_name(a), normalize_name(b));
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }
        let result = score_normalized(&key.0, &key.1);
        self.entries.insert(key, result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_after_normalization() {
        let result = score("Incident ID", "incident_id");
        assert_eq!(result.score, 100);
        assert_eq!(result.reasons, vec!["Exact match"]);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(score("", "incident_id").score, 0);
        assert_eq!(score("###", "incident_id").score, 0);
        assert!(score("", "").reasons.is_empty());
    }

    #[test]
    fn common_words_use_longer_list() {
        // "unit" is shared; longer list has 3 words.
        let result = score("Unit ID Primary", "unit");
        assert_eq!(result.score, 33);
        assert_eq!(result.reasons, vec!["Common words: unit"]);
    }

    #[test]
    fn duplicate_words_count_once() {
        let result = score("time time", "time");
        assert_eq!(result.score, 50);
    }

    #[test]
    fn edit_distance_fallback() {
        // kitten -> sitting: distance 3 over 7 chars.
        let result = score("kitten", "sitting");
        assert_eq!(result.score, 57);
        assert_eq!(result.reasons, vec!["Edit distance: 3"]);
    }

    #[test]
    fn edit_distance_floor() {
        assert_eq!(score("abc", "xyz").score, 0);
        // zip -> latitude: distance 7 over 8 chars is 13, under the floor.
        assert_eq!(score("zip", "latitude").score, 0);
    }

    #[test]
    fn common_words_take_precedence_over_edit_distance() {
        let result = score("Incident Number", "incident_id");
        assert_eq!(result.score, 50);
        assert!(result.reasons[0].starts_with("Common words"));
    }

    #[test]
    fn cache_matches_direct_scoring() {
        let mut cache = ScoreCache::new();
        let first = cache.score("Dispatch Time", "dispatch_time");
        let second = cache.score("dispatch-time", "Dispatch.Time");
        assert_eq!(first, score("Dispatch Time", "dispatch_time"));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
