/// Frequency Aggregator
///
/// Accumulates admitted terms into a candidate pool keyed by the normalized
/// token. Colliding tokens accumulate score, never overwrite, and discovery
/// order is recorded so downstream tie-breaks stay stable.
use std::collections::HashMap;

use super::tokenizer::{is_admissible, normalize_key, tokenize};

#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    scores: HashMap<String, f64>,
    /// Normalized keys in first-seen order
    order: Vec<String>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn score(&self, term: &str) -> Option<f64> {
        self.scores.get(&normalize_key(term)).copied()
    }

    /// Merge a weighted term into the pool (related-query path). The term
    /// still has to clear the admission policy.
    pub fn merge_weighted(&mut self, term: &str, weight: f64) {
        if !is_admissible(term) {
            return;
        }
        self.add(term, weight);
    }

    fn add(&mut self, term: &str, weight: f64) {
        let key = normalize_key(term);
        match self.scores.get_mut(&key) {
            Some(score) => *score += weight,
            None => {
                self.scores.insert(key.clone(), weight);
                self.order.push(key);
            }
        }
    }

    /// Top `k` candidates as `(term, local_score, discovery_index)`,
    /// score-descending with discovery order breaking ties.
    pub fn top_candidates(&self, k: usize) -> Vec<(String, f64, usize)> {
        let mut entries: Vec<(String, f64, usize)> = self
            .order
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), self.scores[key], idx))
            .collect();

        // entries start in discovery order; the stable sort keeps that as
        // the tie-break
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(k);
        entries
    }
}

/// Count occurrences of admitted tokens across all titles (scrape path).
pub fn aggregate_titles(titles: &[String]) -> CandidatePool {
    let mut pool = CandidatePool::new();
    for title in titles {
        for token in tokenize(title) {
            if is_admissible(&token) {
                pool.add(&token, 1.0);
            }
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_admitted_tokens_only() {
        let titles = vec![
            "[情報] 台積電法說會".to_string(),
            "台積電 外資買超".to_string(),
            "今天 大盤 怎麼了".to_string(),
        ];
        let pool = aggregate_titles(&titles);

        assert_eq!(pool.score("台積電"), Some(1.0));
        assert_eq!(pool.score("台積電法說會"), Some(1.0));
        assert_eq!(pool.score("外資買超"), Some(1.0));
        assert_eq!(pool.score("大盤"), None);
        assert_eq!(pool.score("今天"), None);
    }

    #[test]
    fn test_colliding_keys_accumulate() {
        let mut pool = CandidatePool::new();
        pool.merge_weighted("台積電", 3.0);
        pool.merge_weighted("台積電", 2.0);
        assert_eq!(pool.score("台積電"), Some(5.0));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_long_tokens_merge_under_truncated_key() {
        let mut pool = CandidatePool::new();
        // both admitted (contain 台積電), identical first 12 chars
        pool.merge_weighted("台積電法說會重點整理懶人包上集", 1.0);
        pool.merge_weighted("台積電法說會重點整理懶人包下集", 1.0);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.score("台積電法說會重點整理懶人包"), Some(2.0));
    }

    #[test]
    fn test_inadmissible_weighted_terms_dropped() {
        let mut pool = CandidatePool::new();
        pool.merge_weighted("整理", 50.0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_top_candidates_order_and_ties() {
        let mut pool = CandidatePool::new();
        pool.merge_weighted("聯發科", 2.0);
        pool.merge_weighted("台積電", 5.0);
        pool.merge_weighted("鴻海", 2.0);

        let top = pool.top_candidates(10);
        let terms: Vec<&str> = top.iter().map(|(t, _, _)| t.as_str()).collect();
        // 聯發科 discovered before 鴻海, ties break by discovery order
        assert_eq!(terms, vec!["台積電", "聯發科", "鴻海"]);

        let top2 = pool.top_candidates(2);
        assert_eq!(top2.len(), 2);
    }
}
