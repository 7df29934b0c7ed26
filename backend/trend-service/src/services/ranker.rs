/// Score Fuser & Ranker
///
/// Combines the local frequency signal with external heat into one fused
/// score, orders the pool deterministically and truncates to the output
/// size.
use chrono::{DateTime, Utc};

use super::interest::EnrichedTerm;
use crate::models::{Provenance, RankedKeyword};

/// Canonical fusion weights. The worked ordering in the acceptance scenario
/// assumes 0.6 local / 0.4 heat; the drafts' 0.7/0.3 mix was dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub local: f64,
    pub heat: f64,
}

pub const DEFAULT_FUSION_WEIGHTS: FusionWeights = FusionWeights {
    local: 0.6,
    heat: 0.4,
};

/// Ranks labeled "up". Presentational heuristic only; this is not a trend
/// computation over time.
pub const UPTREND_RANKS: u32 = 3;

const NEUTRAL_TREND: &str = "→";

pub fn fused_score(term: &EnrichedTerm, weights: &FusionWeights) -> f64 {
    term.local_score * weights.local + term.heat * weights.heat
}

/// Sort by fused score descending, tie-break by heat descending, then by
/// discovery order; truncate to `limit` and assign 1-based rank/id.
pub fn rank(
    mut terms: Vec<EnrichedTerm>,
    limit: usize,
    weights: &FusionWeights,
    now: DateTime<Utc>,
) -> Vec<RankedKeyword> {
    terms.sort_by(|a, b| {
        let fa = fused_score(a, weights);
        let fb = fused_score(b, weights);
        fb.partial_cmp(&fa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.heat
                    .partial_cmp(&a.heat)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.discovery_index.cmp(&b.discovery_index))
    });
    terms.truncate(limit);

    terms
        .into_iter()
        .enumerate()
        .map(|(i, term)| {
            let rank = (i + 1) as u32;
            let fused = fused_score(&term, weights);
            RankedKeyword {
                id: rank,
                keyword: term.term,
                rank,
                display_volume: display_volume(term.heat, term.local_score),
                trend: trend_label(rank),
                last_update: now,
                provenance: Provenance {
                    local_score: term.local_score,
                    heat: term.heat,
                    fused_score: fused,
                },
            }
        })
        .collect()
}

fn trend_label(rank: u32) -> String {
    if rank <= UPTREND_RANKS {
        "up".to_string()
    } else {
        NEUTRAL_TREND.to_string()
    }
}

/// Heat when enriched, local count otherwise, floored at 1 so the UI never
/// shows a "0" volume for a term that ranked.
fn display_volume(heat: f64, local_score: f64) -> String {
    let volume = if heat > 0.0 { heat } else { local_score };
    format!("{}", volume.max(1.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(name: &str, local: f64, heat: f64, idx: usize) -> EnrichedTerm {
        EnrichedTerm {
            term: name.to_string(),
            local_score: local,
            heat,
            discovery_index: idx,
        }
    }

    #[test]
    fn test_fusion_scenario() {
        // pool {台積電:12, 聯發科:9, 0050:5}, heat {80, 40, 90}, weights 0.6/0.4
        let terms = vec![
            term("台積電", 12.0, 80.0, 0),
            term("聯發科", 9.0, 40.0, 1),
            term("0050", 5.0, 90.0, 2),
        ];

        let w = DEFAULT_FUSION_WEIGHTS;
        assert!((fused_score(&terms[0], &w) - 39.2).abs() < 1e-9);
        assert!((fused_score(&terms[1], &w) - 21.4).abs() < 1e-9);
        assert!((fused_score(&terms[2], &w) - 39.0).abs() < 1e-9);

        let ranked = rank(terms, 20, &w, Utc::now());
        let order: Vec<&str> = ranked.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(order, vec!["台積電", "0050", "聯發科"]);
    }

    #[test]
    fn test_ranks_are_contiguous_and_scores_non_increasing() {
        let terms: Vec<_> = (0..30)
            .map(|i| term(&format!("t{}", i), (i % 7) as f64, (i % 11) as f64 * 9.0, i))
            .collect();

        let ranked = rank(terms, 20, &DEFAULT_FUSION_WEIGHTS, Utc::now());
        assert_eq!(ranked.len(), 20);
        for (i, kw) in ranked.iter().enumerate() {
            assert_eq!(kw.rank, (i + 1) as u32);
            assert_eq!(kw.id, kw.rank);
            if i > 0 {
                assert!(ranked[i - 1].provenance.fused_score >= kw.provenance.fused_score);
            }
        }
    }

    #[test]
    fn test_tie_break_heat_then_discovery() {
        // identical fused scores: 10*0.6 + 30*0.4 = 18 = 2*0.6 + 42*0.4
        let terms = vec![
            term("low-heat", 10.0, 30.0, 0),
            term("high-heat", 2.0, 42.0, 1),
            term("low-heat-later", 10.0, 30.0, 2),
        ];

        let ranked = rank(terms, 20, &DEFAULT_FUSION_WEIGHTS, Utc::now());
        let order: Vec<&str> = ranked.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(order, vec!["high-heat", "low-heat", "low-heat-later"]);
    }

    #[test]
    fn test_trend_labels() {
        let terms: Vec<_> = (0..5)
            .map(|i| term(&format!("t{}", i), (10 - i) as f64, 0.0, i))
            .collect();
        let ranked = rank(terms, 20, &DEFAULT_FUSION_WEIGHTS, Utc::now());
        assert_eq!(ranked[0].trend, "up");
        assert_eq!(ranked[2].trend, "up");
        assert_eq!(ranked[3].trend, "→");
    }

    #[test]
    fn test_display_volume_prefers_heat_and_floors_at_one() {
        let ranked = rank(
            vec![
                term("heated", 3.0, 77.0, 0),
                term("unheated", 4.0, 0.0, 1),
                term("barely", 0.0, 0.0, 2),
            ],
            20,
            &DEFAULT_FUSION_WEIGHTS,
            Utc::now(),
        );
        let by_name = |name: &str| {
            ranked
                .iter()
                .find(|k| k.keyword == name)
                .unwrap()
                .display_volume
                .clone()
        };
        assert_eq!(by_name("heated"), "77");
        assert_eq!(by_name("unheated"), "4");
        assert_eq!(by_name("barely"), "1");
    }
}
