//! Sorts fused results, applies tie-breaks, and clamps to an intent-dependent
//! cutoff (spec §4.7, component C7).

use std::cmp::Ordering;

use crate::config::ScoringConfig;
use crate::model::{Intent, Strategy};

use super::consensus::ScoredChunk;

/// Resolves the final cutoff `K`: `query.k_override` (validated to be
/// `1..=max_k_override` upstream) supersedes the per-intent table.
pub fn resolve_k_final(dominant_intent: Intent, k_override: Option<usize>, config: &ScoringConfig) -> usize {
    match k_override {
        Some(k) if k <= config.max_k_override => k,
        _ => config.cutoffs.get(dominant_intent),
    }
}

/// Sorts by `final_score` descending, `best_rank` ascending, `chunk_id`
/// lexicographic ascending (I-5); when `dominant_intent` is `flow`, chunks
/// with a graph hit are listed ahead of equal-scoring chunks without one
/// (spec §4.7, "Optional graph-hit promotion").
pub fn rank_and_cutoff(mut chunks: Vec<ScoredChunk>, dominant_intent: Intent, k_final: usize) -> Vec<ScoredChunk> {
    chunks.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                if dominant_intent == Intent::Flow {
                    let a_has_graph = a.positions.contains_key(&Strategy::Graph);
                    let b_has_graph = b.positions.contains_key(&Strategy::Graph);
                    b_has_graph.cmp(&a_has_graph)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| a.best_rank.cmp(&b.best_rank))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    chunks.truncate(k_final);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn chunk(id: &str, final_score: f64, best_rank: usize, has_graph: bool) -> ScoredChunk {
        let mut positions = HashMap::new();
        positions.insert(Strategy::Vector, best_rank);
        if has_graph {
            positions.insert(Strategy::Graph, best_rank);
        }
        ScoredChunk {
            chunk_id: id.to_string(),
            positions,
            rr: HashMap::new(),
            base_score: final_score,
            final_score,
            consensus_factor: 1.0,
            best_rank,
            avg_rank: best_rank as f64,
        }
    }

    #[test]
    fn sorts_by_score_then_best_rank_then_chunk_id() {
        let chunks = vec![
            chunk("b", 0.5, 2, false),
            chunk("a", 0.5, 2, false),
            chunk("c", 0.9, 1, false),
        ];
        let ranked = rank_and_cutoff(chunks, Intent::Balanced, 10);
        assert_eq!(ranked[0].chunk_id, "c");
        assert_eq!(ranked[1].chunk_id, "a");
        assert_eq!(ranked[2].chunk_id, "b");
    }

    #[test]
    fn cutoff_truncates_to_k_final() {
        let chunks = vec![chunk("a", 0.9, 1, false), chunk("b", 0.8, 2, false), chunk("c", 0.7, 3, false)];
        let ranked = rank_and_cutoff(chunks, Intent::Balanced, 2);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn flow_intent_promotes_equal_score_graph_hits() {
        let chunks = vec![chunk("no_graph", 0.5, 1, false), chunk("has_graph", 0.5, 1, true)];
        let ranked = rank_and_cutoff(chunks, Intent::Flow, 10);
        assert_eq!(ranked[0].chunk_id, "has_graph");
    }

    #[test]
    fn symbol_intent_does_not_apply_graph_promotion() {
        let chunks = vec![chunk("no_graph", 0.5, 1, false), chunk("has_graph", 0.5, 2, true)];
        let ranked = rank_and_cutoff(chunks, Intent::Symbol, 10);
        // Without promotion, best_rank (1 < 2) decides, not the graph hit.
        assert_eq!(ranked[0].chunk_id, "no_graph");
    }

    #[test]
    fn k_override_supersedes_intent_table() {
        let config = ScoringConfig::default();
        assert_eq!(resolve_k_final(Intent::Symbol, Some(5), &config), 5);
        assert_eq!(resolve_k_final(Intent::Symbol, None, &config), 20);
        assert_eq!(resolve_k_final(Intent::Symbol, Some(9999), &config), 20);
    }
}
