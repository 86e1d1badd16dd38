//! Weighted sum of reciprocal-rank contributions across strategies
//! (spec §4.5, component C5).

use std::collections::HashMap;

use crate::config::ScoringConfig;
use crate::model::{ChunkId, Strategy, StrategyResult, StrategyWeights};

use super::rank_normalizer::normalize;

/// Everything known about one chunk's per-strategy evidence before consensus
/// boosting is applied.
#[derive(Debug, Clone)]
pub struct ChunkEvidence {
    pub chunk_id: ChunkId,
    /// 1-based position per strategy that returned this chunk.
    pub positions: HashMap<Strategy, usize>,
    /// Reciprocal-rank contribution per strategy that returned this chunk.
    pub rr: HashMap<Strategy, f64>,
    /// `Σ_s W_final[s] · rr_s(chunk)` — strictly non-negative (spec §4.5).
    pub base_score: f64,
}

/// Fuses four per-strategy results into per-chunk evidence. This is the only
/// place intent weights are applied (spec §4.5).
pub fn fuse(
    results: &HashMap<Strategy, StrategyResult>,
    weights: &StrategyWeights,
    config: &ScoringConfig,
) -> Vec<ChunkEvidence> {
    let mut evidence: HashMap<ChunkId, ChunkEvidence> = HashMap::new();

    for &strategy in &Strategy::ALL {
        let Some(result) = results.get(&strategy) else { continue };
        let normalized = normalize(strategy, result, &config.rank_constants);
        let weight = weights.get(strategy);

        for (chunk_id, (position, rr)) in normalized {
            let entry = evidence.entry(chunk_id.clone()).or_insert_with(|| ChunkEvidence {
                chunk_id: chunk_id.clone(),
                positions: HashMap::new(),
                rr: HashMap::new(),
                base_score: 0.0,
            });
            entry.positions.insert(strategy, position);
            entry.rr.insert(strategy, rr);
            entry.base_score += weight * rr;
        }
    }

    evidence.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Intent;
    use crate::weights::WeightResolver;
    use std::collections::HashMap;

    fn flow_weights(config: &ScoringConfig) -> StrategyWeights {
        let dist = crate::model::IntentDistribution::from_probabilities(HashMap::from([
            (Intent::Flow, 1.0),
            (Intent::Symbol, 0.0),
            (Intent::Concept, 0.0),
            (Intent::Code, 0.0),
            (Intent::Balanced, 0.0),
        ]));
        WeightResolver::new(config).resolve(&dist)
    }

    #[test]
    fn base_score_is_non_negative_and_sums_contributions() {
        let config = ScoringConfig::default();
        let weights = flow_weights(&config);
        let mut results = HashMap::new();
        results.insert(Strategy::Graph, StrategyResult::new(vec!["c1".into()]));
        results.insert(Strategy::Symbol, StrategyResult::new(vec!["c1".into()]));

        let fused = fuse(&results, &weights, &config);
        assert_eq!(fused.len(), 1);
        let chunk = &fused[0];
        assert!(chunk.base_score >= 0.0);
        assert_eq!(chunk.positions.len(), 2);
        let expected = weights.get(Strategy::Graph) / (50.0 + 1.0) + weights.get(Strategy::Symbol) / (50.0 + 1.0);
        assert!((chunk.base_score - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_strategy_contributes_nothing() {
        let config = ScoringConfig::default();
        let weights = flow_weights(&config);
        let mut results = HashMap::new();
        results.insert(Strategy::Vector, StrategyResult::new(vec!["c1".into()]));
        let fused = fuse(&results, &weights, &config);
        assert_eq!(fused[0].positions.len(), 1);
        assert!(!fused[0].positions.contains_key(&Strategy::Graph));
    }

    #[test]
    fn no_phantom_hits_chunk_set_is_union_of_inputs() {
        let config = ScoringConfig::default();
        let weights = flow_weights(&config);
        let mut results = HashMap::new();
        results.insert(Strategy::Vector, StrategyResult::new(vec!["a".into(), "b".into()]));
        results.insert(Strategy::Lexical, StrategyResult::new(vec!["b".into(), "c".into()]));
        let fused = fuse(&results, &weights, &config);
        let ids: std::collections::HashSet<_> = fused.iter().map(|e| e.chunk_id.clone()).collect();
        assert_eq!(ids, std::collections::HashSet::from(["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn fusion_is_invariant_to_anything_but_order() {
        // P-8: StrategyResult never carries a raw backend score, only order —
        // so any two backends that agree on order (however their internal
        // scores were scaled) produce byte-identical evidence here.
        let config = ScoringConfig::default();
        let weights = flow_weights(&config);
        let mut results_a = HashMap::new();
        results_a.insert(Strategy::Vector, StrategyResult::new(vec!["x".into(), "y".into()]));
        let mut results_b = HashMap::new();
        results_b.insert(Strategy::Vector, StrategyResult::new(vec!["x".into(), "y".into()]));

        let mut fused_a = fuse(&results_a, &weights, &config);
        let mut fused_b = fuse(&results_b, &weights, &config);
        fused_a.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));
        fused_b.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));
        for (a, b) in fused_a.iter().zip(fused_b.iter()) {
            assert_eq!(a.chunk_id, b.chunk_id);
            assert!((a.base_score - b.base_score).abs() < 1e-15);
        }
    }
}
