//! Emits a deterministic, LTR-ready feature vector per surviving chunk
//! (spec §4.8, component C8).

use crate::fusion::ScoredChunk;
use crate::model::{ChunkMeta, FeatureVector, FusedHit, Strategy, StrategyWeights};

/// Read-only chunk-metadata collaborator consumed only by the feature
/// emitter (spec §6, "Chunk-metadata collaborator"). Absence of metadata
/// must not fail the query; unknown fields become `null`/`None`.
pub trait ChunkMetaProvider: Send + Sync {
    fn get_meta(&self, chunk_id: &str) -> Option<ChunkMeta>;
}

/// A [`ChunkMetaProvider`] that never has metadata; used when no collaborator
/// is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetaProvider;

impl ChunkMetaProvider for NoopMetaProvider {
    fn get_meta(&self, _chunk_id: &str) -> Option<ChunkMeta> {
        None
    }
}

/// Builds the final [`FusedHit`] (including its [`FeatureVector`]) for one
/// ranked chunk. Feature ordering is fixed (spec §4.8, "Feature ordering is
/// fixed and stable").
pub fn emit(chunk: ScoredChunk, weights: &StrategyWeights, meta_provider: &dyn ChunkMetaProvider) -> FusedHit {
    let position_of = |s: Strategy| chunk.positions.get(&s).map(|&p| p as i64).unwrap_or(-1);
    let rr_of = |s: Strategy| *chunk.rr.get(&s).unwrap_or(&0.0);

    let meta = meta_provider.get_meta(&chunk.chunk_id).unwrap_or_default();

    let feature_vector = FeatureVector {
        vec_position: position_of(Strategy::Vector),
        lex_position: position_of(Strategy::Lexical),
        sym_position: position_of(Strategy::Symbol),
        graph_position: position_of(Strategy::Graph),
        vec_rr: rr_of(Strategy::Vector),
        lex_rr: rr_of(Strategy::Lexical),
        sym_rr: rr_of(Strategy::Symbol),
        graph_rr: rr_of(Strategy::Graph),
        weight_vector: weights.get(Strategy::Vector),
        weight_lexical: weights.get(Strategy::Lexical),
        weight_symbol: weights.get(Strategy::Symbol),
        weight_graph: weights.get(Strategy::Graph),
        strategies_hit_count: chunk.positions.len() as u8,
        best_rank: chunk.best_rank,
        avg_rank: chunk.avg_rank,
        consensus_factor: chunk.consensus_factor,
        meta,
    };

    let strategies_hit: Vec<Strategy> = Strategy::ALL
        .iter()
        .copied()
        .filter(|s| chunk.positions.contains_key(s))
        .collect();

    FusedHit {
        chunk_id: chunk.chunk_id,
        base_score: chunk.base_score,
        final_score: chunk.final_score,
        strategies_hit,
        best_rank: chunk.best_rank,
        avg_rank: chunk.avg_rank,
        consensus_factor: chunk.consensus_factor,
        feature_vector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::fusion::engine::ChunkEvidence;
    use crate::model::{ChunkKind, Intent, IntentDistribution};
    use crate::weights::WeightResolver;
    use std::collections::HashMap;

    struct FixedMetaProvider;
    impl ChunkMetaProvider for FixedMetaProvider {
        fn get_meta(&self, _chunk_id: &str) -> Option<ChunkMeta> {
            Some(ChunkMeta { kind: Some(ChunkKind::Function), file_path_depth: Some(3), token_size: Some(120) })
        }
    }

    fn balanced_weights(config: &ScoringConfig) -> StrategyWeights {
        let dist = IntentDistribution::from_probabilities(HashMap::from([
            (Intent::Balanced, 1.0),
            (Intent::Symbol, 0.0),
            (Intent::Flow, 0.0),
            (Intent::Concept, 0.0),
            (Intent::Code, 0.0),
        ]));
        WeightResolver::new(config).resolve(&dist)
    }

    #[test]
    fn absent_strategies_use_sentinel_position() {
        let config = ScoringConfig::default();
        let weights = balanced_weights(&config);
        let evidence = ChunkEvidence {
            chunk_id: "c1".to_string(),
            positions: HashMap::from([(Strategy::Vector, 3)]),
            rr: HashMap::from([(Strategy::Vector, 0.1)]),
            base_score: 0.04,
        };
        let scored = crate::fusion::consensus::apply(evidence, config.consensus_beta);
        let hit = emit(scored, &weights, &NoopMetaProvider);
        assert_eq!(hit.feature_vector.vec_position, 3);
        assert_eq!(hit.feature_vector.lex_position, -1);
        assert_eq!(hit.feature_vector.sym_position, -1);
        assert_eq!(hit.feature_vector.graph_position, -1);
        assert!(hit.feature_vector.meta.kind.is_none());
    }

    #[test]
    fn missing_metadata_does_not_fail_emission() {
        let config = ScoringConfig::default();
        let weights = balanced_weights(&config);
        let evidence = ChunkEvidence {
            chunk_id: "c1".to_string(),
            positions: HashMap::from([(Strategy::Lexical, 1)]),
            rr: HashMap::from([(Strategy::Lexical, 0.2)]),
            base_score: 0.06,
        };
        let scored = crate::fusion::consensus::apply(evidence, config.consensus_beta);
        let hit = emit(scored, &weights, &FixedMetaProvider);
        assert_eq!(hit.feature_vector.meta.token_size, Some(120));
    }

    #[test]
    fn strategies_hit_matches_positions() {
        let config = ScoringConfig::default();
        let weights = balanced_weights(&config);
        let evidence = ChunkEvidence {
            chunk_id: "c1".to_string(),
            positions: HashMap::from([(Strategy::Symbol, 1), (Strategy::Graph, 2)]),
            rr: HashMap::from([(Strategy::Symbol, 0.02), (Strategy::Graph, 0.02)]),
            base_score: 0.01,
        };
        let scored = crate::fusion::consensus::apply(evidence, config.consensus_beta);
        let hit = emit(scored, &weights, &NoopMetaProvider);
        assert_eq!(hit.strategies_hit.len(), 2);
        assert!(hit.strategies_hit.contains(&Strategy::Symbol));
        assert!(hit.strategies_hit.contains(&Strategy::Graph));
        assert_eq!(hit.feature_vector.strategies_hit_count, 2);
    }
}
