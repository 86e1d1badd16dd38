//! Scoring constants and coordinator tuning (spec §4.3, §4.4, §4.6, §4.7, §4.9).
//!
//! Unlike the ingestion-side configuration this crate's teacher loads from a
//! `config.toml` on disk, `ScoringConfig` only tunes the fusion math itself;
//! loading it from a file is optional and never required at construction
//! time (`ScoringConfig::default()` always reproduces the spec's constants).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Intent, Strategy};

/// Errors loading or validating a [`ScoringConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scoring config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scoring config: {0}")]
    Invalid(String),
}

/// Per-strategy reciprocal-rank constants (spec §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankConstants {
    pub k_vector: f64,
    pub k_lexical: f64,
    pub k_symbol: f64,
    pub k_graph: f64,
}

impl Default for RankConstants {
    fn default() -> Self {
        Self {
            k_vector: 70.0,
            k_lexical: 70.0,
            k_symbol: 50.0,
            k_graph: 50.0,
        }
    }
}

impl RankConstants {
    pub fn for_strategy(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Vector => self.k_vector,
            Strategy::Lexical => self.k_lexical,
            Strategy::Symbol => self.k_symbol,
            Strategy::Graph => self.k_graph,
        }
    }
}

/// Base weight profile matrix, one row per intent (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseProfile {
    pub vector: f64,
    pub lexical: f64,
    pub symbol: f64,
    pub graph: f64,
}

impl BaseProfile {
    pub fn get(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Vector => self.vector,
            Strategy::Lexical => self.lexical,
            Strategy::Symbol => self.symbol,
            Strategy::Graph => self.graph,
        }
    }

    fn sum(&self) -> f64 {
        self.vector + self.lexical + self.symbol + self.graph
    }
}

/// One [`BaseProfile`] row per [`Intent`] (spec §4.3 table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseProfileTable {
    pub code: BaseProfile,
    pub symbol: BaseProfile,
    pub flow: BaseProfile,
    pub concept: BaseProfile,
    pub balanced: BaseProfile,
}

impl BaseProfileTable {
    pub fn get(&self, intent: Intent) -> &BaseProfile {
        match intent {
            Intent::Code => &self.code,
            Intent::Symbol => &self.symbol,
            Intent::Flow => &self.flow,
            Intent::Concept => &self.concept,
            Intent::Balanced => &self.balanced,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Intent, &BaseProfile)> {
        [
            (Intent::Code, &self.code),
            (Intent::Symbol, &self.symbol),
            (Intent::Flow, &self.flow),
            (Intent::Concept, &self.concept),
            (Intent::Balanced, &self.balanced),
        ]
        .into_iter()
    }
}

/// Final cutoff `K` by dominant intent (spec §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffTable {
    pub symbol: usize,
    pub flow: usize,
    pub concept: usize,
    pub code: usize,
    pub balanced: usize,
}

impl CutoffTable {
    pub fn get(&self, intent: Intent) -> usize {
        match intent {
            Intent::Symbol => self.symbol,
            Intent::Flow => self.flow,
            Intent::Concept => self.concept,
            Intent::Code => self.code,
            Intent::Balanced => self.balanced,
        }
    }
}

/// All tunable constants for one deployment of the fusion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub rank_constants: RankConstants,
    pub base_profiles: BaseProfileTable,
    /// `β` in the consensus-boost formula (spec §4.6).
    pub consensus_beta: f64,
    pub cutoffs: CutoffTable,
    /// Per-query total deadline, `T_total` (spec §4.9), in milliseconds.
    pub deadline_total_ms: u64,
    /// Per-strategy soft deadline, `T_s` (spec §4.9), in milliseconds.
    pub deadline_strategy_ms: u64,
    /// Bounded query concurrency before rejecting with `Overloaded` (spec §5).
    pub max_concurrent_queries: usize,
    /// Overfetch multiplier applied to `K_final` to get each strategy's `k_s` (spec §4.9).
    pub overfetch_multiplier: usize,
    pub overfetch_floor: usize,
    pub overfetch_ceiling: usize,
    /// Maximum `k_override` a caller may supply before it's rejected (spec §3, §8).
    pub max_k_override: usize,
    /// Tags the constants above so diagnostics/features can be interpreted
    /// unambiguously across releases (spec §6, "Versioning").
    pub scoring_version: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let base_profiles = BaseProfileTable {
            code: BaseProfile { vector: 0.50, lexical: 0.30, symbol: 0.10, graph: 0.10 },
            symbol: BaseProfile { vector: 0.20, lexical: 0.20, symbol: 0.50, graph: 0.10 },
            flow: BaseProfile { vector: 0.20, lexical: 0.10, symbol: 0.20, graph: 0.50 },
            concept: BaseProfile { vector: 0.70, lexical: 0.20, symbol: 0.05, graph: 0.05 },
            balanced: BaseProfile { vector: 0.40, lexical: 0.30, symbol: 0.20, graph: 0.10 },
        };

        Self {
            rank_constants: RankConstants::default(),
            base_profiles,
            consensus_beta: 0.3,
            cutoffs: CutoffTable { symbol: 20, flow: 15, concept: 60, code: 40, balanced: 40 },
            deadline_total_ms: 1_000,
            deadline_strategy_ms: 400,
            max_concurrent_queries: 64,
            overfetch_multiplier: 3,
            overfetch_floor: 50,
            overfetch_ceiling: 300,
            max_k_override: 200,
            scoring_version: "hmr-core-1.0".to_string(),
        }
    }
}

impl ScoringConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.overfetch_floor > self.overfetch_ceiling {
            return Err(ConfigError::Invalid(
                "overfetch_floor must not exceed overfetch_ceiling".to_string(),
            ));
        }
        if self.deadline_strategy_ms > self.deadline_total_ms {
            return Err(ConfigError::Invalid(
                "deadline_strategy_ms must not exceed deadline_total_ms".to_string(),
            ));
        }
        for (intent, profile) in self.base_profiles.iter() {
            let sum = profile.sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(ConfigError::Invalid(format!(
                    "base profile for intent {intent} sums to {sum}, expected 1.0"
                )));
            }
        }
        Ok(())
    }

    /// Per-strategy overfetch cap `k_s = clamp(3·K_final, floor, ceiling)` (spec §4.9).
    pub fn strategy_k(&self, k_final: usize) -> usize {
        (self.overfetch_multiplier * k_final).clamp(self.overfetch_floor, self.overfetch_ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_base_profiles_sum_to_one() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_config_matches_spec_constants() {
        let config = ScoringConfig::default();
        assert_eq!(config.rank_constants.k_vector, 70.0);
        assert_eq!(config.rank_constants.k_symbol, 50.0);
        assert_eq!(config.cutoffs.symbol, 20);
        assert_eq!(config.cutoffs.concept, 60);
        assert_eq!(config.consensus_beta, 0.3);
    }

    #[test]
    fn strategy_k_respects_floor_and_ceiling() {
        let config = ScoringConfig::default();
        assert_eq!(config.strategy_k(5), 50); // 15 < floor(50)
        assert_eq!(config.strategy_k(40), 120);
        assert_eq!(config.strategy_k(1000), 300); // clamped to ceiling
    }

    #[test]
    fn invalid_base_profile_is_rejected() {
        let toml_str = r#"
            consensus_beta = 0.3
            deadline_total_ms = 1000
            deadline_strategy_ms = 400
            max_concurrent_queries = 64
            overfetch_multiplier = 3
            overfetch_floor = 50
            overfetch_ceiling = 300
            max_k_override = 200
            scoring_version = "test"

            [rank_constants]
            k_vector = 70.0
            k_lexical = 70.0
            k_symbol = 50.0
            k_graph = 50.0

            [cutoffs]
            symbol = 20
            flow = 15
            concept = 60
            code = 40
            balanced = 40

            [base_profiles.code]
            vector = 0.9
            lexical = 0.9
            symbol = 0.1
            graph = 0.1
        "#;
        let result = ScoringConfig::from_toml_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.toml");
        let serialized = toml::to_string(&ScoringConfig::default()).unwrap();
        std::fs::write(&path, serialized).unwrap();
        let loaded = ScoringConfig::from_file(&path).unwrap();
        assert_eq!(loaded, ScoringConfig::default());
    }
}
