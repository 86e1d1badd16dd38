//! Combines an intent distribution with base weight profiles into a
//! normalized per-strategy weight vector (spec §4.3, component C3).

use crate::config::ScoringConfig;
use crate::model::{Intent, IntentDistribution, Strategy, StrategyWeights};

/// Resolves [`IntentDistribution`] + [`ScoringConfig::base_profiles`] into
/// [`StrategyWeights`].
pub struct WeightResolver<'a> {
    config: &'a ScoringConfig,
}

impl<'a> WeightResolver<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// `W_final[s] = Σ_i p_intent[i] · W_i[s]`, renormalized so the result
    /// sums to 1 (spec §4.3, §9 "Weight normalization").
    pub fn resolve(&self, intent_distribution: &IntentDistribution) -> StrategyWeights {
        let mut raw = std::collections::HashMap::new();
        for &strategy in &Strategy::ALL {
            let mixed: f64 = Intent::TIE_ORDER
                .iter()
                .map(|&intent| {
                    intent_distribution.get(intent) * self.config.base_profiles.get(intent).get(strategy)
                })
                .sum();
            raw.insert(strategy, mixed);
        }
        let mut weights = StrategyWeights::new(raw);
        weights.renormalize();
        weights
    }
}
