//! Converts `(chunk_id, position)` pairs into reciprocal-rank contributions
//! (spec §4.4, component C4).

use std::collections::HashMap;

use crate::config::RankConstants;
use crate::model::{ChunkId, Strategy, StrategyResult};

/// `rr_s(chunk) = 1 / (k_s + position)` for every chunk one strategy returned.
///
/// Returns a map from chunk id to `(position, rr)`; chunks the strategy did
/// not return simply have no entry — the caller treats a missing entry as
/// `rr_s(chunk) = 0` (spec §4.5).
pub fn normalize(strategy: Strategy, result: &StrategyResult, constants: &RankConstants) -> HashMap<ChunkId, (usize, f64)> {
    let k_s = constants.for_strategy(strategy);
    result
        .iter()
        .map(|(id, position)| (id.clone(), (position, 1.0 / (k_s + position as f64))))
        .collect()
}
