//! Multiplies base fused score by a consensus factor derived from how many
//! strategies returned a chunk and how good their average rank was
//! (spec §4.6, component C6).

use std::collections::HashMap;

use crate::model::{ChunkId, Strategy};

use super::engine::ChunkEvidence;

/// One chunk's evidence plus its resolved consensus boost and final score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: ChunkId,
    pub positions: HashMap<Strategy, usize>,
    pub rr: HashMap<Strategy, f64>,
    pub base_score: f64,
    pub final_score: f64,
    pub consensus_factor: f64,
    pub best_rank: usize,
    pub avg_rank: f64,
}

/// Applies the consensus formula from spec §4.6:
///
/// ```text
/// quality_factor   = 1 / (1 + avg_rank / 10)
/// consensus_raw     = 1 + β · (√M − 1)
/// consensus_capped  = min(1.5, consensus_raw)
/// consensus_factor   = consensus_capped · (0.5 + 0.5 · quality_factor)
/// final_score        = base_score · consensus_factor
/// ```
///
/// Global envelope: `consensus_factor ∈ [0.5, 1.5]` (I-3); chunks with `M = 1`
/// always get `consensus_factor ≤ 1.0` (I-4).
pub fn apply(evidence: ChunkEvidence, beta: f64) -> ScoredChunk {
    let m = evidence.positions.len();
    debug_assert!(m >= 1, "consensus applied to chunk with no hitting strategy");

    let total_rank: usize = evidence.positions.values().sum();
    let avg_rank = total_rank as f64 / m as f64;
    let best_rank = *evidence.positions.values().min().unwrap_or(&usize::MAX);

    let quality_factor = 1.0 / (1.0 + avg_rank / 10.0);
    let consensus_raw = 1.0 + beta * ((m as f64).sqrt() - 1.0);
    let consensus_capped = consensus_raw.min(1.5);
    let consensus_factor = consensus_capped * (0.5 + 0.5 * quality_factor);
    let final_score = evidence.base_score * consensus_factor;

    ScoredChunk {
        chunk_id: evidence.chunk_id,
        positions: evidence.positions,
        rr: evidence.rr,
        base_score: evidence.base_score,
        final_score,
        consensus_factor,
        best_rank,
        avg_rank,
    }
}
