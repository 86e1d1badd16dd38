//! Rank-first fusion pipeline: C4 (rank normalization), C5 (fusion), C6
//! (consensus boosting), C7 (final ranking) — spec §4.4–§4.7.

pub mod consensus;
pub mod engine;
pub mod final_ranker;
pub mod rank_normalizer;

pub use consensus::ScoredChunk;
pub use engine::ChunkEvidence;
