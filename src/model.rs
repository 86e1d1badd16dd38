//! Core data model: queries, intents, weights, and fused hits (spec §3).

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, comparable, hashable chunk identifier.
pub type ChunkId = String;

/// The four independent retrieval backends HMR-Core fuses evidence from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Vector,
    Lexical,
    Symbol,
    Graph,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Vector,
        Strategy::Lexical,
        Strategy::Symbol,
        Strategy::Graph,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Vector => "vector",
            Strategy::Lexical => "lexical",
            Strategy::Symbol => "symbol",
            Strategy::Graph => "graph",
        };
        f.write_str(s)
    }
}

/// Discrete categorization of the user's information need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Symbol,
    Flow,
    Concept,
    Code,
    Balanced,
}

impl Intent {
    /// Ordering used to break ties among intents within 0.05 of the max
    /// (spec §4.7, "Cutoff K by dominant intent").
    pub const TIE_ORDER: [Intent; 5] = [
        Intent::Symbol,
        Intent::Flow,
        Intent::Code,
        Intent::Concept,
        Intent::Balanced,
    ];
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Symbol => "symbol",
            Intent::Flow => "flow",
            Intent::Concept => "concept",
            Intent::Code => "code",
            Intent::Balanced => "balanced",
        };
        f.write_str(s)
    }
}

/// Structured query filters (language, path prefix, kind).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFilters {
    pub language: Option<String>,
    pub path_prefix: Option<String>,
    pub kind: Option<ChunkKind>,
}

/// The kind of retrievable unit a chunk represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Function,
    Class,
    File,
    Chunk,
}

/// Immutable request entry point (spec §3, "Query").
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub repo_id: String,
    pub snapshot_id: String,
    pub k_override: Option<usize>,
    pub filters: Option<QueryFilters>,
    pub trace_id: String,
}

impl Query {
    pub fn new(text: impl Into<String>, repo_id: impl Into<String>, snapshot_id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            repo_id: repo_id.into(),
            snapshot_id: snapshot_id.into(),
            k_override: None,
            filters: None,
            trace_id: trace_id.into(),
        }
    }
}

/// Mapping from intent label to probability in `[0, 1]`, summing to `1 ± ε`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDistribution {
    probs: HashMap<Intent, f64>,
}

/// Tolerance used across the crate for "sums to 1" checks (spec §3, I-2).
pub const EPSILON: f64 = 1e-6;

impl IntentDistribution {
    /// Builds a distribution from raw (unnormalized) scores, applying a fixed
    /// softmax temperature so a dominant signal yields a dominant label.
    pub fn from_scores(scores: &HashMap<Intent, f64>, temperature: f64) -> Self {
        let max = scores.values().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: HashMap<Intent, f64> = scores
            .iter()
            .map(|(&intent, &s)| (intent, ((s - max) / temperature).exp()))
            .collect();
        let sum: f64 = exp.values().sum();
        let probs = exp.into_iter().map(|(i, v)| (i, v / sum)).collect();
        Self { probs }
    }

    /// Builds a distribution directly from already-normalized probabilities.
    pub fn from_probabilities(probs: HashMap<Intent, f64>) -> Self {
        Self { probs }
    }

    pub fn get(&self, intent: Intent) -> f64 {
        *self.probs.get(&intent).unwrap_or(&0.0)
    }

    pub fn sum(&self) -> f64 {
        self.probs.values().sum()
    }

    /// The intent with the largest probability, ties broken by [`Intent::TIE_ORDER`]
    /// among labels within 0.05 of the maximum (spec §4.7).
    pub fn dominant(&self) -> Intent {
        let max_p = self.probs.values().cloned().fold(f64::NEG_INFINITY, f64::max);
        for &intent in &Intent::TIE_ORDER {
            if let Some(&p) = self.probs.get(&intent) {
                if max_p - p <= 0.05 {
                    return intent;
                }
            }
        }
        Intent::Balanced
    }

    pub fn iter(&self) -> impl Iterator<Item = (Intent, f64)> + '_ {
        self.probs.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= EPSILON && self.probs.values().all(|&p| (0.0..=1.0).contains(&p))
    }
}

/// Mapping from strategy to weight in `[0, 1]`, summing to `1 ± ε`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    weights: HashMap<Strategy, f64>,
}

impl StrategyWeights {
    pub fn new(weights: HashMap<Strategy, f64>) -> Self {
        Self { weights }
    }

    pub fn get(&self, strategy: Strategy) -> f64 {
        *self.weights.get(&strategy).unwrap_or(&0.0)
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= EPSILON && self.weights.values().all(|&w| (0.0..=1.0).contains(&w))
    }

    /// Renormalizes in place so weights sum to exactly 1 (spec §4.3, §9).
    pub fn renormalize(&mut self) {
        let sum: f64 = self.weights.values().sum();
        if sum > 0.0 {
            for v in self.weights.values_mut() {
                *v /= sum;
            }
        }
    }
}

/// Per-strategy ordered sequence of chunk ids (spec §3, "StrategyResult").
///
/// Positions are 1-based and every `ChunkId` appears at most once (I-1). No
/// raw backend score is carried here by design: only order is observable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyResult {
    ordered_ids: Vec<ChunkId>,
}

impl StrategyResult {
    pub fn new(ordered_ids: Vec<ChunkId>) -> Self {
        debug_assert!(
            {
                let mut seen = HashSet::new();
                ordered_ids.iter().all(|id| seen.insert(id))
            },
            "StrategyResult must not contain duplicate chunk ids (I-1)"
        );
        Self { ordered_ids }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    /// Iterates `(chunk_id, position)` pairs, position 1-based.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkId, usize)> {
        self.ordered_ids.iter().zip(1..)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ordered_ids.iter().any(|c| c == id)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.ordered_ids.iter().position(|c| c == id).map(|i| i + 1)
    }
}

/// Status of a single strategy's call for one query (spec §4.9 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    Done,
    Timeout,
    Failed,
}

/// Chunk metadata carried in the feature vector (spec §4.8, "Metadata").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub kind: Option<ChunkKind>,
    pub file_path_depth: Option<u32>,
    pub token_size: Option<u32>,
}

/// Deterministic, ordering-stable feature vector for one surviving chunk
/// (spec §4.8). Field order is part of the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub vec_position: i64,
    pub lex_position: i64,
    pub sym_position: i64,
    pub graph_position: i64,
    pub vec_rr: f64,
    pub lex_rr: f64,
    pub sym_rr: f64,
    pub graph_rr: f64,
    pub weight_vector: f64,
    pub weight_lexical: f64,
    pub weight_symbol: f64,
    pub weight_graph: f64,
    pub strategies_hit_count: u8,
    pub best_rank: usize,
    pub avg_rank: f64,
    pub consensus_factor: f64,
    pub meta: ChunkMeta,
}

/// A chunk that survived fusion (spec §3, "FusedHit").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    pub chunk_id: ChunkId,
    pub base_score: f64,
    pub final_score: f64,
    pub strategies_hit: Vec<Strategy>,
    pub best_rank: usize,
    pub avg_rank: f64,
    pub consensus_factor: f64,
    pub feature_vector: FeatureVector,
}
