//! Orchestrates one query end to end: fan-out, fusion, consensus, ranking,
//! and feature emission (spec §4.9, component C9).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::adapters::IndexAdapter;
use crate::cache::HotCache;
use crate::config::ScoringConfig;
use crate::error::HmrError;
use crate::features::{ChunkMetaProvider, NoopMetaProvider};
use crate::fusion::{consensus, engine, final_ranker};
use crate::intent::IntentClassifier;
use crate::model::{FusedHit, IntentDistribution, Query, QueryFilters, Strategy, StrategyResult, StrategyStatus, StrategyWeights};

/// Outcome cache key: the fields of [`Query`] that determine the final
/// ranking, excluding `trace_id` (spec §6, a trace id is per-call metadata,
/// not part of the query's identity).
type OutcomeCacheKey = (String, String, String, Option<usize>, Option<QueryFilters>);

/// Capacity of the per-[`Coordinator`] outcome cache (spec §10, "Hot caches").
const OUTCOME_CACHE_CAPACITY: usize = 256;

/// Per-query diagnostics record (spec §6, "Diagnostics/metrics stream").
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub trace_id: String,
    pub intent_distribution: IntentDistribution,
    pub weights_used: StrategyWeights,
    pub strategy_status: HashMap<Strategy, StrategyStatus>,
    pub strategy_latency_ms: HashMap<Strategy, u64>,
    pub strategy_input_counts: HashMap<Strategy, usize>,
    pub union_chunk_count: usize,
    pub k_final: usize,
    pub scoring_version: String,
    pub elapsed_ms: u64,
}

/// Bundles the ranked hits with the diagnostics record for one query (spec §6).
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub hits: Vec<FusedHit>,
    pub diagnostics: Diagnostics,
}

/// Fans a [`Query`] out to four [`IndexAdapter`]s and reduces their results to
/// a ranked [`QueryOutcome`] (spec §4.9).
///
/// Mirrors the teacher's `search_hybrid` parallel-join shape, generalized from
/// a fixed two-strategy join to a fixed four-strategy fan-out behind a
/// concurrency-limiting semaphore.
pub struct Coordinator<C: IntentClassifier> {
    vector: Arc<dyn IndexAdapter>,
    lexical: Arc<dyn IndexAdapter>,
    symbol: Arc<dyn IndexAdapter>,
    graph: Arc<dyn IndexAdapter>,
    classifier: C,
    config: ScoringConfig,
    meta_provider: Arc<dyn ChunkMetaProvider>,
    concurrency: Arc<Semaphore>,
    outcome_cache: HotCache<OutcomeCacheKey, QueryOutcome>,
}

impl<C: IntentClassifier> Coordinator<C> {
    pub fn new(
        vector: Arc<dyn IndexAdapter>,
        lexical: Arc<dyn IndexAdapter>,
        symbol: Arc<dyn IndexAdapter>,
        graph: Arc<dyn IndexAdapter>,
        classifier: C,
        config: ScoringConfig,
    ) -> Self {
        let concurrency = Arc::new(Semaphore::new(config.max_concurrent_queries));
        Self {
            vector,
            lexical,
            symbol,
            graph,
            classifier,
            config,
            meta_provider: Arc::new(NoopMetaProvider),
            concurrency,
            outcome_cache: HotCache::new(OUTCOME_CACHE_CAPACITY),
        }
    }

    /// Swaps in a real chunk-metadata collaborator (spec §6, "Chunk-metadata
    /// collaborator"). Defaults to [`NoopMetaProvider`].
    pub fn with_meta_provider(mut self, meta_provider: Arc<dyn ChunkMetaProvider>) -> Self {
        self.meta_provider = meta_provider;
        self
    }

    fn cache_key(query: &Query) -> OutcomeCacheKey {
        (
            query.text.clone(),
            query.repo_id.clone(),
            query.snapshot_id.clone(),
            query.k_override,
            query.filters.clone(),
        )
    }

    fn adapter_for(&self, strategy: Strategy) -> &Arc<dyn IndexAdapter> {
        match strategy {
            Strategy::Vector => &self.vector,
            Strategy::Lexical => &self.lexical,
            Strategy::Symbol => &self.symbol,
            Strategy::Graph => &self.graph,
        }
    }

    fn validate(&self, query: &Query) -> Result<(), HmrError> {
        if query.text.trim().is_empty() {
            return Err(HmrError::InvalidQuery("query text must not be empty".to_string()));
        }
        if let Some(k) = query.k_override {
            if k == 0 || k > self.config.max_k_override {
                return Err(HmrError::InvalidQuery(format!(
                    "k_override must be in 1..={}, got {k}",
                    self.config.max_k_override
                )));
            }
        }
        Ok(())
    }

    /// Runs one query through classification, fan-out, fusion, consensus,
    /// ranking, and feature emission, returning the ordered hits plus
    /// diagnostics (spec §4.9, §6).
    pub async fn query(&self, query: Query) -> Result<QueryOutcome, HmrError> {
        let start = Instant::now();
        self.validate(&query)?;

        let cache_key = Self::cache_key(&query);
        if let Some(mut cached) = self.outcome_cache.get(&cache_key) {
            debug!("trace_id={} outcome cache hit", query.trace_id);
            cached.diagnostics.trace_id = query.trace_id;
            return Ok(cached);
        }

        let _permit = self
            .concurrency
            .clone()
            .try_acquire_owned()
            .map_err(|_| HmrError::Overloaded)?;

        let intent_distribution = self.classifier.classify(&query.text);
        let dominant_intent = intent_distribution.dominant();

        let mut weights = crate::weights::WeightResolver::new(&self.config).resolve(&intent_distribution);
        if !weights.is_valid() {
            weights.renormalize();
        }

        let k_final = final_ranker::resolve_k_final(dominant_intent, query.k_override, &self.config);
        let k_s = self.config.strategy_k(k_final);

        let total_deadline = Duration::from_millis(self.config.deadline_total_ms);
        let fan_out = self.fan_out(&query, k_s);

        let (results, status, latency_ms) = match timeout(total_deadline, fan_out).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "trace_id={} total deadline of {}ms exceeded; treating in-flight strategies as timed out",
                    query.trace_id, self.config.deadline_total_ms
                );
                let timed_out_status = Strategy::ALL.iter().map(|&s| (s, StrategyStatus::Timeout)).collect();
                let empty_results = HashMap::new();
                let zero_latency = Strategy::ALL.iter().map(|&s| (s, self.config.deadline_total_ms)).collect();
                (empty_results, timed_out_status, zero_latency)
            }
        };

        if status.values().all(|s| *s != StrategyStatus::Done) {
            warn!("trace_id={} all strategies failed or timed out", query.trace_id);
            return Err(HmrError::AllStrategiesFailed);
        }

        let strategy_input_counts = results.iter().map(|(&s, r)| (s, r.len())).collect();

        let evidence = engine::fuse(&results, &weights, &self.config);
        let union_chunk_count = evidence.len();

        let scored: Vec<_> = evidence
            .into_iter()
            .map(|e| consensus::apply(e, self.config.consensus_beta))
            .collect();
        let ranked = final_ranker::rank_and_cutoff(scored, dominant_intent, k_final);

        let hits: Vec<FusedHit> = ranked
            .into_iter()
            .map(|chunk| crate::features::emit(chunk, &weights, self.meta_provider.as_ref()))
            .collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "trace_id={} intent={dominant_intent} hits={} elapsed_ms={elapsed_ms}",
            query.trace_id,
            hits.len()
        );

        let diagnostics = Diagnostics {
            trace_id: query.trace_id,
            intent_distribution,
            weights_used: weights,
            strategy_status: status,
            strategy_latency_ms: latency_ms,
            strategy_input_counts,
            union_chunk_count,
            k_final,
            scoring_version: self.config.scoring_version.clone(),
            elapsed_ms,
        };

        let outcome = QueryOutcome { hits, diagnostics };
        self.outcome_cache.put(cache_key, outcome.clone());
        Ok(outcome)
    }

    /// Runs the four strategy calls concurrently, each bounded by the
    /// per-strategy soft deadline; a strategy that errors or times out
    /// contributes an empty result rather than failing the query (spec §4.9,
    /// §7 "recovered internally").
    async fn fan_out(
        &self,
        query: &Query,
        k_s: usize,
    ) -> (HashMap<Strategy, StrategyResult>, HashMap<Strategy, StrategyStatus>, HashMap<Strategy, u64>) {
        let strategy_deadline = Duration::from_millis(self.config.deadline_strategy_ms);
        let deadline_instant = Instant::now() + strategy_deadline;

        let calls = Strategy::ALL.map(|strategy| {
            let adapter = self.adapter_for(strategy).clone();
            let query = query.clone();
            async move {
                let call_start = Instant::now();
                let outcome = timeout(strategy_deadline, adapter.retrieve(&query, k_s, deadline_instant)).await;
                let latency_ms = call_start.elapsed().as_millis() as u64;
                let (result, status) = match outcome {
                    Ok(Ok(result)) => (result, StrategyStatus::Done),
                    Ok(Err(_adapter_err)) => (StrategyResult::empty(), StrategyStatus::Failed),
                    Err(_elapsed) => (StrategyResult::empty(), StrategyStatus::Timeout),
                };
                debug!("strategy={strategy} status={status:?} latency_ms={latency_ms} took {:?}", call_start.elapsed());
                (strategy, result, status, latency_ms)
            }
        });

        let [v, l, s, g] = calls;
        let (v, l, s, g) = tokio::join!(v, l, s, g);

        let mut results = HashMap::new();
        let mut status = HashMap::new();
        let mut latency_ms = HashMap::new();
        for (strategy, result, st, lat) in [v, l, s, g] {
            results.insert(strategy, result);
            status.insert(strategy, st);
            latency_ms.insert(strategy, lat);
        }
        (results, status, latency_ms)
    }
}
