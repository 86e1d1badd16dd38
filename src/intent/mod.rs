//! Intent classification: maps query text to a probability distribution over
//! `{symbol, flow, concept, code, balanced}` (spec §4.2, component C2).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Intent, IntentDistribution};

/// Per-match increment for an identifier-like signal (spec §4.2, "symbol").
const SYMBOL_INCREMENT: f64 = 0.8;
/// Per-match increment for a call/usage verb (spec §4.2, "flow").
const FLOW_INCREMENT: f64 = 1.2;
/// Per-match increment for a conceptual verb (spec §4.2, "concept").
const CONCEPT_INCREMENT: f64 = 1.2;
/// Per-match increment for a code-example verb (spec §4.2, "code").
const CODE_INCREMENT: f64 = 1.0;
/// Constant baseline contributed by the `balanced` feature regardless of text.
const BALANCED_BASELINE: f64 = 0.5;
/// Softmax temperature: low enough that a single clear signal (e.g. one
/// concept phrase match) still clears the spec's post-mixing weight bars —
/// `W_final[vector] >= 0.6` for a concept-dominant query, `W_final[graph] >=
/// 0.5` for a flow-dominant one — high enough that an ambiguous query (no
/// signal beyond the balanced baseline) stays near uniform.
const SOFTMAX_TEMPERATURE: f64 = 0.3;

/// Maps query text to an [`IntentDistribution`].
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> IntentDistribution;
}

fn camel_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z][a-z0-9]+[A-Z][A-Za-z0-9]*").unwrap())
}

fn dotted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\.[A-Za-z_][A-Za-z0-9_]*").unwrap())
}

fn snake_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z][a-z0-9]*_[a-z0-9_]+").unwrap())
}

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(class|def|fn)\b").unwrap())
}

const FLOW_PHRASES: &[&str] = &["calls", "callers", "called by", "trace", "flow", "where used"];
const CONCEPT_PHRASES: &[&str] = &["explain", "what is", "how does", "overview"];
const CODE_PHRASES: &[&str] = &["example", "implement", "loop", "conditional", "pattern"];

fn count_phrase_matches(lower_text: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|p| lower_text.contains(*p)).count()
}

/// Rule + softmax baseline classifier (spec §4.2, "Algorithm (baseline, rule + softmax)").
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    fn raw_scores(&self, text: &str) -> HashMap<Intent, f64> {
        let lower = text.to_lowercase();

        let symbol_matches = text.contains("::") as usize
            + (camel_case_re().is_match(text) as usize)
            + (dotted_re().is_match(text) as usize)
            + (snake_case_re().is_match(text) as usize)
            + (keyword_re().is_match(text) as usize);
        let symbol = symbol_matches as f64 * SYMBOL_INCREMENT;

        let flow = count_phrase_matches(&lower, FLOW_PHRASES) as f64 * FLOW_INCREMENT;
        let concept = count_phrase_matches(&lower, CONCEPT_PHRASES) as f64 * CONCEPT_INCREMENT;
        let code = count_phrase_matches(&lower, CODE_PHRASES) as f64 * CODE_INCREMENT;

        HashMap::from([
            (Intent::Symbol, symbol),
            (Intent::Flow, flow),
            (Intent::Concept, concept),
            (Intent::Code, code),
            (Intent::Balanced, BALANCED_BASELINE),
        ])
    }
}

impl IntentClassifier for RuleBasedClassifier {
    fn classify(&self, text: &str) -> IntentDistribution {
        let scores = self.raw_scores(text);
        let signal = scores[&Intent::Symbol] + scores[&Intent::Flow] + scores[&Intent::Concept] + scores[&Intent::Code];

        if signal == 0.0 {
            // Failure mode (spec §4.2): deterministic uniform distribution
            // biased slightly toward balanced.
            let probs = HashMap::from([
                (Intent::Balanced, 0.36),
                (Intent::Symbol, 0.16),
                (Intent::Flow, 0.16),
                (Intent::Concept, 0.16),
                (Intent::Code, 0.16),
            ]);
            return IntentDistribution::from_probabilities(probs);
        }

        IntentDistribution::from_scores(&scores, SOFTMAX_TEMPERATURE)
    }
}
