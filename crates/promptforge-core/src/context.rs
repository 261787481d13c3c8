//! Typed context values and the per-run chain context.
//!
//! Techniques communicate across chain stages through key/value bags. To
//! avoid runtime type-assertion failures the value side is a small closed
//! set of kinds rather than an any-type; keys are plain strings, namespaced
//! `<technique_id>_<key>` when a technique publishes into the accumulated
//! context.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A context value: one of a small closed set of kinds.
///
/// Untagged so that config files and JSON payloads can use natural literals
/// (`true`, `3.5`, `"text"`, `["a", "b"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (all numbers are carried as f64).
    Number(f64),
    /// Text value.
    String(String),
    /// List of strings.
    StringList(Vec<String>),
}

impl ContextValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ContextValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ContextValue::StringList(l) => Some(l),
            _ => None,
        }
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Number(v)
    }
}

impl From<usize> for ContextValue {
    fn from(v: usize) -> Self {
        ContextValue::Number(v as f64)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::String(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::String(v)
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(v: Vec<String>) -> Self {
        ContextValue::StringList(v)
    }
}

/// Ordered key/value bag used for all context maps.
///
/// `BTreeMap` keeps iteration order deterministic, which keeps chain runs
/// and serialized summaries reproducible.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// A recorded technique-level failure inside a chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainError {
    /// Id of the technique whose transform failed.
    pub technique_id: String,
    /// Human-readable failure description.
    pub message: String,
}

/// Mutable per-run state threaded through the chain executor.
///
/// Created fresh for every enhancement run, owned exclusively by the
/// executor for the run's lifetime, discarded at run end.
///
/// Invariant: `current_text` always equals the output of the last applied
/// technique, or `original_text` if no technique has run yet.
/// `applied_techniques` is append-only and never reordered.
#[derive(Debug, Clone)]
pub struct ChainContext {
    base_context: ContextMap,
    original_text: String,
    current_text: String,
    applied_techniques: Vec<String>,
    technique_outputs: BTreeMap<String, String>,
    technique_metadata: BTreeMap<String, ContextMap>,
    accumulated_context: ContextMap,
    errors: Vec<ChainError>,
    warnings: Vec<String>,
    technique_timings: BTreeMap<String, Duration>,
}

impl ChainContext {
    /// Creates a fresh context for one run.
    pub fn new(original_text: impl Into<String>, base_context: ContextMap) -> Self {
        let original_text = original_text.into();
        Self {
            base_context,
            current_text: original_text.clone(),
            original_text,
            applied_techniques: Vec::new(),
            technique_outputs: BTreeMap::new(),
            technique_metadata: BTreeMap::new(),
            accumulated_context: ContextMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            technique_timings: BTreeMap::new(),
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn applied_techniques(&self) -> &[String] {
        &self.applied_techniques
    }

    pub fn technique_output(&self, id: &str) -> Option<&str> {
        self.technique_outputs.get(id).map(String::as_str)
    }

    pub fn accumulated_context(&self) -> &ContextMap {
        &self.accumulated_context
    }

    pub fn technique_metadata(&self, id: &str) -> Option<&ContextMap> {
        self.technique_metadata.get(id)
    }

    pub fn errors(&self) -> &[ChainError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Builds the effective input context for the technique at `position`:
    /// the caller-supplied base context, a read-only view of the chain so
    /// far, and the live accumulated context. Later sources win on key
    /// collision, so accumulated values shadow chain info and base values.
    pub fn effective_context(&self, position: usize) -> ContextMap {
        let mut ctx = self.base_context.clone();
        ctx.insert(
            "chain_previous_techniques".to_string(),
            ContextValue::StringList(self.applied_techniques.clone()),
        );
        ctx.insert("chain_position".to_string(), ContextValue::from(position));
        ctx.insert(
            "chain_original_text".to_string(),
            ContextValue::from(self.original_text.clone()),
        );
        for (id, output) in &self.technique_outputs {
            ctx.insert(format!("chain_output_{id}"), ContextValue::from(output.clone()));
        }
        for (key, value) in &self.accumulated_context {
            ctx.insert(key.clone(), value.clone());
        }
        ctx
    }

    /// Records a successful technique application.
    ///
    /// Context updates reported by the technique are merged into the
    /// accumulated context under `<technique_id>_<key>` to avoid
    /// cross-technique key collisions.
    pub fn record_success(
        &mut self,
        technique_id: &str,
        output: String,
        elapsed: Duration,
        metadata: ContextMap,
        context_updates: ContextMap,
    ) {
        self.current_text = output.clone();
        self.technique_outputs.insert(technique_id.to_string(), output);
        self.applied_techniques.push(technique_id.to_string());
        self.technique_timings.insert(technique_id.to_string(), elapsed);
        if !metadata.is_empty() {
            self.technique_metadata.insert(technique_id.to_string(), metadata);
        }
        for (key, value) in context_updates {
            self.accumulated_context.insert(format!("{technique_id}_{key}"), value);
        }
    }

    /// Records a technique-level failure. `current_text` is left unchanged
    /// so downstream stages see the last successful output.
    pub fn record_failure(&mut self, technique_id: &str, message: impl Into<String>) {
        self.errors.push(ChainError {
            technique_id: technique_id.to_string(),
            message: message.into(),
        });
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Consumes the context into a serializable execution summary.
    pub fn into_summary(self) -> (String, ChainSummary) {
        let timings = self
            .technique_timings
            .into_iter()
            .map(|(id, d)| (id, d.as_millis() as u64))
            .collect();
        let summary = ChainSummary {
            techniques_applied: self.applied_techniques,
            technique_timings_ms: timings,
            errors: self.errors,
            warnings: self.warnings,
            accumulated_context: self.accumulated_context.keys().cloned().collect(),
        };
        (self.current_text, summary)
    }
}

/// Structured summary of one chain run, returned alongside the enhanced
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Technique ids in application order (failed techniques excluded).
    pub techniques_applied: Vec<String>,
    /// Wall-clock time spent per applied technique, in milliseconds.
    pub technique_timings_ms: BTreeMap<String, u64>,
    /// Technique-level failures, in occurrence order.
    pub errors: Vec<ChainError>,
    /// Non-fatal notes accumulated during the run.
    pub warnings: Vec<String>,
    /// Keys published into the accumulated context during the run.
    pub accumulated_context: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_value_json_roundtrip() {
        let json = r#"{"flag":true,"weight":2.5,"name":"cot","tags":["a","b"]}"#;
        let map: ContextMap = serde_json::from_str(json).unwrap();
        assert_eq!(map["flag"], ContextValue::Bool(true));
        assert_eq!(map["weight"], ContextValue::Number(2.5));
        assert_eq!(map["name"], ContextValue::String("cot".into()));
        assert_eq!(
            map["tags"],
            ContextValue::StringList(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn fresh_context_mirrors_original_text() {
        let ctx = ChainContext::new("hello", ContextMap::new());
        assert_eq!(ctx.current_text(), "hello");
        assert_eq!(ctx.original_text(), "hello");
        assert!(ctx.applied_techniques().is_empty());
    }

    #[test]
    fn success_updates_current_text_and_order() {
        let mut ctx = ChainContext::new("base", ContextMap::new());
        ctx.record_success(
            "a",
            "base+a".into(),
            Duration::from_millis(3),
            ContextMap::new(),
            ContextMap::new(),
        );
        ctx.record_success(
            "b",
            "base+a+b".into(),
            Duration::from_millis(5),
            ContextMap::new(),
            ContextMap::new(),
        );
        assert_eq!(ctx.current_text(), "base+a+b");
        assert_eq!(ctx.applied_techniques(), ["a", "b"]);
        assert_eq!(ctx.technique_output("a"), Some("base+a"));
    }

    #[test]
    fn failure_leaves_current_text_untouched() {
        let mut ctx = ChainContext::new("base", ContextMap::new());
        ctx.record_success(
            "a",
            "base+a".into(),
            Duration::ZERO,
            ContextMap::new(),
            ContextMap::new(),
        );
        ctx.record_failure("b", "boom");
        assert_eq!(ctx.current_text(), "base+a");
        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(ctx.errors()[0].technique_id, "b");
    }

    #[test]
    fn reported_metadata_is_kept_per_technique() {
        let mut ctx = ChainContext::new("t", ContextMap::new());
        let mut meta = ContextMap::new();
        meta.insert("template_length".into(), ContextValue::from(42usize));
        ctx.record_success("cot", "out".into(), Duration::ZERO, meta, ContextMap::new());
        assert_eq!(
            ctx.technique_metadata("cot").and_then(|m| m.get("template_length")),
            Some(&ContextValue::Number(42.0))
        );
        assert!(ctx.technique_metadata("other").is_none());
    }

    #[test]
    fn context_updates_are_namespaced() {
        let mut ctx = ChainContext::new("t", ContextMap::new());
        let mut updates = ContextMap::new();
        updates.insert("steps".into(), ContextValue::from(4.0));
        ctx.record_success("cot", "out".into(), Duration::ZERO, ContextMap::new(), updates);
        assert_eq!(
            ctx.accumulated_context().get("cot_steps"),
            Some(&ContextValue::Number(4.0))
        );
    }

    #[test]
    fn effective_context_layers_base_chain_and_accumulated() {
        let mut base = ContextMap::new();
        base.insert("tone".into(), ContextValue::from("formal"));
        let mut ctx = ChainContext::new("orig", base);
        ctx.record_success(
            "a",
            "out-a".into(),
            Duration::ZERO,
            ContextMap::new(),
            ContextMap::new(),
        );
        let eff = ctx.effective_context(1);
        assert_eq!(eff["tone"], ContextValue::String("formal".into()));
        assert_eq!(eff["chain_position"], ContextValue::Number(1.0));
        assert_eq!(eff["chain_original_text"], ContextValue::String("orig".into()));
        assert_eq!(eff["chain_output_a"], ContextValue::String("out-a".into()));
        assert_eq!(
            eff["chain_previous_techniques"],
            ContextValue::StringList(vec!["a".into()])
        );
    }

    #[test]
    fn summary_reports_timings_in_millis() {
        let mut ctx = ChainContext::new("t", ContextMap::new());
        ctx.record_success(
            "a",
            "out".into(),
            Duration::from_millis(12),
            ContextMap::new(),
            ContextMap::new(),
        );
        let (text, summary) = ctx.into_summary();
        assert_eq!(text, "out");
        assert_eq!(summary.technique_timings_ms["a"], 12);
        assert_eq!(summary.techniques_applied, ["a"]);
    }
}
