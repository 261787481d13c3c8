//! Tests for the chain executor.

use super::*;
use promptforge_core::{ContextMap, ContextValue};

fn scored(id: &str, template: &str) -> ScoredTechnique {
    ScoredTechnique {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        template: template.to_string(),
        parameters: ContextMap::new(),
        priority: 0,
        score: 50.0,
        confidence: 0.5,
        reasoning: String::new(),
    }
}

struct Suffix(&'static str);

impl TechniqueTransform for Suffix {
    fn apply(&self, text: &str, _context: &ContextMap) -> promptforge_core::Result<TransformOutput> {
        Ok(TransformOutput::text(format!("{text}{}", self.0)))
    }
}

struct AlwaysFail;

impl TechniqueTransform for AlwaysFail {
    fn apply(&self, _text: &str, _context: &ContextMap) -> promptforge_core::Result<TransformOutput> {
        Err(PromptForgeError::Internal("induced failure".to_string()))
    }
}

struct Sleeper(Duration);

impl TechniqueTransform for Sleeper {
    fn apply(&self, text: &str, _context: &ContextMap) -> promptforge_core::Result<TransformOutput> {
        thread::sleep(self.0);
        Ok(TransformOutput::text(text))
    }
}

/// Publishes one context update and echoes what it observed.
struct Observer;

impl TechniqueTransform for Observer {
    fn apply(&self, text: &str, context: &ContextMap) -> promptforge_core::Result<TransformOutput> {
        let previous = context
            .get("chain_previous_techniques")
            .and_then(|v| v.as_list().map(|l| l.join(",")))
            .unwrap_or_default();
        let mut updates = ContextMap::new();
        updates.insert("seen".to_string(), ContextValue::from(previous.clone()));
        Ok(TransformOutput {
            text: format!("{text}|saw:{previous}"),
            metadata: ContextMap::new(),
            context_updates: updates,
        })
    }
}

fn registry(entries: Vec<(&str, Arc<dyn TechniqueTransform>)>) -> Arc<TechniqueRegistry> {
    let mut registry = TechniqueRegistry::new();
    for (id, transform) in entries {
        registry.register(id, transform);
    }
    Arc::new(registry)
}

#[test]
fn zero_techniques_is_a_noop() {
    let outcome = ChainExecutor::new()
        .run(&[], "untouched", ContextMap::new())
        .unwrap();
    assert_eq!(outcome.text, "untouched");
    assert!(outcome.summary.techniques_applied.is_empty());
    assert!(outcome.summary.errors.is_empty());
}

#[test]
fn techniques_apply_in_order() {
    let executor = ChainExecutor::new().with_registry(registry(vec![
        ("a", Arc::new(Suffix("-a"))),
        ("b", Arc::new(Suffix("-b"))),
    ]));
    let outcome = executor
        .run(&[scored("a", ""), scored("b", "")], "base", ContextMap::new())
        .unwrap();
    assert_eq!(outcome.text, "base-a-b");
    assert_eq!(outcome.summary.techniques_applied, ["a", "b"]);
    assert!(outcome.summary.technique_timings_ms.contains_key("a"));
    assert!(outcome.summary.technique_timings_ms.contains_key("b"));
}

#[test]
fn unregistered_technique_falls_back_to_template() {
    let outcome = ChainExecutor::new()
        .run(
            &[scored("cot", "Think step by step.\n\n{text}")],
            "Why?",
            ContextMap::new(),
        )
        .unwrap();
    assert_eq!(outcome.text, "Think step by step.\n\nWhy?");
}

#[test]
fn failure_mid_chain_is_recorded_and_run_continues() {
    let executor = ChainExecutor::new().with_registry(registry(vec![
        ("ok1", Arc::new(Suffix("-1"))),
        ("bad", Arc::new(AlwaysFail)),
        ("ok2", Arc::new(Suffix("-2"))),
    ]));
    let outcome = executor
        .run(
            &[scored("ok1", ""), scored("bad", ""), scored("ok2", "")],
            "base",
            ContextMap::new(),
        )
        .unwrap();
    // The failed stage leaves current text at the prior stage's output.
    assert_eq!(outcome.text, "base-1-2");
    assert_eq!(outcome.summary.techniques_applied, ["ok1", "ok2"]);
    assert_eq!(outcome.summary.errors.len(), 1);
    assert_eq!(outcome.summary.errors[0].technique_id, "bad");
    assert!(outcome.summary.errors[0].message.contains("induced failure"));
}

#[test]
fn failing_first_technique_leaves_original_text() {
    let executor =
        ChainExecutor::new().with_registry(registry(vec![("bad", Arc::new(AlwaysFail))]));
    let outcome = executor
        .run(&[scored("bad", "")], "original", ContextMap::new())
        .unwrap();
    assert_eq!(outcome.text, "original");
    assert!(outcome.summary.techniques_applied.is_empty());
    assert_eq!(outcome.summary.errors.len(), 1);
}

#[test]
fn fail_fast_aborts_the_run() {
    let executor = ChainExecutor::new()
        .with_registry(registry(vec![
            ("bad", Arc::new(AlwaysFail)),
            ("ok", Arc::new(Suffix("-x"))),
        ]))
        .with_fail_fast(true);
    let err = executor
        .run(&[scored("bad", ""), scored("ok", "")], "base", ContextMap::new())
        .unwrap_err();
    assert!(matches!(err, PromptForgeError::ChainFailed(id) if id == "bad"));
}

#[test]
fn timeout_is_a_technique_level_failure() {
    let executor = ChainExecutor::new()
        .with_registry(registry(vec![
            ("slow", Arc::new(Sleeper(Duration::from_millis(200)))),
            ("fast", Arc::new(Suffix("-fast"))),
        ]))
        .with_technique_timeout(Some(Duration::from_millis(20)));
    let outcome = executor
        .run(
            &[scored("slow", ""), scored("fast", "")],
            "base",
            ContextMap::new(),
        )
        .unwrap();
    assert_eq!(outcome.text, "base-fast");
    assert_eq!(outcome.summary.errors.len(), 1);
    assert_eq!(outcome.summary.errors[0].technique_id, "slow");
    assert!(outcome.summary.errors[0].message.contains("timed out"));
}

#[test]
fn later_techniques_observe_earlier_work() {
    let executor = ChainExecutor::new().with_registry(registry(vec![
        ("first", Arc::new(Observer)),
        ("second", Arc::new(Observer)),
    ]));
    let outcome = executor
        .run(
            &[scored("first", ""), scored("second", "")],
            "t",
            ContextMap::new(),
        )
        .unwrap();
    // The second stage sees the first in its chain info.
    assert_eq!(outcome.text, "t|saw:|saw:first");
    // Context updates were namespaced per technique.
    assert!(outcome
        .summary
        .accumulated_context
        .contains(&"first_seen".to_string()));
    assert!(outcome
        .summary
        .accumulated_context
        .contains(&"second_seen".to_string()));
}

#[test]
fn unchanged_output_produces_a_warning() {
    // Empty template falls back to pass-through.
    let outcome = ChainExecutor::new()
        .run(&[scored("noop", "")], "same", ContextMap::new())
        .unwrap();
    assert_eq!(outcome.text, "same");
    assert_eq!(outcome.summary.techniques_applied, ["noop"]);
    assert_eq!(outcome.summary.warnings.len(), 1);
    assert!(outcome.summary.warnings[0].contains("noop"));
}

#[test]
fn base_context_reaches_transforms() {
    struct ReadTone;
    impl TechniqueTransform for ReadTone {
        fn apply(&self, text: &str, context: &ContextMap) -> promptforge_core::Result<TransformOutput> {
            let tone = context.get("tone").and_then(|v| v.as_str()).unwrap_or("none");
            Ok(TransformOutput::text(format!("{text} ({tone})")))
        }
    }
    let executor = ChainExecutor::new().with_registry(registry(vec![(
        "tone",
        Arc::new(ReadTone) as Arc<dyn TechniqueTransform>,
    )]));
    let mut base = ContextMap::new();
    base.insert("tone".to_string(), ContextValue::from("formal"));
    let outcome = executor.run(&[scored("tone", "")], "text", base).unwrap();
    assert_eq!(outcome.text, "text (formal)");
}
