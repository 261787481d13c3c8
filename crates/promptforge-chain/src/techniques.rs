//! Built-in technique transforms.
//!
//! The default transform for every cataloged technique is template filling:
//! the catalog's `template` string with `{text}` and `{context:<key>}`
//! placeholders substituted. Custom transforms registered under a
//! technique's id in the [`TechniqueRegistry`](crate::TechniqueRegistry)
//! take precedence.

use promptforge_core::{ContextMap, ContextValue, Result};

use crate::transform::{TechniqueTransform, TransformOutput};

/// Fills a technique template with the current text and context values.
///
/// Placeholders:
/// - `{text}` — the chain's current text
/// - `{context:<key>}` — the effective context value for `<key>`, rendered
///   as text; unknown keys render as an empty string and are reported in
///   metadata
///
/// An empty template passes the text through unchanged.
#[derive(Debug, Clone)]
pub struct TemplateTransform {
    template: String,
}

impl TemplateTransform {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl TechniqueTransform for TemplateTransform {
    fn apply(&self, text: &str, context: &ContextMap) -> Result<TransformOutput> {
        if self.template.is_empty() {
            return Ok(TransformOutput::text(text));
        }

        let mut missing: Vec<String> = Vec::new();
        let filled = fill_template(&self.template, text, context, &mut missing);

        let mut metadata = ContextMap::new();
        metadata.insert(
            "template_length".to_string(),
            ContextValue::from(self.template.len()),
        );
        if !missing.is_empty() {
            metadata.insert(
                "missing_context_keys".to_string(),
                ContextValue::StringList(missing),
            );
        }

        let mut context_updates = ContextMap::new();
        context_updates.insert("applied".to_string(), ContextValue::Bool(true));

        Ok(TransformOutput {
            text: filled,
            metadata,
            context_updates,
        })
    }
}

/// Single-pass placeholder substitution. Substituted values are not
/// re-scanned, so user text containing `{text}` cannot recurse.
fn fill_template(
    template: &str,
    text: &str,
    context: &ContextMap,
    missing: &mut Vec<String>,
) -> String {
    let mut out = String::with_capacity(template.len() + text.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find('}') {
            Some(close) => {
                let token = &after[1..close];
                if token == "text" {
                    out.push_str(text);
                } else if let Some(key) = token.strip_prefix("context:") {
                    match context.get(key) {
                        Some(value) => out.push_str(&render_value(value)),
                        None => missing.push(key.to_string()),
                    }
                } else {
                    // Unknown placeholder kinds pass through verbatim.
                    out.push_str(&after[..=close]);
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_value(value: &ContextValue) -> String {
    match value {
        ContextValue::Bool(b) => b.to_string(),
        ContextValue::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        ContextValue::String(s) => s.clone(),
        ContextValue::StringList(items) => items.join(", "),
    }
}
