use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::context::NodeContext;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"))
}

/// Replace every `{{ path }}` in `template` with the value it resolves to.
///
/// Plain text substitution only; nothing inside the braces is evaluated.
pub fn render_template(template: &str, ctx: &NodeContext) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| {
            ctx.resolve(&caps[1])
                .present()
                .map(display_value)
                .unwrap_or_default()
        })
        .into_owned()
}

/// String form used for substitution and comparisons.
///
/// Strings are inserted raw, `null` as empty, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
