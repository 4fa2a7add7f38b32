use serde_json::{Map, Value};

use crate::context::NodeContext;
use crate::template::render_template;

/// Reshape upstream data through `config.template`.
///
/// String templates are rendered and, when the result is valid JSON, parsed
/// back into a value. Object and array templates are rendered through their
/// JSON text without escaping, so a substituted value containing a quote or a
/// newline breaks the JSON and the node outputs the rendered text as a string.
/// Without a template the node passes `prev` through.
pub fn run(config: &Map<String, Value>, ctx: &NodeContext) -> Value {
    match config.get("template") {
        None | Some(Value::Null) => ctx.prev().cloned().unwrap_or(Value::Null),
        Some(Value::String(template)) => parse_or_text(render_template(template, ctx)),
        Some(template @ (Value::Object(_) | Value::Array(_))) => {
            parse_or_text(render_template(&template.to_string(), ctx))
        }
        Some(literal) => literal.clone(),
    }
}

fn parse_or_text(rendered: String) -> Value {
    serde_json::from_str(&rendered).unwrap_or(Value::String(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(prev: Value) -> NodeContext {
        NodeContext::new(Some(prev.clone()), vec![("t".into(), prev)])
    }

    fn transform(config: Value, ctx: &NodeContext) -> Value {
        run(config.as_object().unwrap(), ctx)
    }

    #[test]
    fn test_prev_placeholder_yields_structured_output() {
        let out = transform(json!({ "template": "{{prev}}" }), &ctx(json!({ "type": "manual" })));
        assert_eq!(out, json!({ "type": "manual" }));
    }

    #[test]
    fn test_text_template_stays_a_string() {
        let out = transform(
            json!({ "template": "Order from {{prev.name}}" }),
            &ctx(json!({ "name": "Jae" })),
        );
        assert_eq!(out, json!("Order from Jae"));
    }

    #[test]
    fn test_object_template_substitutes_inside_strings() {
        let out = transform(
            json!({ "template": { "greeting": "hi {{prev.name}}" } }),
            &ctx(json!({ "name": "Jae" })),
        );
        assert_eq!(out, json!({ "greeting": "hi Jae" }));
    }

    #[test]
    fn test_unescaped_quote_falls_back_to_text() {
        let out = transform(
            json!({ "template": { "greeting": "hi {{prev.name}}" } }),
            &ctx(json!({ "name": "Jae \"J\"" })),
        );
        assert_eq!(out, json!(r#"{"greeting":"hi Jae "J""}"#));
    }

    #[test]
    fn test_missing_template_passes_prev_through() {
        let out = transform(json!({}), &ctx(json!([1, 2])));
        assert_eq!(out, json!([1, 2]));
        assert_eq!(transform(json!({}), &NodeContext::empty()), Value::Null);
    }

    #[test]
    fn test_entry_node_renders_empty_prev() {
        let out = transform(json!({ "template": "[{{prev}}]" }), &NodeContext::empty());
        assert_eq!(out, json!([]));
    }
}
