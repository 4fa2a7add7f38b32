use std::fmt;

use serde_json::{json, Map, Value};

use dalkak_core::error::{FlowError, Result};

use crate::context::NodeContext;
use crate::template::{display_value, render_template};

use super::config_str;

/// Comparison applied by a `condition` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "equals" | "==" => Some(Self::Equals),
            "not_equals" | "!=" => Some(Self::NotEquals),
            "contains" => Some(Self::Contains),
            "not_contains" => Some(Self::NotContains),
            ">" => Some(Self::Greater),
            "<" => Some(Self::Less),
            ">=" => Some(Self::GreaterOrEqual),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }

    /// Compare the string forms of both sides. Ordering operators compare as
    /// numbers and are false when either side is not numeric.
    pub fn evaluate(&self, left: &str, right: &str) -> bool {
        match self {
            Self::Equals => left == right,
            Self::NotEquals => left != right,
            Self::Contains => left.contains(right),
            Self::NotContains => !left.contains(right),
            Self::Greater | Self::Less | Self::GreaterOrEqual | Self::LessOrEqual => {
                let (Ok(l), Ok(r)) = (left.trim().parse::<f64>(), right.trim().parse::<f64>()) else {
                    return false;
                };
                match self {
                    Self::Greater => l > r,
                    Self::Less => l < r,
                    Self::GreaterOrEqual => l >= r,
                    _ => l <= r,
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate `field <operator> value`. A false comparison is a normal output,
/// not an error.
pub fn run(config: &Map<String, Value>, ctx: &NodeContext) -> Result<Value> {
    let operator = match config_str(config, "operator") {
        None => Operator::Equals,
        Some(raw) if raw.trim().is_empty() => Operator::Equals,
        Some(raw) => Operator::parse(&raw)
            .ok_or_else(|| FlowError::node("condition", format!("unsupported operator \"{raw}\"")))?,
    };

    let field = config_str(config, "field").unwrap_or_default();
    let left = if field.trim().is_empty() {
        ctx.prev().map(display_value).unwrap_or_default()
    } else {
        ctx.resolve(&field)
            .present()
            .map(display_value)
            .unwrap_or_default()
    };

    let value = config.get("value").cloned().unwrap_or(Value::Null);
    let right = match &value {
        Value::String(s) => render_template(s, ctx),
        other => display_value(other),
    };

    let pass = operator.evaluate(&left, &right);

    Ok(json!({
        "pass": pass,
        "operator": operator.as_str(),
        "field": field,
        "value": value,
        "left": left,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> NodeContext {
        let prev = json!({ "type": "manual", "count": 12, "tags": ["a", "b"] });
        NodeContext::new(Some(prev.clone()), vec![("t".into(), prev)])
    }

    fn eval(config: Value, ctx: &NodeContext) -> Result<Value> {
        run(config.as_object().unwrap(), ctx)
    }

    #[test]
    fn test_not_equals_on_matching_value_fails() {
        let out = eval(
            json!({ "field": "prev.type", "operator": "not_equals", "value": "manual" }),
            &manual(),
        )
        .unwrap();
        assert_eq!(out["pass"], false);
        assert_eq!(out["operator"], "not_equals");
        assert_eq!(out["field"], "prev.type");
        assert_eq!(out["value"], "manual");
    }

    #[test]
    fn test_contains_substring() {
        let out = eval(
            json!({ "field": "prev.type", "operator": "contains", "value": "anu" }),
            &manual(),
        )
        .unwrap();
        assert_eq!(out["pass"], true);
    }

    #[test]
    fn test_missing_operator_defaults_to_equals() {
        let out = eval(json!({ "field": "prev.type", "value": "manual" }), &manual()).unwrap();
        assert_eq!(out["pass"], true);
        assert_eq!(out["operator"], "equals");
    }

    #[test]
    fn test_numeric_comparison() {
        let ctx = manual();
        let gt = eval(json!({ "field": "prev.count", "operator": ">", "value": 10 }), &ctx).unwrap();
        assert_eq!(gt["pass"], true);
        let le = eval(json!({ "field": "prev.count", "operator": "<=", "value": "11.5" }), &ctx).unwrap();
        assert_eq!(le["pass"], false);
        let nan = eval(json!({ "field": "prev.type", "operator": ">", "value": 1 }), &ctx).unwrap();
        assert_eq!(nan["pass"], false);
    }

    #[test]
    fn test_missing_field_compares_as_empty() {
        let out = eval(
            json!({ "field": "prev.nothing", "operator": "equals", "value": "" }),
            &manual(),
        )
        .unwrap();
        assert_eq!(out["pass"], true);
        assert_eq!(out["left"], "");
    }

    #[test]
    fn test_value_is_templated() {
        let out = eval(
            json!({ "field": "prev.type", "operator": "equals", "value": "{{t.type}}" }),
            &manual(),
        )
        .unwrap();
        assert_eq!(out["pass"], true);
    }

    #[test]
    fn test_non_string_left_uses_json_form() {
        let out = eval(
            json!({ "field": "prev.tags", "operator": "contains", "value": "\"b\"" }),
            &manual(),
        )
        .unwrap();
        assert_eq!(out["left"], r#"["a","b"]"#);
        assert_eq!(out["pass"], true);
    }

    #[test]
    fn test_unknown_operator_is_a_node_error() {
        let err = eval(json!({ "field": "prev.type", "operator": "matches", "value": "x" }), &manual())
            .unwrap_err();
        assert!(err.to_string().contains("unsupported operator \"matches\""));
    }

    #[test]
    fn test_operator_aliases() {
        assert_eq!(Operator::parse("=="), Some(Operator::Equals));
        assert_eq!(Operator::parse("!="), Some(Operator::NotEquals));
        assert_eq!(Operator::parse(" not_contains "), Some(Operator::NotContains));
        assert_eq!(Operator::parse("~"), None);
    }
}
