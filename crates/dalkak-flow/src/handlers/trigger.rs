use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// Entry node. Always fires; echoes its schedule/path config.
pub fn run(config: &Map<String, Value>) -> Value {
    json!({
        "type": "manual",
        "triggeredAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "cron": config.get("cron").cloned().unwrap_or(Value::Null),
        "path": config.get("path").cloned().unwrap_or(Value::Null),
    })
}
