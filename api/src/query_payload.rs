use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /query`.
///
/// Fields are kept as raw JSON so a wrongly-typed value reaches the presence
/// check instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    pub file_path: Option<Value>,
    pub question: Option<Value>,
}

impl QueryPayload {
    /// Both fields, if present and non-empty.
    pub fn required_fields(&self) -> Option<(String, String)> {
        let file_path = self.file_path.as_ref().and_then(scalar_text)?;
        let question = self.question.as_ref().and_then(scalar_text)?;
        Some((file_path, question))
    }
}

/// Text of a non-empty JSON scalar. `null`, `""`, `0` and `false` count as
/// absent; arrays and objects are never a usable path or question.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}
