use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Framework and dependency classification inferred for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub framework: Option<String>,
    pub dependencies: Vec<String>,
}

impl ClassificationResult {
    /// Coerces a recovered JSON object into a classification.
    ///
    /// Strings are kept verbatim and any other non-null value is rendered as
    /// compact JSON text. A lone dependency string becomes a one-element list.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let framework = object.get("framework").and_then(value_as_text);

        let dependencies = match object.get("dependencies") {
            Some(Value::Array(items)) => items.iter().filter_map(value_as_text).collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };

        Self {
            framework,
            dependencies,
        }
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single non-streaming chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn json_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            format: Some("json".to_string()),
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}
