use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::{
    extract_json_object, format_classification_prompt, AIError, ChatRequest,
    ClassificationResult, InferenceBackend,
};

/// How a classification was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// The model answered with a bare JSON object.
    Parsed(ClassificationResult),
    /// The object had to be dug out of surrounding prose or code fences.
    Extracted(ClassificationResult),
    /// Nothing usable came back; carries the reason.
    Fallback(AIError),
}

impl ClassificationOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The classification to record; the all-absent default on fallback.
    pub fn into_result(self) -> ClassificationResult {
        match self {
            Self::Parsed(result) | Self::Extracted(result) => result,
            Self::Fallback(_) => ClassificationResult::default(),
        }
    }
}

pub struct FrameworkClassifier<'a> {
    backend: &'a dyn InferenceBackend,
}

impl<'a> FrameworkClassifier<'a> {
    pub fn new(backend: &'a dyn InferenceBackend) -> Self {
        Self { backend }
    }

    /// Sends one classification request for `code_lines`. Every failure is
    /// absorbed into [`ClassificationOutcome::Fallback`] and logged as a
    /// warning naming `file_name`.
    pub async fn classify(&self, code_lines: &[String], file_name: &str) -> ClassificationOutcome {
        let outcome = match self.request(code_lines).await {
            Ok(content) => interpret(&content),
            Err(e) => ClassificationOutcome::Fallback(e),
        };

        match &outcome {
            ClassificationOutcome::Fallback(reason) => {
                warn!(
                    file = %file_name,
                    backend = %self.backend.name(),
                    "AI classification failed: {}",
                    reason
                );
            }
            ClassificationOutcome::Extracted(_) => {
                debug!(file = %file_name, "Recovered JSON from free-form model output");
            }
            ClassificationOutcome::Parsed(_) => {}
        }

        outcome
    }

    async fn request(&self, code_lines: &[String]) -> Result<String, AIError> {
        let request = ChatRequest::json_prompt(
            self.backend.model(),
            format_classification_prompt(code_lines),
        );
        let response = self.backend.chat(request).await?;
        Ok(response.message.content.trim().to_string())
    }
}

/// Direct parse first, then tolerant extraction. An empty recovered object
/// counts as nothing recovered.
fn interpret(content: &str) -> ClassificationOutcome {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(content) {
        return ClassificationOutcome::Parsed(ClassificationResult::from_object(&object));
    }

    match extract_json_object(content) {
        Some(object) if !object.is_empty() => {
            ClassificationOutcome::Extracted(ClassificationResult::from_object(&object))
        }
        _ => ClassificationOutcome::Fallback(AIError::ParseError(format!(
            "Could not extract valid JSON from: {}",
            content.chars().take(200).collect::<String>()
        ))),
    }
}
