use async_trait::async_trait;

mod error;
mod extract;
mod ollama;
mod response;
#[cfg(test)]
pub(crate) mod mock;

pub use error::AIError;
pub use extract::extract_json_object;
pub use ollama::OllamaClient;
pub use response::{ChatMessage, ChatRequest, ChatResponse, ClassificationResult};

/// A text-generation model reachable through a request/response call.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AIError>;

    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Prompt asking for a framework/dependency classification of `code_lines`,
/// embedded verbatim.
pub fn format_classification_prompt(code_lines: &[String]) -> String {
    format!(
        "Analyze the following code and determine:\n\
         \n\
         1. Framework used (React, Angular, Vue, None)\n\
         2. External libraries used\n\
         \n\
         Respond ONLY with valid JSON using this structure:\n\
         \n\
         {{\n\
           \"framework\": \"...\",\n\
           \"dependencies\": []\n\
         }}\n\
         \n\
         Code:\n\
         {}\n",
        code_lines.join("\n")
    )
}
