use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::error::AIError;
use super::response::{ChatMessage, ChatRequest, ChatResponse};
use super::InferenceBackend;

/// Scripted backend: answers requests from a queue, in order. An empty queue
/// answers with a network error.
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<String, AIError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    model: String,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            model: "mock-model".to_string(),
        }
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    pub fn with_error(self, error: AIError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AIError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AIError::NetworkError("no scripted response left".to_string())));

        next.map(|content| ChatResponse {
            model,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            done: true,
            total_duration: None,
            eval_count: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}
