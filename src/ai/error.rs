use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AIError {
    NetworkError(String),
    TimeoutError(u64),
    APIError { status: u16, message: String },
    ModelNotFound(String),
    InvalidResponse(String),
    ParseError(String),
    ConfigurationError(String),
}

impl fmt::Display for AIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::TimeoutError(secs) => write!(f, "Request timed out after {} seconds", secs),
            Self::APIError { status, message } => write!(f, "API error ({}): {}", status, message),
            Self::ModelNotFound(model) => write!(
                f,
                "Model '{}' not found. Please pull it with: ollama pull {}",
                model, model
            ),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AIError {}
