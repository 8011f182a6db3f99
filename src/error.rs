// API failure taxonomy
use std::fmt;

/// Why a request did not produce the expected payload.
///
/// `Transport` and `Http` are request failures; `Rejected` is a business-rule
/// rejection carried in a 2xx body with `status: false`. `Schema` means the
/// server claimed success but the body did not match the endpoint schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    Transport(String),
    Http {
        status: u16,
        message: Option<String>,
    },
    Rejected {
        message: Option<String>,
    },
    Schema(String),
}

impl ApiFailure {
    pub fn transport(reason: impl Into<String>) -> Self {
        ApiFailure::Transport(reason.into())
    }

    pub fn http(status: u16, message: Option<String>) -> Self {
        ApiFailure::Http { status, message }
    }

    pub fn rejected(message: Option<String>) -> Self {
        ApiFailure::Rejected { message }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        ApiFailure::Schema(reason.into())
    }

    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiFailure::Http { message, .. } | ApiFailure::Rejected { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            ApiFailure::Transport(_) | ApiFailure::Schema(_) => None,
        }
    }

    /// Text shown to the user: the server's message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_request_failure(&self) -> bool {
        matches!(self, ApiFailure::Transport(_) | ApiFailure::Http { .. })
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiFailure::Rejected { .. })
    }

    /// Get error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiFailure::Transport(_) => "TRANSPORT_ERROR",
            ApiFailure::Http { status: 401, .. } => "UNAUTHORIZED",
            ApiFailure::Http { status: 403, .. } => "FORBIDDEN",
            ApiFailure::Http { status: 404, .. } => "NOT_FOUND",
            ApiFailure::Http { .. } => "HTTP_ERROR",
            ApiFailure::Rejected { .. } => "REJECTED",
            ApiFailure::Schema(_) => "UNEXPECTED_RESPONSE",
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Transport(reason) => write!(f, "request failed: {}", reason),
            ApiFailure::Http { status, message } => match message {
                Some(msg) => write!(f, "HTTP {}: {}", status, msg),
                None => write!(f, "HTTP {}", status),
            },
            ApiFailure::Rejected { message } => match message {
                Some(msg) => write!(f, "rejected: {}", msg),
                None => write!(f, "rejected by server"),
            },
            ApiFailure::Schema(reason) => write!(f, "unexpected response: {}", reason),
        }
    }
}

impl std::error::Error for ApiFailure {}
