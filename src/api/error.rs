//! Backend error types.

use thiserror::Error;

/// Message the backend attaches to a repeated submission.
pub const ALREADY_SUBMITTED_MESSAGE: &str = "User has already submitted this quiz";

/// Errors that can occur when talking to the quiz backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The quiz id does not resolve to a quiz.
    #[error("quiz {0} not found")]
    QuizNotFound(u64),

    /// The user id does not resolve to a profile.
    #[error("user {0} not found")]
    UserNotFound(String),

    /// The user already has a scored submission for this quiz.
    #[error("quiz already submitted")]
    AlreadySubmitted,

    /// The backend answered with an error status or `success: false`.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Reading local quiz files failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Classify a backend error message.
    pub fn from_message(status: u16, message: String) -> Self {
        if is_already_submitted(&message) {
            ApiError::AlreadySubmitted
        } else {
            ApiError::Http { status, message }
        }
    }

    /// Returns `true` for the "already submitted" conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::AlreadySubmitted)
    }

    /// Returns `true` if the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::QuizNotFound(_) | ApiError::UserNotFound(_))
    }
}

fn is_already_submitted(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(ALREADY_SUBMITTED_MESSAGE)
        || message.to_ascii_lowercase().contains("already submitted")
}
