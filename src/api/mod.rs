//! External collaborators of the quiz session.
//!
//! The session core only sees these traits. [`http::HttpBackend`] talks to
//! the loyalty backend over REST, [`file::FileBackend`] serves quizzes from
//! a local directory and scores them itself.

pub mod error;
pub mod file;
pub mod http;

use async_trait::async_trait;

use crate::models::{
    Quiz, QuizAttempt, QuizSummary, SubmissionRequest, SubmissionResult, UserProfile,
};

pub use error::ApiError;

/// Fetches a full quiz definition by id.
#[async_trait]
pub trait QuizLoader: Send + Sync {
    async fn load_quiz(&self, quiz_id: u64) -> Result<Quiz, ApiError>;
}

/// Scores a completed answer set.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Submit answers. Repeated submissions fail with
    /// [`ApiError::AlreadySubmitted`].
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ApiError>;

    /// The authoritative earlier attempt, when the sink can supply one.
    async fn prior_result(
        &self,
        _user_id: &str,
        _quiz_id: u64,
    ) -> Result<Option<QuizAttempt>, ApiError> {
        Ok(None)
    }
}

/// Lists quizzes that can currently be taken.
#[async_trait]
pub trait QuizCatalog: Send + Sync {
    async fn list_active(&self) -> Result<Vec<QuizSummary>, ApiError>;
}

/// Looks up user profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, ApiError>;
}

/// Everything the terminal client needs from a backend.
pub trait Backend: QuizLoader + SubmissionSink + QuizCatalog + UserDirectory {}

impl<T> Backend for T where T: QuizLoader + SubmissionSink + QuizCatalog + UserDirectory {}
