//! # quizdesk
//!
//! A terminal client for timed loyalty-program quizzes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quizdesk::api::file::FileBackend;
//! use quizdesk::session::{QuizSession, SessionOptions};
//!
//! # async fn demo() -> Result<(), quizdesk::QuizError> {
//! let backend = FileBackend::new("quizzes");
//! let mut session = QuizSession::start(&backend, 1, SessionOptions::default()).await?;
//!
//! session.select(0);
//! session.next();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod models;
pub mod session;
pub mod terminal;
mod ui;

use std::io;

use thiserror::Error;

pub use api::ApiError;
pub use app::App;
pub use config::{Config, load_config, load_config_from};
pub use context::UserContext;
pub use session::{Outcome, QuizSession, SessionOptions, Transition};

/// Error type for starting a quiz session.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The quiz could not be fetched.
    #[error("failed to load quiz: {0}")]
    Api(#[from] ApiError),

    /// The quiz exists but has nothing to answer.
    #[error("quiz {0} has no questions")]
    EmptyQuiz(u64),

    /// IO error while driving the terminal.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl QuizError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuizError::Api(err) if err.is_not_found())
    }
}
