//! The quiz-taking state machine.
//!
//! [`timer`] drives the per-question countdown, [`answers`] holds the
//! in-progress and committed selections, [`controller`] moves between
//! questions and decides when to submit, and [`outcome`] turns the
//! submission sink's answer into something the results screen can show.

pub mod answers;
pub mod controller;
pub mod outcome;
pub mod timer;

pub use answers::{AnswerRecord, QuestionElapsed, Selection};
pub use controller::{Phase, QuizSession, Rejection, SessionOptions, Submission, Transition};
pub use outcome::Outcome;
pub use timer::{Countdown, DEFAULT_QUESTION_SECONDS, Tick};
