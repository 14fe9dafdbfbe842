//! Normalizes what the submission sink returns into a result for the
//! results screen.

use tracing::{info, warn};

use crate::api::SubmissionSink;
use crate::context::UserContext;
use crate::models::{QuizAttempt, SubmissionResult, SubmissionSummary};

use super::controller::Submission;

/// What the results screen receives after a session is submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Freshly scored by the sink.
    Scored(SubmissionResult),
    /// The quiz was already submitted; this is the sink's record of the
    /// earlier attempt.
    PriorAttempt(SubmissionResult),
    /// The quiz was already submitted and the sink had no earlier record.
    /// Built from the local answer set and not verified by the backend.
    LocalFallback(SubmissionResult),
    /// No result could be obtained.
    Unavailable { reason: String },
}

impl Outcome {
    pub fn result(&self) -> Option<&SubmissionResult> {
        match self {
            Outcome::Scored(result)
            | Outcome::PriorAttempt(result)
            | Outcome::LocalFallback(result) => Some(result),
            Outcome::Unavailable { .. } => None,
        }
    }

    /// Whether the numbers come from the backend.
    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Scored(_) | Outcome::PriorAttempt(_))
    }
}

/// Submit once and classify the answer. Never retries.
pub async fn settle(
    sink: &dyn SubmissionSink,
    user: &UserContext,
    submission: &Submission,
) -> Outcome {
    let Some(user_id) = user.user_id() else {
        warn!(session_id = %submission.session_id, "no signed-in user, submission skipped");
        return Outcome::Unavailable {
            reason: "no signed-in user".to_string(),
        };
    };

    let request = submission.to_request(user_id);
    let err = match sink.submit(&request).await {
        Ok(result) => {
            info!(
                session_id = %submission.session_id,
                score = result.submission.score,
                "submission scored"
            );
            return Outcome::Scored(result);
        }
        Err(err) => err,
    };

    if !err.is_conflict() {
        warn!(session_id = %submission.session_id, error = %err, "submission failed");
        return Outcome::Unavailable {
            reason: err.to_string(),
        };
    }

    info!(
        session_id = %submission.session_id,
        "quiz already submitted, looking up earlier attempt"
    );
    match sink.prior_result(user_id, submission.quiz_id).await {
        Ok(Some(attempt)) => Outcome::PriorAttempt(from_attempt(&attempt, submission)),
        Ok(None) => Outcome::LocalFallback(local_fallback(submission)),
        Err(err) => {
            warn!(error = %err, "earlier attempt lookup failed");
            Outcome::LocalFallback(local_fallback(submission))
        }
    }
}

fn from_attempt(attempt: &QuizAttempt, submission: &Submission) -> SubmissionResult {
    let total = submission.total_questions;
    // Attempts without a count only carry the percentage score
    let correct = attempt
        .correct_answers
        .unwrap_or_else(|| ((attempt.score as f64 / 100.0) * total as f64).round() as usize)
        .min(total);

    SubmissionResult {
        submission: SubmissionSummary {
            id: Some(attempt.id),
            score: attempt.score,
            total_questions: total,
            correct_answers: correct,
            time_spent: attempt.time_spent.unwrap_or(submission.elapsed_seconds),
            completed_at: attempt.completed_at.clone(),
        },
        reward: None,
        user_stats: None,
    }
}

/// Result synthesized from the local answer set. `correct_answers` counts
/// answered questions; the score is left at zero and no reward is claimed.
pub fn local_fallback(submission: &Submission) -> SubmissionResult {
    SubmissionResult {
        submission: SubmissionSummary {
            id: None,
            score: 0,
            total_questions: submission.total_questions,
            correct_answers: submission.answered_count(),
            time_spent: submission.elapsed_seconds,
            completed_at: None,
        },
        reward: None,
        user_stats: None,
    }
}
