//! Data model shared by the session core, the backends and the screens.

mod quiz;
mod result;
mod user;

pub use quiz::{
    AnswerOption, Media, MediaKind, Prompt, Question, QuestionKind, Quiz, QuizSummary, RewardTier,
};
pub use result::{
    Reward, SubmissionRequest, SubmissionResult, SubmissionSummary, SubmittedAnswer, UserStats,
};
pub use user::{Gift, GiftPoints, QuizAttempt, UserProfile};

use serde::{Deserialize, Deserializer};

/// Accepts either a JSON string or a number and keeps its textual form.
///
/// The backend reports some aggregates (`averageScore`) as `"87.50"` and
/// others as plain numbers depending on the endpoint.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null => String::new(),
    })
}
