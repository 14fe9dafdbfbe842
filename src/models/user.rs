use serde::{Deserialize, Serialize};

/// A past attempt listed on the user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub quiz_id: u64,
    pub score: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub correct_answers: Option<usize>,
    #[serde(default)]
    pub time_spent: Option<u32>,
}

impl QuizAttempt {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }
}

/// Profile of the signed-in user as far as the quiz screens need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<u64>,
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub total_quizzes_completed: u32,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub average_score: String,
    #[serde(default)]
    pub quiz_attempts: Vec<QuizAttempt>,
    /// Rewards earned so far. The backend calls this list `giftName`.
    #[serde(rename = "giftName", default)]
    pub gifts: Vec<Gift>,
}

/// A reward credited to the user, possibly already redeemed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: u64,
    #[serde(default)]
    pub point: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Point totals over a gift list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GiftPoints {
    pub total: u32,
    pub available: u32,
    pub used: u32,
}

impl UserProfile {
    /// Most recent completed attempt for a quiz, if any.
    pub fn attempt_for(&self, quiz_id: u64) -> Option<&QuizAttempt> {
        self.quiz_attempts
            .iter()
            .filter(|attempt| attempt.quiz_id == quiz_id && attempt.is_completed())
            .max_by_key(|attempt| attempt.id)
    }

    pub fn gift_points(&self) -> GiftPoints {
        let total: u32 = self.gifts.iter().map(|gift| gift.point).sum();
        let used: u32 = self
            .gifts
            .iter()
            .filter(|gift| gift.is_used)
            .map(|gift| gift.point)
            .sum();
        GiftPoints {
            total,
            available: total.saturating_sub(used),
            used,
        }
    }
}
