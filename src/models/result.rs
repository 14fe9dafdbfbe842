use serde::{Deserialize, Serialize};

/// One answered question on the wire.
///
/// Selected options travel as a list of option texts so a comma inside an
/// option cannot blur the boundary between two selections. An unanswered
/// question sends an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: u64,
    pub answers: Vec<String>,
}

impl SubmittedAnswer {
    pub fn is_answered(&self) -> bool {
        !self.answers.is_empty()
    }
}

/// Body of `POST /submissions/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub user_id: String,
    pub quiz_id: u64,
    pub time_spent: u32,
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    #[serde(default)]
    pub id: Option<u64>,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl SubmissionSummary {
    /// Share of correct answers, rounded to a whole percent.
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        ((self.correct_answers as f64 / self.total_questions as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub points: u32,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub total_quizzes_completed: u32,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub average_score: String,
}

/// Scored submission as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub submission: SubmissionSummary,
    #[serde(default)]
    pub reward: Option<Reward>,
    #[serde(default)]
    pub user_stats: Option<UserStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = SubmissionRequest {
            user_id: "zalo-42".into(),
            quiz_id: 3,
            time_spent: 41,
            answers: vec![
                SubmittedAnswer {
                    question_id: 1,
                    answers: vec!["Aspirin, 500mg".into(), "Ibuprofen".into()],
                },
                SubmittedAnswer {
                    question_id: 2,
                    answers: vec![],
                },
            ],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], "zalo-42");
        assert_eq!(json["timeSpent"], 41);
        assert_eq!(json["answers"][0]["questionId"], 1);
        assert_eq!(json["answers"][0]["answers"][0], "Aspirin, 500mg");
        assert_eq!(json["answers"][1]["answers"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_result_accepts_numeric_average() {
        let body = serde_json::json!({
            "submission": {"id": 9, "score": 80, "totalQuestions": 5, "correctAnswers": 4, "timeSpent": 70, "completedAt": "2025-01-01T00:00:00Z"},
            "reward": {"points": 50, "level": "good", "message": "Well done"},
            "userStats": {"totalPoints": 150, "totalQuizzesCompleted": 2, "averageScore": 85.5}
        });

        let result: SubmissionResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.submission.percentage(), 80);
        assert_eq!(result.user_stats.unwrap().average_score, "85.5");
    }

    #[test]
    fn test_percentage_of_empty_quiz_is_zero() {
        let summary = SubmissionSummary {
            id: None,
            score: 0,
            total_questions: 0,
            correct_answers: 0,
            time_spent: 0,
            completed_at: None,
        };
        assert_eq!(summary.percentage(), 0);
    }
}
