//! Offline backend serving quizzes from a directory of JSON files.
//!
//! Each quiz lives in `<dir>/<id>.json` using the same shape the REST
//! backend returns. Submissions are scored locally and remembered for the
//! lifetime of the process.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::models::{
    Gift, Quiz, QuizAttempt, QuizSummary, Reward, SubmissionRequest, SubmissionResult,
    SubmissionSummary, UserProfile, UserStats,
};

use super::error::ApiError;
use super::{QuizCatalog, QuizLoader, SubmissionSink, UserDirectory};

#[derive(Debug, Clone)]
struct StoredAttempt {
    attempt: QuizAttempt,
    reward: Option<Reward>,
}

impl StoredAttempt {
    fn reward_points(&self) -> u32 {
        self.reward.as_ref().map_or(0, |reward| reward.points)
    }

    /// Rewards worth points show up as unused gifts.
    fn gift(&self) -> Option<Gift> {
        let reward = self.reward.as_ref().filter(|reward| reward.points > 0)?;
        Some(Gift {
            id: self.attempt.id,
            point: reward.points,
            message: reward.message.clone(),
            description: format!("{} ({})", self.attempt.name, reward.level),
            is_used: false,
            created_at: self.attempt.completed_at.clone(),
        })
    }
}

#[derive(Default)]
struct Ledger {
    next_id: u64,
    attempts: HashMap<(String, u64), StoredAttempt>,
}

pub struct FileBackend {
    dir: PathBuf,
    ledger: Mutex<Ledger>,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn quiz_path(&self, quiz_id: u64) -> PathBuf {
        self.dir.join(format!("{quiz_id}.json"))
    }

    async fn read_quiz(&self, path: &Path) -> Result<Quiz, ApiError> {
        let json_content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&json_content).map_err(|err| {
            ApiError::Decode(format!("failed to parse {}: {}", path.display(), err))
        })
    }

    /// Read `path` and check that the quiz inside carries the id its file
    /// name promises.
    async fn read_checked(&self, path: &Path, quiz_id: u64) -> Result<Quiz, ApiError> {
        let quiz = self.read_quiz(path).await?;
        if quiz.id != quiz_id {
            return Err(ApiError::Decode(format!(
                "{} holds quiz {}, expected {}",
                path.display(),
                quiz.id,
                quiz_id
            )));
        }
        Ok(quiz)
    }
}

fn file_quiz_id(path: &Path) -> Option<u64> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// Count questions whose chosen option set equals the correct option set.
fn count_correct(quiz: &Quiz, request: &SubmissionRequest) -> usize {
    quiz.questions
        .iter()
        .filter(|question| {
            let Some(submitted) = request
                .answers
                .iter()
                .find(|answer| answer.question_id == question.id)
            else {
                return false;
            };

            let chosen: BTreeSet<&str> = submitted.answers.iter().map(String::as_str).collect();
            let correct: BTreeSet<&str> = question
                .answers
                .iter()
                .filter(|option| option.is_correct)
                .map(|option| option.content.as_str())
                .collect();

            !chosen.is_empty() && chosen == correct
        })
        .count()
}

fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    }
}

fn user_stats(ledger: &Ledger, user_id: &str) -> UserStats {
    let attempts: Vec<&StoredAttempt> = ledger
        .attempts
        .iter()
        .filter(|((user, _), _)| user == user_id)
        .map(|(_, stored)| stored)
        .collect();

    let completed = attempts.len() as u32;
    let total_points = attempts.iter().map(|stored| stored.reward_points()).sum();
    let average = if attempts.is_empty() {
        0.0
    } else {
        attempts
            .iter()
            .map(|stored| stored.attempt.score as f64)
            .sum::<f64>()
            / attempts.len() as f64
    };

    UserStats {
        total_points,
        total_quizzes_completed: completed,
        average_score: format!("{average:.2}"),
    }
}

#[async_trait]
impl QuizLoader for FileBackend {
    #[instrument(skip(self))]
    async fn load_quiz(&self, quiz_id: u64) -> Result<Quiz, ApiError> {
        let path = self.quiz_path(quiz_id);
        match self.read_checked(&path, quiz_id).await {
            Ok(quiz) => Ok(quiz),
            Err(ApiError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ApiError::QuizNotFound(quiz_id))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl SubmissionSink for FileBackend {
    #[instrument(skip(self, request), fields(quiz_id = request.quiz_id))]
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ApiError> {
        let quiz = self.load_quiz(request.quiz_id).await?;
        let mut ledger = self.ledger.lock().await;

        let key = (request.user_id.clone(), request.quiz_id);
        if ledger.attempts.contains_key(&key) {
            warn!(user_id = %request.user_id, "repeated submission rejected");
            return Err(ApiError::AlreadySubmitted);
        }

        let total = quiz.question_count();
        let correct = count_correct(&quiz, request);
        let score = score_percent(correct, total);
        let reward = quiz.reward_for(score).map(|tier| Reward {
            points: tier.points,
            level: tier.level.clone(),
            message: tier.message.clone(),
        });

        ledger.next_id += 1;
        let attempt = QuizAttempt {
            id: ledger.next_id,
            name: quiz.name.clone(),
            quiz_id: quiz.id,
            score,
            status: "completed".to_string(),
            completed_at: None,
            correct_answers: Some(correct),
            time_spent: Some(request.time_spent),
        };
        ledger.attempts.insert(
            key,
            StoredAttempt {
                attempt: attempt.clone(),
                reward: reward.clone(),
            },
        );
        info!(score, correct, total, "submission scored locally");

        Ok(SubmissionResult {
            submission: SubmissionSummary {
                id: Some(attempt.id),
                score,
                total_questions: total,
                correct_answers: correct,
                time_spent: request.time_spent,
                completed_at: None,
            },
            reward,
            user_stats: Some(user_stats(&ledger, &request.user_id)),
        })
    }

    async fn prior_result(
        &self,
        user_id: &str,
        quiz_id: u64,
    ) -> Result<Option<QuizAttempt>, ApiError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .attempts
            .get(&(user_id.to_string(), quiz_id))
            .map(|stored| stored.attempt.clone()))
    }
}

#[async_trait]
impl QuizCatalog for FileBackend {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn list_active(&self) -> Result<Vec<QuizSummary>, ApiError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut quizzes = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(quiz_id) = file_quiz_id(&path) else {
                continue;
            };
            match self.read_checked(&path, quiz_id).await {
                Ok(quiz) => quizzes.push(QuizSummary::from(&quiz)),
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping unreadable quiz file")
                }
            }
        }

        quizzes.sort_by_key(|quiz| quiz.id);
        Ok(quizzes)
    }
}

#[async_trait]
impl UserDirectory for FileBackend {
    async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let ledger = self.ledger.lock().await;
        let stats = user_stats(&ledger, user_id);

        let mut stored: Vec<&StoredAttempt> = ledger
            .attempts
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, stored)| stored)
            .collect();
        stored.sort_by_key(|stored| stored.attempt.id);

        let quiz_attempts = stored.iter().map(|s| s.attempt.clone()).collect();
        let gifts = stored.iter().filter_map(|s| s.gift()).collect();

        Ok(UserProfile {
            id: None,
            user_id: user_id.to_string(),
            name: user_id.to_string(),
            points: stats.total_points,
            total_quizzes_completed: stats.total_quizzes_completed,
            average_score: stats.average_score,
            quiz_attempts,
            gifts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmittedAnswer;

    fn write_quiz(dir: &Path) {
        let quiz = serde_json::json!({
            "id": 1,
            "name": "Offline",
            "totalPoints": 20,
            "rewards": {
                "poor": {"level": "poor", "points": 0, "message": "Try again", "minScore": 0},
                "excellent": {"level": "excellent", "points": 100, "message": "Great", "minScore": 90}
            },
            "questions": [
                {"id": 10, "type": "single", "content": {"text": "Q1"},
                 "answers": [{"content": "A", "isCorrect": true}, {"content": "B"}]},
                {"id": 11, "type": "multi", "content": {"text": "Q2"},
                 "answers": [{"content": "C, with comma", "isCorrect": true}, {"content": "D", "isCorrect": true}, {"content": "E"}]}
            ]
        });
        std::fs::write(dir.join("1.json"), quiz.to_string()).unwrap();
        std::fs::write(dir.join("notes.txt"), "not a quiz").unwrap();
        std::fs::write(dir.join("2.json"), "{ broken").unwrap();
    }

    fn answers(q1: &[&str], q2: &[&str]) -> SubmissionRequest {
        SubmissionRequest {
            user_id: "local".into(),
            quiz_id: 1,
            time_spent: 12,
            answers: vec![
                SubmittedAnswer {
                    question_id: 10,
                    answers: q1.iter().map(|s| s.to_string()).collect(),
                },
                SubmittedAnswer {
                    question_id: 11,
                    answers: q2.iter().map(|s| s.to_string()).collect(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn scores_exact_option_sets() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let backend = FileBackend::new(dir.path());

        let result = backend
            .submit(&answers(&["A"], &["D", "C, with comma"]))
            .await
            .unwrap();
        assert_eq!(result.submission.correct_answers, 2);
        assert_eq!(result.submission.score, 100);
        assert_eq!(result.reward.unwrap().level, "excellent");
        assert_eq!(result.user_stats.unwrap().total_points, 100);
    }

    #[tokio::test]
    async fn partial_multi_selection_is_wrong() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let backend = FileBackend::new(dir.path());

        let result = backend.submit(&answers(&[], &["D"])).await.unwrap();
        assert_eq!(result.submission.correct_answers, 0);
        assert_eq!(result.reward.unwrap().level, "poor");
    }

    #[tokio::test]
    async fn second_submission_conflicts_and_prior_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let backend = FileBackend::new(dir.path());

        backend.submit(&answers(&["A"], &[])).await.unwrap();
        let err = backend.submit(&answers(&["B"], &[])).await.unwrap_err();
        assert!(err.is_conflict());

        let prior = backend.prior_result("local", 1).await.unwrap().unwrap();
        assert_eq!(prior.correct_answers, Some(1));
        assert_eq!(prior.score, 50);

        let profile = backend.fetch_user("local").await.unwrap();
        assert_eq!(profile.quiz_attempts.len(), 1);
        // A zero-point reward is not a gift
        assert!(profile.gifts.is_empty());
    }

    #[tokio::test]
    async fn earned_rewards_become_gifts() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let backend = FileBackend::new(dir.path());

        backend
            .submit(&answers(&["A"], &["C, with comma", "D"]))
            .await
            .unwrap();

        let profile = backend.fetch_user("local").await.unwrap();
        assert_eq!(profile.gifts.len(), 1);
        assert_eq!(profile.gifts[0].point, 100);
        assert_eq!(profile.gifts[0].message, "Great");
        assert_eq!(profile.gift_points().available, 100);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(matches!(
            backend.load_quiz(42).await.unwrap_err(),
            ApiError::QuizNotFound(42)
        ));
    }

    #[tokio::test]
    async fn catalogue_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        let backend = FileBackend::new(dir.path());

        let quizzes = backend.list_active().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].name, "Offline");
    }

    #[tokio::test]
    async fn quiz_id_must_match_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write_quiz(dir.path());
        std::fs::copy(dir.path().join("1.json"), dir.path().join("5.json")).unwrap();
        let backend = FileBackend::new(dir.path());

        let err = backend.load_quiz(5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(!err.is_not_found());

        let quizzes = backend.list_active().await.unwrap();
        let ids: Vec<u64> = quizzes.iter().map(|quiz| quiz.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
