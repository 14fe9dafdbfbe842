//! Who is taking quizzes.
//!
//! The host container owns authentication; the client only learns a user
//! id at start-up. [`UserContext`] is built once and passed by reference to
//! whatever needs it.

use tracing::debug;

use crate::api::{ApiError, UserDirectory};
use crate::models::{Gift, QuizAttempt, UserProfile};

#[derive(Debug, Clone, Default)]
pub struct UserContext {
    user_id: Option<String>,
    profile: Option<UserProfile>,
}

impl UserContext {
    /// Blank ids are treated as no user.
    pub fn new(user_id: Option<String>) -> Self {
        let user_id = user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            user_id,
            profile: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn attempts(&self) -> &[QuizAttempt] {
        self.profile
            .as_ref()
            .map(|profile| profile.quiz_attempts.as_slice())
            .unwrap_or_default()
    }

    pub fn gifts(&self) -> &[Gift] {
        self.profile
            .as_ref()
            .map(|profile| profile.gifts.as_slice())
            .unwrap_or_default()
    }

    /// Re-read the profile. Does nothing without a user id.
    pub async fn refresh(&mut self, directory: &dyn UserDirectory) -> Result<(), ApiError> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(());
        };

        let profile = directory.fetch_user(user_id).await?;
        debug!(user_id, attempts = profile.quiz_attempts.len(), "profile refreshed");
        self.profile = Some(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct OneUser;

    #[async_trait]
    impl UserDirectory for OneUser {
        async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, ApiError> {
            if user_id != "zalo-3" {
                return Err(ApiError::UserNotFound(user_id.to_string()));
            }
            Ok(UserProfile {
                id: Some(3),
                user_id: user_id.to_string(),
                name: "Minh".into(),
                points: 40,
                total_quizzes_completed: 1,
                average_score: "80.00".into(),
                quiz_attempts: vec![QuizAttempt {
                    id: 1,
                    name: "Basics".into(),
                    quiz_id: 2,
                    score: 80,
                    status: "completed".into(),
                    completed_at: None,
                    correct_answers: None,
                    time_spent: None,
                }],
                gifts: vec![],
            })
        }
    }

    #[test]
    fn test_blank_user_id_is_anonymous() {
        assert!(!UserContext::new(Some("   ".into())).is_signed_in());
        assert_eq!(UserContext::new(Some(" zalo-3 ".into())).user_id(), Some("zalo-3"));
    }

    #[tokio::test]
    async fn refresh_loads_profile() {
        let mut context = UserContext::new(Some("zalo-3".into()));
        context.refresh(&OneUser).await.unwrap();
        assert_eq!(context.attempts().len(), 1);
        assert_eq!(context.profile().map(|p| p.points), Some(40));
    }

    #[tokio::test]
    async fn refresh_without_user_is_noop() {
        let mut context = UserContext::anonymous();
        context.refresh(&OneUser).await.unwrap();
        assert!(context.profile().is_none());
        assert!(context.attempts().is_empty());
    }

    #[tokio::test]
    async fn refresh_propagates_unknown_user() {
        let mut context = UserContext::new(Some("nobody".into()));
        let err = context.refresh(&OneUser).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
