//! REST client for the loyalty quiz backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use reqwest::Url;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument, warn};

use crate::models::{
    Quiz, QuizAttempt, QuizSummary, SubmissionRequest, SubmissionResult, UserProfile,
};

use super::error::ApiError;
use super::{QuizCatalog, QuizLoader, SubmissionSink, UserDirectory};

pub const DEFAULT_BASE_URL: &str = "https://loyalty.bom.asia";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const API_PREFIX: &str = "/api/miniApp/quiz";

/// Every endpoint wraps its payload as `{success, data, message}`.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct QuizData {
    quiz: Quiz,
}

#[derive(Deserialize)]
struct QuizList {
    #[serde(default)]
    quizzes: Vec<QuizSummary>,
}

#[derive(Deserialize)]
struct UserData {
    user: UserProfile,
}

/// Backend reached over HTTP.
pub struct HttpBackend {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: Option<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// `path` followed by `segment`, percent-encoded as one path segment.
    fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| ApiError::Network(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Network("base URL cannot take a path".to_string()))?
            .push(segment);
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Send a request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status >= 400 {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or(body);
            return Err(ApiError::from_message(status, message));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("failed to parse response: {e}")))?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(ApiError::from_message(status, message));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}

/// A 404 or a `success: false` answer means the resource is absent.
fn is_absent(err: &ApiError) -> bool {
    matches!(err, ApiError::Http { status, .. } if *status == 404 || *status < 400)
}

#[async_trait]
impl QuizLoader for HttpBackend {
    #[instrument(skip(self))]
    async fn load_quiz(&self, quiz_id: u64) -> Result<Quiz, ApiError> {
        let request = self.client.get(self.url(&format!("/templates/{quiz_id}")));
        let data: QuizData = self.send(request).await.map_err(|err| {
            if is_absent(&err) {
                ApiError::QuizNotFound(quiz_id)
            } else {
                err
            }
        })?;

        debug!(questions = data.quiz.question_count(), "quiz loaded");
        Ok(data.quiz)
    }
}

#[async_trait]
impl SubmissionSink for HttpBackend {
    #[instrument(
        skip(self, request),
        fields(quiz_id = request.quiz_id, answers = request.answers.len())
    )]
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResult, ApiError> {
        let builder = self
            .client
            .post(self.url("/submissions/submit"))
            .json(request);

        match self.send::<SubmissionResult>(builder).await {
            Ok(result) => {
                debug!(score = result.submission.score, "submission scored");
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    async fn prior_result(
        &self,
        user_id: &str,
        quiz_id: u64,
    ) -> Result<Option<QuizAttempt>, ApiError> {
        match self.fetch_user(user_id).await {
            Ok(profile) => Ok(profile.attempt_for(quiz_id).cloned()),
            Err(ApiError::UserNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl QuizCatalog for HttpBackend {
    #[instrument(skip(self))]
    async fn list_active(&self) -> Result<Vec<QuizSummary>, ApiError> {
        let request = self.client.get(self.url("/templates/active"));
        let list: QuizList = self.send(request).await?;
        Ok(list.quizzes)
    }
}

#[async_trait]
impl UserDirectory for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_user(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let request = self.client.get(self.url_with_segment("/users", user_id)?);
        let data: UserData = self.send(request).await.map_err(|err| {
            if is_absent(&err) {
                ApiError::UserNotFound(user_id.to_string())
            } else {
                err
            }
        })?;
        Ok(data.user)
    }
}
