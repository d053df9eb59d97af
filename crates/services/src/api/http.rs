use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use quiz_core::model::{AnswerFeedback, QuizResults, SessionToken};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    CompleteQuizRequest, CompletionAck, QuizApi, StartQuizRequest, StartQuizResponse,
    SubmitAnswerRequest,
};
use crate::auth_events::{AuthEvent, AuthEvents};
use crate::config::ApiConfig;
use crate::error::ApiError;

const EXPIRED_TOKEN_MESSAGE: &str = "invalid or expired token";

/// `QuizApi` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: ApiConfig,
    auth_events: Arc<AuthEvents>,
}

impl HttpQuizApi {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig, auth_events: Arc<AuthEvents>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
            auth_events,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `/api/quiz/results/<token>` with the token as one escaped path segment.
    fn results_url(&self, token: &SessionToken) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.config.url("/api/quiz/results"))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(token.as_str());
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Error bodies are best-effort; an unreadable body falls back to the status line.
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("quiz backend rejected credentials ({status}); signalling logout");
            self.auth_events.emit(AuthEvent::SessionExpired);
            let message =
                body_message(&body).unwrap_or_else(|| EXPIRED_TOKEN_MESSAGE.to_owned());
            return Err(ApiError::Unauthorized(message));
        }

        let message = body_message(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Err(ApiError::Status { status, message })
    }
}

/// The `message` field of a JSON error body, if any.
fn body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn start_quiz(
        &self,
        request: &StartQuizRequest,
    ) -> Result<StartQuizResponse, ApiError> {
        debug!("POST /api/quiz/start {request:?}");
        let url = self.config.url("/api/quiz/start");
        self.send(self.client.post(url).json(request)).await
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<AnswerFeedback, ApiError> {
        debug!("POST /api/quiz/answer for question {}", request.question_id);
        let url = self.config.url("/api/quiz/answer");
        self.send(self.client.post(url).json(request)).await
    }

    async fn complete_quiz(
        &self,
        request: &CompleteQuizRequest,
    ) -> Result<CompletionAck, ApiError> {
        debug!("POST /api/quiz/complete for session {}", request.session_token);
        let url = self.config.url("/api/quiz/complete");
        self.send(self.client.post(url).json(request)).await
    }

    async fn results(&self, token: &SessionToken) -> Result<QuizResults, ApiError> {
        let url = self.results_url(token)?;
        debug!("GET {url}");
        self.send(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_from_json_body() {
        assert_eq!(
            body_message(r#"{"message": "Quiz limit reached"}"#).as_deref(),
            Some("Quiz limit reached")
        );
    }

    #[test]
    fn ignores_non_json_or_blank_messages() {
        assert_eq!(body_message("<html>502</html>"), None);
        assert_eq!(body_message(r#"{"message": "  "}"#), None);
        assert_eq!(body_message(r#"{"error": "x"}"#), None);
    }

    fn api(base_url: &str) -> HttpQuizApi {
        HttpQuizApi::new(ApiConfig::new(base_url), Arc::new(AuthEvents::new())).unwrap()
    }

    #[test]
    fn results_url_escapes_the_token() {
        let url = api("http://localhost:5000/")
            .results_url(&SessionToken::new("a/b?c#d"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/quiz/results/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn results_url_keeps_plain_tokens_and_base_path() {
        let url = api("http://quiz.test/backend")
            .results_url(&SessionToken::new("tok-1"))
            .unwrap();
        assert_eq!(url.as_str(), "http://quiz.test/backend/api/quiz/results/tok-1");
    }

    #[test]
    fn results_url_rejects_unparseable_base() {
        let err = api("not a url").results_url(&SessionToken::new("t")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
