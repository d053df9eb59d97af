use std::sync::Arc;

use log::{debug, info};
use quiz_core::model::{AnswerFeedback, OptionId, QuizResults, QuizSelection, SessionToken};
use quiz_core::{QuizAction, QuizState, SessionPhase};
use storage::SessionPersistence;

use crate::api::{
    CompleteQuizRequest, CompletionAck, QuizApi, StartQuizRequest, SubmitAnswerRequest,
};
use crate::error::QuizError;

/// Drives one quiz attempt.
///
/// Every change goes through [`dispatch`](Self::dispatch): the reducer runs
/// first, then the persistence observer sees the new state. Network failures
/// are written into the state's `error` before being returned, and nothing is
/// retried automatically.
pub struct QuizSessionService {
    api: Arc<dyn QuizApi>,
    persistence: SessionPersistence,
    state: QuizState,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, persistence: SessionPersistence) -> Self {
        Self {
            api,
            persistence,
            state: QuizState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Reduce `action` into the state and let persistence observe the result.
    pub async fn dispatch(&mut self, action: QuizAction) {
        debug!("dispatch {}", action.name());
        self.state.apply(action.clone());
        self.persistence.observe(&action, &self.state).await;
    }

    /// Pick up an attempt left in local storage.
    ///
    /// Returns `true` when a session was restored. Corrupt storage is
    /// discarded and leaves the service idle.
    pub async fn resume(&mut self) -> bool {
        self.state = self.persistence.restore().await;
        let resumed = self.state.phase() != SessionPhase::Idle;
        if resumed {
            info!(
                "resumed quiz at question {} of {}",
                self.state.current_question_index() + 1,
                self.state.questions().len()
            );
        }
        resumed
    }

    /// Ask the backend for a new attempt and load its questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Api` if the request fails and
    /// `QuizError::EmptyResult` if the backend has no questions for the
    /// selection. Either way the message is also stored in the state.
    pub async fn start_quiz(&mut self, selection: &QuizSelection) -> Result<(), QuizError> {
        self.dispatch(QuizAction::SetLoading(true)).await;

        let response = match self.api.start_quiz(&StartQuizRequest::from(selection)).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(err.into()).await),
        };
        if response.questions.is_empty() {
            return Err(self.fail(QuizError::EmptyResult).await);
        }

        info!(
            "started quiz session {} with {} questions",
            response.session_token,
            response.questions.len()
        );
        self.dispatch(QuizAction::StartQuiz {
            token: response.session_token,
            questions: response.questions,
        })
        .await;
        Ok(())
    }

    /// Submit `option_id` for the question under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSession`, `QuizError::AlreadyAnswered`,
    /// `QuizError::NoActiveQuestion` or `QuizError::UnknownOption` when the
    /// answer cannot be sent, and `QuizError::Api` when the request fails.
    pub async fn submit_answer(
        &mut self,
        option_id: OptionId,
        time_spent: u32,
    ) -> Result<AnswerFeedback, QuizError> {
        let request = self.answer_request(option_id, time_spent)?;

        self.dispatch(QuizAction::SetLoading(true)).await;
        let feedback = match self.api.submit_answer(&request).await {
            Ok(feedback) => feedback,
            Err(err) => return Err(self.fail(err.into()).await),
        };

        self.dispatch(QuizAction::SetLoading(false)).await;
        self.dispatch(QuizAction::SubmitAnswer {
            question_id: request.question_id,
            option_id: request.option_id,
            is_correct: feedback.is_correct,
            time_spent,
            feedback: Some(feedback.clone()),
        })
        .await;
        Ok(feedback)
    }

    fn answer_request(
        &self,
        option_id: OptionId,
        time_spent: u32,
    ) -> Result<SubmitAnswerRequest, QuizError> {
        let session_token = self
            .state
            .session_token()
            .cloned()
            .ok_or(QuizError::NoSession)?;
        if self.state.phase() == SessionPhase::AwaitingFeedback || self.state.current_answered() {
            return Err(QuizError::AlreadyAnswered);
        }
        let question = self
            .state
            .current_question()
            .ok_or(QuizError::NoActiveQuestion)?;
        if !question.options.is_empty() && question.option(&option_id).is_none() {
            return Err(QuizError::UnknownOption(option_id));
        }

        Ok(SubmitAnswerRequest {
            session_token,
            question_id: question.id.clone(),
            option_id,
            time_spent,
        })
    }

    /// Advance past the current question and return the new phase.
    pub async fn next_question(&mut self) -> SessionPhase {
        self.dispatch(QuizAction::NextQuestion).await;
        self.state.phase()
    }

    pub async fn set_feedback(&mut self, show: bool, data: Option<AnswerFeedback>) {
        self.dispatch(QuizAction::SetFeedback { show, data }).await;
    }

    pub async fn dismiss_error(&mut self) {
        self.dispatch(QuizAction::ClearError).await;
    }

    /// Tell the backend the attempt is over.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSession` without an active token and
    /// `QuizError::Api` if the request fails.
    pub async fn complete_quiz(&mut self, time_spent: u32) -> Result<CompletionAck, QuizError> {
        let session_token = self
            .state
            .session_token()
            .cloned()
            .ok_or(QuizError::NoSession)?;

        self.dispatch(QuizAction::SetLoading(true)).await;
        let request = CompleteQuizRequest {
            session_token,
            time_spent,
        };
        let ack = match self.api.complete_quiz(&request).await {
            Ok(ack) => ack,
            Err(err) => return Err(self.fail(err.into()).await),
        };
        self.dispatch(QuizAction::SetLoading(false)).await;

        info!(
            "completed quiz session {} ({} of {} correct)",
            request.session_token,
            self.state.correct_count(),
            self.state.questions().len()
        );
        Ok(ack)
    }

    /// Fetch the server-side results of a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Api` if the request fails.
    pub async fn results(&mut self, token: &SessionToken) -> Result<QuizResults, QuizError> {
        self.dispatch(QuizAction::SetLoading(true)).await;
        match self.api.results(token).await {
            Ok(results) => {
                self.dispatch(QuizAction::SetLoading(false)).await;
                Ok(results)
            }
            Err(err) => Err(self.fail(err.into()).await),
        }
    }

    /// Drop the attempt and its stored copy.
    pub async fn reset(&mut self) {
        self.dispatch(QuizAction::ResetQuiz).await;
    }

    async fn fail(&mut self, err: QuizError) -> QuizError {
        self.dispatch(QuizAction::SetError(err.to_string())).await;
        err
    }
}
