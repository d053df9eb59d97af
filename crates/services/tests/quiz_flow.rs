use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::{
    AnswerFeedback, OptionId, PerformanceLevel, Question, QuestionId, QuestionOption,
    QuizResults, QuizSelection, ResultSession, SessionToken,
};
use quiz_core::{QuizState, SessionPhase};
use reqwest::StatusCode;
use services::api::{
    CompleteQuizRequest, CompletionAck, StartQuizRequest, StartQuizResponse, SubmitAnswerRequest,
};
use services::{ApiError, QuizApi, QuizError, QuizSessionService};
use storage::{InMemoryStore, KeyValueStore, SESSION_KEY, SessionPersistence, StorageError};

fn question(n: usize) -> Question {
    Question {
        id: QuestionId::new(format!("q{n}")),
        text: format!("Question {n}"),
        options: vec![
            QuestionOption {
                id: OptionId::new(format!("q{n}-right")),
                text: "right".into(),
                is_correct: true,
                position: Some(1),
                order: None,
            },
            QuestionOption {
                id: OptionId::new(format!("q{n}-wrong")),
                text: "wrong".into(),
                is_correct: false,
                position: Some(2),
                order: None,
            },
        ],
        category: None,
        difficulty: None,
        code: None,
        points: Some(10),
    }
}

#[derive(Default)]
struct FakeApi {
    questions: Vec<Question>,
    fail_with: Option<u16>,
    starts: Mutex<Vec<StartQuizRequest>>,
    answers: Mutex<Vec<SubmitAnswerRequest>>,
    completions: Mutex<Vec<CompleteQuizRequest>>,
}

impl FakeApi {
    fn with_questions(n: usize) -> Self {
        Self {
            questions: (0..n).map(question).collect(),
            ..Self::default()
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::with_questions(3)
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        match self.fail_with {
            Some(401) => Err(ApiError::Unauthorized("invalid or expired token".into())),
            Some(code) => Err(ApiError::Status {
                status: StatusCode::from_u16(code).unwrap(),
                message: format!("backend said {code}"),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QuizApi for FakeApi {
    async fn start_quiz(
        &self,
        request: &StartQuizRequest,
    ) -> Result<StartQuizResponse, ApiError> {
        self.starts.lock().unwrap().push(request.clone());
        self.check()?;
        Ok(StartQuizResponse {
            session_token: SessionToken::new("sess-1"),
            questions: self.questions.clone(),
        })
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<AnswerFeedback, ApiError> {
        self.answers.lock().unwrap().push(request.clone());
        self.check()?;
        let question = self
            .questions
            .iter()
            .find(|q| q.id == request.question_id)
            .unwrap();
        let correct = question.options.iter().find(|o| o.is_correct).cloned();
        let is_correct = correct.as_ref().is_some_and(|o| o.id == request.option_id);
        Ok(AnswerFeedback {
            is_correct,
            correct_option: correct,
            explanation: "explained".into(),
            points_earned: if is_correct { 10 } else { 0 },
        })
    }

    async fn complete_quiz(
        &self,
        request: &CompleteQuizRequest,
    ) -> Result<CompletionAck, ApiError> {
        self.completions.lock().unwrap().push(request.clone());
        self.check()?;
        Ok(CompletionAck {
            success: Some(true),
            message: None,
        })
    }

    async fn results(&self, token: &SessionToken) -> Result<QuizResults, ApiError> {
        self.check()?;
        assert_eq!(token.as_str(), "sess-1");
        Ok(QuizResults {
            session: ResultSession {
                total_questions: 3,
                correct_answers: 2,
                score: 66.7,
                ..ResultSession::default()
            },
            performance_level: PerformanceLevel::Intermediate,
            average_time: 5.0,
            category_breakdown: Default::default(),
        })
    }
}

fn service(api: Arc<FakeApi>, store: Arc<InMemoryStore>) -> QuizSessionService {
    QuizSessionService::new(api, SessionPersistence::new(store))
}

#[tokio::test]
async fn full_quiz_flow_scores_against_total_questions() {
    let api = Arc::new(FakeApi::with_questions(3));
    let store = Arc::new(InMemoryStore::new());
    let mut quiz = service(Arc::clone(&api), Arc::clone(&store));

    quiz.start_quiz(&QuizSelection::default()).await.unwrap();
    assert_eq!(quiz.phase(), SessionPhase::InProgress);
    assert_eq!(
        api.starts.lock().unwrap()[0].category.as_deref(),
        Some("JavaScript")
    );

    let feedback = quiz
        .submit_answer(OptionId::new("q0-right"), 4)
        .await
        .unwrap();
    assert!(feedback.is_correct);
    assert_eq!(quiz.phase(), SessionPhase::AwaitingFeedback);
    assert!((quiz.state().score() - 100.0 / 3.0).abs() < 1e-9);

    assert_eq!(quiz.next_question().await, SessionPhase::InProgress);
    quiz.submit_answer(OptionId::new("q1-wrong"), 6).await.unwrap();
    quiz.next_question().await;
    quiz.submit_answer(OptionId::new("q2-right"), 2).await.unwrap();
    assert_eq!(quiz.next_question().await, SessionPhase::Complete);

    assert!((quiz.state().score() - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(quiz.state().total_time_spent(), 12);

    let ack = quiz.complete_quiz(12).await.unwrap();
    assert_eq!(ack.success, Some(true));
    assert_eq!(api.completions.lock().unwrap()[0].time_spent, 12);

    let results = quiz.results(&SessionToken::new("sess-1")).await.unwrap();
    assert_eq!(results.performance_level, PerformanceLevel::Intermediate);
    assert!(!quiz.state().is_loading());
}

#[tokio::test]
async fn empty_question_list_is_an_error() {
    let api = Arc::new(FakeApi::with_questions(0));
    let mut quiz = service(api, Arc::new(InMemoryStore::new()));

    let err = quiz.start_quiz(&QuizSelection::default()).await.unwrap_err();

    assert!(matches!(err, QuizError::EmptyResult));
    assert_eq!(
        quiz.state().error(),
        Some("no questions available for this selection")
    );
    assert!(!quiz.state().is_loading());
    assert_eq!(quiz.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn network_error_lands_in_state_and_start_clears_it() {
    let store = Arc::new(InMemoryStore::new());
    let mut quiz = service(Arc::new(FakeApi::failing(500)), Arc::clone(&store));

    let err = quiz.start_quiz(&QuizSelection::default()).await.unwrap_err();
    assert!(matches!(err, QuizError::Api(ApiError::Status { .. })));
    assert_eq!(quiz.state().error(), Some("backend said 500"));

    let mut quiz = service(Arc::new(FakeApi::with_questions(2)), store);
    quiz.dispatch(quiz_core::QuizAction::SetError("stale".into()))
        .await;
    quiz.start_quiz(&QuizSelection::default()).await.unwrap();
    assert!(quiz.state().error().is_none());
}

#[tokio::test]
async fn unauthorized_is_reported() {
    let mut quiz = service(Arc::new(FakeApi::failing(401)), Arc::new(InMemoryStore::new()));

    let err = quiz.start_quiz(&QuizSelection::default()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(quiz.state().error(), Some("invalid or expired token"));
}

#[tokio::test]
async fn double_submission_is_rejected_before_the_network() {
    let api = Arc::new(FakeApi::with_questions(2));
    let mut quiz = service(Arc::clone(&api), Arc::new(InMemoryStore::new()));
    quiz.start_quiz(&QuizSelection::default()).await.unwrap();

    quiz.submit_answer(OptionId::new("q0-right"), 1).await.unwrap();
    let err = quiz
        .submit_answer(OptionId::new("q0-wrong"), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, QuizError::AlreadyAnswered));
    assert_eq!(api.answers.lock().unwrap().len(), 1);
    assert_eq!(quiz.state().answers().len(), 1);
}

#[tokio::test]
async fn invalid_selections_are_rejected_locally() {
    let api = Arc::new(FakeApi::with_questions(1));
    let mut quiz = service(Arc::clone(&api), Arc::new(InMemoryStore::new()));

    let err = quiz.submit_answer(OptionId::new("x"), 1).await.unwrap_err();
    assert!(matches!(err, QuizError::NoSession));

    quiz.start_quiz(&QuizSelection::default()).await.unwrap();
    let err = quiz
        .submit_answer(OptionId::new("not-an-option"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::UnknownOption(_)));

    quiz.next_question().await;
    let err = quiz
        .submit_answer(OptionId::new("q0-right"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::NoActiveQuestion));
    assert!(api.answers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_answer_keeps_question_open() {
    let store = Arc::new(InMemoryStore::new());
    let mut quiz = service(Arc::new(FakeApi::with_questions(2)), Arc::clone(&store));
    quiz.start_quiz(&QuizSelection::default()).await.unwrap();

    // Swap in a failing backend for the same stored session.
    let mut flaky = service(Arc::new(FakeApi::failing(503)), store);
    assert!(flaky.resume().await);
    let err = flaky
        .submit_answer(OptionId::new("q0-right"), 3)
        .await
        .unwrap_err();

    assert!(matches!(err, QuizError::Api(_)));
    assert_eq!(flaky.phase(), SessionPhase::InProgress);
    assert!(flaky.state().answers().is_empty());
    assert_eq!(flaky.state().error(), Some("backend said 503"));

    flaky.dismiss_error().await;
    assert!(flaky.state().error().is_none());
}

#[tokio::test]
async fn resume_after_restart_restores_position() {
    let api = Arc::new(FakeApi::with_questions(3));
    let store = Arc::new(InMemoryStore::new());

    let (index, score) = {
        let mut quiz = service(Arc::clone(&api), Arc::clone(&store));
        quiz.start_quiz(&QuizSelection::default()).await.unwrap();
        quiz.submit_answer(OptionId::new("q0-right"), 5).await.unwrap();
        quiz.next_question().await;
        (quiz.state().current_question_index(), quiz.state().score())
    };

    let mut restarted = service(api, store);
    assert!(restarted.resume().await);

    assert_eq!(restarted.state().current_question_index(), index);
    assert!((restarted.state().score() - score).abs() < f64::EPSILON);
    assert!(restarted.state().feedback_data().is_none());
    assert_eq!(restarted.phase(), SessionPhase::InProgress);
}

#[tokio::test]
async fn resume_with_corrupt_storage_stays_idle() {
    let store = Arc::new(InMemoryStore::new());
    store.set(SESSION_KEY, "definitely not json").await.unwrap();
    let mut quiz = service(Arc::new(FakeApi::with_questions(1)), Arc::clone(&store));

    assert!(!quiz.resume().await);
    assert_eq!(quiz.state(), &QuizState::default());
    assert_eq!(store.get(SESSION_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn reset_clears_state_and_storage() {
    let store = Arc::new(InMemoryStore::new());
    let mut quiz = service(Arc::new(FakeApi::with_questions(2)), Arc::clone(&store));
    quiz.start_quiz(&QuizSelection::default()).await.unwrap();
    assert!(store.get(SESSION_KEY).await.unwrap().is_some());

    quiz.reset().await;

    assert_eq!(quiz.state(), &QuizState::default());
    assert_eq!(store.get(SESSION_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn complete_requires_session() {
    let mut quiz = service(Arc::new(FakeApi::with_questions(1)), Arc::new(InMemoryStore::new()));
    let err = quiz.complete_quiz(10).await.unwrap_err();
    assert!(matches!(err, QuizError::NoSession));
}

#[tokio::test]
async fn skipped_question_counts_against_the_score() {
    let store = Arc::new(InMemoryStore::new());
    let mut quiz = service(Arc::new(FakeApi::with_questions(2)), Arc::clone(&store));
    quiz.start_quiz(&QuizSelection::default()).await.unwrap();

    assert_eq!(quiz.next_question().await, SessionPhase::InProgress);
    assert!(quiz.state().answers().is_empty());
    quiz.submit_answer(OptionId::new("q1-right"), 2).await.unwrap();
    assert!((quiz.state().score() - 50.0).abs() < 1e-9);

    let mut restarted = service(Arc::new(FakeApi::with_questions(2)), store);
    assert!(restarted.resume().await);
    assert_eq!(restarted.state().current_question_index(), 1);
    assert_eq!(restarted.state().answers()[0].question_id, QuestionId::new("q1"));
}

/// Local storage that rejects every operation.
struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }
}

#[tokio::test]
async fn storage_failures_never_reach_the_caller() {
    let mut quiz = QuizSessionService::new(
        Arc::new(FakeApi::with_questions(2)),
        SessionPersistence::new(Arc::new(UnavailableStore)),
    );

    assert!(!quiz.resume().await);
    assert_eq!(quiz.phase(), SessionPhase::Idle);

    quiz.start_quiz(&QuizSelection::default()).await.unwrap();
    assert_eq!(quiz.phase(), SessionPhase::InProgress);
    quiz.submit_answer(OptionId::new("q0-right"), 3).await.unwrap();
    assert!((quiz.state().score() - 50.0).abs() < 1e-9);
    assert_eq!(quiz.next_question().await, SessionPhase::InProgress);
    assert_eq!(quiz.state().current_question_index(), 1);
    assert!(quiz.state().error().is_none());

    quiz.reset().await;
    assert_eq!(quiz.state(), &QuizState::default());
}
