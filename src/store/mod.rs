// src/store/mod.rs

//! Storage boundary for the engines.
//!
//! Every read and write the engines perform goes through one of these traits.
//! Upserts are deliberately split into `find_*` / `insert_*` / `update_*` so
//! callers do an explicit read-then-write keyed by the natural key; that is not
//! atomic under concurrent requests, and last write wins.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        exam::{ExamAnswer, ExamFlag, ExamSession, ExamSessionQuestion, MockExam},
        lesson::LessonCompletion,
        practice::{Attempt, AttemptCounts, NewAttempt, PracticeSession},
        question::{CreateQuestionRequest, Question},
        topic::{Topic, TopicMastery},
        user::{UpdateProfileRequest, User},
    },
};

pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Overwrites only the fields that are `Some`. `None` when the user does not exist.
    async fn update_profile(
        &self,
        user_id: i64,
        changes: &UpdateProfileRequest,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn list_topics(&self) -> StoreResult<Vec<Topic>>;
    async fn find_topic(&self, id: i64) -> StoreResult<Option<Topic>>;
    async fn find_topic_by_slug(&self, slug: &str) -> StoreResult<Option<Topic>>;
    async fn create_topic(&self, name: &str, slug: &str, color: &str) -> StoreResult<Topic>;
}

#[async_trait]
pub trait MasteryStore: Send + Sync {
    async fn find_mastery(&self, user_id: i64, topic_id: i64) -> StoreResult<Option<TopicMastery>>;
    async fn insert_mastery(&self, row: &TopicMastery) -> StoreResult<()>;
    async fn update_mastery(&self, row: &TopicMastery) -> StoreResult<()>;
    async fn list_mastery(&self, user_id: i64) -> StoreResult<Vec<TopicMastery>>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn create_question(
        &self,
        owner_id: i64,
        req: &CreateQuestionRequest,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Question>;
    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>>;
    async fn find_questions(&self, ids: &[i64]) -> StoreResult<Vec<Question>>;
    async fn list_questions(&self, owner_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Question>>;
}

#[async_trait]
pub trait PracticeStore: Send + Sync {
    async fn create_practice_session(
        &self,
        user_id: i64,
        topic_id: i64,
        difficulty: Option<&str>,
        question_count: i32,
        created_at: DateTime<Utc>,
    ) -> StoreResult<PracticeSession>;
    async fn find_practice_session(&self, id: i64) -> StoreResult<Option<PracticeSession>>;
    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt>;
    /// Oldest first. `since` is an inclusive lower bound on `created_at`.
    async fn attempts_for_user(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Attempt>>;
    /// Counts for the user, optionally narrowed to one topic.
    async fn attempt_counts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<AttemptCounts>;
    /// Newest first.
    async fn incorrect_attempts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Attempt>>;
}

#[async_trait]
pub trait LessonStore: Send + Sync {
    async fn find_completion(&self, user_id: i64, lesson_id: &str) -> StoreResult<Option<LessonCompletion>>;
    async fn insert_completion(
        &self,
        user_id: i64,
        topic_slug: &str,
        lesson_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<LessonCompletion>;
    async fn delete_completion(&self, id: i64) -> StoreResult<()>;
    async fn list_completions(&self, user_id: i64, topic_slug: Option<&str>) -> StoreResult<Vec<LessonCompletion>>;
    async fn count_completions(&self, user_id: i64, topic_slug: &str) -> StoreResult<i64>;
}

#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn list_exams(&self) -> StoreResult<Vec<MockExam>>;
    async fn find_exam(&self, id: i64) -> StoreResult<Option<MockExam>>;

    async fn create_exam_session(
        &self,
        user_id: i64,
        exam_id: i64,
        started_at: DateTime<Utc>,
    ) -> StoreResult<ExamSession>;
    async fn find_exam_session(&self, id: i64) -> StoreResult<Option<ExamSession>>;
    async fn exam_sessions_for_user(&self, user_id: i64) -> StoreResult<Vec<ExamSession>>;
    async fn save_exam_result(
        &self,
        session_id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Persists `question_ids` in presentation order (index 0 first).
    async fn assign_questions(&self, session_id: i64, question_ids: &[i64]) -> StoreResult<()>;
    /// Ordered by `order_index`.
    async fn session_questions(&self, session_id: i64) -> StoreResult<Vec<ExamSessionQuestion>>;

    async fn find_exam_answer(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamAnswer>>;
    async fn insert_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()>;
    async fn update_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()>;
    async fn exam_answers(&self, session_id: i64) -> StoreResult<Vec<ExamAnswer>>;

    async fn find_exam_flag(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamFlag>>;
    async fn insert_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()>;
    async fn update_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()>;
    async fn exam_flags(&self, session_id: i64) -> StoreResult<Vec<ExamFlag>>;
}

/// Everything the engines read or write.
pub trait Store:
    UserStore + TopicStore + MasteryStore + QuestionStore + PracticeStore + LessonStore + ExamStore
{
}

impl<T> Store for T where
    T: UserStore + TopicStore + MasteryStore + QuestionStore + PracticeStore + LessonStore + ExamStore
{
}
