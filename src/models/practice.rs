// src/models/practice.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'practice_sessions' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: i64,
    pub user_id: i64,
    pub topic_id: i64,
    pub difficulty: Option<String>,
    pub question_count: i32,
    pub created_at: DateTime<Utc>,
}

/// One answered practice question. Immutable once stored.
///
/// `topic_id` is not a column of 'answer_attempts'; it is joined in from the question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub topic_id: i64,
    pub practice_session_id: i64,
    pub selected_answer_index: Option<i32>,
    pub correct: bool,
    pub time_taken_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub question_id: i64,
    pub topic_id: i64,
    pub practice_session_id: i64,
    pub selected_answer_index: Option<i32>,
    pub correct: bool,
    pub time_taken_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewAttempt {
    pub fn into_attempt(self, id: i64) -> Attempt {
        Attempt {
            id,
            user_id: self.user_id,
            question_id: self.question_id,
            topic_id: self.topic_id,
            practice_session_id: self.practice_session_id,
            selected_answer_index: self.selected_answer_index,
            correct: self.correct,
            time_taken_seconds: self.time_taken_seconds,
            created_at: self.created_at,
        }
    }
}

/// Total and correct attempt counts for a scope (user, or user + topic).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct AttemptCounts {
    pub total: i64,
    pub correct: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePracticeSessionRequest {
    pub topic_id: i64,
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 200))]
    pub question_count: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerAttemptRequest {
    pub session_id: i64,
    pub question_id: i64,
    pub selected_answer_index: Option<i32>,
    /// Absent or non-positive values are ignored by the hours-studied total.
    #[validate(range(min = 0, max = 86_400))]
    pub time_taken_seconds: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptResultResponse {
    pub attempt_id: i64,
    pub correct: bool,
    pub correct_answer_index: i32,
    pub mastery_pct: i32,
}

#[derive(Debug, Deserialize)]
pub struct MistakeParams {
    pub topic_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MistakeTopicParams {
    pub topic_id: i64,
}

/// Latest wrong answer for one question.
#[derive(Debug, Serialize, Deserialize)]
pub struct MistakeQuestion {
    pub question_id: i64,
    pub topic_id: i64,
    pub topic_name: String,
    pub text: String,
    pub user_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub attempted_at: DateTime<Utc>,
}
