// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'mock_exams' table (static exam definitions).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MockExam {
    pub id: i64,
    pub topic_id: Option<i64>,
    pub title: String,
    pub total_questions: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub description: Option<String>,
}

/// Represents the 'exam_sessions' table.
///
/// `score` and `submitted_at` stay `None` until the session is submitted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: i64,
    pub user_id: i64,
    pub mock_exam_id: i64,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
}

impl ExamSession {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// At most one per (exam_session_id, question_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ExamAnswer {
    pub exam_session_id: i64,
    pub question_id: i64,
    pub selected_answer_index: Option<i32>,
    pub correct: bool,
}

/// Review flag, tracked independently of correctness.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ExamFlag {
    pub exam_session_id: i64,
    pub question_id: i64,
    pub flagged: bool,
}

/// Question assigned to a session at start, with its presentation order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ExamSessionQuestion {
    pub exam_session_id: i64,
    pub question_id: i64,
    pub order_index: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamSessionResponse {
    pub id: i64,
    pub exam_id: i64,
    pub total_questions: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub assigned_questions: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ExamAnswerRequest {
    pub question_id: i64,
    pub selected_answer_index: Option<i32>,
    #[serde(default)]
    pub flagged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamSubmitResponse {
    pub session_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub correct_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicScore {
    pub topic_id: i64,
    pub topic_name: String,
    pub correct: i32,
    pub total: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamResultResponse {
    pub session_id: i64,
    pub submitted: bool,
    pub score: i32,
    pub total_questions: i32,
    pub correct_count: i32,
    pub topic_scores: Vec<TopicScore>,
}
