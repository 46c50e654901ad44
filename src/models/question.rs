// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
/// Questions are owned by the user who authored them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub owner_id: i64,
    pub topic_id: i64,

    /// The text content of the question.
    pub text: String,

    /// Stored as a JSON array in the database.
    pub choices: Json<Vec<String>>,

    /// Index into `choices`.
    pub correct_answer_index: i32,

    pub explanation: Option<String>,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Question {
    /// A missing selection is never correct.
    pub fn is_correct(&self, selected: Option<i32>) -> bool {
        selected == Some(self.correct_answer_index)
    }

    pub fn choice(&self, index: Option<i32>) -> Option<String> {
        let index = usize::try_from(index?).ok()?;
        self.choices.get(index).cloned()
    }
}

/// DTO for sending a question to an exam taker (excludes answer and explanation).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub topic_id: i64,
    pub text: String,
    pub choices: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            topic_id: q.topic_id,
            text: q.text,
            choices: q.choices.0,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub topic_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(custom(function = validate_choices))]
    pub choices: Vec<String>,
    pub correct_answer_index: i32,
    #[validate(length(max = 4000))]
    pub explanation: Option<String>,
    #[validate(custom(function = validate_difficulty))]
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionListParams {
    pub topic_id: Option<i64>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn validate_choices(choices: &[String]) -> Result<(), validator::ValidationError> {
    if choices.is_empty() {
        return Err(validator::ValidationError::new("choices_cannot_be_empty"));
    }
    for choice in choices {
        if choice.len() > 500 {
            return Err(validator::ValidationError::new("choice_too_long"));
        }
    }
    Ok(())
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "medium" | "hard" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}
