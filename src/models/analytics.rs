// src/models/analytics.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dashboard headline figures, pre-formatted for display.
#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub accuracy: String,
    pub study_streak: String,
    pub hours_studied: String,
    pub total_questions: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicMasteryStat {
    pub topic_id: i64,
    pub name: String,
    pub mastery_pct: i32,
    pub weak: bool,
}

/// All fields are whole percentages in [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessReport {
    pub score: i32,
    pub accuracy: i32,
    pub consistency: i32,
    pub coverage: i32,
    pub mock_exam_avg: i32,
}

/// One calendar day of the accuracy trend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccuracyPoint {
    /// e.g. "Mar 7".
    pub label: String,
    pub date: NaiveDate,
    pub accuracy: i32,
    pub total: i32,
    pub correct: i32,
}
