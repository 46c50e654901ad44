// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use super::{
    ExamStore, LessonStore, MasteryStore, PracticeStore, QuestionStore, StoreResult, TopicStore,
    UserStore,
};
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

/// `Store` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    id, username, password, full_name, target_exam_date, daily_study_hours,
    avatar_url, created_at, updated_at
"#;

const ATTEMPT_COLUMNS: &str = r#"
    a.id, a.user_id, a.question_id, q.topic_id, a.practice_session_id,
    a.selected_answer_index, a.correct, a.time_taken_seconds, a.created_at
"#;

const QUESTION_COLUMNS: &str = r#"
    id, owner_id, topic_id, text, choices, correct_answer_index,
    explanation, difficulty, created_at
"#;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("Username '{}' already exists", username))
                } else {
                    AppError::from(e)
                }
            })
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        changes: &UpdateProfileRequest,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                target_exam_date = COALESCE($3, target_exam_date),
                daily_study_hours = COALESCE($4, daily_study_hours),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(changes.full_name.as_deref())
            .bind(changes.target_exam_date)
            .bind(changes.daily_study_hours)
            .bind(changes.avatar_url.as_deref())
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TopicStore for PgStore {
    async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        let topics =
            sqlx::query_as::<_, Topic>("SELECT id, name, slug, color FROM topics ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(topics)
    }

    async fn find_topic(&self, id: i64) -> StoreResult<Option<Topic>> {
        let topic =
            sqlx::query_as::<_, Topic>("SELECT id, name, slug, color FROM topics WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(topic)
    }

    async fn find_topic_by_slug(&self, slug: &str) -> StoreResult<Option<Topic>> {
        let topic =
            sqlx::query_as::<_, Topic>("SELECT id, name, slug, color FROM topics WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(topic)
    }

    async fn create_topic(&self, name: &str, slug: &str, color: &str) -> StoreResult<Topic> {
        sqlx::query_as::<_, Topic>(
            r#"
            INSERT INTO topics (name, slug, color)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, color
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Topic slug '{}' already exists", slug))
            } else {
                AppError::from(e)
            }
        })
    }
}

#[async_trait]
impl MasteryStore for PgStore {
    async fn find_mastery(&self, user_id: i64, topic_id: i64) -> StoreResult<Option<TopicMastery>> {
        let row = sqlx::query_as::<_, TopicMastery>(
            r#"
            SELECT user_id, topic_id, mastery_pct, weak
            FROM user_topics
            WHERE user_id = $1 AND topic_id = $2
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_mastery(&self, row: &TopicMastery) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_topics (user_id, topic_id, mastery_pct, weak)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.user_id)
        .bind(row.topic_id)
        .bind(row.mastery_pct)
        .bind(row.weak)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_mastery(&self, row: &TopicMastery) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE user_topics
            SET mastery_pct = $3, weak = $4
            WHERE user_id = $1 AND topic_id = $2
            "#,
        )
        .bind(row.user_id)
        .bind(row.topic_id)
        .bind(row.mastery_pct)
        .bind(row.weak)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_mastery(&self, user_id: i64) -> StoreResult<Vec<TopicMastery>> {
        let rows = sqlx::query_as::<_, TopicMastery>(
            r#"
            SELECT user_id, topic_id, mastery_pct, weak
            FROM user_topics
            WHERE user_id = $1
            ORDER BY topic_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn create_question(
        &self,
        owner_id: i64,
        req: &CreateQuestionRequest,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Question> {
        let sql = format!(
            r#"
            INSERT INTO questions
                (owner_id, topic_id, text, choices, correct_answer_index, explanation, difficulty, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        );
        let question = sqlx::query_as::<_, Question>(&sql)
            .bind(owner_id)
            .bind(req.topic_id)
            .bind(&req.text)
            .bind(Json(&req.choices))
            .bind(req.correct_answer_index)
            .bind(&req.explanation)
            .bind(&req.difficulty)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(question)
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
        let question = sqlx::query_as::<_, Question>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(question)
    }

    async fn find_questions(&self, ids: &[i64]) -> StoreResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }

    async fn list_questions(&self, owner_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Question>> {
        let sql = format!(
            r#"
            SELECT {} FROM questions
            WHERE owner_id = $1 AND ($2::BIGINT IS NULL OR topic_id = $2)
            ORDER BY created_at DESC, id DESC
            "#,
            QUESTION_COLUMNS
        );
        let questions = sqlx::query_as::<_, Question>(&sql)
            .bind(owner_id)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(questions)
    }
}

#[async_trait]
impl PracticeStore for PgStore {
    async fn create_practice_session(
        &self,
        user_id: i64,
        topic_id: i64,
        difficulty: Option<&str>,
        question_count: i32,
        created_at: DateTime<Utc>,
    ) -> StoreResult<PracticeSession> {
        let session = sqlx::query_as::<_, PracticeSession>(
            r#"
            INSERT INTO practice_sessions (user_id, topic_id, difficulty, question_count, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, topic_id, difficulty, question_count, created_at
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .bind(difficulty)
        .bind(question_count)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn find_practice_session(&self, id: i64) -> StoreResult<Option<PracticeSession>> {
        let session = sqlx::query_as::<_, PracticeSession>(
            r#"
            SELECT id, user_id, topic_id, difficulty, question_count, created_at
            FROM practice_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO answer_attempts
                (user_id, question_id, practice_session_id, selected_answer_index,
                 correct, time_taken_seconds, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.question_id)
        .bind(attempt.practice_session_id)
        .bind(attempt.selected_answer_index)
        .bind(attempt.correct)
        .bind(attempt.time_taken_seconds)
        .bind(attempt.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt.into_attempt(id))
    }

    async fn attempts_for_user(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Attempt>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM answer_attempts a
            JOIN questions q ON q.id = a.question_id
            WHERE a.user_id = $1 AND ($2::TIMESTAMPTZ IS NULL OR a.created_at >= $2)
            ORDER BY a.created_at, a.id
            "#,
            ATTEMPT_COLUMNS
        );
        let attempts = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(attempts)
    }

    async fn attempt_counts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<AttemptCounts> {
        let counts = sqlx::query_as::<_, AttemptCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE a.correct) AS correct
            FROM answer_attempts a
            JOIN questions q ON q.id = a.question_id
            WHERE a.user_id = $1 AND ($2::BIGINT IS NULL OR q.topic_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn incorrect_attempts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Attempt>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM answer_attempts a
            JOIN questions q ON q.id = a.question_id
            WHERE a.user_id = $1 AND NOT a.correct
              AND ($2::BIGINT IS NULL OR q.topic_id = $2)
            ORDER BY a.created_at DESC, a.id DESC
            "#,
            ATTEMPT_COLUMNS
        );
        let attempts = sqlx::query_as::<_, Attempt>(&sql)
            .bind(user_id)
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(attempts)
    }
}

#[async_trait]
impl LessonStore for PgStore {
    async fn find_completion(&self, user_id: i64, lesson_id: &str) -> StoreResult<Option<LessonCompletion>> {
        let row = sqlx::query_as::<_, LessonCompletion>(
            r#"
            SELECT id, user_id, topic_slug, lesson_id, completed_at
            FROM lesson_progress
            WHERE user_id = $1 AND lesson_id = $2
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_completion(
        &self,
        user_id: i64,
        topic_slug: &str,
        lesson_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<LessonCompletion> {
        let row = sqlx::query_as::<_, LessonCompletion>(
            r#"
            INSERT INTO lesson_progress (user_id, topic_slug, lesson_id, completed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, topic_slug, lesson_id, completed_at
            "#,
        )
        .bind(user_id)
        .bind(topic_slug)
        .bind(lesson_id)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_completion(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM lesson_progress WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_completions(&self, user_id: i64, topic_slug: Option<&str>) -> StoreResult<Vec<LessonCompletion>> {
        let rows = sqlx::query_as::<_, LessonCompletion>(
            r#"
            SELECT id, user_id, topic_slug, lesson_id, completed_at
            FROM lesson_progress
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR topic_slug = $2)
            ORDER BY completed_at, id
            "#,
        )
        .bind(user_id)
        .bind(topic_slug)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_completions(&self, user_id: i64, topic_slug: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_progress WHERE user_id = $1 AND topic_slug = $2",
        )
        .bind(user_id)
        .bind(topic_slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl ExamStore for PgStore {
    async fn list_exams(&self) -> StoreResult<Vec<MockExam>> {
        let exams = sqlx::query_as::<_, MockExam>(
            r#"
            SELECT id, topic_id, title, total_questions, duration_minutes, description
            FROM mock_exams
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(exams)
    }

    async fn find_exam(&self, id: i64) -> StoreResult<Option<MockExam>> {
        let exam = sqlx::query_as::<_, MockExam>(
            r#"
            SELECT id, topic_id, title, total_questions, duration_minutes, description
            FROM mock_exams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exam)
    }

    async fn create_exam_session(
        &self,
        user_id: i64,
        exam_id: i64,
        started_at: DateTime<Utc>,
    ) -> StoreResult<ExamSession> {
        let session = sqlx::query_as::<_, ExamSession>(
            r#"
            INSERT INTO exam_sessions (user_id, mock_exam_id, started_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, mock_exam_id, started_at, submitted_at, score
            "#,
        )
        .bind(user_id)
        .bind(exam_id)
        .bind(started_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn find_exam_session(&self, id: i64) -> StoreResult<Option<ExamSession>> {
        let session = sqlx::query_as::<_, ExamSession>(
            r#"
            SELECT id, user_id, mock_exam_id, started_at, submitted_at, score
            FROM exam_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn exam_sessions_for_user(&self, user_id: i64) -> StoreResult<Vec<ExamSession>> {
        let sessions = sqlx::query_as::<_, ExamSession>(
            r#"
            SELECT id, user_id, mock_exam_id, started_at, submitted_at, score
            FROM exam_sessions
            WHERE user_id = $1
            ORDER BY started_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn save_exam_result(
        &self,
        session_id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE exam_sessions SET score = $2, submitted_at = $3 WHERE id = $1")
            .bind(session_id)
            .bind(score)
            .bind(submitted_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn assign_questions(&self, session_id: i64, question_ids: &[i64]) -> StoreResult<()> {
        if question_ids.is_empty() {
            return Ok(());
        }

        let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "INSERT INTO exam_session_questions (exam_session_id, question_id, order_index) ",
        );
        query_builder.push_values(question_ids.iter().enumerate(), |mut row, (index, id)| {
            row.push_bind(session_id)
                .push_bind(*id)
                .push_bind(index as i32);
        });

        query_builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn session_questions(&self, session_id: i64) -> StoreResult<Vec<ExamSessionQuestion>> {
        let rows = sqlx::query_as::<_, ExamSessionQuestion>(
            r#"
            SELECT exam_session_id, question_id, order_index
            FROM exam_session_questions
            WHERE exam_session_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_exam_answer(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamAnswer>> {
        let answer = sqlx::query_as::<_, ExamAnswer>(
            r#"
            SELECT exam_session_id, question_id, selected_answer_index, correct
            FROM exam_answers
            WHERE exam_session_id = $1 AND question_id = $2
            "#,
        )
        .bind(session_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn insert_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO exam_answers (exam_session_id, question_id, selected_answer_index, correct)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(answer.exam_session_id)
        .bind(answer.question_id)
        .bind(answer.selected_answer_index)
        .bind(answer.correct)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE exam_answers
            SET selected_answer_index = $3, correct = $4
            WHERE exam_session_id = $1 AND question_id = $2
            "#,
        )
        .bind(answer.exam_session_id)
        .bind(answer.question_id)
        .bind(answer.selected_answer_index)
        .bind(answer.correct)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn exam_answers(&self, session_id: i64) -> StoreResult<Vec<ExamAnswer>> {
        let answers = sqlx::query_as::<_, ExamAnswer>(
            r#"
            SELECT exam_session_id, question_id, selected_answer_index, correct
            FROM exam_answers
            WHERE exam_session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn find_exam_flag(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamFlag>> {
        let flag = sqlx::query_as::<_, ExamFlag>(
            r#"
            SELECT exam_session_id, question_id, flagged
            FROM exam_flags
            WHERE exam_session_id = $1 AND question_id = $2
            "#,
        )
        .bind(session_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flag)
    }

    async fn insert_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO exam_flags (exam_session_id, question_id, flagged) VALUES ($1, $2, $3)",
        )
        .bind(flag.exam_session_id)
        .bind(flag.question_id)
        .bind(flag.flagged)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()> {
        sqlx::query(
            "UPDATE exam_flags SET flagged = $3 WHERE exam_session_id = $1 AND question_id = $2",
        )
        .bind(flag.exam_session_id)
        .bind(flag.question_id)
        .bind(flag.flagged)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn exam_flags(&self, session_id: i64) -> StoreResult<Vec<ExamFlag>> {
        let flags = sqlx::query_as::<_, ExamFlag>(
            r#"
            SELECT exam_session_id, question_id, flagged
            FROM exam_flags
            WHERE exam_session_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(flags)
    }
}
