// tests/common/mod.rs

//! In-memory `Store` so integration tests run the real engines and router
//! without a database.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use review_backend::{
    config::{Config, LessonCatalog},
    error::AppError,
    models::{
        exam::{ExamAnswer, ExamFlag, ExamSession, ExamSessionQuestion, MockExam},
        lesson::LessonCompletion,
        practice::{Attempt, AttemptCounts, NewAttempt, PracticeSession},
        question::{CreateQuestionRequest, Question},
        topic::{Topic, TopicMastery},
        user::{UpdateProfileRequest, User},
    },
    routes,
    state::AppState,
    store::{
        ExamStore, LessonStore, MasteryStore, PracticeStore, QuestionStore, StoreResult,
        TopicStore, UserStore,
    },
    utils::clock::FixedClock,
};
use sqlx::types::Json;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    topics: Vec<Topic>,
    mastery: Vec<TopicMastery>,
    questions: Vec<Question>,
    practice_sessions: Vec<PracticeSession>,
    attempts: Vec<Attempt>,
    lessons: Vec<LessonCompletion>,
    exams: Vec<MockExam>,
    exam_sessions: Vec<ExamSession>,
    session_questions: Vec<ExamSessionQuestion>,
    answers: Vec<ExamAnswer>,
    flags: Vec<ExamFlag>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Same topics and mock exams as the initial migration.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut t = store.tables.lock().unwrap();
            for (name, slug, color) in [
                ("General Psychology", "general-psychology", "blue"),
                ("Abnormal Psychology", "abnormal-psychology", "purple"),
                ("Psychological Assessment", "psychological-assessment", "amber"),
                (
                    "Industrial/Organizational Psychology",
                    "industrial-organizational-psychology",
                    "green",
                ),
                ("Ethics (RA 10029)", "ethics-ra-10029", "red"),
            ] {
                let id = t.id();
                t.topics.push(Topic {
                    id,
                    name: name.into(),
                    slug: slug.into(),
                    color: color.into(),
                });
            }
        }
        store.add_exam(None, "Full BLEPP Simulation", Some(150), Some(180));
        store.add_exam(Some(1), "General Psychology Mock Exam", Some(40), Some(60));
        store.add_exam(None, "Quick Practice", Some(10), Some(15));
        store
    }

    pub fn add_exam(
        &self,
        topic_id: Option<i64>,
        title: &str,
        total_questions: Option<i32>,
        duration_minutes: Option<i32>,
    ) -> MockExam {
        let mut t = self.tables.lock().unwrap();
        let exam = MockExam {
            id: t.id(),
            topic_id,
            title: title.into(),
            total_questions,
            duration_minutes,
            description: None,
        };
        t.exams.push(exam.clone());
        exam
    }

    /// Adds an attempt with an arbitrary timestamp, bypassing the practice engine.
    pub fn backdate_attempt(&self, user_id: i64, question_id: i64, correct: bool, at: DateTime<Utc>) {
        let mut t = self.tables.lock().unwrap();
        let topic_id = t
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.topic_id)
            .unwrap_or_default();
        let id = t.id();
        t.attempts.push(Attempt {
            id,
            user_id,
            question_id,
            topic_id,
            practice_session_id: 0,
            selected_answer_index: None,
            correct,
            time_taken_seconds: None,
            created_at: at,
        });
    }

    pub fn mastery_row(&self, user_id: i64, topic_id: i64) -> Option<TopicMastery> {
        let t = self.tables.lock().unwrap();
        t.mastery
            .iter()
            .find(|m| m.user_id == user_id && m.topic_id == topic_id)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!("Username '{}' already exists", username)));
        }
        let user = User {
            id: t.id(),
            username: username.into(),
            password: password_hash.into(),
            full_name: None,
            target_exam_date: None,
            daily_study_hours: None,
            avatar_url: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        changes: &UpdateProfileRequest,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        let Some(user) = t.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.full_name {
            user.full_name = Some(name.clone());
        }
        if let Some(date) = changes.target_exam_date {
            user.target_exam_date = Some(date);
        }
        if let Some(hours) = changes.daily_study_hours {
            user.daily_study_hours = Some(hours);
        }
        if let Some(url) = &changes.avatar_url {
            user.avatar_url = Some(url.clone());
        }
        user.updated_at = Some(updated_at);
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TopicStore for MemoryStore {
    async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        Ok(self.tables.lock().unwrap().topics.clone())
    }

    async fn find_topic(&self, id: i64) -> StoreResult<Option<Topic>> {
        let t = self.tables.lock().unwrap();
        Ok(t.topics.iter().find(|x| x.id == id).cloned())
    }

    async fn find_topic_by_slug(&self, slug: &str) -> StoreResult<Option<Topic>> {
        let t = self.tables.lock().unwrap();
        Ok(t.topics.iter().find(|x| x.slug == slug).cloned())
    }

    async fn create_topic(&self, name: &str, slug: &str, color: &str) -> StoreResult<Topic> {
        let mut t = self.tables.lock().unwrap();
        if t.topics.iter().any(|x| x.slug == slug) {
            return Err(AppError::Conflict(format!("Topic '{}' already exists", slug)));
        }
        let topic = Topic {
            id: t.id(),
            name: name.into(),
            slug: slug.into(),
            color: color.into(),
        };
        t.topics.push(topic.clone());
        Ok(topic)
    }
}

#[async_trait]
impl MasteryStore for MemoryStore {
    async fn find_mastery(&self, user_id: i64, topic_id: i64) -> StoreResult<Option<TopicMastery>> {
        Ok(self.mastery_row(user_id, topic_id))
    }

    async fn insert_mastery(&self, row: &TopicMastery) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        if t.mastery
            .iter()
            .any(|m| m.user_id == row.user_id && m.topic_id == row.topic_id)
        {
            return Err(AppError::Conflict("duplicate mastery row".into()));
        }
        t.mastery.push(row.clone());
        Ok(())
    }

    async fn update_mastery(&self, row: &TopicMastery) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        if let Some(m) = t
            .mastery
            .iter_mut()
            .find(|m| m.user_id == row.user_id && m.topic_id == row.topic_id)
        {
            m.mastery_pct = row.mastery_pct;
            m.weak = row.weak;
        }
        Ok(())
    }

    async fn list_mastery(&self, user_id: i64) -> StoreResult<Vec<TopicMastery>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<_> = t.mastery.iter().filter(|m| m.user_id == user_id).cloned().collect();
        rows.sort_by_key(|m| m.topic_id);
        Ok(rows)
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn create_question(
        &self,
        owner_id: i64,
        req: &CreateQuestionRequest,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Question> {
        let mut t = self.tables.lock().unwrap();
        let question = Question {
            id: t.id(),
            owner_id,
            topic_id: req.topic_id,
            text: req.text.clone(),
            choices: Json(req.choices.clone()),
            correct_answer_index: req.correct_answer_index,
            explanation: req.explanation.clone(),
            difficulty: req.difficulty.clone(),
            created_at,
        };
        t.questions.push(question.clone());
        Ok(question)
    }

    async fn find_question(&self, id: i64) -> StoreResult<Option<Question>> {
        let t = self.tables.lock().unwrap();
        Ok(t.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn find_questions(&self, ids: &[i64]) -> StoreResult<Vec<Question>> {
        let t = self.tables.lock().unwrap();
        Ok(t.questions.iter().filter(|q| ids.contains(&q.id)).cloned().collect())
    }

    async fn list_questions(&self, owner_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Question>> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t
            .questions
            .iter()
            .filter(|q| q.owner_id == owner_id && topic_id.is_none_or(|id| q.topic_id == id))
            .cloned()
            .collect();
        list.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(list)
    }
}

#[async_trait]
impl PracticeStore for MemoryStore {
    async fn create_practice_session(
        &self,
        user_id: i64,
        topic_id: i64,
        difficulty: Option<&str>,
        question_count: i32,
        created_at: DateTime<Utc>,
    ) -> StoreResult<PracticeSession> {
        let mut t = self.tables.lock().unwrap();
        let session = PracticeSession {
            id: t.id(),
            user_id,
            topic_id,
            difficulty: difficulty.map(str::to_string),
            question_count,
            created_at,
        };
        t.practice_sessions.push(session.clone());
        Ok(session)
    }

    async fn find_practice_session(&self, id: i64) -> StoreResult<Option<PracticeSession>> {
        let t = self.tables.lock().unwrap();
        Ok(t.practice_sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> StoreResult<Attempt> {
        let mut t = self.tables.lock().unwrap();
        let id = t.id();
        let attempt = attempt.into_attempt(id);
        t.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn attempts_for_user(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Attempt>> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && since.is_none_or(|s| a.created_at >= s))
            .cloned()
            .collect();
        list.sort_by_key(|a| (a.created_at, a.id));
        Ok(list)
    }

    async fn attempt_counts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<AttemptCounts> {
        let t = self.tables.lock().unwrap();
        let scoped = t
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id && topic_id.is_none_or(|id| a.topic_id == id));
        let mut counts = AttemptCounts::default();
        for a in scoped {
            counts.total += 1;
            if a.correct {
                counts.correct += 1;
            }
        }
        Ok(counts)
    }

    async fn incorrect_attempts(&self, user_id: i64, topic_id: Option<i64>) -> StoreResult<Vec<Attempt>> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t
            .attempts
            .iter()
            .filter(|a| {
                a.user_id == user_id && !a.correct && topic_id.is_none_or(|id| a.topic_id == id)
            })
            .cloned()
            .collect();
        list.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(list)
    }
}

#[async_trait]
impl LessonStore for MemoryStore {
    async fn find_completion(&self, user_id: i64, lesson_id: &str) -> StoreResult<Option<LessonCompletion>> {
        let t = self.tables.lock().unwrap();
        Ok(t.lessons
            .iter()
            .find(|l| l.user_id == user_id && l.lesson_id == lesson_id)
            .cloned())
    }

    async fn insert_completion(
        &self,
        user_id: i64,
        topic_slug: &str,
        lesson_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<LessonCompletion> {
        let mut t = self.tables.lock().unwrap();
        let completion = LessonCompletion {
            id: t.id(),
            user_id,
            topic_slug: topic_slug.into(),
            lesson_id: lesson_id.into(),
            completed_at,
        };
        t.lessons.push(completion.clone());
        Ok(completion)
    }

    async fn delete_completion(&self, id: i64) -> StoreResult<()> {
        self.tables.lock().unwrap().lessons.retain(|l| l.id != id);
        Ok(())
    }

    async fn list_completions(&self, user_id: i64, topic_slug: Option<&str>) -> StoreResult<Vec<LessonCompletion>> {
        let t = self.tables.lock().unwrap();
        Ok(t.lessons
            .iter()
            .filter(|l| l.user_id == user_id && topic_slug.is_none_or(|s| l.topic_slug == s))
            .cloned()
            .collect())
    }

    async fn count_completions(&self, user_id: i64, topic_slug: &str) -> StoreResult<i64> {
        let t = self.tables.lock().unwrap();
        Ok(t.lessons
            .iter()
            .filter(|l| l.user_id == user_id && l.topic_slug == topic_slug)
            .count() as i64)
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn list_exams(&self) -> StoreResult<Vec<MockExam>> {
        Ok(self.tables.lock().unwrap().exams.clone())
    }

    async fn find_exam(&self, id: i64) -> StoreResult<Option<MockExam>> {
        let t = self.tables.lock().unwrap();
        Ok(t.exams.iter().find(|e| e.id == id).cloned())
    }

    async fn create_exam_session(
        &self,
        user_id: i64,
        exam_id: i64,
        started_at: DateTime<Utc>,
    ) -> StoreResult<ExamSession> {
        let mut t = self.tables.lock().unwrap();
        let session = ExamSession {
            id: t.id(),
            user_id,
            mock_exam_id: exam_id,
            started_at,
            submitted_at: None,
            score: None,
        };
        t.exam_sessions.push(session.clone());
        Ok(session)
    }

    async fn find_exam_session(&self, id: i64) -> StoreResult<Option<ExamSession>> {
        let t = self.tables.lock().unwrap();
        Ok(t.exam_sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn exam_sessions_for_user(&self, user_id: i64) -> StoreResult<Vec<ExamSession>> {
        let t = self.tables.lock().unwrap();
        Ok(t.exam_sessions.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn save_exam_result(
        &self,
        session_id: i64,
        score: i32,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        if let Some(s) = t.exam_sessions.iter_mut().find(|s| s.id == session_id) {
            s.score = Some(score);
            s.submitted_at = Some(submitted_at);
        }
        Ok(())
    }

    async fn assign_questions(&self, session_id: i64, question_ids: &[i64]) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        for (i, id) in question_ids.iter().enumerate() {
            t.session_questions.push(ExamSessionQuestion {
                exam_session_id: session_id,
                question_id: *id,
                order_index: i as i32,
            });
        }
        Ok(())
    }

    async fn session_questions(&self, session_id: i64) -> StoreResult<Vec<ExamSessionQuestion>> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t
            .session_questions
            .iter()
            .filter(|q| q.exam_session_id == session_id)
            .cloned()
            .collect();
        list.sort_by_key(|q| q.order_index);
        Ok(list)
    }

    async fn find_exam_answer(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamAnswer>> {
        let t = self.tables.lock().unwrap();
        Ok(t.answers
            .iter()
            .find(|a| a.exam_session_id == session_id && a.question_id == question_id)
            .cloned())
    }

    async fn insert_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()> {
        self.tables.lock().unwrap().answers.push(answer.clone());
        Ok(())
    }

    async fn update_exam_answer(&self, answer: &ExamAnswer) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        if let Some(a) = t.answers.iter_mut().find(|a| {
            a.exam_session_id == answer.exam_session_id && a.question_id == answer.question_id
        }) {
            *a = answer.clone();
        }
        Ok(())
    }

    async fn exam_answers(&self, session_id: i64) -> StoreResult<Vec<ExamAnswer>> {
        let t = self.tables.lock().unwrap();
        Ok(t.answers.iter().filter(|a| a.exam_session_id == session_id).cloned().collect())
    }

    async fn find_exam_flag(&self, session_id: i64, question_id: i64) -> StoreResult<Option<ExamFlag>> {
        let t = self.tables.lock().unwrap();
        Ok(t.flags
            .iter()
            .find(|f| f.exam_session_id == session_id && f.question_id == question_id)
            .cloned())
    }

    async fn insert_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()> {
        self.tables.lock().unwrap().flags.push(flag.clone());
        Ok(())
    }

    async fn update_exam_flag(&self, flag: &ExamFlag) -> StoreResult<()> {
        let mut t = self.tables.lock().unwrap();
        if let Some(f) = t.flags.iter_mut().find(|f| {
            f.exam_session_id == flag.exam_session_id && f.question_id == flag.question_id
        }) {
            f.flagged = flag.flagged;
        }
        Ok(())
    }

    async fn exam_flags(&self, session_id: i64) -> StoreResult<Vec<ExamFlag>> {
        let t = self.tables.lock().unwrap();
        let mut list: Vec<_> = t.flags.iter().filter(|f| f.exam_session_id == session_id).cloned().collect();
        list.sort_by_key(|f| f.question_id);
        Ok(list)
    }
}

/// 2024-03-15 18:00 at +02:00.
pub fn fixed_now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-03-15T18:00:00+02:00").unwrap()
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        lesson_catalog_path: None,
    }
}

/// Spawns the app on a random port over a fresh seeded memory store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    let state = AppState {
        store: Arc::new(MemoryStore::seeded()),
        config: test_config(),
        catalog: Arc::new(LessonCatalog::default()),
        clock: Arc::new(FixedClock(fixed_now())),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a fresh user and returns a bearer token.
pub async fn register_and_login(client: &reqwest::Client, address: &str) -> String {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let res = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(res.status().as_u16(), 201);

    let res = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(res.status().as_u16(), 200);

    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}
