// src/services/exam.rs

//! Mock exam sessions: Started -> AnswerRecorded* -> Submitted (terminal).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use crate::{
    error::AppError,
    models::{
        exam::{
            ExamAnswer, ExamAnswerRequest, ExamFlag, ExamResultResponse, ExamSession,
            ExamSessionQuestion, ExamSessionResponse, ExamSubmitResponse, MockExam, TopicScore,
        },
        question::{PublicQuestion, Question},
        topic::Topic,
    },
    services::percent,
    store::Store,
};

/// Denominator for scoring: assigned questions, else the declared total,
/// else however many answers were recorded.
pub fn resolve_total(assigned: usize, declared: Option<i32>, answered: usize) -> i32 {
    if assigned > 0 {
        assigned as i32
    } else if let Some(total) = declared {
        total.max(0)
    } else {
        answered as i32
    }
}

pub fn exam_score(correct: i32, total: i32) -> i32 {
    percent(correct as i64, total as i64)
}

/// Per-topic correct/total over the assigned questions, in first-seen order.
///
/// Keyed by topic id so two topics sharing a name stay separate.
pub fn topic_breakdown(
    assigned: &[ExamSessionQuestion],
    questions: &HashMap<i64, Question>,
    topics: &HashMap<i64, Topic>,
    answers: &HashMap<i64, ExamAnswer>,
) -> Vec<TopicScore> {
    let mut scores: Vec<TopicScore> = Vec::new();
    let mut index_by_topic: HashMap<i64, usize> = HashMap::new();

    for item in assigned {
        let Some(question) = questions.get(&item.question_id) else {
            continue;
        };
        let idx = *index_by_topic.entry(question.topic_id).or_insert_with(|| {
            scores.push(TopicScore {
                topic_id: question.topic_id,
                topic_name: topics
                    .get(&question.topic_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
                correct: 0,
                total: 0,
            });
            scores.len() - 1
        });

        let score = &mut scores[idx];
        score.total += 1;
        if answers.get(&item.question_id).is_some_and(|a| a.correct) {
            score.correct += 1;
        }
    }

    scores
}

/// Loads a session the caller owns. Someone else's session is reported as missing.
async fn owned_session(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
) -> Result<ExamSession, AppError> {
    match store.find_exam_session(session_id).await? {
        Some(session) if session.user_id == user_id => Ok(session),
        _ => Err(AppError::not_found("Session")),
    }
}

async fn session_exam(store: &dyn Store, session: &ExamSession) -> Result<MockExam, AppError> {
    store
        .find_exam(session.mock_exam_id)
        .await?
        .ok_or_else(|| AppError::not_found("Exam"))
}

pub async fn list_exams(store: &dyn Store) -> Result<Vec<MockExam>, AppError> {
    store.list_exams().await
}

/// Creates a session and draws a random subset of the caller's own questions,
/// up to the exam's declared total.
pub async fn start_session(
    store: &dyn Store,
    user_id: i64,
    exam_id: i64,
    now: DateTime<Utc>,
) -> Result<ExamSessionResponse, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let exam = store
        .find_exam(exam_id)
        .await?
        .ok_or_else(|| AppError::not_found("Exam"))?;

    let session = store.create_exam_session(user_id, exam.id, now).await?;

    let mut pool: Vec<i64> = store
        .list_questions(user_id, None)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();
    pool.shuffle(&mut rand::rng());
    let target = exam
        .total_questions
        .map_or(pool.len(), |t| usize::try_from(t).unwrap_or(0));
    pool.truncate(target);
    store.assign_questions(session.id, &pool).await?;

    tracing::info!(
        user_id,
        exam_id,
        session_id = session.id,
        assigned = pool.len(),
        "Started exam session"
    );

    Ok(ExamSessionResponse {
        id: session.id,
        exam_id: exam.id,
        total_questions: exam.total_questions,
        duration_minutes: exam.duration_minutes,
        assigned_questions: pool.len(),
        started_at: session.started_at,
    })
}

/// Assigned questions in presentation order, without answers.
pub async fn session_questions(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
) -> Result<Vec<PublicQuestion>, AppError> {
    owned_session(store, user_id, session_id).await?;

    let assigned = store.session_questions(session_id).await?;
    let ids: Vec<i64> = assigned.iter().map(|q| q.question_id).collect();
    let mut by_id: HashMap<i64, Question> = store
        .find_questions(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    Ok(ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(PublicQuestion::from)
        .collect())
}

/// Records (or replaces) the caller's answer and review flag for one question.
pub async fn record_answer(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
    req: &ExamAnswerRequest,
) -> Result<ExamAnswer, AppError> {
    let session = owned_session(store, user_id, session_id).await?;
    if session.is_submitted() {
        return Err(AppError::Conflict("Exam session already submitted".to_string()));
    }

    let question = match store.find_question(req.question_id).await? {
        Some(q) if q.owner_id == user_id => q,
        _ => return Err(AppError::not_found("Question")),
    };

    let assigned = store.session_questions(session_id).await?;
    if !assigned.iter().any(|a| a.question_id == question.id) {
        return Err(AppError::not_found("Question"));
    }

    let correct = question.is_correct(req.selected_answer_index);
    let answer = ExamAnswer {
        exam_session_id: session_id,
        question_id: question.id,
        selected_answer_index: req.selected_answer_index,
        correct,
    };
    if store.find_exam_answer(session_id, question.id).await?.is_some() {
        store.update_exam_answer(&answer).await?;
    } else {
        store.insert_exam_answer(&answer).await?;
    }

    match store.find_exam_flag(session_id, question.id).await? {
        Some(mut flag) => {
            flag.flagged = req.flagged;
            store.update_exam_flag(&flag).await?;
        }
        None => {
            store
                .insert_exam_flag(&ExamFlag {
                    exam_session_id: session_id,
                    question_id: question.id,
                    flagged: req.flagged,
                })
                .await?;
        }
    }

    Ok(answer)
}

pub async fn list_flags(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
) -> Result<Vec<ExamFlag>, AppError> {
    owned_session(store, user_id, session_id).await?;
    store.exam_flags(session_id).await
}

/// Scores and closes the session. A submitted session cannot be submitted again.
pub async fn submit(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<ExamSubmitResponse, AppError> {
    let session = owned_session(store, user_id, session_id).await?;
    if session.is_submitted() {
        return Err(AppError::Conflict("Exam session already submitted".to_string()));
    }
    let exam = session_exam(store, &session).await?;

    let assigned = store.session_questions(session_id).await?;
    let answers = store.exam_answers(session_id).await?;
    let correct_count = answers.iter().filter(|a| a.correct).count() as i32;
    let total_questions = resolve_total(assigned.len(), exam.total_questions, answers.len());
    let score = exam_score(correct_count, total_questions);

    store.save_exam_result(session_id, score, now).await?;

    tracing::info!(user_id, session_id, score, total_questions, "Submitted exam session");

    Ok(ExamSubmitResponse {
        session_id,
        score,
        total_questions,
        correct_count,
    })
}

/// Score plus topic-by-topic breakdown. For an open session the score is provisional.
pub async fn results(
    store: &dyn Store,
    user_id: i64,
    session_id: i64,
) -> Result<ExamResultResponse, AppError> {
    let session = owned_session(store, user_id, session_id).await?;
    let exam = session_exam(store, &session).await?;

    let assigned = store.session_questions(session_id).await?;
    let answers = store.exam_answers(session_id).await?;

    let ids: Vec<i64> = assigned.iter().map(|q| q.question_id).collect();
    let questions: HashMap<i64, Question> = store
        .find_questions(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();
    let topics: HashMap<i64, Topic> = store
        .list_topics()
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let correct_count = answers.iter().filter(|a| a.correct).count() as i32;
    let total_questions = resolve_total(assigned.len(), exam.total_questions, answers.len());
    let score = session
        .score
        .unwrap_or_else(|| exam_score(correct_count, total_questions));

    let answers_by_question: HashMap<i64, ExamAnswer> =
        answers.into_iter().map(|a| (a.question_id, a)).collect();
    let topic_scores = topic_breakdown(&assigned, &questions, &topics, &answers_by_question);

    Ok(ExamResultResponse {
        session_id,
        submitted: session.is_submitted(),
        score,
        total_questions,
        correct_count,
        topic_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn question(id: i64, topic_id: i64) -> Question {
        Question {
            id,
            owner_id: 1,
            topic_id,
            text: format!("Q{}", id),
            choices: Json(vec!["A".into(), "B".into()]),
            correct_answer_index: 0,
            explanation: None,
            difficulty: "medium".into(),
            created_at: Utc::now(),
        }
    }

    fn topic(id: i64, name: &str) -> Topic {
        Topic {
            id,
            name: name.into(),
            slug: format!("t{}", id),
            color: "blue".into(),
        }
    }

    fn assigned(ids: &[i64]) -> Vec<ExamSessionQuestion> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| ExamSessionQuestion {
                exam_session_id: 1,
                question_id: *id,
                order_index: i as i32,
            })
            .collect()
    }

    fn answer(question_id: i64, correct: bool) -> (i64, ExamAnswer) {
        (
            question_id,
            ExamAnswer {
                exam_session_id: 1,
                question_id,
                selected_answer_index: Some(if correct { 0 } else { 1 }),
                correct,
            },
        )
    }

    #[test]
    fn total_prefers_assigned_then_declared_then_answered() {
        assert_eq!(resolve_total(4, Some(40), 3), 4);
        assert_eq!(resolve_total(0, Some(40), 3), 40);
        assert_eq!(resolve_total(0, None, 3), 3);
        assert_eq!(resolve_total(0, None, 0), 0);
    }

    #[test]
    fn score_is_rounded_share() {
        assert_eq!(exam_score(2, 4), 50);
        assert_eq!(exam_score(0, 0), 0);
        assert_eq!(exam_score(2, 3), 67);
    }

    #[test]
    fn breakdown_groups_by_topic_id() {
        let questions: HashMap<_, _> = [question(1, 10), question(2, 20), question(3, 10), question(4, 30)]
            .into_iter()
            .map(|q| (q.id, q))
            .collect();
        // Two distinct topics sharing a display name.
        let topics: HashMap<_, _> = [topic(10, "Ethics"), topic(20, "Ethics"), topic(30, "Assessment")]
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let answers: HashMap<_, _> = [answer(1, true), answer(2, false), answer(3, true)]
            .into_iter()
            .collect();

        let scores = topic_breakdown(&assigned(&[1, 2, 3, 4]), &questions, &topics, &answers);
        assert_eq!(scores.len(), 3);
        assert_eq!((scores[0].topic_id, scores[0].correct, scores[0].total), (10, 2, 2));
        assert_eq!((scores[1].topic_id, scores[1].correct, scores[1].total), (20, 0, 1));
        assert_eq!(scores[1].topic_name, "Ethics");
        assert_eq!((scores[2].topic_id, scores[2].correct, scores[2].total), (30, 0, 1));
    }

    #[test]
    fn breakdown_of_empty_session_is_empty() {
        let scores = topic_breakdown(&[], &HashMap::new(), &HashMap::new(), &HashMap::new());
        assert!(scores.is_empty());
    }
}
