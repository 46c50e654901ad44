// src/services/mastery.rs

use crate::{
    config::LessonCatalog,
    error::AppError,
    models::{practice::AttemptCounts, topic::TopicMastery},
    services::{blend, percent},
    store::Store,
};

/// Practice accuracy weight, in tenths.
pub const PRACTICE_WEIGHT: i64 = 7;
/// Lesson completion weight, in tenths.
pub const LESSON_WEIGHT: i64 = 3;

/// Everything the mastery blend depends on for one (user, topic).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasteryInputs {
    pub attempts: AttemptCounts,
    pub total_lessons: i64,
    pub completed_lessons: i64,
}

impl MasteryInputs {
    pub fn practice_accuracy(&self) -> i32 {
        percent(self.attempts.correct, self.attempts.total)
    }

    /// Capped at 100 in case the catalog shrank below what was completed.
    pub fn lesson_completion(&self) -> i32 {
        percent(self.completed_lessons, self.total_lessons).min(100)
    }

    pub fn mastery_pct(&self) -> i32 {
        blend(&[
            (self.practice_accuracy(), PRACTICE_WEIGHT),
            (self.lesson_completion(), LESSON_WEIGHT),
        ])
    }
}

/// Recomputes and persists the mastery percentage for one (user, topic).
///
/// Creates the row with `weak = false` on first use; otherwise only the
/// percentage is overwritten.
pub async fn recompute_mastery(
    store: &dyn Store,
    catalog: &LessonCatalog,
    user_id: i64,
    topic_id: i64,
) -> Result<i32, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let topic = store
        .find_topic(topic_id)
        .await?
        .ok_or_else(|| AppError::not_found("Topic"))?;

    let attempts = store.attempt_counts(user_id, Some(topic_id)).await?;
    let total_lessons = catalog.total_lessons(&topic.slug);
    let completed_lessons = if total_lessons == 0 {
        0
    } else {
        store.count_completions(user_id, &topic.slug).await?
    };

    let inputs = MasteryInputs {
        attempts,
        total_lessons,
        completed_lessons,
    };
    let mastery_pct = inputs.mastery_pct();

    match store.find_mastery(user_id, topic_id).await? {
        Some(mut row) => {
            row.mastery_pct = mastery_pct;
            store.update_mastery(&row).await?;
        }
        None => {
            store
                .insert_mastery(&TopicMastery {
                    user_id,
                    topic_id,
                    mastery_pct,
                    weak: false,
                })
                .await?;
        }
    }

    tracing::debug!(
        user_id,
        topic_id,
        practice_accuracy = inputs.practice_accuracy(),
        lesson_completion = inputs.lesson_completion(),
        mastery_pct,
        "Recomputed topic mastery"
    );

    Ok(mastery_pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(total: i64, correct: i64, lessons: i64, completed: i64) -> MasteryInputs {
        MasteryInputs {
            attempts: AttemptCounts { total, correct },
            total_lessons: lessons,
            completed_lessons: completed,
        }
    }

    #[test]
    fn empty_inputs_give_zero() {
        let m = inputs(0, 0, 0, 0);
        assert_eq!(m.practice_accuracy(), 0);
        assert_eq!(m.lesson_completion(), 0);
        assert_eq!(m.mastery_pct(), 0);
    }

    #[test]
    fn blends_seventy_thirty() {
        // accuracy 75, lessons 6/12 = 50 -> 52.5 + 15 = 67.5 -> 68
        assert_eq!(inputs(4, 3, 12, 6).mastery_pct(), 68);
        // accuracy 100, no lessons -> 70
        assert_eq!(inputs(2, 2, 0, 0).mastery_pct(), 70);
        // lessons only -> 30
        assert_eq!(inputs(0, 0, 6, 6).mastery_pct(), 30);
    }

    #[test]
    fn stays_within_bounds() {
        for total in 0..12 {
            for correct in 0..=total {
                for completed in 0..=15 {
                    let pct = inputs(total, correct, 10, completed).mastery_pct();
                    assert!((0..=100).contains(&pct), "{} out of range", pct);
                }
            }
        }
    }

    #[test]
    fn excess_completions_are_capped() {
        assert_eq!(inputs(0, 0, 4, 9).lesson_completion(), 100);
    }
}
