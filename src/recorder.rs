// src/recorder.rs

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    error::RecordError,
    models::{
        quiz_result::{
            LeaderboardEntry, NewQuizResult, QuizResult, RecordResultRequest, ResultAmendment,
            ResultListParams, UserXpSummary,
        },
        user::UserId,
    },
    scoring,
    store::{ResultStore, page_limit},
};

/// Validates attempts, derives their score fields and persists them.
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct ResultRecorder {
    store: Arc<dyn ResultStore>,
    strict: bool,
}

impl ResultRecorder {
    /// Lenient recorder: `score > totalQuestions` and answer-count mismatches
    /// are logged and accepted.
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self {
            store,
            strict: false,
        }
    }

    /// Rejects `score > totalQuestions` and `answers.len() != totalQuestions`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Records one completed attempt.
    ///
    /// * Checks the user reference, then every field.
    /// * Recomputes `percentageScore` and `xpEarned`; caller-supplied values are ignored.
    /// * Defaults `completedAt` to now.
    /// * Performs exactly one insert. Nothing is written when validation fails.
    pub async fn record_result(&self, req: RecordResultRequest) -> Result<QuizResult, RecordError> {
        let user_id = UserId::parse(&req.user_id)?;
        req.validate()?;

        // validate() has already enforced `required` on these.
        let (Some(score), Some(total_questions), Some(time_taken)) =
            (req.score, req.total_questions, req.time_taken)
        else {
            return Err(RecordError::Validation(
                "score, totalQuestions and timeTaken are required".to_string(),
            ));
        };

        self.check_consistency(score, total_questions, req.answers.len())?;

        if let Some(supplied) = req.percentage_score {
            tracing::debug!("Discarding client percentageScore {} for quiz {}", supplied, req.quiz_id);
        }

        let derived = scoring::derive(score, total_questions)?;

        let record = NewQuizResult {
            user_id,
            quiz_id: req.quiz_id.trim().to_string(),
            quiz_title: req.quiz_title.trim().to_string(),
            score,
            total_questions,
            percentage_score: derived.percentage_score,
            time_taken,
            answers: req.answers,
            xp_earned: derived.xp_earned,
            completed_at: req.completed_at.unwrap_or_else(Utc::now),
        };

        let saved = self.store.insert(record).await?;

        tracing::info!(
            result_id = saved.id,
            user_id = %saved.user_id,
            quiz_id = %saved.quiz_id,
            percentage = saved.percentage_score,
            xp = saved.xp_earned,
            "Quiz result recorded"
        );

        Ok(saved)
    }

    /// Corrects raw fields of an existing record.
    ///
    /// In strict mode the amended record must still pass the cross-field checks.
    ///
    /// `percentageScore`, `xpEarned` and `completedAt` keep the values from
    /// creation time, whatever is amended.
    pub async fn amend_result(
        &self,
        id: i64,
        amendment: ResultAmendment,
    ) -> Result<QuizResult, RecordError> {
        if amendment.is_empty() {
            return Err(RecordError::Validation(
                "amendment must change at least one field".to_string(),
            ));
        }
        amendment.validate()?;

        if self.strict {
            let stored = self.get_result(id).await?;
            let score = amendment.score.unwrap_or(stored.score);
            let total_questions = amendment.total_questions.unwrap_or(stored.total_questions);
            let answer_count = amendment
                .answers
                .as_ref()
                .map_or(stored.answers.len(), Vec::len);

            self.check_consistency(score, total_questions, answer_count)?;
        }

        let amended = self
            .store
            .amend(id, &amendment)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("Quiz result {} not found", id)))?;

        tracing::info!(result_id = id, "Quiz result amended");

        Ok(amended)
    }

    pub async fn get_result(&self, id: i64) -> Result<QuizResult, RecordError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("Quiz result {} not found", id)))
    }

    pub async fn list_results(
        &self,
        user_id: &UserId,
        params: &ResultListParams,
    ) -> Result<Vec<QuizResult>, RecordError> {
        self.store.list_for_user(user_id, params).await
    }

    pub async fn summarize(&self, user_id: &UserId) -> Result<UserXpSummary, RecordError> {
        self.store.summarize_user(user_id).await
    }

    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, RecordError> {
        self.store.leaderboard(page_limit(limit)).await
    }

    fn check_consistency(
        &self,
        score: i64,
        total_questions: i64,
        answer_count: usize,
    ) -> Result<(), RecordError> {
        let mut problems = Vec::new();

        if score > total_questions {
            problems.push(format!(
                "score {} exceeds totalQuestions {}",
                score, total_questions
            ));
        }
        if answer_count as i64 != total_questions {
            problems.push(format!(
                "{} answers submitted for {} questions",
                answer_count, total_questions
            ));
        }

        if problems.is_empty() {
            return Ok(());
        }

        let message = problems.join("; ");
        if self.strict {
            return Err(RecordError::Validation(message));
        }

        tracing::warn!("Accepting inconsistent quiz result: {}", message);
        Ok(())
    }
}
