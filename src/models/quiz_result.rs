// src/models/quiz_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{models::user::UserId, scoring::XpTier};

/// One answered question, embedded in a [`QuizResult`].
///
/// Question text and correct answer are copied at attempt time so old records
/// stay stable when the quiz content changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[validate(custom(function = not_blank, message = "questionId is required"))]
    pub question_id: String,

    #[validate(custom(function = not_blank, message = "questionText is required"))]
    pub question_text: String,

    /// Empty when the question timed out before the student picked anything.
    #[validate(length(max = 2000))]
    pub user_answer: String,

    #[validate(custom(function = not_blank, message = "correctAnswer is required"))]
    pub correct_answer: String,

    /// Computed by the client. Stored verbatim.
    pub is_correct: bool,
}

/// Represents the 'quiz_results' table in the database.
/// One row per completed attempt.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub user_id: UserId,
    pub quiz_id: String,
    pub quiz_title: String,
    pub score: i64,
    pub total_questions: i64,

    /// Derived from `score` and `total_questions` when the row was created.
    pub percentage_score: f64,

    /// Seconds.
    pub time_taken: i64,

    /// Stored as a JSON array.
    #[sqlx(json)]
    pub answers: Vec<Answer>,

    /// Derived from `percentage_score` when the row was created.
    pub xp_earned: i64,

    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn tier(&self) -> XpTier {
        XpTier::for_percentage(self.percentage_score)
    }
}

/// A validated record with its derived fields, ready for a single insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuizResult {
    pub user_id: UserId,
    pub quiz_id: String,
    pub quiz_title: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage_score: f64,
    pub time_taken: i64,
    pub answers: Vec<Answer>,
    pub xp_earned: i64,
    pub completed_at: DateTime<Utc>,
}

/// DTO for submitting a completed attempt.
///
/// String fields default to empty so a missing field fails validation with a
/// readable message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordResultRequest {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    #[validate(
        custom(function = not_blank, message = "quizId is required"),
        length(max = 200)
    )]
    pub quiz_id: String,

    #[serde(default)]
    #[validate(
        custom(function = not_blank, message = "quizTitle is required"),
        length(max = 500)
    )]
    pub quiz_title: String,

    #[validate(
        required(message = "score is required"),
        range(min = 0, message = "score must not be negative")
    )]
    pub score: Option<i64>,

    #[validate(
        required(message = "totalQuestions is required"),
        range(min = 1, message = "totalQuestions must be at least 1")
    )]
    pub total_questions: Option<i64>,

    #[validate(
        required(message = "timeTaken is required"),
        range(min = 0, message = "timeTaken must not be negative")
    )]
    pub time_taken: Option<i64>,

    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<Answer>,

    /// Accepted so older clients keep working. Always recomputed.
    #[serde(default)]
    pub percentage_score: Option<f64>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// DTO for correcting an existing record.
///
/// Raw fields only. Derived fields are frozen at creation time and are not
/// accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResultAmendment {
    #[validate(
        custom(function = not_blank, message = "quizTitle must not be empty"),
        length(max = 500)
    )]
    pub quiz_title: Option<String>,

    #[validate(range(min = 0, message = "score must not be negative"))]
    pub score: Option<i64>,

    #[validate(range(min = 1, message = "totalQuestions must be at least 1"))]
    pub total_questions: Option<i64>,

    #[validate(range(min = 0, message = "timeTaken must not be negative"))]
    pub time_taken: Option<i64>,

    #[validate(nested)]
    pub answers: Option<Vec<Answer>>,
}

impl ResultAmendment {
    pub fn is_empty(&self) -> bool {
        self.quiz_title.is_none()
            && self.score.is_none()
            && self.total_questions.is_none()
            && self.time_taken.is_none()
            && self.answers.is_none()
    }
}

/// Cursor pagination over a user's history, newest first.
///
/// The cursor is the `(completedAt, id)` of the last row of the previous page.
/// Without `before_id`, every result completed at `before` is skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultListParams {
    pub limit: Option<i64>,
    pub before: Option<DateTime<Utc>>,
    pub before_id: Option<i64>,
}

impl ResultListParams {
    /// Rows strictly after the cursor in `(completed_at DESC, id DESC)` order.
    pub fn admits(&self, completed_at: DateTime<Utc>, id: i64) -> bool {
        self.before.is_none_or(|before| {
            (completed_at, id) < (before, self.before_id.unwrap_or(i64::MIN))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

/// Aggregate of one user's results, for dashboards.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserXpSummary {
    pub user_id: UserId,
    pub attempts: i64,
    pub total_xp: i64,
    pub average_percentage: Option<f64>,
    pub best_percentage: Option<f64>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Row of the XP leaderboard.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub total_xp: i64,
    pub attempts: i64,
}

/// Response body for a single record: the stored fields plus its band.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: QuizResult,
    pub tier: XpTier,
}

impl From<QuizResult> for ResultView {
    fn from(result: QuizResult) -> Self {
        let tier = result.tier();
        Self { result, tier }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
