// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
    error::RecordError,
    models::{
        quiz_result::{
            LeaderboardEntry, NewQuizResult, QuizResult, ResultAmendment, ResultListParams,
            UserXpSummary,
        },
        user::UserId,
    },
    store::{ResultStore, page_limit},
};

const RESULT_COLUMNS: &str = "id, user_id, quiz_id, quiz_title, score, total_questions, \
     percentage_score, time_taken, answers, xp_earned, completed_at, created_at, updated_at";

/// `quiz_results` table in Postgres. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn insert(&self, record: NewQuizResult) -> Result<QuizResult, RecordError> {
        let sql = format!(
            r#"
            INSERT INTO quiz_results
                (user_id, quiz_id, quiz_title, score, total_questions,
                 percentage_score, time_taken, answers, xp_earned, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );

        let saved = sqlx::query_as::<_, QuizResult>(&sql)
            .bind(&record.user_id)
            .bind(&record.quiz_id)
            .bind(&record.quiz_title)
            .bind(record.score)
            .bind(record.total_questions)
            .bind(record.percentage_score)
            .bind(record.time_taken)
            .bind(Json(&record.answers))
            .bind(record.xp_earned)
            .bind(record.completed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quiz result: {:?}", e);
                RecordError::from(e)
            })?;

        Ok(saved)
    }

    async fn find(&self, id: i64) -> Result<Option<QuizResult>, RecordError> {
        let sql = format!("SELECT {} FROM quiz_results WHERE id = $1", RESULT_COLUMNS);

        let found = sqlx::query_as::<_, QuizResult>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        params: &ResultListParams,
    ) -> Result<Vec<QuizResult>, RecordError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM quiz_results
            WHERE user_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR (completed_at, id) < ($2, $3))
            ORDER BY completed_at DESC, id DESC
            LIMIT $4
            "#,
            RESULT_COLUMNS
        );

        let results = sqlx::query_as::<_, QuizResult>(&sql)
            .bind(user_id)
            .bind(params.before)
            .bind(params.before_id.unwrap_or(i64::MIN))
            .bind(page_limit(params.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list quiz results: {:?}", e);
                RecordError::from(e)
            })?;

        Ok(results)
    }

    async fn amend(
        &self,
        id: i64,
        amendment: &ResultAmendment,
    ) -> Result<Option<QuizResult>, RecordError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE quiz_results SET ");
        let mut separated = builder.separated(", ");

        if let Some(quiz_title) = &amendment.quiz_title {
            separated.push("quiz_title = ");
            separated.push_bind_unseparated(quiz_title.clone());
        }

        if let Some(score) = amendment.score {
            separated.push("score = ");
            separated.push_bind_unseparated(score);
        }

        if let Some(total_questions) = amendment.total_questions {
            separated.push("total_questions = ");
            separated.push_bind_unseparated(total_questions);
        }

        if let Some(time_taken) = amendment.time_taken {
            separated.push("time_taken = ");
            separated.push_bind_unseparated(time_taken);
        }

        if let Some(answers) = &amendment.answers {
            separated.push("answers = ");
            separated.push_bind_unseparated(Json(answers.clone()));
        }

        separated.push("updated_at = CURRENT_TIMESTAMP");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(RESULT_COLUMNS);

        let amended = builder
            .build_query_as::<QuizResult>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to amend quiz result {}: {:?}", id, e);
                RecordError::from(e)
            })?;

        Ok(amended)
    }

    async fn summarize_user(&self, user_id: &UserId) -> Result<UserXpSummary, RecordError> {
        let summary = sqlx::query_as::<_, UserXpSummary>(
            r#"
            SELECT
                $1::TEXT AS user_id,
                COUNT(*) AS attempts,
                COALESCE(SUM(xp_earned), 0)::BIGINT AS total_xp,
                AVG(percentage_score) AS average_percentage,
                MAX(percentage_score) AS best_percentage,
                MAX(completed_at) AS last_completed_at
            FROM quiz_results
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, RecordError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                user_id,
                SUM(xp_earned)::BIGINT AS total_xp,
                COUNT(*) AS attempts
            FROM quiz_results
            GROUP BY user_id
            ORDER BY total_xp DESC, user_id ASC
            LIMIT $1
            "#,
        )
        .bind(page_limit(Some(limit)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            RecordError::from(e)
        })?;

        Ok(entries)
    }
}
