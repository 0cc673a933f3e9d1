// src/store/mod.rs

use async_trait::async_trait;

use crate::{
    error::RecordError,
    models::{
        quiz_result::{
            LeaderboardEntry, NewQuizResult, QuizResult, ResultAmendment, ResultListParams,
            UserXpSummary,
        },
        user::UserId,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryResultStore;
pub use postgres::PgResultStore;

/// Default page size for history listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard cap for any listing.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamps a caller-supplied limit into `1..=MAX_PAGE_SIZE`.
pub fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Durable storage for quiz results.
///
/// `insert` is the only way a record comes into existence and is a single
/// all-or-nothing write. `amend` touches raw fields only; derived fields keep
/// the values computed at insert time.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn insert(&self, record: NewQuizResult) -> Result<QuizResult, RecordError>;

    async fn find(&self, id: i64) -> Result<Option<QuizResult>, RecordError>;

    /// Newest first (`completed_at DESC, id DESC`).
    async fn list_for_user(
        &self,
        user_id: &UserId,
        params: &ResultListParams,
    ) -> Result<Vec<QuizResult>, RecordError>;

    async fn amend(
        &self,
        id: i64,
        amendment: &ResultAmendment,
    ) -> Result<Option<QuizResult>, RecordError>;

    async fn summarize_user(&self, user_id: &UserId) -> Result<UserXpSummary, RecordError>;

    /// Users by total XP, highest first; ties broken by user id.
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, RecordError>;
}
