// src/store/memory.rs

use std::{
    cmp::Reverse,
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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

/// Process-local store. Used when no database is configured, and by tests.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryResultStore {
    records: RwLock<HashMap<i64, QuizResult>>,
    next_id: AtomicI64,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn insert(&self, record: NewQuizResult) -> Result<QuizResult, RecordError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();

        let saved = QuizResult {
            id,
            user_id: record.user_id,
            quiz_id: record.quiz_id,
            quiz_title: record.quiz_title,
            score: record.score,
            total_questions: record.total_questions,
            percentage_score: record.percentage_score,
            time_taken: record.time_taken,
            answers: record.answers,
            xp_earned: record.xp_earned,
            completed_at: record.completed_at,
            created_at: now,
            updated_at: now,
        };

        self.records.write().await.insert(id, saved.clone());
        Ok(saved)
    }

    async fn find(&self, id: i64) -> Result<Option<QuizResult>, RecordError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        params: &ResultListParams,
    ) -> Result<Vec<QuizResult>, RecordError> {
        let records = self.records.read().await;

        let mut results: Vec<QuizResult> = records
            .values()
            .filter(|r| &r.user_id == user_id)
            .filter(|r| params.admits(r.completed_at, r.id))
            .cloned()
            .collect();

        results.sort_by_key(|r| Reverse((r.completed_at, r.id)));
        results.truncate(page_limit(params.limit) as usize);

        Ok(results)
    }

    async fn amend(
        &self,
        id: i64,
        amendment: &ResultAmendment,
    ) -> Result<Option<QuizResult>, RecordError> {
        let mut records = self.records.write().await;

        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(quiz_title) = &amendment.quiz_title {
            record.quiz_title = quiz_title.clone();
        }
        if let Some(score) = amendment.score {
            record.score = score;
        }
        if let Some(total_questions) = amendment.total_questions {
            record.total_questions = total_questions;
        }
        if let Some(time_taken) = amendment.time_taken {
            record.time_taken = time_taken;
        }
        if let Some(answers) = &amendment.answers {
            record.answers = answers.clone();
        }
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn summarize_user(&self, user_id: &UserId) -> Result<UserXpSummary, RecordError> {
        let records = self.records.read().await;
        let mine: Vec<&QuizResult> = records.values().filter(|r| &r.user_id == user_id).collect();

        let attempts = mine.len() as i64;
        let total_xp = mine.iter().map(|r| r.xp_earned).sum();
        let average_percentage = (attempts > 0)
            .then(|| mine.iter().map(|r| r.percentage_score).sum::<f64>() / attempts as f64);
        let best_percentage = mine
            .iter()
            .map(|r| r.percentage_score)
            .max_by(|a, b| a.total_cmp(b));
        let last_completed_at = mine.iter().map(|r| r.completed_at).max();

        Ok(UserXpSummary {
            user_id: user_id.clone(),
            attempts,
            total_xp,
            average_percentage,
            best_percentage,
            last_completed_at,
        })
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, RecordError> {
        let records = self.records.read().await;

        let mut totals: HashMap<&UserId, (i64, i64)> = HashMap::new();
        for record in records.values() {
            let entry = totals.entry(&record.user_id).or_default();
            entry.0 += record.xp_earned;
            entry.1 += 1;
        }

        let mut entries: Vec<LeaderboardEntry> = totals
            .into_iter()
            .map(|(user_id, (total_xp, attempts))| LeaderboardEntry {
                user_id: user_id.clone(),
                total_xp,
                attempts,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.total_xp
                .cmp(&a.total_xp)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        entries.truncate(page_limit(Some(limit)) as usize);

        Ok(entries)
    }
}
