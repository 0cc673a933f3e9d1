// src/scoring.rs

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// XP granted for finishing an attempt, regardless of performance.
pub const BASE_XP: i64 = 10;

/// Performance band an attempt falls into.
///
/// Bands are evaluated highest first; each threshold includes its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpTier {
    /// 90% and above.
    Mastery,
    /// 75% up to 90%.
    Proficient,
    /// 50% up to 75%.
    Developing,
    /// Below 50%.
    Beginning,
}

impl XpTier {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            XpTier::Mastery
        } else if percentage >= 75.0 {
            XpTier::Proficient
        } else if percentage >= 50.0 {
            XpTier::Developing
        } else {
            XpTier::Beginning
        }
    }

    /// Bonus stacked on top of [`BASE_XP`].
    pub fn bonus(self) -> i64 {
        match self {
            XpTier::Mastery => 40,
            XpTier::Proficient => 25,
            XpTier::Developing => 15,
            XpTier::Beginning => 5,
        }
    }
}

/// Fields derived from `(score, total_questions)` at creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedScore {
    pub percentage_score: f64,
    pub xp_earned: i64,
    pub tier: XpTier,
}

/// `score / total_questions * 100`.
///
/// The multiplication happens first so exact band boundaries (9/10, 3/4, 1/2)
/// land exactly on 90, 75 and 50.
pub fn percentage_score(score: i64, total_questions: i64) -> Result<f64, RecordError> {
    if total_questions < 1 {
        return Err(RecordError::Validation(
            "totalQuestions must be at least 1".to_string(),
        ));
    }
    if score < 0 {
        return Err(RecordError::Validation(
            "score must not be negative".to_string(),
        ));
    }

    Ok((score as f64 * 100.0) / total_questions as f64)
}

/// XP awarded for a percentage: [`BASE_XP`] plus the tier bonus.
pub fn xp_for_percentage(percentage: f64) -> i64 {
    BASE_XP + XpTier::for_percentage(percentage).bonus()
}

/// Pure function of its two inputs: identical pairs always derive identical values.
pub fn derive(score: i64, total_questions: i64) -> Result<DerivedScore, RecordError> {
    let percentage_score = percentage_score(score, total_questions)?;
    let tier = XpTier::for_percentage(percentage_score);

    Ok(DerivedScore {
        percentage_score,
        xp_earned: xp_for_percentage(percentage_score),
        tier,
    })
}
