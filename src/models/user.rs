// src/models/user.rs

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Object-id format used by the user-management service.
static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern is valid"));

/// Opaque reference to a user owned by the external user-management service.
///
/// Only the shape is checked here. Whether the user actually exists is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(RecordError::Reference("userId is required".to_string()));
        }
        if !OBJECT_ID.is_match(raw) {
            return Err(RecordError::Reference(format!(
                "userId '{}' is not a valid reference",
                raw
            )));
        }

        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
