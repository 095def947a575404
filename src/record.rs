//! The long-format input record.

use serde::{Deserialize, Serialize};

/// Column name of the user identifier, both in sources and in the output header.
pub const USER_ID: &str = "user_id";
/// Column name of the resource path in sources.
pub const PATH: &str = "path";
/// Column name of the length value in sources.
pub const LENGTH: &str = "length";

/// One `(user_id, path, length)` observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub user_id: String,
    pub path: String,
    pub length: i64,
}

impl Record {
    pub fn new(user_id: impl Into<String>, path: impl Into<String>, length: i64) -> Self {
        Self {
            user_id: user_id.into(),
            path: path.into(),
            length,
        }
    }
}
