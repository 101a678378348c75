//! Comment records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version assigned to every comment when it is first stored.
pub const INITIAL_COMMENT_VERSION: i64 = 1;

/// A comment left by a reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author: String,
    /// Refreshed to the current time on every update
    pub created_at: DateTime<Utc>,
    /// Incremented by one on every update, starting at [`INITIAL_COMMENT_VERSION`]
    pub version: i64,
}

impl Comment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_serialized() {
        let mut comment = Comment::new("Ada", "Nice one");
        comment.version = 3;
        let value = serde_json::to_value(&comment).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["content"], "Nice one");
    }
}
