//! Quote records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quote and its author.
///
/// `id` and `created_at` are assigned by the store on creation and are
/// ignored when a quote is submitted for writing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let quote: Quote = serde_json::from_str(r#"{"text": "Stay hungry."}"#).unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert!(quote.author.is_empty());
        assert_eq!(quote.id, 0);
    }

    #[test]
    fn test_serialized_shape() {
        let quote = Quote::new("Einstein", "Imagination is more important than knowledge.");
        let value = serde_json::to_value(&quote).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "author", "text", "created_at"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 4);
    }
}
