//! Resource abstraction shared by quotes and comments

use crate::validation::{validate_comment, validate_quote};
use crate::{Comment, Quote, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A record type the storage engine can manage.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Lowercase singular name, used in errors and logs
    const KIND: &'static str;

    /// Fields accepted for ordering. These double as column names.
    const SORT_FIELDS: &'static [&'static str];

    fn id(&self) -> i64;

    fn created_at(&self) -> DateTime<Utc>;

    fn validate(&self) -> Result<()>;

    /// Compare on one of [`Self::SORT_FIELDS`]. Unknown fields compare equal.
    fn compare_field(&self, other: &Self, field: &str) -> Ordering;
}

impl Resource for Quote {
    const KIND: &'static str = "quote";
    const SORT_FIELDS: &'static [&'static str] = &["id", "author", "text", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(&self) -> Result<()> {
        validate_quote(self)
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "id" => self.id.cmp(&other.id),
            "author" => self.author.cmp(&other.author),
            "text" => self.text.cmp(&other.text),
            "created_at" => self.created_at.cmp(&other.created_at),
            _ => Ordering::Equal,
        }
    }
}

impl Resource for Comment {
    const KIND: &'static str = "comment";
    const SORT_FIELDS: &'static [&'static str] =
        &["id", "author", "content", "created_at", "version"];

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(&self) -> Result<()> {
        validate_comment(self)
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "id" => self.id.cmp(&other.id),
            "author" => self.author.cmp(&other.author),
            "content" => self.content.cmp(&other.content),
            "created_at" => self.created_at.cmp(&other.created_at),
            "version" => self.version.cmp(&other.version),
            _ => Ordering::Equal,
        }
    }
}
