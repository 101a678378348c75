//! QOTD Core Library
//!
//! Storage contract, validation rules and list-query normalization shared by
//! every storage backend of the QOTD API.

// Re-export pure types from qotd-types
pub use qotd_types::*;

pub mod error;
pub mod ports;
pub mod query;
pub mod resource;
pub mod validation;

pub use error::{QotdError, Result};
pub use ports::Store;
pub use query::{ListParams, ListQuery, OrderBy, Pagination, Sort, SortOrder, MAX_PAGE_SIZE};
pub use resource::Resource;
pub use validation::{validate_comment, validate_quote};
