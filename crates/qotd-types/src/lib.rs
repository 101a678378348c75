//! QOTD Types - Pure record definitions
//!
//! This crate contains only the serde data types shared by the storage
//! layer and the HTTP facade, with no async runtime dependencies.

pub mod comment;
pub mod quote;

pub use comment::*;
pub use quote::*;
