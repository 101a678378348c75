//! Storage layer
//!
//! Two interchangeable backends behind the [`Store`] trait: a volatile
//! in-memory store and an embedded SQLite database. The backend is chosen
//! once at startup; handlers only ever see `Arc<dyn Store<R>>`.

pub mod db;
pub mod memory;


pub use db::{Database, DatabaseOptions};
pub use memory::MemoryStore;

use crate::config::StorageConfig;
use anyhow::Result;
use qotd_core::{Comment, QotdError, Quote, Store};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    InMemory,
    Sqlite,
}

impl FromStr for Backend {
    type Err = QotdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN_MEMORY" => Ok(Backend::InMemory),
            "SQLITE" => Ok(Backend::Sqlite),
            _ => Err(QotdError::BackendUnsupported(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::InMemory => write!(f, "IN_MEMORY"),
            Backend::Sqlite => write!(f, "SQLITE"),
        }
    }
}

/// The storage instance owned by the server for its whole lifetime
#[derive(Clone)]
pub enum Storage {
    Memory(Arc<MemoryStore>),
    Sqlite(Arc<Database>),
}

impl Storage {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        match config.backend()? {
            Backend::InMemory => {
                tracing::info!("Using in-memory storage");
                Ok(Storage::Memory(Arc::new(MemoryStore::new())))
            }
            Backend::Sqlite => {
                let dsn = config.dsn()?;
                let db = Database::connect(dsn, config.database_options()).await?;
                Ok(Storage::Sqlite(Arc::new(db)))
            }
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            Storage::Memory(_) => Backend::InMemory,
            Storage::Sqlite(_) => Backend::Sqlite,
        }
    }

    pub fn quotes(&self) -> Arc<dyn Store<Quote>> {
        match self {
            Storage::Memory(store) => store.quotes.clone(),
            Storage::Sqlite(db) => db.clone(),
        }
    }

    pub fn comments(&self) -> Arc<dyn Store<Comment>> {
        match self {
            Storage::Memory(store) => store.comments.clone(),
            Storage::Sqlite(db) => db.clone(),
        }
    }

    /// Release the backend. The in-memory store is flushed.
    pub async fn disconnect(&self) {
        match self {
            Storage::Memory(store) => {
                store.clear();
                tracing::info!("In-memory storage flushed");
            }
            Storage::Sqlite(db) => db.close().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("IN_MEMORY".parse::<Backend>().unwrap(), Backend::InMemory);
        assert_eq!("sqlite".parse::<Backend>().unwrap(), Backend::Sqlite);

        match "POSTGRES".parse::<Backend>() {
            Err(QotdError::BackendUnsupported(value)) => assert_eq!(value, "POSTGRES"),
            other => panic!("expected unsupported backend, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_memory_disconnect_flushes() {
        let config = StorageConfig::default();
        let storage = Storage::connect(&config).await.unwrap();
        assert_eq!(storage.backend(), Backend::InMemory);

        let mut quote = Quote::new("Einstein", "Imagination is more important than knowledge.");
        storage.quotes().create(&mut quote).await.unwrap();
        storage.disconnect().await;

        let quotes = storage.quotes().list(&Default::default()).await.unwrap();
        assert!(quotes.is_empty());
    }
}
