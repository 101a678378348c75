//! Volatile in-process storage
//!
//! Each collection is an ordered `Vec` guarded by a single mutex. Every
//! operation, reads included, holds the lock for its whole duration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use qotd_core::{
    Comment, ListQuery, OrderBy, QotdError, Quote, Resource, Result, SortOrder, Store,
    INITIAL_COMMENT_VERSION,
};
use std::cmp::Ordering;
use std::sync::Arc;

/// Store-owned field handling for records kept in memory
pub trait MemoryRecord: Resource {
    /// Fill in the fields the store assigns on insertion
    fn assign(&mut self, id: i64, now: DateTime<Utc>);

    /// Copy the content fields of `incoming` into the stored record
    fn apply_update(&mut self, incoming: &Self, now: DateTime<Utc>);
}

impl MemoryRecord for Quote {
    fn assign(&mut self, id: i64, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
    }

    fn apply_update(&mut self, incoming: &Self, _now: DateTime<Utc>) {
        self.author = incoming.author.clone();
        self.text = incoming.text.clone();
    }
}

impl MemoryRecord for Comment {
    fn assign(&mut self, id: i64, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
        self.version = INITIAL_COMMENT_VERSION;
    }

    fn apply_update(&mut self, incoming: &Self, now: DateTime<Utc>) {
        self.content = incoming.content.clone();
        self.author = incoming.author.clone();
        self.created_at = now;
        self.version += 1;
    }
}

/// One resource collection
pub struct MemoryCollection<R> {
    inner: Mutex<CollectionState<R>>,
}

struct CollectionState<R> {
    records: Vec<R>,
    /// Last id handed out; ids are never reused until the collection is cleared
    last_id: i64,
}

impl<R: MemoryRecord> MemoryCollection<R> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CollectionState {
                records: Vec::new(),
                last_id: 0,
            }),
        }
    }

    /// Drop every record and restart numbering from 1
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.records.clear();
        state.last_id = 0;
    }
}

impl<R: MemoryRecord> Default for MemoryCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn compare<R: Resource>(a: &R, b: &R, order: OrderBy) -> Ordering {
    let ordering = a
        .compare_field(b, order.field)
        .then_with(|| a.id().cmp(&b.id()));
    match order.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl<R: MemoryRecord> Store<R> for MemoryCollection<R> {
    async fn list(&self, query: &ListQuery) -> Result<Vec<R>> {
        let order = OrderBy::resolve::<R>(&query.sort);
        let state = self.inner.lock();

        let mut records: Vec<&R> = state.records.iter().collect();
        records.sort_by(|a, b| compare::<R>(a, b, order));

        let window = query.pagination.window(records.len());
        Ok(records[window].iter().map(|r| R::clone(r)).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<R> {
        let state = self.inner.lock();
        state
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| QotdError::not_found(R::KIND, id))
    }

    async fn create(&self, record: &mut R) -> Result<()> {
        record.validate()?;

        let mut state = self.inner.lock();
        let id = state.last_id + 1;
        record.assign(id, Utc::now());
        state.records.push(record.clone());
        state.last_id = id;
        Ok(())
    }

    async fn update(&self, id: i64, record: &mut R) -> Result<()> {
        record.validate()?;

        let mut state = self.inner.lock();
        let stored = state
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| QotdError::not_found(R::KIND, id))?;
        stored.apply_update(record, Utc::now());
        *record = stored.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.inner.lock();
        let index = state
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| QotdError::not_found(R::KIND, id))?;
        state.records.remove(index);
        Ok(())
    }
}

/// In-memory backend holding both collections
pub struct MemoryStore {
    pub quotes: Arc<MemoryCollection<Quote>>,
    pub comments: Arc<MemoryCollection<Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            quotes: Arc::new(MemoryCollection::new()),
            comments: Arc::new(MemoryCollection::new()),
        }
    }

    /// Flush every collection. Previously issued ids become invalid.
    pub fn clear(&self) {
        self.quotes.clear();
        self.comments.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
