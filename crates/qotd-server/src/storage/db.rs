//! SQLite database layer (embedded, reached through a connection pool)
//!
//! Every statement runs under the configured query timeout. Sort columns are
//! only ever taken from a resource's allow-list, limit/offset are bound.

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qotd_core::{
    Comment, ListQuery, OrderBy, QotdError, Quote, Resource, Result, Store,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Bound on establishing the pool and the first connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub query_timeout: Duration,
    pub max_connections: u32,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(3),
            max_connections: 5,
        }
    }
}

pub struct Database {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Database {
    pub async fn connect(dsn: &str, options: DatabaseOptions) -> AnyResult<Self> {
        tracing::info!("Opening SQLite database: {}", dsn);

        let connect_options = SqliteConnectOptions::from_str(dsn)
            .with_context(|| format!("Invalid SQLite DSN: {}", dsn))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = tokio::time::timeout(
            CONNECT_TIMEOUT,
            SqlitePoolOptions::new()
                .max_connections(options.max_connections)
                .acquire_timeout(options.query_timeout)
                .connect_with(connect_options),
        )
        .await
        .map_err(|_| QotdError::Timeout(CONNECT_TIMEOUT))
        .context("Timed out connecting to SQLite")?
        .with_context(|| format!("Failed to connect to SQLite database: {}", dsn))?;

        tracing::info!("SQLite connection pool established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool,
            query_timeout: options.query_timeout,
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> AnyResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                author TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                version INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed");
    }

    /// Run one statement under the query timeout. Dropping the statement
    /// future on expiry cancels it.
    async fn bounded<T, F>(&self, statement: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, statement).await {
            Ok(result) => result.map_err(storage_error),
            Err(_) => Err(QotdError::Timeout(self.query_timeout)),
        }
    }
}

fn storage_error(e: sqlx::Error) -> QotdError {
    match e {
        sqlx::Error::PoolTimedOut => QotdError::Storage("connection pool timed out".to_string()),
        other => QotdError::Storage(other.to_string()),
    }
}

/// `SELECT` for a list request. `order.field` comes from the allow-list.
fn list_sql<R: Resource>(table: &str, columns: &str, query: &ListQuery) -> String {
    let order = OrderBy::resolve::<R>(&query.sort);
    let direction = order.order.as_sql();
    let mut sql = format!(
        "SELECT {columns} FROM {table} ORDER BY {field} {direction}, id {direction}",
        field = order.field,
    );
    if !query.pagination.is_unbounded() {
        sql.push_str(" LIMIT ?1 OFFSET ?2");
    }
    sql
}

const QUOTE_COLUMNS: &str = "id, text, author, created_at";
const COMMENT_COLUMNS: &str = "id, content, author, created_at, version";

#[async_trait]
impl Store<Quote> for Database {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Quote>> {
        let sql = list_sql::<Quote>("quotes", QUOTE_COLUMNS, query);
        let mut statement = sqlx::query_as::<_, QuoteRow>(&sql);
        if !query.pagination.is_unbounded() {
            statement = statement
                .bind(query.pagination.limit)
                .bind(query.pagination.offset.max(0));
        }

        let rows = self.bounded(statement.fetch_all(&self.pool)).await?;
        Ok(rows.into_iter().map(Quote::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Quote> {
        let row: Option<QuoteRow> = self
            .bounded(
                sqlx::query_as(
                    r#"
                    SELECT id, text, author, created_at
                    FROM quotes WHERE id = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Quote::from)
            .ok_or_else(|| QotdError::not_found(Quote::KIND, id))
    }

    async fn create(&self, quote: &mut Quote) -> Result<()> {
        quote.validate()?;

        let (id, created_at): (i64, DateTime<Utc>) = self
            .bounded(
                sqlx::query_as(
                    r#"
                    INSERT INTO quotes (text, author, created_at)
                    VALUES (?1, ?2, ?3)
                    RETURNING id, created_at
                    "#,
                )
                .bind(&quote.text)
                .bind(&quote.author)
                .bind(Utc::now())
                .fetch_one(&self.pool),
            )
            .await?;

        quote.id = id;
        quote.created_at = created_at;
        Ok(())
    }

    async fn update(&self, id: i64, quote: &mut Quote) -> Result<()> {
        quote.validate()?;

        let row: Option<QuoteRow> = self
            .bounded(
                sqlx::query_as(
                    r#"
                    UPDATE quotes SET text = ?1, author = ?2
                    WHERE id = ?3
                    RETURNING id, text, author, created_at
                    "#,
                )
                .bind(&quote.text)
                .bind(&quote.author)
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        let row = row.ok_or_else(|| QotdError::not_found(Quote::KIND, id))?;
        *quote = row.into();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM quotes WHERE id = ?1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(QotdError::not_found(Quote::KIND, id));
        }
        Ok(())
    }
}

#[async_trait]
impl Store<Comment> for Database {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Comment>> {
        let sql = list_sql::<Comment>("comments", COMMENT_COLUMNS, query);
        let mut statement = sqlx::query_as::<_, CommentRow>(&sql);
        if !query.pagination.is_unbounded() {
            statement = statement
                .bind(query.pagination.limit)
                .bind(query.pagination.offset.max(0));
        }

        let rows = self.bounded(statement.fetch_all(&self.pool)).await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Comment> {
        let row: Option<CommentRow> = self
            .bounded(
                sqlx::query_as(
                    r#"
                    SELECT id, content, author, created_at, version
                    FROM comments WHERE id = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Comment::from)
            .ok_or_else(|| QotdError::not_found(Comment::KIND, id))
    }

    async fn create(&self, comment: &mut Comment) -> Result<()> {
        comment.validate()?;

        let (id, created_at, version): (i64, DateTime<Utc>, i64) = self
            .bounded(
                sqlx::query_as(
                    r#"
                    INSERT INTO comments (content, author, created_at)
                    VALUES (?1, ?2, ?3)
                    RETURNING id, created_at, version
                    "#,
                )
                .bind(&comment.content)
                .bind(&comment.author)
                .bind(Utc::now())
                .fetch_one(&self.pool),
            )
            .await?;

        comment.id = id;
        comment.created_at = created_at;
        comment.version = version;
        Ok(())
    }

    async fn update(&self, id: i64, comment: &mut Comment) -> Result<()> {
        comment.validate()?;

        // version is bumped by the statement itself, not read-then-written
        let row: Option<CommentRow> = self
            .bounded(
                sqlx::query_as(
                    r#"
                    UPDATE comments
                    SET content = ?1, author = ?2, created_at = ?3, version = version + 1
                    WHERE id = ?4
                    RETURNING id, content, author, created_at, version
                    "#,
                )
                .bind(&comment.content)
                .bind(&comment.author)
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(&self.pool),
            )
            .await?;

        let row = row.ok_or_else(|| QotdError::not_found(Comment::KIND, id))?;
        *comment = row.into();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM comments WHERE id = ?1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(QotdError::not_found(Comment::KIND, id));
        }
        Ok(())
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct QuoteRow {
    id: i64,
    text: String,
    author: String,
    created_at: DateTime<Utc>,
}

impl From<QuoteRow> for Quote {
    fn from(r: QuoteRow) -> Self {
        Quote {
            id: r.id,
            author: r.author,
            text: r.text,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    author: String,
    created_at: DateTime<Utc>,
    version: i64,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            content: r.content,
            author: r.author,
            created_at: r.created_at,
            version: r.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qotd_core::{Sort, SortOrder};
    use tempfile::TempDir;

    async fn open(dir: &TempDir) -> Database {
        let dsn = format!("sqlite://{}", dir.path().join("qotd.db").display());
        Database::connect(&dsn, DatabaseOptions::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_list_sql_uses_allow_list() {
        let mut query = ListQuery::all();
        query.sort = Sort::by("author; DROP TABLE quotes", SortOrder::Asc);
        let sql = list_sql::<Quote>("quotes", QUOTE_COLUMNS, &query);
        assert!(sql.ends_with("ORDER BY created_at DESC, id DESC"));
        assert!(!sql.contains("DROP"));

        let query = ListQuery::new(10, 20, "version", "asc");
        let sql = list_sql::<Comment>("comments", COMMENT_COLUMNS, &query);
        assert!(sql.contains("ORDER BY version ASC, id ASC LIMIT ?1 OFFSET ?2"));
    }

    #[tokio::test]
    async fn test_statement_timeout() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir).await;
        db.query_timeout = Duration::from_millis(20);

        let result: Result<()> = db
            .bounded(std::future::pending::<std::result::Result<(), sqlx::Error>>())
            .await;
        assert!(matches!(result, Err(QotdError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_data_survives_reconnect() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir).await;
        let mut quote = Quote::new("Seneca", "Luck is what happens when preparation meets opportunity.");
        Store::<Quote>::create(&db, &mut quote).await.unwrap();
        db.close().await;

        let db = open(&dir).await;
        let fetched = Store::<Quote>::get_by_id(&db, quote.id).await.unwrap();
        assert_eq!(fetched, quote);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir).await;

        let mut first = Comment::new("A", "one");
        let mut second = Comment::new("B", "two");
        Store::<Comment>::create(&db, &mut first).await.unwrap();
        Store::<Comment>::create(&db, &mut second).await.unwrap();
        Store::<Comment>::delete(&db, second.id).await.unwrap();

        let mut third = Comment::new("C", "three");
        Store::<Comment>::create(&db, &mut third).await.unwrap();
        assert_eq!(third.id, 3);
    }
}
