//! SQLite-backed request ledger
//!
//! Owns the `servers` and `requests` tables. Every public operation degrades
//! to a sentinel value when the database could not be opened or a query
//! fails, so the pages that depend on it keep rendering.

use super::error::LedgerError;
use super::identity::HostIdentity;
use super::observer::{LedgerObserver, TracingObserver};
use super::pagination::{page_offset, resolve_window};
use crate::config::LedgerConfig;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const CREATE_SERVERS: &str = "CREATE TABLE IF NOT EXISTS servers(
    ServerID INTEGER PRIMARY KEY AUTOINCREMENT,
    Hostname TEXT NOT NULL,
    IP TEXT NOT NULL,
    Platform TEXT
)";

const CREATE_REQUESTS: &str = "CREATE TABLE IF NOT EXISTS requests(
    RequestID INTEGER PRIMARY KEY AUTOINCREMENT,
    Epoch REAL NOT NULL,
    RemoteAddress TEXT,
    RemoteUserAgent TEXT,
    RequestURL TEXT,
    ServerID INTEGER,
    FOREIGN KEY(ServerID) REFERENCES servers(ServerID)
)";

const REQUEST_COLUMNS: &str = "RequestID AS request_id,
    Epoch AS epoch,
    COALESCE(RemoteAddress, '') AS remote_address,
    COALESCE(RemoteUserAgent, '') AS user_agent,
    COALESCE(RequestURL, '') AS url,
    COALESCE(ServerID, 0) AS server_id";

/// One row of the servers table, with its live request count
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ServerRow {
    pub server_id: i64,
    pub request_count: i64,
    pub hostname: String,
    pub ip: String,
    pub platform: String,
}

/// One logged request
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RequestRow {
    pub request_id: i64,
    pub epoch: f64,
    pub remote_address: String,
    pub user_agent: String,
    pub url: String,
    pub server_id: i64,
}

/// Result of a paginated ledger query
///
/// `NoData` is the sentinel for an unavailable store; views render it as a
/// single placeholder row. An empty window is `Rows(vec![])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "rows", rename_all = "snake_case")]
pub enum LedgerPage<T> {
    Rows(Vec<T>),
    NoData,
}

impl<T> LedgerPage<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// Real rows; empty for the sentinel
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Rows(rows) => rows,
            Self::NoData => &[],
        }
    }
}

enum StoreState {
    Active { pool: SqlitePool, path: PathBuf },
    Unavailable { reason: String },
}

/// Handle to the request ledger
pub struct LedgerStore {
    state: StoreState,
    server_id: OnceLock<i64>,
    observer: Arc<dyn LedgerObserver>,
}

impl LedgerStore {
    /// Open the ledger, reporting through `tracing`
    pub async fn open(config: &LedgerConfig) -> Self {
        Self::open_with_observer(config, Arc::new(TracingObserver)).await
    }

    /// Open the ledger with an explicit observer
    ///
    /// Never fails: if the database cannot be opened the store comes up
    /// Unavailable and every later call returns its sentinel.
    pub async fn open_with_observer(
        config: &LedgerConfig,
        observer: Arc<dyn LedgerObserver>,
    ) -> Self {
        let path = PathBuf::from(&config.database_path);

        let state = match Self::connect(&path, config.create_parent_dir).await {
            Ok(pool) => {
                observer.opened(&path);
                StoreState::Active { pool, path }
            }
            Err(e) => {
                observer.degraded("open", &format!("{}: {}", path.display(), e));
                StoreState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Self {
            state,
            server_id: OnceLock::new(),
            observer,
        }
    }

    async fn connect(path: &Path, create_parent_dir: bool) -> Result<SqlitePool, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                if !create_parent_dir {
                    return Err(LedgerError::MissingDirectory(parent.to_path_buf()));
                }
                tokio::fs::create_dir_all(parent).await?;
                tracing::info!(directory = %parent.display(), "Created database directory");
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)  // readers don't block the request writer
            .busy_timeout(Duration::from_secs(5));

        // Small pool; SQLite has a single writer anyway
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Self::create_schema(&pool).await?;
        Ok(pool)
    }

    /// Create both tables if they are missing
    async fn create_schema(pool: &SqlitePool) -> Result<(), LedgerError> {
        sqlx::query(CREATE_SERVERS).execute(pool).await?;
        sqlx::query(CREATE_REQUESTS).execute(pool).await?;
        Ok(())
    }

    fn pool(&self) -> Result<&SqlitePool, LedgerError> {
        match &self.state {
            StoreState::Active { pool, .. } => Ok(pool),
            StoreState::Unavailable { reason } => Err(LedgerError::Unavailable(reason.clone())),
        }
    }

    /// Whether the backing database opened successfully
    pub fn is_available(&self) -> bool {
        matches!(self.state, StoreState::Active { .. })
    }

    /// Path of the backing database, when open
    pub fn database_path(&self) -> Option<&Path> {
        match &self.state {
            StoreState::Active { path, .. } => Some(path),
            StoreState::Unavailable { .. } => None,
        }
    }

    /// Id registered by [`register_self`](Self::register_self), `0` before that
    pub fn server_id(&self) -> i64 {
        self.server_id.get().copied().unwrap_or(0)
    }

    /// Look up or insert the `servers` row for `identity`
    ///
    /// Returns the row's id, or `0` when the store is unavailable. The first
    /// successful result becomes the id attached to every logged request.
    pub async fn register_self(&self, identity: &HostIdentity) -> i64 {
        match self.try_register(identity).await {
            Ok(id) => {
                let _ = self.server_id.set(id);
                self.observer.registered(id);
                id
            }
            Err(e) => {
                self.observer.degraded(
                    "register_self",
                    &format!("{} ({}): {}", identity.hostname, identity.ip, e),
                );
                0
            }
        }
    }

    async fn try_register(&self, identity: &HostIdentity) -> Result<i64, LedgerError> {
        let mut tx = self.pool()?.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT ServerID FROM servers WHERE Hostname = ? AND IP = ?
             ORDER BY ServerID ASC LIMIT 1",
        )
        .bind(&identity.hostname)
        .bind(&identity.ip)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(id) => id,
            None => sqlx::query("INSERT INTO servers (Hostname, IP, Platform) VALUES (?, ?, ?)")
                .bind(&identity.hostname)
                .bind(&identity.ip)
                .bind(&identity.platform)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid(),
        };

        tx.commit().await?;
        Ok(id)
    }

    /// Append one request to the log
    ///
    /// Missing values are stored as empty strings. Returns `false` (and
    /// reports why) when nothing was written.
    pub async fn put_request(
        &self,
        remote_addr: Option<&str>,
        user_agent: Option<&str>,
        url: Option<&str>,
    ) -> bool {
        let remote_addr = remote_addr.unwrap_or_default();
        let user_agent = user_agent.unwrap_or_default();
        let url = url.unwrap_or_default();

        match self.try_put_request(remote_addr, user_agent, url).await {
            Ok(()) => true,
            Err(e) => {
                self.observer.degraded(
                    "put_request",
                    &format!(
                        "{}: remote_addr {}, remote_user_agent {}, request_url {}",
                        e, remote_addr, user_agent, url
                    ),
                );
                false
            }
        }
    }

    async fn try_put_request(
        &self,
        remote_addr: &str,
        user_agent: &str,
        url: &str,
    ) -> Result<(), LedgerError> {
        let pool = self.pool()?;

        sqlx::query(
            "INSERT INTO requests (Epoch, RemoteAddress, RemoteUserAgent, RequestURL, ServerID)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(epoch_now())
        .bind(remote_addr)
        .bind(user_agent)
        .bind(url)
        .bind(self.server_id.get().copied())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Highest request id, which is the request count since rows are never deleted
    pub async fn total_requests(&self) -> i64 {
        let result = match self.pool() {
            Ok(pool) => sqlx::query_scalar("SELECT COALESCE(MAX(RequestID), 0) FROM requests")
                .fetch_one(pool)
                .await
                .map_err(LedgerError::from),
            Err(e) => Err(e),
        };
        self.or_sentinel("total_requests", result, 0)
    }

    /// Highest server id
    pub async fn total_servers(&self) -> i64 {
        let result = match self.pool() {
            Ok(pool) => sqlx::query_scalar("SELECT COALESCE(MAX(ServerID), 0) FROM servers")
                .fetch_one(pool)
                .await
                .map_err(LedgerError::from),
            Err(e) => Err(e),
        };
        self.or_sentinel("total_servers", result, 0)
    }

    /// Servers in an id window, each with its current request count
    pub async fn list_servers(&self, page_start: i64, page_count: i64) -> LedgerPage<ServerRow> {
        let result = self.try_list_servers(page_start, page_count).await;
        self.or_sentinel("list_servers", result.map(LedgerPage::Rows), LedgerPage::NoData)
    }

    async fn try_list_servers(
        &self,
        page_start: i64,
        page_count: i64,
    ) -> Result<Vec<ServerRow>, LedgerError> {
        let pool = self.pool()?;
        let (min, max) = resolve_window(page_start, page_count, self.total_servers().await);

        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT
                s.ServerID AS server_id,
                (SELECT COUNT(*) FROM requests r WHERE r.ServerID = s.ServerID) AS request_count,
                s.Hostname AS hostname,
                s.IP AS ip,
                COALESCE(s.Platform, '') AS platform
             FROM servers s
             WHERE s.ServerID BETWEEN ? AND ?
             ORDER BY s.ServerID ASC",
        )
        .bind(min)
        .bind(max)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Requests in an id window
    pub async fn list_requests(&self, page_start: i64, page_count: i64) -> LedgerPage<RequestRow> {
        let result = self.try_list_requests(page_start, page_count).await;
        self.or_sentinel("list_requests", result.map(LedgerPage::Rows), LedgerPage::NoData)
    }

    async fn try_list_requests(
        &self,
        page_start: i64,
        page_count: i64,
    ) -> Result<Vec<RequestRow>, LedgerError> {
        let pool = self.pool()?;
        let (min, max) = resolve_window(page_start, page_count, self.total_requests().await);

        let sql = format!(
            "SELECT {} FROM requests WHERE RequestID BETWEEN ? AND ? ORDER BY RequestID ASC",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(min)
            .bind(max)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Requests observed by one server, paged by page number
    pub async fn list_requests_for_server(
        &self,
        server_id: i64,
        page: i64,
        page_count: i64,
    ) -> LedgerPage<RequestRow> {
        let result = self.try_list_requests_for_server(server_id, page, page_count).await;
        self.or_sentinel(
            "list_requests_for_server",
            result.map(LedgerPage::Rows),
            LedgerPage::NoData,
        )
    }

    async fn try_list_requests_for_server(
        &self,
        server_id: i64,
        page: i64,
        page_count: i64,
    ) -> Result<Vec<RequestRow>, LedgerError> {
        let pool = self.pool()?;
        let (offset, limit) = page_offset(page, page_count);

        let sql = format!(
            "SELECT {} FROM requests WHERE ServerID = ? ORDER BY RequestID ASC LIMIT ? OFFSET ?",
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(server_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Hostname and IP of a server, `None` when unknown
    pub async fn server_socket(&self, server_id: i64) -> Option<(String, String)> {
        let result = match self.pool() {
            Ok(pool) => sqlx::query_as::<_, (String, String)>(
                "SELECT Hostname, IP FROM servers WHERE ServerID = ?",
            )
            .bind(server_id)
            .fetch_optional(pool)
            .await
            .map_err(LedgerError::from),
            Err(e) => Err(e),
        };
        self.or_sentinel("server_socket", result, None)
    }

    /// Highest request id logged by a server, `0` when it has none
    pub async fn last_request_for_server(&self, server_id: i64) -> i64 {
        let result = match self.pool() {
            Ok(pool) => sqlx::query_scalar(
                "SELECT COALESCE(MAX(RequestID), 0) FROM requests WHERE ServerID = ?",
            )
            .bind(server_id)
            .fetch_one(pool)
            .await
            .map_err(LedgerError::from),
            Err(e) => Err(e),
        };
        self.or_sentinel("last_request_for_server", result, 0)
    }

    /// Close the pool, waiting for in-flight queries
    pub async fn close(&self) {
        if let StoreState::Active { pool, .. } = &self.state {
            pool.close().await;
        }
    }

    fn or_sentinel<T>(&self, operation: &'static str, result: Result<T, LedgerError>, sentinel: T) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.observer.degraded(operation, &e.to_string());
                sentinel
            }
        }
    }
}

/// Current Unix time in seconds, rounded to 4 decimal places
fn epoch_now() -> f64 {
    let micros = chrono::Utc::now().timestamp_micros() as f64;
    (micros / 100.0).round() / 10_000.0
}
