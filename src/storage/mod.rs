pub mod reviews;

pub use reviews::{CustomerRow, ReviewRequestRow, ReviewStatus, TransitionOutcome};

use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ProfileForm;

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the server indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed store failure, classified from the driver's structured error kind.
///
/// Constraint violations are recognised via `sqlx::error::ErrorKind`, never by
/// matching substrings of the error message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("referenced row does not exist")]
    ForeignKey,
    #[error("database query timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => return StoreError::Conflict,
                sqlx::error::ErrorKind::ForeignKeyViolation => return StoreError::ForeignKey,
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
async fn with_timeout<T>(fut: impl std::future::Future<Output = StoreResult<T>>) -> StoreResult<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(QUERY_TIMEOUT.as_secs())),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthSessionRow {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

/// The single business record owned by one user: contact info plus
/// review-platform links. `facebook_review_url` / `yelp_review_url` are
/// optional and stored as the empty string when absent.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfileRow {
    pub id: String,
    pub user_id: String,
    pub business_name: String,
    pub phone: String,
    pub email: String,
    pub google_review_url: String,
    pub facebook_review_url: String,
    pub yelp_review_url: String,
    pub onboarding_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> StoreResult<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> StoreResult<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
        let db_path = data_dir.join("revloop.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))
                .map_err(StoreError::Database)?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .foreign_keys(true)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts)
            .await
            .map_err(StoreError::Database)?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> StoreResult<()> {
        // Idempotent DDL — safe to run on every startup.
        // `business_profiles.user_id` is UNIQUE: at most one profile per user
        // is enforced at the storage level, not just by application logic.
        let ddl = [
            "CREATE TABLE IF NOT EXISTS users (
                 id TEXT PRIMARY KEY,
                 email TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 created_at TEXT NOT NULL
             )",
            "CREATE TABLE IF NOT EXISTS auth_sessions (
                 token TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 created_at TEXT NOT NULL,
                 expires_at TEXT NOT NULL
             )",
            "CREATE INDEX IF NOT EXISTS idx_auth_sessions_user ON auth_sessions(user_id)",
            "CREATE TABLE IF NOT EXISTS business_profiles (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                 business_name TEXT NOT NULL,
                 phone TEXT NOT NULL,
                 email TEXT NOT NULL,
                 google_review_url TEXT NOT NULL,
                 facebook_review_url TEXT NOT NULL DEFAULT '',
                 yelp_review_url TEXT NOT NULL DEFAULT '',
                 onboarding_completed INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE TABLE IF NOT EXISTS customers (
                 id TEXT PRIMARY KEY,
                 profile_id TEXT NOT NULL REFERENCES business_profiles(id) ON DELETE CASCADE,
                 name TEXT NOT NULL,
                 phone TEXT NOT NULL DEFAULT '',
                 email TEXT NOT NULL DEFAULT '',
                 created_at TEXT NOT NULL
             )",
            "CREATE INDEX IF NOT EXISTS idx_customers_profile ON customers(profile_id)",
            "CREATE TABLE IF NOT EXISTS review_requests (
                 id TEXT PRIMARY KEY,
                 profile_id TEXT NOT NULL REFERENCES business_profiles(id) ON DELETE CASCADE,
                 customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
                 status TEXT NOT NULL DEFAULT 'pending',
                 sent_at TEXT,
                 clicked_at TEXT,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
            "CREATE INDEX IF NOT EXISTS idx_review_requests_profile ON review_requests(profile_id)",
        ];
        for stmt in ddl {
            sqlx::query(stmt).execute(pool).await?;
        }
        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(UserRow {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ─── Auth sessions ──────────────────────────────────────────────────────

    /// Mint a fresh bearer session for a user.
    ///
    /// The token is an opaque 32-character hex string (UUID v4 without dashes).
    pub async fn create_auth_session(
        &self,
        user_id: &str,
        ttl_hours: u32,
    ) -> StoreResult<AuthSessionRow> {
        let token = Uuid::new_v4().to_string().replace('-', "");
        let now = Utc::now();
        let expires = now + chrono::Duration::hours(ttl_hours as i64);
        let created_at = now.to_rfc3339();
        let expires_at = expires.to_rfc3339();
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(user_id)
        .bind(&created_at)
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;
        Ok(AuthSessionRow {
            token,
            user_id: user_id.to_string(),
            created_at,
            expires_at,
        })
    }

    /// Map a bearer token to its owning user id, or `None` for unknown and
    /// expired tokens.
    pub async fn resolve_token(&self, token: &str) -> StoreResult<Option<String>> {
        let now = Utc::now().to_rfc3339();
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(&now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(user_id,)| user_id))
    }

    /// On startup, delete sessions whose expiry has passed.
    /// Returns the number of sessions purged.
    pub async fn purge_expired_sessions(&self) -> StoreResult<u64> {
        with_timeout(async {
            let now = Utc::now().to_rfc3339();
            let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
                .bind(&now)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        })
        .await
    }

    // ─── Business profiles ──────────────────────────────────────────────────

    pub async fn get_profile_for_user(
        &self,
        user_id: &str,
    ) -> StoreResult<Option<BusinessProfileRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM business_profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Insert-or-overwrite the caller's profile in one atomic statement,
    /// keyed on the UNIQUE `user_id` column.
    ///
    /// An update is a full replace of all mutable fields — omitted optional
    /// URLs revert to the empty string. `onboarding_completed` is set on both
    /// paths. Returns the persisted row and `true` when a new row was
    /// inserted: a fresh insert stamps `created_at` and `updated_at` with the
    /// same value, while an update moves only `updated_at`.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        form: &ProfileForm,
    ) -> StoreResult<(BusinessProfileRow, bool)> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let row: BusinessProfileRow = sqlx::query_as(
            "INSERT INTO business_profiles
               (id, user_id, business_name, phone, email,
                google_review_url, facebook_review_url, yelp_review_url,
                onboarding_completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
               business_name = excluded.business_name,
               phone = excluded.phone,
               email = excluded.email,
               google_review_url = excluded.google_review_url,
               facebook_review_url = excluded.facebook_review_url,
               yelp_review_url = excluded.yelp_review_url,
               onboarding_completed = 1,
               updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&form.business_name)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(&form.google_review_url)
        .bind(&form.facebook_review_url)
        .bind(&form.yelp_review_url)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        let created = row.created_at == row.updated_at;
        Ok((row, created))
    }
}
