//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{params, Connection, OptionalExt};
use tracing::warn;

use crate::domain::result::Error;
use crate::domain::{Flash, NewUser, Profile, Session, Thought, User, DEFAULT_AVATAR};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
}

/// Rows and column names of a raw SQL query
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn empty(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            row_count: 0,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, date_joined";
const PROFILE_COLUMNS: &str = "id, user_id, image";
const THOUGHT_COLUMNS: &str = "id, user_id, text, created_at";
const SESSION_COLUMNS: &str = "token_hash, user_id, created_at, expires_at, flash";

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file
    ///
    /// Retries with exponential backoff on file locking errors, which show up
    /// when the CLI and a running server touch the same file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// In-memory database, used by unit tests and throwaway demos
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off: nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("connection lock poisoned: {}", e)).into())
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === User operations ===

    /// Insert a user; the id comes from the sequence
    pub fn insert_user(&self, new_user: &NewUser, date_joined: DateTime<Utc>) -> Result<User> {
        let conn = self.lock()?;
        let id: i64 = conn.query_row(
            "INSERT INTO auth_user (username, email, password_hash, date_joined)
             VALUES (?, ?, ?, ?)
             RETURNING id",
            params![
                new_user.username,
                new_user.email,
                new_user.password_hash,
                format_timestamp(&date_joined),
            ],
            |row| row.get(0),
        )?;

        Ok(User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            date_joined: parse_timestamp(&format_timestamp(&date_joined)),
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM auth_user WHERE id = ?"),
                [id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Exact (case-sensitive) username lookup, as used by login
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM auth_user WHERE username = ?"),
                [username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// True if a username exists ignoring case
    pub fn username_taken(&self, username: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM auth_user WHERE lower(username) = lower(?)",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_users(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM auth_user ORDER BY id"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Delete a user and everything it owns (sessions, thoughts, profile)
    ///
    /// Children go first; each statement auto-commits. Returns false if the
    /// user did not exist.
    pub fn delete_user(&self, user_id: i64) -> Result<bool> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM sys_sessions WHERE user_id = ?", params![user_id])?;
        conn.execute("DELETE FROM users_thought WHERE user_id = ?", params![user_id])?;
        conn.execute("DELETE FROM users_profile WHERE user_id = ?", params![user_id])?;
        let deleted = conn.execute("DELETE FROM auth_user WHERE id = ?", params![user_id])?;

        Ok(deleted > 0)
    }

    // === Profile operations ===

    /// Insert an empty profile for a user
    pub fn insert_profile(&self, user_id: i64) -> Result<Profile> {
        let conn = self.lock()?;
        let profile = conn.query_row(
            &format!(
                "INSERT INTO users_profile (user_id, image) VALUES (?, ?) RETURNING {PROFILE_COLUMNS}"
            ),
            params![user_id, DEFAULT_AVATAR],
            row_to_profile,
        )?;
        Ok(profile)
    }

    pub fn get_profile_by_user(&self, user_id: i64) -> Result<Option<Profile>> {
        let conn = self.lock()?;
        let profile = conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM users_profile WHERE user_id = ?"),
                [user_id],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Fetch the user's profile, creating it if missing
    ///
    /// The boolean is true when a row was created. The lock is held across
    /// both statements, and the unique user_id keeps the insert idempotent.
    pub fn get_or_create_profile(&self, user_id: i64) -> Result<(Profile, bool)> {
        let conn = self.lock()?;
        let select = format!("SELECT {PROFILE_COLUMNS} FROM users_profile WHERE user_id = ?");

        if let Some(profile) = conn.query_row(&select, [user_id], row_to_profile).optional()? {
            return Ok((profile, false));
        }

        let inserted = conn.execute(
            "INSERT INTO users_profile (user_id, image) VALUES (?, ?) ON CONFLICT (user_id) DO NOTHING",
            params![user_id, DEFAULT_AVATAR],
        )?;
        let profile = conn.query_row(&select, [user_id], row_to_profile)?;
        Ok((profile, inserted > 0))
    }

    pub fn update_profile_image(&self, profile_id: i64, image: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE users_profile SET image = ? WHERE id = ?",
            params![image, profile_id],
        )?;
        Ok(())
    }

    // === Thought operations ===

    pub fn insert_thought(
        &self,
        user_id: i64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Thought> {
        let conn = self.lock()?;
        let thought = conn.query_row(
            &format!(
                "INSERT INTO users_thought (user_id, text, created_at) VALUES (?, ?, ?)
                 RETURNING {THOUGHT_COLUMNS}"
            ),
            params![user_id, text, format_timestamp(&created_at)],
            row_to_thought,
        )?;
        Ok(thought)
    }

    /// All thoughts owned by a user, newest first
    pub fn get_thoughts_by_user(&self, user_id: i64) -> Result<Vec<Thought>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {THOUGHT_COLUMNS} FROM users_thought
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        ))?;
        let thoughts = stmt
            .query_map([user_id], row_to_thought)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(thoughts)
    }

    /// Single (id, text) row, looked up with a bound parameter
    pub fn get_thought_row(&self, id: i64) -> Result<Option<(i64, String)>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, text FROM users_thought WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    // === Session operations ===

    pub fn insert_session(&self, session: &Session) -> Result<()> {
        let flash = serde_json::to_string(&session.flash)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_sessions (token_hash, user_id, created_at, expires_at, flash)
             VALUES (?, ?, ?, ?, ?)",
            params![
                session.token_hash,
                session.user_id,
                format_timestamp(&session.created_at),
                format_timestamp(&session.expires_at),
                flash,
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let conn = self.lock()?;
        let session = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sys_sessions WHERE token_hash = ?"),
                [token_hash],
                row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Edit a session's pending notices under one lock, so concurrent
    /// requests on the same session cannot drop each other's changes.
    /// Returns `None` when the session does not exist.
    pub fn update_session_flash<R>(
        &self,
        token_hash: &str,
        edit: impl FnOnce(&mut Vec<Flash>) -> R,
    ) -> Result<Option<R>> {
        let conn = self.lock()?;
        let Some(session) = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sys_sessions WHERE token_hash = ?"),
                [token_hash],
                row_to_session,
            )
            .optional()?
        else {
            return Ok(None);
        };

        let mut pending = session.flash.clone();
        let output = edit(&mut pending);
        if pending != session.flash {
            conn.execute(
                "UPDATE sys_sessions SET flash = ? WHERE token_hash = ?",
                params![serde_json::to_string(&pending)?, token_hash],
            )?;
        }
        Ok(Some(output))
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM sys_sessions WHERE token_hash = ?",
            params![token_hash],
        )?;
        Ok(())
    }

    /// Remove sessions that expired at or before `now`
    pub fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_sessions WHERE expires_at <= ?",
            params![format_timestamp(&now)],
        )?;
        Ok(deleted)
    }

    // === Counts ===

    pub fn count_users(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM auth_user")
    }

    pub fn count_profiles(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM users_profile")
    }

    pub fn count_thoughts(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM users_thought")
    }

    pub fn count_live_sessions(&self, now: DateTime<Utc>) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM sys_sessions WHERE expires_at > ?",
            [format_timestamp(&now)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count(&self, sql: &str) -> Result<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    }

    // === Raw queries ===

    /// Execute caller-built SQL text as-is and collect every row
    ///
    /// No statement filtering and no parameters: whatever the string says is
    /// what runs. The lookup page's injectable path goes through here.
    pub fn execute_raw_query(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut result_rows = stmt.query([])?;

        let mut rows: Vec<Vec<serde_json::Value>> = Vec::new();
        let mut column_count = 0;

        while let Some(row) = result_rows.next()? {
            if rows.is_empty() {
                column_count = row.as_ref().column_count();
            }
            rows.push((0..column_count).map(|i| column_value(row, i)).collect());
        }

        // Release the borrow on stmt before reading column names
        drop(result_rows);

        let count = if column_count > 0 {
            column_count
        } else {
            stmt.column_count()
        };
        let columns = (0..count)
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        let row_count = rows.len();
        Ok(QueryResult {
            columns,
            rows,
            row_count,
        })
    }
}

// Row mappers

fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
    let date_joined: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        date_joined: parse_timestamp(&date_joined),
    })
}

fn row_to_profile(row: &duckdb::Row) -> duckdb::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image: row.get(2)?,
    })
}

fn row_to_thought(row: &duckdb::Row) -> duckdb::Result<Thought> {
    let created_at: String = row.get(3)?;
    Ok(Thought {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn row_to_session(row: &duckdb::Row) -> duckdb::Result<Session> {
    let created_at: String = row.get(2)?;
    let expires_at: String = row.get(3)?;
    let flash: String = row.get(4)?;
    Ok(Session {
        token_hash: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_timestamp(&created_at),
        expires_at: parse_timestamp(&expires_at),
        // A corrupt flash column only loses pending notices
        flash: serde_json::from_str(&flash).unwrap_or_default(),
    })
}

fn column_value(row: &duckdb::Row, idx: usize) -> serde_json::Value {
    use duckdb::types::ValueRef;

    match row.get_ref(idx) {
        Ok(ValueRef::Null) => serde_json::Value::Null,
        Ok(ValueRef::Boolean(b)) => serde_json::Value::Bool(b),
        Ok(ValueRef::TinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::SmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Int(i)) => serde_json::json!(i),
        Ok(ValueRef::BigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::HugeInt(i)) => serde_json::json!(i.to_string()),
        Ok(ValueRef::UTinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::USmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UBigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Float(f)) => serde_json::json!(f),
        Ok(ValueRef::Double(f)) => serde_json::json!(f),
        Ok(ValueRef::Decimal(d)) => serde_json::Value::String(d.to_string()),
        Ok(ValueRef::Text(bytes)) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        Ok(ValueRef::Blob(bytes)) => {
            serde_json::Value::String(format!("<blob {} bytes>", bytes.len()))
        }
        Ok(ValueRef::Date32(days)) => chrono::DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map(|dt| serde_json::Value::String(dt.date_naive().to_string()))
            .unwrap_or(serde_json::Value::Null),
        Ok(ValueRef::Timestamp(_, micros)) => {
            let text = chrono::DateTime::from_timestamp_micros(micros)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| micros.to_string());
            serde_json::Value::String(text)
        }
        _ => serde_json::Value::Null,
    }
}

// Helper functions

/// Fixed-width UTC timestamp so text ordering matches time ordering
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::open_in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn add_user(repo: &DuckDbRepository, name: &str) -> User {
        repo.insert_user(
            &NewUser::new(name, format!("{}@example.com", name), "hash"),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let a = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let b = DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap();
        assert_eq!(format_timestamp(&a).len(), format_timestamp(&b).len());
        assert!(format_timestamp(&a) < format_timestamp(&b));
        assert_eq!(parse_timestamp(&format_timestamp(&b)), b);
    }

    #[test]
    fn test_user_ids_are_sequential() {
        let repo = repo();
        let alice = add_user(&repo, "alice");
        let bob = add_user(&repo, "bob");
        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.get_user_by_id(2).unwrap().unwrap().username, "bob");
        assert!(repo.get_user_by_id(99).unwrap().is_none());
    }

    #[test]
    fn test_username_taken_ignores_case() {
        let repo = repo();
        add_user(&repo, "Alice");
        assert!(repo.username_taken("alice").unwrap());
        assert!(repo.get_user_by_username("alice").unwrap().is_none());
        assert!(repo.get_user_by_username("Alice").unwrap().is_some());
    }

    #[test]
    fn test_get_or_create_profile_is_idempotent() {
        let repo = repo();
        let alice = add_user(&repo, "alice");

        let (first, created) = repo.get_or_create_profile(alice.id).unwrap();
        assert!(created);
        assert_eq!(first.image, DEFAULT_AVATAR);

        let (second, created_again) = repo.get_or_create_profile(alice.id).unwrap();
        assert!(!created_again);
        assert_eq!(first, second);
        assert_eq!(repo.count_profiles().unwrap(), 1);
    }

    #[test]
    fn test_thoughts_newest_first() {
        let repo = repo();
        let alice = add_user(&repo, "alice");
        let base = Utc::now();
        repo.insert_thought(alice.id, "first", base).unwrap();
        repo.insert_thought(alice.id, "second", base + Duration::seconds(1))
            .unwrap();
        repo.insert_thought(alice.id, "same-instant", base + Duration::seconds(1))
            .unwrap();

        let texts: Vec<String> = repo
            .get_thoughts_by_user(alice.id)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["same-instant", "second", "first"]);
    }

    #[test]
    fn test_execute_raw_query_returns_columns_and_rows() {
        let repo = repo();
        let alice = add_user(&repo, "alice");
        repo.insert_thought(alice.id, "hello", Utc::now()).unwrap();

        let result = repo
            .execute_raw_query("SELECT id, text FROM users_thought WHERE id = 1")
            .unwrap();
        assert_eq!(result.columns, vec!["id", "text"]);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0][0], serde_json::json!(1));
        assert_eq!(result.rows[0][1], serde_json::json!("hello"));

        let empty = repo
            .execute_raw_query("SELECT id, text FROM users_thought WHERE id = 42")
            .unwrap();
        assert_eq!(empty.row_count, 0);
        assert_eq!(empty.columns, vec!["id", "text"]);
    }

    #[test]
    fn test_malformed_raw_query_is_an_error() {
        let repo = repo();
        assert!(repo
            .execute_raw_query("SELECT id, text FROM users_thought WHERE id = '")
            .is_err());
    }

    #[test]
    fn test_session_flash_roundtrip() {
        let repo = repo();
        let alice = add_user(&repo, "alice");
        let now = Utc::now();
        repo.insert_session(&Session {
            token_hash: "t1".to_string(),
            user_id: alice.id,
            created_at: now,
            expires_at: now + Duration::hours(1),
            flash: Vec::new(),
        })
        .unwrap();

        let pushed = repo
            .update_session_flash("t1", |pending| pending.push(Flash::success("saved")))
            .unwrap();
        assert_eq!(pushed, Some(()));
        assert_eq!(repo.update_session_flash("missing", |_| ()).unwrap(), None);
        let session = repo.get_session("t1").unwrap().unwrap();
        assert_eq!(session.flash, vec![Flash::success("saved")]);
        assert_eq!(repo.count_live_sessions(now).unwrap(), 1);

        assert_eq!(repo.delete_expired_sessions(now + Duration::hours(2)).unwrap(), 1);
        assert!(repo.get_session("t1").unwrap().is_none());
    }

    #[test]
    fn test_delete_user_cascades() {
        let repo = repo();
        let alice = add_user(&repo, "alice");
        let bob = add_user(&repo, "bob");
        repo.insert_profile(alice.id).unwrap();
        repo.insert_profile(bob.id).unwrap();
        repo.insert_thought(alice.id, "mine", Utc::now()).unwrap();
        repo.insert_thought(bob.id, "bob's", Utc::now()).unwrap();

        assert!(repo.delete_user(alice.id).unwrap());
        assert!(repo.get_user_by_id(alice.id).unwrap().is_none());
        assert!(repo.get_profile_by_user(alice.id).unwrap().is_none());
        assert!(repo.get_thoughts_by_user(alice.id).unwrap().is_empty());

        assert_eq!(repo.get_thoughts_by_user(bob.id).unwrap().len(), 1);
        assert!(!repo.delete_user(alice.id).unwrap());
    }
}
