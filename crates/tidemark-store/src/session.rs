//! SQLite session factory

use crate::StoreError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tidemark_domain::dialect::{self, SqlDialect};
use tidemark_domain::SessionFactory;

/// Default time a session waits on a locked database before failing
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens SQLite connections to one database file
///
/// Each [`open`](SessionFactory::open) creates a fresh connection, so
/// `:memory:` gives every session its own empty database.
///
/// # Thread Safety
///
/// The factory is shared freely; connections are not, and each run owns
/// the connection it opened.
#[derive(Debug, Clone)]
pub struct SqliteSessionFactory {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteSessionFactory {
    /// Create a factory for the database file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Create a factory from a `jdbc:sqlite:<path>` connection string
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark_store::SqliteSessionFactory;
    ///
    /// let factory = SqliteSessionFactory::from_url("jdbc:sqlite:/tmp/history.db").unwrap();
    /// assert_eq!(factory.path().to_str(), Some("/tmp/history.db"));
    ///
    /// assert!(SqliteSessionFactory::from_url("jdbc:postgresql://db/app").is_err());
    /// ```
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let dialect = SqlDialect::from_url(url)
            .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;

        if dialect != SqlDialect::Sqlite {
            return Err(StoreError::UnsupportedDialect(dialect.to_string()));
        }

        let target = dialect::connection_target(url)
            .filter(|target| !target.is_empty())
            .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;

        Ok(Self::new(target))
    }

    /// Set how long a session waits on a locked database
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionFactory for SqliteSessionFactory {
    type Session = Connection;
    type Error = StoreError;

    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}
