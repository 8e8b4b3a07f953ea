//! Tidemark Storage Layer
//!
//! SQLite implementation of the session and executor seams defined in
//! `tidemark-domain`.
//!
//! # Architecture
//!
//! - [`SqliteSessionFactory`] opens one `rusqlite::Connection` per cleanup run
//! - [`SqliteCleaner`] deletes rows from the table named by a [`TableTarget`]
//!   according to a time-window or quota policy
//! - Connections run in autocommit mode, so every deletion batch commits on
//!   its own and survives a later failure
//!
//! # Examples
//!
//! ```no_run
//! use tidemark_domain::{CleanupExecutor, SessionFactory, TimeWindowPolicy};
//! use tidemark_store::{SqliteCleaner, SqliteSessionFactory, TableTarget};
//!
//! let factory = SqliteSessionFactory::from_url("jdbc:sqlite:/var/lib/tidemark/history.db").unwrap();
//! let mut conn = factory.open().unwrap();
//!
//! let target = TableTarget::new("position_log", "recorded_at");
//! let policy = TimeWindowPolicy::keep_days("0 0 3 * * ?", 30).into();
//!
//! let report = SqliteCleaner::new().exec(&mut conn, &policy, &target).unwrap();
//! println!("deleted {} rows", report.rows_deleted);
//! ```

#![warn(missing_docs)]

mod cleaner;
mod error;
mod session;
mod target;

pub use cleaner::SqliteCleaner;
pub use error::StoreError;
pub use session::SqliteSessionFactory;
pub use target::{TableTarget, DEFAULT_BATCH_ROWS};
