//! Tidemark Domain Layer
//!
//! This crate contains the retention policy model and the trait interfaces
//! that the rest of Tidemark depends upon. It carries no I/O of its own:
//! sessions, schedules and deletion statements live in other crates.
//!
//! ## Key Concepts
//!
//! - **Retention window**: how long data is kept before it becomes eligible
//!   for deletion ([`TimeWindowPolicy`])
//! - **Quota**: a byte-size ceiling on a dataset's storage footprint
//!   ([`QuotaPolicy`])
//! - **Eviction batch**: the amount of data targeted by one quota pass
//! - **Cutoff instant**: data strictly older than this is eligible for
//!   time-based deletion
//! - **Dialect**: the SQL vendor family inferred from a connection string
//!
//! ## Architecture
//!
//! - Policies are immutable values; reconfiguration replaces the whole value
//! - Validation is performed by `tidemark-gatekeeper` through [`traits::ValidationSink`]
//! - Deletion is performed by a [`traits::CleanupExecutor`] implementation
//!   against a session opened from a [`traits::SessionFactory`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dialect;
pub mod error;
pub mod kind;
pub mod policy;
pub mod quota;
pub mod time_window;
pub mod traits;

// Re-exports for convenience
pub use dialect::SqlDialect;
pub use error::{BoxError, ConfigError, ExecutionError};
pub use kind::PolicyKind;
pub use policy::{CleanupPolicy, RetentionPolicy};
pub use quota::{QuotaPolicy, BYTES_PER_MEGABYTE};
pub use time_window::TimeWindowPolicy;
pub use traits::{CleanupExecutor, CleanupReport, SessionFactory, ValidationSink};
