//! Command implementations.

pub mod check;
pub mod daemon;
pub mod dialect;
pub mod run_once;

pub use self::check::execute_check;
pub use self::daemon::execute_daemon;
pub use self::dialect::execute_dialect;
pub use self::run_once::execute_run_once;
