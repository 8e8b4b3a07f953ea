//! Dialect command implementation.

use crate::cli::DialectArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tidemark_domain::SqlDialect;

/// Resolve the dialect of a connection URL.
pub fn resolve(url: &str) -> Result<SqlDialect> {
    SqlDialect::from_url(url).ok_or_else(|| {
        CliError::InvalidInput(format!("'{}' is not a jdbc:<dialect>:... URL", url))
    })
}

/// Execute the dialect command.
pub fn execute_dialect(args: DialectArgs, formatter: &Formatter) -> Result<()> {
    let dialect = resolve(&args.url)?;
    println!("{}", formatter.success(dialect.as_str()));
    Ok(())
}
