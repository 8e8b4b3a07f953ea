//! Cleanup target - which table and columns a cleanup runs against

use serde::{Deserialize, Serialize};
use tidemark_domain::ExecutionError;

/// Rows removed per DELETE statement unless configured otherwise
pub const DEFAULT_BATCH_ROWS: u32 = 1000;

/// Table a [`SqliteCleaner`](crate::SqliteCleaner) deletes from
///
/// The timestamp column holds milliseconds since the Unix epoch. The table
/// must have a rowid (no `WITHOUT ROWID`); rowid order breaks timestamp ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTarget {
    /// Table name
    pub table: String,

    /// Column holding the row timestamp (epoch milliseconds)
    pub timestamp_column: String,

    /// Column holding each row's size in bytes, for exact quota measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_column: Option<String>,

    /// Rows removed per DELETE statement
    #[serde(default = "default_batch_rows")]
    pub batch_rows: u32,
}

fn default_batch_rows() -> u32 {
    DEFAULT_BATCH_ROWS
}

impl TableTarget {
    /// Target `table`, ordering rows by `timestamp_column`
    pub fn new(table: impl Into<String>, timestamp_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            timestamp_column: timestamp_column.into(),
            size_column: None,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }

    /// Measure occupancy exactly by summing `column`
    pub fn with_size_column(mut self, column: impl Into<String>) -> Self {
        self.size_column = Some(column.into());
        self
    }

    /// Remove at most `rows` rows per DELETE statement
    pub fn with_batch_rows(mut self, rows: u32) -> Self {
        self.batch_rows = rows;
        self
    }

    /// Quoted identifiers, checked before they are spliced into SQL
    pub(crate) fn idents(&self) -> Result<Idents, ExecutionError> {
        if self.batch_rows == 0 {
            return Err(ExecutionError::InvalidTarget(format!(
                "batch_rows for table {} must be positive",
                self.table
            )));
        }

        Ok(Idents {
            table: quote_ident(&self.table)?,
            timestamp: quote_ident(&self.timestamp_column)?,
            size: self.size_column.as_deref().map(quote_ident).transpose()?,
        })
    }
}

/// Quoted identifiers of a checked [`TableTarget`]
#[derive(Debug)]
pub(crate) struct Idents {
    pub table: String,
    pub timestamp: String,
    pub size: Option<String>,
}

/// Quote a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`)
fn quote_ident(name: &str) -> Result<String, ExecutionError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(ExecutionError::InvalidTarget(format!(
            "'{}' is not a plain SQL identifier",
            name
        )));
    }

    Ok(format!("\"{}\"", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("position_log").unwrap(), "\"position_log\"");
        assert_eq!(quote_ident("_t1").unwrap(), "\"_t1\"");
        assert!(quote_ident("").is_err());
        assert!(quote_ident("1table").is_err());
        assert!(quote_ident("log; DROP TABLE users").is_err());
        assert!(quote_ident("a\"b").is_err());
    }

    #[test]
    fn test_idents() {
        let target = TableTarget::new("log", "ts").with_size_column("bytes");
        let idents = target.idents().unwrap();
        assert_eq!(idents.table, "\"log\"");
        assert_eq!(idents.timestamp, "\"ts\"");
        assert_eq!(idents.size.as_deref(), Some("\"bytes\""));

        assert!(TableTarget::new("log", "ts").with_batch_rows(0).idents().is_err());
        assert!(TableTarget::new("log", "ts").with_size_column("bad col").idents().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let target: TableTarget = toml::from_str(
            r#"
            table = "position_log"
            timestamp_column = "recorded_at"
            "#,
        )
        .unwrap();
        assert_eq!(target, TableTarget::new("position_log", "recorded_at"));
        assert_eq!(target.batch_rows, DEFAULT_BATCH_ROWS);
    }
}
