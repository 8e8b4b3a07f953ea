//! SQL dialect detection from connection strings
//!
//! Connection strings follow the `jdbc:<dialect>:<rest>` convention used by
//! existing deployments' configuration files.

/// Scheme prefix every recognised connection string starts with
pub const CONNECTION_SCHEME: &str = "jdbc:";

/// SQL vendor family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    /// PostgreSQL
    Postgresql,
    /// MySQL / MariaDB
    Mysql,
    /// Oracle
    Oracle,
    /// Microsoft SQL Server
    Sqlserver,
    /// SQLite
    Sqlite,
    /// H2
    H2,
    /// Anything else, kept verbatim
    Other(String),
}

impl SqlDialect {
    /// Resolve the dialect of a connection string
    ///
    /// Returns `None` when the string is unparseable.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark_domain::SqlDialect;
    ///
    /// assert_eq!(SqlDialect::from_url("jdbc:sqlite:/tmp/history.db"), Some(SqlDialect::Sqlite));
    /// assert_eq!(SqlDialect::from_url("postgres://localhost/db"), None);
    /// ```
    pub fn from_url(url: &str) -> Option<Self> {
        dialect_token(url).map(Self::from_token)
    }

    /// Map a dialect token to a dialect
    pub fn from_token(token: &str) -> Self {
        match token {
            "postgresql" => SqlDialect::Postgresql,
            "mysql" => SqlDialect::Mysql,
            "oracle" => SqlDialect::Oracle,
            "sqlserver" => SqlDialect::Sqlserver,
            "sqlite" => SqlDialect::Sqlite,
            "h2" => SqlDialect::H2,
            other => SqlDialect::Other(other.to_string()),
        }
    }

    /// Dialect token as it appears in a connection string
    pub fn as_str(&self) -> &str {
        match self {
            SqlDialect::Postgresql => "postgresql",
            SqlDialect::Mysql => "mysql",
            SqlDialect::Oracle => "oracle",
            SqlDialect::Sqlserver => "sqlserver",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::H2 => "h2",
            SqlDialect::Other(token) => token,
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialect token between the first two `:` separators
///
/// `None` if `url` does not start with [`CONNECTION_SCHEME`] or has no
/// second separator.
pub fn dialect_token(url: &str) -> Option<&str> {
    let rest = url.strip_prefix(CONNECTION_SCHEME)?;
    let end = rest.find(':')?;
    Some(&rest[..end])
}

/// Everything after the dialect token (`jdbc:sqlite:/a/b.db` -> `/a/b.db`)
pub fn connection_target(url: &str) -> Option<&str> {
    let rest = url.strip_prefix(CONNECTION_SCHEME)?;
    let end = rest.find(':')?;
    Some(&rest[end + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_token() {
        assert_eq!(dialect_token("jdbc:postgresql://localhost:5432/app"), Some("postgresql"));
        assert_eq!(dialect_token("jdbc:mysql://db:3306/app"), Some("mysql"));
        assert_eq!(dialect_token("jdbc:h2:mem:test"), Some("h2"));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(dialect_token("postgresql://localhost/app"), None);
        assert_eq!(dialect_token("jdbc:sqlite"), None);
        assert_eq!(dialect_token(""), None);
    }

    #[test]
    fn test_known_and_other_dialects() {
        assert_eq!(SqlDialect::from_url("jdbc:sqlserver://host;db=x"), Some(SqlDialect::Sqlserver));
        assert_eq!(SqlDialect::from_url("jdbc:oracle:thin:@host"), Some(SqlDialect::Oracle));
        assert_eq!(
            SqlDialect::from_url("jdbc:db2://host:50000/x"),
            Some(SqlDialect::Other("db2".to_string()))
        );
        assert_eq!(SqlDialect::Other("db2".into()).to_string(), "db2");
    }

    #[test]
    fn test_connection_target() {
        assert_eq!(connection_target("jdbc:sqlite:/var/lib/x.db"), Some("/var/lib/x.db"));
        assert_eq!(connection_target("jdbc:sqlite::memory:"), Some(":memory:"));
        assert_eq!(connection_target("sqlite:/x.db"), None);
    }
}
