//! SQL dialects: placeholder style and COUNT/pagination shaping.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Database family the generated SQL targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB (`?` placeholders, `LIMIT offset, size`)
    #[default]
    Mysql,
    /// PostgreSQL (`$1` placeholders, `LIMIT size OFFSET offset`)
    Postgresql,
    /// Oracle (`:1` placeholders, ROWNUM windows)
    Oracle,
}

impl Dialect {
    /// Parse a dialect name (case-insensitive), accepting common aliases.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::Mysql),
            "postgresql" | "postgres" | "pg" | "pgsql" => Some(Dialect::Postgresql),
            "oracle" => Some(Dialect::Oracle),
            _ => None,
        }
    }

    /// Parse a dialect name, falling back to MySQL for names we don't know.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(dialect = name, "Unknown dialect, falling back to mysql");
            Dialect::Mysql
        })
    }

    /// Lower-case name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgresql => "postgresql",
            Dialect::Oracle => "oracle",
        }
    }

    /// Placeholder for the `index`th (1-based) parameter.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Mysql => "?".to_string(),
            Dialect::Postgresql => format!("${index}"),
            Dialect::Oracle => format!(":{index}"),
        }
    }

    /// Wrap `sql` so it returns its row count.
    #[must_use]
    pub fn build_count_sql(&self, sql: &str) -> String {
        match self {
            Dialect::Mysql | Dialect::Postgresql => format!("SELECT COUNT(*) FROM ({sql}) AS t"),
            // Oracle rejects AS before a table alias.
            Dialect::Oracle => format!("SELECT COUNT(*) FROM ({sql}) t"),
        }
    }

    /// Turn `sql` into a derived table so outer clauses apply to its result.
    #[must_use]
    pub fn wrap_subquery(&self, sql: &str) -> String {
        match self {
            Dialect::Mysql | Dialect::Postgresql => format!("SELECT * FROM ({sql}) AS t"),
            Dialect::Oracle => format!("SELECT * FROM ({sql}) t"),
        }
    }

    /// Restrict `sql` to page `current` (1-based) of `size` rows.
    #[must_use]
    pub fn build_pagination_sql(&self, sql: &str, current: u64, size: u64) -> String {
        let offset = current.saturating_sub(1).saturating_mul(size);
        match self {
            Dialect::Mysql => format!("{sql} LIMIT {offset}, {size}"),
            Dialect::Postgresql => format!("{sql} LIMIT {size} OFFSET {offset}"),
            Dialect::Oracle => {
                let end_row = current.saturating_mul(size);
                format!(
                    "SELECT * FROM (SELECT ROWNUM AS rn, t.* FROM ({sql}) t WHERE ROWNUM <= {end_row}) WHERE rn > {offset}"
                )
            }
        }
    }

    /// Clause capping a statement at `limit` rows, including the leading space.
    #[must_use]
    pub fn limit_clause(&self, limit: u64) -> String {
        match self {
            Dialect::Mysql | Dialect::Postgresql => format!(" LIMIT {limit}"),
            Dialect::Oracle => format!(" FETCH FIRST {limit} ROWS ONLY"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Dialect::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQL: &str = "SELECT id, username FROM t_user";

    #[test]
    fn names_and_fallback() {
        assert_eq!(Dialect::from_name("MySQL"), Dialect::Mysql);
        assert_eq!(Dialect::from_name("postgres"), Dialect::Postgresql);
        assert_eq!(Dialect::from_name("PG"), Dialect::Postgresql);
        assert_eq!(Dialect::from_name("Oracle"), Dialect::Oracle);
        assert_eq!(Dialect::from_name("sqlserver"), Dialect::Mysql);
        assert_eq!(Dialect::parse("sqlserver"), None);
    }

    #[test]
    fn placeholders() {
        assert_eq!(Dialect::Mysql.placeholder(3), "?");
        assert_eq!(Dialect::Postgresql.placeholder(3), "$3");
        assert_eq!(Dialect::Oracle.placeholder(3), ":3");
    }

    #[test]
    fn count_sql() {
        assert_eq!(
            Dialect::Mysql.build_count_sql(SQL),
            "SELECT COUNT(*) FROM (SELECT id, username FROM t_user) AS t"
        );
        assert_eq!(
            Dialect::Postgresql.build_count_sql(SQL),
            "SELECT COUNT(*) FROM (SELECT id, username FROM t_user) AS t"
        );
        assert_eq!(
            Dialect::Oracle.build_count_sql(SQL),
            "SELECT COUNT(*) FROM (SELECT id, username FROM t_user) t"
        );
    }

    #[test]
    fn pagination_sql() {
        assert_eq!(
            Dialect::Mysql.build_pagination_sql(SQL, 3, 10),
            "SELECT id, username FROM t_user LIMIT 20, 10"
        );
        assert_eq!(
            Dialect::Postgresql.build_pagination_sql(SQL, 3, 10),
            "SELECT id, username FROM t_user LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            Dialect::Oracle.build_pagination_sql(SQL, 3, 10),
            "SELECT * FROM (SELECT ROWNUM AS rn, t.* FROM (SELECT id, username FROM t_user) t WHERE ROWNUM <= 30) WHERE rn > 20"
        );
    }

    #[test]
    fn subquery_wrapping() {
        assert_eq!(
            Dialect::Mysql.wrap_subquery("SELECT id FROM t_user LIMIT 1000"),
            "SELECT * FROM (SELECT id FROM t_user LIMIT 1000) AS t"
        );
        assert_eq!(
            Dialect::Oracle.wrap_subquery(SQL),
            "SELECT * FROM (SELECT id, username FROM t_user) t"
        );
    }

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(
            Dialect::Mysql.build_pagination_sql(SQL, 1, 5),
            "SELECT id, username FROM t_user LIMIT 0, 5"
        );
    }

    #[test]
    fn limit_clauses() {
        assert_eq!(Dialect::Mysql.limit_clause(1000), " LIMIT 1000");
        assert_eq!(Dialect::Oracle.limit_clause(1), " FETCH FIRST 1 ROWS ONLY");
    }

    #[test]
    fn deserializes_with_fallback() {
        let d: Dialect = serde_json::from_str("\"Postgres\"").unwrap();
        assert_eq!(d, Dialect::Postgresql);
        let d: Dialect = serde_json::from_str("\"db2\"").unwrap();
        assert_eq!(d, Dialect::Mysql);
        assert_eq!(serde_json::to_string(&Dialect::Oracle).unwrap(), "\"oracle\"");
    }
}
