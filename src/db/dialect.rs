use std::fmt;

/// SQL dialect of the connected engine.
///
/// Only identifier quoting differs between the supported engines as far as
/// generated statements are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
    Sqlite,
}

impl SqlDialect {
    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote_ident(&self, ident: &str) -> String {
        let quote = match self {
            SqlDialect::MySql => '`',
            SqlDialect::Postgres | SqlDialect::Sqlite => '"',
        };
        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(quote);
        for c in ident.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }

    /// Quote a `schema.table` pair.
    pub fn qualified(&self, schema: &str, table: &str) -> String {
        format!("{}.{}", self.quote_ident(schema), self.quote_ident(table))
    }

    /// Bind placeholder for the `n`th parameter (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${n}"),
            SqlDialect::MySql | SqlDialect::Sqlite => "?".to_string(),
        }
    }

    /// `INSERT` with one placeholder per column. No columns means a row of
    /// defaults.
    pub fn insert_statement(&self, schema: &str, table: &str, columns: &[&str]) -> String {
        let target = self.qualified(schema, table);
        if columns.is_empty() {
            return match self {
                SqlDialect::MySql => format!("INSERT INTO {target} () VALUES ()"),
                SqlDialect::Postgres | SqlDialect::Sqlite => {
                    format!("INSERT INTO {target} DEFAULT VALUES")
                }
            };
        }

        let names: Vec<String> = columns.iter().map(|c| self.quote_ident(c)).collect();
        let params: Vec<String> = (1..=columns.len()).map(|n| self.placeholder(n)).collect();
        format!(
            "INSERT INTO {target} ({}) VALUES ({})",
            names.join(", "),
            params.join(", ")
        )
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}
