use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "column", rename_all = "snake_case")]
pub enum Classification {
    /// A single creation column was identified
    Resolved(String),
    /// The table has no eligible date/time column
    NoCandidates,
    /// Metadata could not be read, or no MIN probe produced a value
    Unavailable,
    /// The database connection was lost, so no later table can be read either
    ConnectionLost,
    /// The run was cancelled while this table was being classified
    Cancelled,
}

impl Classification {
    /// The classified column, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Classification::Resolved(column) => Some(column),
            _ => None,
        }
    }

    pub fn into_column(self) -> Option<String> {
        match self {
            Classification::Resolved(column) => Some(column),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Resolved(column) => write!(f, "resolved ({column})"),
            Classification::NoCandidates => write!(f, "no_candidates"),
            Classification::Unavailable => write!(f, "unavailable"),
            Classification::ConnectionLost => write!(f, "connection_lost"),
            Classification::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A rendered DELETE statement for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionStatement {
    pub table_name: String,
    pub column_name: String,
    pub cutoff_date: NaiveDate,
    /// Full statement text, terminated by `;`
    pub text: String,
}

/// A table that did not get a statement, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table_name: String,
    pub reason: Classification,
}

/// Per-schema collection of deletion statements, in table processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDeletionPlan {
    pub schema: String,
    pub cutoff_date: NaiveDate,
    statements: Vec<DeletionStatement>,
    #[serde(default)]
    pub skipped: Vec<SkippedTable>,
}

impl SchemaDeletionPlan {
    pub fn new(schema: impl Into<String>, cutoff_date: NaiveDate) -> Self {
        Self {
            schema: schema.into(),
            cutoff_date,
            statements: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append a statement. A second statement for the same table replaces
    /// the first in place so that a table maps to exactly one statement.
    pub fn insert(&mut self, statement: DeletionStatement) {
        match self
            .statements
            .iter_mut()
            .find(|s| s.table_name == statement.table_name)
        {
            Some(existing) => *existing = statement,
            None => self.statements.push(statement),
        }
    }

    pub fn skip(&mut self, table_name: impl Into<String>, reason: Classification) {
        self.skipped.push(SkippedTable {
            table_name: table_name.into(),
            reason,
        });
    }

    pub fn get(&self, table_name: &str) -> Option<&DeletionStatement> {
        self.statements.iter().find(|s| s.table_name == table_name)
    }

    /// Statements in insertion order.
    pub fn statements(&self) -> &[DeletionStatement] {
        &self.statements
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|s| s.table_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
