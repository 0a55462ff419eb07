use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A synthetic value bound into INSERT/UPDATE statements by the smoke test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FakeValue {
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Bool(bool),
    Null,
}

impl std::fmt::Display for FakeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FakeValue::Text(s) => write!(f, "{s:?}"),
            FakeValue::Int(i) => write!(f, "{i}"),
            FakeValue::Float(v) => write!(f, "{v:.2}"),
            FakeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FakeValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            FakeValue::Bool(b) => write!(f, "{b}"),
            FakeValue::Null => write!(f, "NULL"),
        }
    }
}

/// A column/value pair for an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeColumnValue {
    pub column: String,
    pub value: FakeValue,
}

/// Key of a row inserted by the smoke test, kept in text form so that
/// integer and non-integer keys travel the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedKey(pub String);

impl std::fmt::Display for InsertedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one CRUD step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed(String),
    Skipped(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// Outcomes of the four CRUD steps against one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSmokeResult {
    pub table: String,
    pub select: StepOutcome,
    pub insert: StepOutcome,
    pub update: StepOutcome,
    pub delete: StepOutcome,
}

impl TableSmokeResult {
    pub fn skipped(table: impl Into<String>, reason: &str) -> Self {
        let skipped = StepOutcome::Skipped(reason.to_string());
        Self {
            table: table.into(),
            select: skipped.clone(),
            insert: skipped.clone(),
            update: skipped.clone(),
            delete: skipped,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.select.is_success()
            && self.insert.is_success()
            && self.update.is_success()
            && self.delete.is_success()
    }
}

/// Smoke-test results for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeReport {
    pub schema: String,
    pub tables: Vec<TableSmokeResult>,
}

impl SmokeReport {
    /// Number of tables where at least one step did not succeed.
    pub fn failures(&self) -> usize {
        self.tables.iter().filter(|t| !t.all_succeeded()).count()
    }
}
