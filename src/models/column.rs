use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Coarse temporal classification of a column's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalType {
    /// Calendar date without a time component
    Date,
    /// Datetime or timestamp, with or without time zone
    DateTime,
    Other,
}

impl TemporalType {
    /// Classify a declared type name as reported by a catalog.
    ///
    /// Accepts the spellings used by information_schema on PostgreSQL and
    /// MySQL as well as SQLite's free-form declared types.
    pub fn from_declared(declared: &str) -> Self {
        let lower = declared.trim().to_ascii_lowercase();
        if lower.contains("timestamp") || lower.contains("datetime") {
            TemporalType::DateTime
        } else if lower.contains("date") {
            TemporalType::Date
        } else {
            TemporalType::Other
        }
    }

    pub fn is_temporal(&self) -> bool {
        !matches!(self, TemporalType::Other)
    }
}

/// A date/time column as returned by the metadata reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: TemporalType,
    /// Type name exactly as the catalog reported it
    pub declared_type: String,
    pub is_nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, is_nullable: bool) -> Self {
        let declared_type = declared_type.into();
        Self {
            name: name.into(),
            data_type: TemporalType::from_declared(&declared_type),
            declared_type,
            is_nullable,
        }
    }
}

/// Full column metadata, used by the CRUD smoke test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub default: Option<String>,
}

impl ColumnMetadata {
    /// Whether the column has a non-empty default expression.
    pub fn has_default(&self) -> bool {
        self.default.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// A value read back from a date or datetime column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalValue {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl TemporalValue {
    /// Common representation for comparison: a date is midnight on that date.
    pub fn normalized(&self) -> NaiveDateTime {
        match self {
            TemporalValue::Date(d) => d.and_time(NaiveTime::MIN),
            TemporalValue::DateTime(dt) => *dt,
        }
    }

    /// Parse the textual forms engines hand back for date/time values.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(TemporalValue::DateTime(dt));
            }
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
            return Some(TemporalValue::DateTime(dt.naive_utc()));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(TemporalValue::Date)
    }
}

/// Earliest value found for one candidate column during tie-break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarliestValueSample {
    pub column_name: String,
    pub earliest: Option<NaiveDateTime>,
}
