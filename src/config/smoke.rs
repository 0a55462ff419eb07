use serde::{Deserialize, Serialize};

use super::ConfigError;

/// CRUD smoke test settings.
///
/// Nothing runs unless both a schema and at least one table are given,
/// either here or on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmokeConfig {
    /// Schema holding the tables.
    #[serde(default)]
    pub schema: Option<String>,

    /// Tables to exercise, in order.
    #[serde(default)]
    pub tables: Vec<String>,

    /// Seed for the fake-data generator. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SmokeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "smoke.schema cannot be empty".into(),
            ));
        }
        if self.tables.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "smoke.tables cannot contain empty names".into(),
            ));
        }
        Ok(())
    }
}
