use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Creation-column classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Case-insensitive substrings that disqualify a column from being the
    /// creation column.
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// How many MIN probes may run at once for one table.
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            probe_concurrency: default_probe_concurrency(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exclude_patterns.iter().any(|p| !p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "classifier.exclude_patterns must contain at least one non-empty pattern".into(),
            ));
        }
        if self.probe_concurrency == 0 {
            return Err(ConfigError::Validation(
                "classifier.probe_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["update".to_string()]
}

fn default_probe_concurrency() -> usize {
    1
}
