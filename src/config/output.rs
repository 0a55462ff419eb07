use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Where generated deletion scripts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for `<schema>_<date>.sql` files. Created if missing.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("./output")
}
