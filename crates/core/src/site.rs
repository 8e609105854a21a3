use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the external portals the dashboard scrapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Task,
    Vacation,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Task => "task",
            Site::Vacation => "vacation",
        }
    }

    /// Env prefix of the site's credential keys.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Site::Task => "TASK",
            Site::Vacation => "VACATION",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" | "tasks" => Ok(Site::Task),
            "vacation" | "vacations" => Ok(Site::Vacation),
            other => Err(ConfigError::UnknownSite(other.to_string())),
        }
    }
}
