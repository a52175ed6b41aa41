//! Machine configuration, usually authored outside of code.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```rust
//! use xtension_fsm::MachineConfig;
//!
//! let config = MachineConfig::from_json(r#"{ "initial_state": "Idle" }"#).unwrap();
//! assert_eq!(config.initial_state.as_deref(), Some("Idle"));
//! assert_eq!(config.stack.capacity, 3);
//! assert!(!config.stack.flush_when_full);
//! ```

use crate::core::{StackPolicy, StateStack};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid machine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// History stack settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Record previous states at all.
    pub enabled: bool,
    /// Maximum number of recorded states. Zero disables recording.
    pub capacity: usize,
    /// Clear the whole stack when full instead of dropping the oldest entry.
    pub flush_when_full: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 3,
            flush_when_full: false,
        }
    }
}

impl StackConfig {
    pub fn policy(&self) -> StackPolicy {
        if self.flush_when_full {
            StackPolicy::Flush
        } else {
            StackPolicy::Evict
        }
    }

    pub fn build_stack(&self) -> StateStack {
        StateStack::new(self.enabled, self.capacity, self.policy())
    }
}

/// Everything about a machine that is data rather than behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Name of the state entered on initialization.
    pub initial_state: Option<String>,
    pub stack: StackConfig,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
