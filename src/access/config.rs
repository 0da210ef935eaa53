//! Engine configuration.
//!
//! [`EngineConfig`] is the typed configuration a [`DecisionEngine`] is built
//! with. [`EngineSettings`] is its loose serialized form, where the strategy
//! may be a name or a numeric code and every field is optional.
//!
//! [`DecisionEngine`]: crate::access::DecisionEngine

use crate::core::{DecisionError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How individual verdicts are combined into one decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Grant as soon as any voter grants
    #[default]
    Affirmative,
    /// Grant if more voters grant than deny
    Consensus,
    /// Grant only if no voter denies any attribute
    Unanimous,
}

impl Strategy {
    /// Numeric code used in settings files.
    pub fn code(&self) -> u8 {
        match self {
            Strategy::Affirmative => 0,
            Strategy::Consensus => 1,
            Strategy::Unanimous => 2,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Affirmative => write!(f, "affirmative"),
            Strategy::Consensus => write!(f, "consensus"),
            Strategy::Unanimous => write!(f, "unanimous"),
        }
    }
}

impl FromStr for Strategy {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "affirmative" => Ok(Strategy::Affirmative),
            "consensus" => Ok(Strategy::Consensus),
            "unanimous" => Ok(Strategy::Unanimous),
            _ => Err(DecisionError::InvalidStrategy(s.to_string())),
        }
    }
}

impl TryFrom<i64> for Strategy {
    type Error = DecisionError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Strategy::Affirmative),
            1 => Ok(Strategy::Consensus),
            2 => Ok(Strategy::Unanimous),
            _ => Err(DecisionError::InvalidStrategy(code.to_string())),
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = DecisionError;

    fn try_from(code: u8) -> Result<Self> {
        Strategy::try_from(i64::from(code))
    }
}

/// Typed engine configuration. Fixed once the engine is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Aggregation strategy
    pub strategy: Strategy,
    /// Decision when every voter abstains
    pub allow_if_all_abstain: bool,
    /// Consensus decision when grants and denials tie
    pub allow_if_equal_granted_denied: bool,
}

impl EngineConfig {
    /// Create a config for `strategy` with default tie-breaks.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Set the all-abstain decision.
    pub fn with_allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.allow_if_all_abstain = allow;
        self
    }

    /// Set the consensus tie decision.
    pub fn with_allow_if_equal_granted_denied(mut self, allow: bool) -> Self {
        self.allow_if_equal_granted_denied = allow;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Affirmative,
            allow_if_all_abstain: false,
            allow_if_equal_granted_denied: true,
        }
    }
}

/// A strategy as written in settings: a name or a numeric code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategySetting {
    /// Numeric code, see [`Strategy::code`]
    Code(i64),
    /// Strategy name, e.g. `"consensus"`
    Name(String),
}

impl StrategySetting {
    /// Resolve to a [`Strategy`].
    pub fn resolve(&self) -> Result<Strategy> {
        match self {
            StrategySetting::Code(code) => Strategy::try_from(*code),
            StrategySetting::Name(name) => name.parse(),
        }
    }
}

/// Serialized engine settings.
///
/// ```json
/// { "strategy": "consensus", "allow_if_equal_granted_denied": false }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Aggregation strategy, defaults to affirmative
    pub strategy: Option<StrategySetting>,
    /// Decision when every voter abstains, defaults to `false`
    pub allow_if_all_abstain: Option<bool>,
    /// Consensus tie decision, defaults to `true`
    pub allow_if_equal_granted_denied: Option<bool>,
}

impl EngineSettings {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate and fill in defaults.
    pub fn into_config(self) -> Result<EngineConfig> {
        let defaults = EngineConfig::default();
        let strategy = match self.strategy {
            Some(setting) => setting.resolve()?,
            None => defaults.strategy,
        };

        Ok(EngineConfig {
            strategy,
            allow_if_all_abstain: self
                .allow_if_all_abstain
                .unwrap_or(defaults.allow_if_all_abstain),
            allow_if_equal_granted_denied: self
                .allow_if_equal_granted_denied
                .unwrap_or(defaults.allow_if_equal_granted_denied),
        })
    }
}

impl From<EngineConfig> for EngineSettings {
    fn from(config: EngineConfig) -> Self {
        Self {
            strategy: Some(StrategySetting::Name(config.strategy.to_string())),
            allow_if_all_abstain: Some(config.allow_if_all_abstain),
            allow_if_equal_granted_denied: Some(config.allow_if_equal_granted_denied),
        }
    }
}
