use serde::{Deserialize, Serialize};

use crate::errors::{Result, SimulationError};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// decimal places kept on EMI and interest. 0 means whole currency units.
    pub currency_scale: u32,
    /// the generator gives up after `multiplier x term_months` months
    pub iteration_limit_multiplier: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_scale: 0,
            iteration_limit_multiplier: 3,
        }
    }
}

impl EngineConfig {
    /// config that keeps two decimal places (paise, cents)
    pub fn with_minor_units() -> Self {
        Self {
            currency_scale: 2,
            ..Self::default()
        }
    }

    /// parse from json; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| SimulationError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iteration_limit_multiplier == 0 {
            return Err(SimulationError::invalid(
                "config.iteration_limit_multiplier",
                "must be at least 1",
            ));
        }
        if self.currency_scale > 8 {
            return Err(SimulationError::invalid(
                "config.currency_scale",
                format!("at most 8 decimal places supported, got {}", self.currency_scale),
            ));
        }
        Ok(())
    }

    /// month cap for a loan of the given tenure
    pub fn iteration_limit(&self, term_months: u32) -> u32 {
        term_months.saturating_mul(self.iteration_limit_multiplier)
    }
}
