//! Scheduler configuration.

use super::{ConfigError, TIERS};
use crate::machine::TRIGGER_RETRIES;
use serde::{Deserialize, Serialize};

/// One step of a scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStep {
    /// Cycle every tiny machine once.
    Tiny,
    /// Walk one priority tier once.
    Tier(u8),
}

/// Tunables for a [`Factory`](super::Factory).
///
/// The default reproduces the classic weighting: per pass tier 1 is walked
/// eight times, tier 2 four times, tier 3 twice, tier 4 and tier 0 once,
/// and the tiny machines five times.
///
/// ```rust
/// use automata::factory::{FactoryConfig, ScheduleStep};
///
/// let config = FactoryConfig::from_json(
///     r#"{ "trigger_retries": 4, "schedule": ["tiny", { "tier": 1 }, { "tier": 0 }] }"#,
/// ).unwrap();
/// assert_eq!(config.trigger_retries, 4);
/// assert_eq!(config.schedule[1], ScheduleStep::Tier(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Attempts `trigger` makes on each machine before dropping an event.
    pub trigger_retries: u8,
    /// Steps of one scheduling pass, in order.
    pub schedule: Vec<ScheduleStep>,
}

impl FactoryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_retries == 0 {
            return Err(ConfigError::ZeroRetryBudget);
        }
        if self.schedule.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        for (step, entry) in self.schedule.iter().enumerate() {
            if let ScheduleStep::Tier(tier) = *entry {
                if usize::from(tier) >= TIERS {
                    return Err(ConfigError::TierOutOfRange { step, tier });
                }
            }
        }
        Ok(())
    }

    /// How often one pass walks `step`.
    pub fn visits(&self, step: ScheduleStep) -> usize {
        self.schedule.iter().filter(|s| **s == step).count()
    }
}

impl Default for FactoryConfig {
    #[rustfmt::skip]
    fn default() -> Self {
        use ScheduleStep::{Tier, Tiny};
        Self {
            trigger_retries: TRIGGER_RETRIES,
            schedule: vec![
                Tiny, Tier(1), Tier(2), Tier(1), Tier(2),
                Tiny, Tier(1), Tier(3), Tier(1), Tier(4),
                Tiny, Tier(1), Tier(2), Tier(1), Tier(3),
                Tiny, Tier(1), Tier(2), Tier(1), Tier(0),
                Tiny,
            ],
        }
    }
}
