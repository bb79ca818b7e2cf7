//! Factory configuration errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Schedule step {step} names tier {tier}; tiers are 0 to 4")]
    TierOutOfRange { step: usize, tier: u8 },

    #[error("Schedule has no steps")]
    EmptySchedule,

    #[error("Trigger retry budget must be at least 1")]
    ZeroRetryBudget,

    #[error("Invalid factory configuration: {0}")]
    Parse(String),
}
