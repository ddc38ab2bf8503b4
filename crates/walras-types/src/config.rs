//! Configuration of a clearing run.

use serde::{Deserialize, Serialize};

use crate::{Result, WalrasError, constants};

/// Tuning knobs for the clearing loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearingConfig {
    /// Hard round limit. `None` derives it as `round_bound_factor · n²`.
    pub max_rounds: Option<usize>,
    /// Multiplier of the derived bound.
    pub round_bound_factor: usize,
    /// Seed each round's matching with the previous round's still-preferred
    /// edges instead of matching from scratch.
    pub warm_start: bool,
}

impl Default for ClearingConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            round_bound_factor: constants::DEFAULT_ROUND_BOUND_FACTOR,
            warm_start: false,
        }
    }
}

impl ClearingConfig {
    /// Fixed round limit, regardless of market size.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    /// Round limit for a market of `n` buyers.
    #[must_use]
    pub fn round_bound(&self, n: usize) -> usize {
        self.max_rounds.unwrap_or_else(|| {
            self.round_bound_factor
                .saturating_mul(n)
                .saturating_mul(n)
                .max(1)
        })
    }

    /// # Errors
    /// [`WalrasError::Configuration`] for a zero bound or factor.
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == Some(0) {
            return Err(WalrasError::Configuration(
                "max_rounds must be at least 1".into(),
            ));
        }
        if self.max_rounds.is_none() && self.round_bound_factor == 0 {
            return Err(WalrasError::Configuration(
                "round_bound_factor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
