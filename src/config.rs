use crate::{error::ConfigError, Continous};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAMMA: Continous = 0.95;
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Options recognized by a policy iteration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Discount factor, in [0, 1).
    pub gamma: Continous,
    /// Hard iteration budget.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    pub fn new(gamma: Continous, max_iterations: usize) -> Self {
        Self {
            gamma,
            max_iterations,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Also rejects NaN.
        if !(0. ..1.).contains(&self.gamma) {
            return Err(ConfigError::Gamma(self.gamma));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::MaxIterations);
        }

        Ok(())
    }
}
