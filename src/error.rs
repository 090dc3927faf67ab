use crate::Discrete;
use thiserror::Error;

/// The transition model handed to the solver is not a valid finite MDP.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedModelError {
    #[error("model must have at least one state and one action (n_s: {n_s}, n_a: {n_a})")]
    Empty { n_s: usize, n_a: usize },

    #[error("expected {expected} states in transition table, found {found}")]
    StateCount { expected: usize, found: usize },

    #[error("state {state}: expected {expected} actions in transition table, found {found}")]
    ActionCount {
        state: Discrete,
        expected: usize,
        found: usize,
    },

    #[error("no outcomes for (state: {state}, action: {action})")]
    MissingOutcomes { state: Discrete, action: Discrete },

    #[error("(state: {state}, action: {action}) is out of bounds (n_s: {n_s}, n_a: {n_a})")]
    PairOutOfRange {
        state: Discrete,
        action: Discrete,
        n_s: usize,
        n_a: usize,
    },

    #[error("(state: {state}, action: {action}) leads to state {next_state}, but n_s is {n_s}")]
    NextStateOutOfRange {
        state: Discrete,
        action: Discrete,
        next_state: Discrete,
        n_s: usize,
    },

    #[error("(state: {state}, action: {action}) has invalid probability {probability}")]
    InvalidProbability {
        state: Discrete,
        action: Discrete,
        probability: f64,
    },

    #[error("(state: {state}, action: {action}) has non-finite reward {reward}")]
    InvalidReward {
        state: Discrete,
        action: Discrete,
        reward: f64,
    },

    #[error("(state: {state}, action: {action}) probabilities sum to {sum}, expected 1")]
    ProbabilitySum {
        state: Discrete,
        action: Discrete,
        sum: f64,
    },

    #[error("invalid map description: {0}")]
    InvalidMap(String),
}

/// The policy evaluation linear system could not be solved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("gamma must be in [0, 1) for (I - gamma * P) to be invertible, got {gamma}")]
    Gamma { gamma: f64 },

    #[error("(I - gamma * P) is singular for a {n_s} state system")]
    Singular { n_s: usize },

    #[error("policy evaluation produced a non-finite value at state {state}")]
    NonFinite { state: Discrete },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("gamma must be in [0, 1), got {0}")]
    Gamma(f64),

    #[error("max_iterations must be at least 1")]
    MaxIterations,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyIterationError {
    #[error(transparent)]
    MalformedModel(#[from] MalformedModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("policy has {found} entries for {n_s} states, or an action index >= {n_a}")]
    InvalidPolicy { found: usize, n_s: usize, n_a: usize },

    #[error("value function has {found} entries, expected {n_s}")]
    InvalidValueFunction { found: usize, n_s: usize },
}

pub type Result<T> = std::result::Result<T, PolicyIterationError>;
