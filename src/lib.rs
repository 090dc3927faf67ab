//! Optimal policies for finite MDPs by policy iteration.
//!
//! Exact policy evaluation solves `(I - gamma * P_pi) V = R_pi` directly,
//! improvement is greedy on Q with ties going to the lowest action, and the
//! driver stops once no action changes or the iteration budget runs out.

pub mod config;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod report;

pub type Discrete = usize;
pub type Continous = f64;

pub use config::SolverConfig;
pub use error::{ConfigError, MalformedModelError, PolicyIterationError, SolverError};
pub use mdps::{
    mdp::{Mdp, Outcome, TabularMdp, Transitions},
    mdp_solver::MdpSolver,
    solvers::{
        compute_q, evaluate, improve, run, sweep, PolicyIteration, PolicyIterationHistory,
        Termination,
    },
};
