pub mod common;
pub mod policy_evaluation;
pub mod policy_improvement;
pub mod policy_iteration;

pub use policy_evaluation::evaluate;
pub use policy_improvement::{compute_q, improve};
pub use policy_iteration::{run, sweep, PolicyIteration, PolicyIterationHistory, Termination};
