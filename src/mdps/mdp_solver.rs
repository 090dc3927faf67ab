use crate::{Continous, Discrete};

/// Queries over a solved MDP.
pub trait MdpSolver {
    fn v_star(&self, s: Discrete) -> Option<Continous>;

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn pi_star(&self, s: Discrete) -> Option<Discrete>;
}
