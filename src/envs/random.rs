use crate::{
    error::MalformedModelError,
    mdps::mdp::{Outcome, TabularMdp},
    Continous,
};
use rand::{prelude::*, seq::index};

/// Seeded generator of dense-ish random MDPs.
///
/// Each (state, action) reaches `branching` distinct states (clamped to
/// `1..=n_s`) with random weights, paying a reward drawn from `[-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomMdp {
    pub n_s: usize,
    pub n_a: usize,
    pub branching: usize,
    pub seed: u64,
}

impl RandomMdp {
    pub fn new(n_s: usize, n_a: usize, branching: usize, seed: u64) -> Self {
        Self {
            n_s,
            n_a,
            branching,
            seed,
        }
    }

    pub fn build(&self) -> Result<TabularMdp, MalformedModelError> {
        let Self {
            n_s,
            n_a,
            branching,
            seed,
        } = *self;
        if n_s == 0 || n_a == 0 {
            return Err(MalformedModelError::Empty { n_s, n_a });
        }

        let rng = &mut StdRng::seed_from_u64(seed);
        let k = branching.clamp(1, n_s);
        let transitions: Vec<Vec<Vec<Outcome>>> = (0..n_s)
            .map(|_| {
                (0..n_a)
                    .map(|_| {
                        let next = index::sample(rng, n_s, k).into_vec();
                        let weights = (0..k)
                            .map(|_| rng.gen_range(0.01..1.))
                            .collect::<Vec<Continous>>();
                        let total: Continous = weights.iter().sum();

                        next.into_iter()
                            .zip(weights)
                            .map(|(s, w)| Outcome::new(w / total, s, rng.gen_range(-1. ..1.)))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        TabularMdp::new(n_s, n_a, transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::mdp::Mdp;

    #[test]
    fn same_seed_same_model() {
        let a = RandomMdp::new(10, 3, 4, 2718).build().unwrap();
        let b = RandomMdp::new(10, 3, 4, 2718).build().unwrap();
        let c = RandomMdp::new(10, 3, 4, 2719).build().unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn branching_is_clamped_to_state_count() {
        let mdp = RandomMdp::new(3, 2, 10, 1).build().unwrap();

        assert_eq!(mdp.outcomes(0, 0).len(), 3);
        assert_eq!(RandomMdp::new(3, 2, 0, 1).build().unwrap().outcomes(2, 1).len(), 1);
    }

    #[test]
    fn empty_spaces_are_rejected() {
        assert!(RandomMdp::new(0, 2, 1, 1).build().is_err());
    }
}
