use crate::{error::MalformedModelError, Continous, Discrete};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Outcome probabilities of a (state, action) pair must sum to 1 within this.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One possible result of taking an action in a state.
///
/// Deserializes from either `{"probability": p, "next_state": s, "reward": r}`
/// or the tuple form `[p, s, r]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub probability: Continous,
    pub next_state: Discrete,
    pub reward: Continous,
}

impl Outcome {
    pub fn new(probability: Continous, next_state: Discrete, reward: Continous) -> Self {
        Self {
            probability,
            next_state,
            reward,
        }
    }
}

/// Sparse (state, action) keyed form of a transition table.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Outcome>>;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Every state offers the same `n_a` actions. States that have no
/// meaningful action (terminals) still carry `n_a` outcome lists.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    /// Ordered outcomes of taking `a` in `s`. Empty for indices out of bounds.
    fn outcomes(&self, s: Discrete, a: Discrete) -> &[Outcome];
}

/// Checks the finite MDP invariants on any [`Mdp`] implementation.
pub fn validate<M: Mdp + ?Sized>(mdp: &M) -> Result<(), MalformedModelError> {
    let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
    if n_s == 0 || n_a == 0 {
        return Err(MalformedModelError::Empty { n_s, n_a });
    }

    for (s, a) in iproduct!(0..n_s, 0..n_a) {
        let outcomes = mdp.outcomes(s, a);
        if outcomes.is_empty() {
            return Err(MalformedModelError::MissingOutcomes {
                state: s,
                action: a,
            });
        }

        let mut sum = 0.;
        for o in outcomes {
            if !o.probability.is_finite() || !(0. ..=1.).contains(&o.probability) {
                return Err(MalformedModelError::InvalidProbability {
                    state: s,
                    action: a,
                    probability: o.probability,
                });
            }
            if !o.reward.is_finite() {
                return Err(MalformedModelError::InvalidReward {
                    state: s,
                    action: a,
                    reward: o.reward,
                });
            }
            if o.next_state >= n_s {
                return Err(MalformedModelError::NextStateOutOfRange {
                    state: s,
                    action: a,
                    next_state: o.next_state,
                    n_s,
                });
            }
            sum += o.probability;
        }

        if (sum - 1.).abs() > PROBABILITY_TOLERANCE {
            return Err(MalformedModelError::ProbabilitySum {
                state: s,
                action: a,
                sum,
            });
        }
    }

    debug!(n_s, n_a, "validated transition model");
    Ok(())
}

/// Validated, immutable transition table indexed `[state][action]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTabularMdp")]
pub struct TabularMdp {
    n_s: usize,
    n_a: usize,
    transitions: Vec<Vec<Vec<Outcome>>>,
}

impl TabularMdp {
    pub fn new(
        n_s: usize,
        n_a: usize,
        transitions: Vec<Vec<Vec<Outcome>>>,
    ) -> Result<Self, MalformedModelError> {
        if n_s == 0 || n_a == 0 {
            return Err(MalformedModelError::Empty { n_s, n_a });
        }
        if transitions.len() != n_s {
            return Err(MalformedModelError::StateCount {
                expected: n_s,
                found: transitions.len(),
            });
        }
        if let Some((s, row)) = transitions
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_a)
        {
            return Err(MalformedModelError::ActionCount {
                state: s,
                expected: n_a,
                found: row.len(),
            });
        }

        let mdp = Self {
            n_s,
            n_a,
            transitions,
        };
        validate(&mdp)?;

        Ok(mdp)
    }

    /// Builds the table from a map that must cover every (state, action) pair.
    pub fn from_transitions(
        n_s: usize,
        n_a: usize,
        mut transitions: Transitions,
    ) -> Result<Self, MalformedModelError> {
        if let Some(&(state, action)) = transitions.keys().find(|(s, a)| *s >= n_s || *a >= n_a) {
            return Err(MalformedModelError::PairOutOfRange {
                state,
                action,
                n_s,
                n_a,
            });
        }

        let mut table = Vec::with_capacity(n_s);
        for s in 0..n_s {
            let mut row = Vec::with_capacity(n_a);
            for a in 0..n_a {
                let outcomes = transitions
                    .remove(&(s, a))
                    .ok_or(MalformedModelError::MissingOutcomes {
                        state: s,
                        action: a,
                    })?;
                row.push(outcomes);
            }
            table.push(row);
        }

        Self::new(n_s, n_a, table)
    }
}

impl Mdp for TabularMdp {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn outcomes(&self, s: Discrete, a: Discrete) -> &[Outcome] {
        self.transitions
            .get(s)
            .and_then(|row| row.get(a))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Deserialize)]
struct RawTabularMdp {
    n_s: usize,
    n_a: usize,
    transitions: Vec<Vec<Vec<Outcome>>>,
}

impl TryFrom<RawTabularMdp> for TabularMdp {
    type Error = MalformedModelError;

    fn try_from(raw: RawTabularMdp) -> Result<Self, Self::Error> {
        Self::new(raw.n_s, raw.n_a, raw.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;
    use rstest::*;

    fn chain() -> Vec<Vec<Vec<Outcome>>> {
        vec![
            vec![vec![Outcome::new(1., 1, 1.)]],
            vec![vec![Outcome::new(1., 1, 0.)]],
        ]
    }

    #[test]
    fn accessors_return_table_entries() {
        let mdp = TabularMdp::new(2, 1, chain()).unwrap();

        assert_eq!(mdp.n_s(), 2);
        assert_eq!(mdp.n_a(), 1);
        assert_eq!(mdp.outcomes(0, 0), &[Outcome::new(1., 1, 1.)]);
        assert!(mdp.outcomes(2, 0).is_empty());
        assert!(mdp.outcomes(0, 1).is_empty());
    }

    #[test]
    fn probabilities_summing_to_half_are_rejected() {
        let mut table = chain();
        table[0][0] = vec![Outcome::new(0.25, 1, 1.), Outcome::new(0.25, 0, 0.)];

        let err = TabularMdp::new(2, 1, table).unwrap_err();

        assert_eq!(
            err,
            MalformedModelError::ProbabilitySum {
                state: 0,
                action: 0,
                sum: 0.5
            }
        );
    }

    #[test]
    fn sums_within_tolerance_are_accepted() {
        let mut table = chain();
        table[0][0] = vec![
            Outcome::new(1. / 3., 1, 1.),
            Outcome::new(1. / 3., 0, 0.),
            Outcome::new(1. / 3., 1, 0.),
        ];

        assert!(TabularMdp::new(2, 1, table).is_ok());
    }

    #[rstest]
    #[case::next_state(Outcome::new(1., 2, 0.))]
    #[case::negative_probability(Outcome::new(-1., 1, 0.))]
    #[case::nan_probability(Outcome::new(f64::NAN, 1, 0.))]
    #[case::infinite_reward(Outcome::new(1., 1, f64::INFINITY))]
    fn bad_outcomes_are_rejected(#[case] outcome: Outcome) {
        let mut table = chain();
        table[1][0] = vec![outcome];

        assert!(TabularMdp::new(2, 1, table).is_err());
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        assert_that!(TabularMdp::new(3, 1, chain()).unwrap_err()).is_equal_to(
            MalformedModelError::StateCount {
                expected: 3,
                found: 2,
            },
        );
        assert_that!(TabularMdp::new(2, 2, chain()).unwrap_err()).is_equal_to(
            MalformedModelError::ActionCount {
                state: 0,
                expected: 2,
                found: 1,
            },
        );
        assert_that!(TabularMdp::new(0, 1, vec![]).unwrap_err())
            .is_equal_to(MalformedModelError::Empty { n_s: 0, n_a: 1 });
    }

    #[test]
    fn empty_outcome_list_is_rejected() {
        let mut table = chain();
        table[1][0].clear();

        assert_eq!(
            TabularMdp::new(2, 1, table).unwrap_err(),
            MalformedModelError::MissingOutcomes {
                state: 1,
                action: 0
            }
        );
    }

    #[test]
    fn from_transitions_requires_every_pair() {
        let transitions = Transitions::from([
            ((0, 0), vec![Outcome::new(1., 1, 1.)]),
            ((1, 0), vec![Outcome::new(1., 1, 0.)]),
        ]);
        assert!(TabularMdp::from_transitions(2, 1, transitions.clone()).is_ok());

        assert_eq!(
            TabularMdp::from_transitions(2, 2, transitions.clone()).unwrap_err(),
            MalformedModelError::MissingOutcomes {
                state: 0,
                action: 1
            }
        );

        let mut out_of_range = transitions;
        out_of_range.insert((5, 0), vec![Outcome::new(1., 0, 0.)]);
        assert_eq!(
            TabularMdp::from_transitions(2, 1, out_of_range).unwrap_err(),
            MalformedModelError::PairOutOfRange {
                state: 5,
                action: 0,
                n_s: 2,
                n_a: 1
            }
        );
    }

    #[test]
    fn json_accepts_struct_and_tuple_outcomes() {
        let json = r#"{
            "n_s": 2,
            "n_a": 1,
            "transitions": [
                [[{"probability": 1.0, "next_state": 1, "reward": 1.0}]],
                [[[1.0, 1, 0.0]]]
            ]
        }"#;

        let mdp: TabularMdp = serde_json::from_str(json).unwrap();

        assert_eq!(mdp, TabularMdp::new(2, 1, chain()).unwrap());
    }

    #[test]
    fn json_runs_validation() {
        let json = r#"{"n_s": 2, "n_a": 1, "transitions": [[[[0.5, 1, 1.0]]], [[[1.0, 1, 0.0]]]]}"#;

        let err = serde_json::from_str::<TabularMdp>(json).unwrap_err();

        assert!(err.to_string().contains("probabilities sum to 0.5"));
    }

    #[test]
    fn json_round_trips_through_serialize() {
        let mdp = TabularMdp::new(2, 1, chain()).unwrap();

        let json = serde_json::to_string(&mdp).unwrap();

        assert_eq!(serde_json::from_str::<TabularMdp>(&json).unwrap(), mdp);
    }
}
