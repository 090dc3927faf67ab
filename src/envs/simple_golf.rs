use crate::{
    error::MalformedModelError,
    mdps::mdp::{Mdp, Outcome, TabularMdp, Transitions},
    Discrete,
};

pub const N_S: usize = 3;
pub const N_A: usize = 3;

/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
///
/// States: 0 = fairway, 1 = green, 2 = in the hole. Actions: 0 = hit to
/// green, 1 = hit to fairway, 2 = hit in hole. Every action the article
/// leaves undefined keeps the ball where it is for no reward.
#[derive(Debug, Clone)]
pub struct SimpleGolf {
    mdp: TabularMdp,
}

impl SimpleGolf {
    pub fn new() -> Result<Self, MalformedModelError> {
        let mut transitions = Transitions::from([
            (
                (0, 0),
                vec![Outcome::new(0.9, 1, 0.), Outcome::new(0.1, 0, 0.)],
            ),
            (
                (1, 1),
                vec![Outcome::new(0.9, 0, 0.), Outcome::new(0.1, 1, 0.)],
            ),
            (
                (1, 2),
                vec![Outcome::new(0.9, 2, 10.), Outcome::new(0.1, 1, 0.)],
            ),
        ]);

        for s in 0..N_S {
            for a in 0..N_A {
                transitions
                    .entry((s, a))
                    .or_insert_with(|| vec![Outcome::new(1., s, 0.)]);
            }
        }

        Ok(Self {
            mdp: TabularMdp::from_transitions(N_S, N_A, transitions)?,
        })
    }
}

impl Mdp for SimpleGolf {
    fn n_s(&self) -> usize {
        self.mdp.n_s()
    }

    fn n_a(&self) -> usize {
        self.mdp.n_a()
    }

    fn outcomes(&self, s: Discrete, a: Discrete) -> &[Outcome] {
        self.mdp.outcomes(s, a)
    }
}
