use crate::{
    error::MalformedModelError,
    mdps::mdp::{Mdp, Outcome, TabularMdp},
    Discrete,
};

pub const LEFT: Discrete = 0;
pub const DOWN: Discrete = 1;
pub const RIGHT: Discrete = 2;
pub const UP: Discrete = 3;

pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

pub const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
    "FFFHFFFG",
];

/// FrozenLake grid world with the transition table gymnasium exposes as `env.P`.
///
/// Cells are numbered row major. Entering `G` pays 1. `H` and `G` are
/// absorbing. On slippery ice the agent moves in the intended direction or
/// either perpendicular one, each with probability 1/3.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    desc: Vec<Vec<u8>>,
    mdp: TabularMdp,
}

impl FrozenLake {
    pub fn new<S: AsRef<str>>(desc: &[S], is_slippery: bool) -> Result<Self, MalformedModelError> {
        let desc = desc
            .iter()
            .map(|row| row.as_ref().as_bytes().to_vec())
            .collect::<Vec<_>>();

        let ncol = desc.first().map_or(0, Vec::len);
        if ncol == 0 {
            return Err(MalformedModelError::InvalidMap("map is empty".into()));
        }
        if desc.iter().any(|row| row.len() != ncol) {
            return Err(MalformedModelError::InvalidMap(
                "rows have different lengths".into(),
            ));
        }
        if let Some(&c) = desc.iter().flatten().find(|&&c| !b"SFHG".contains(&c)) {
            return Err(MalformedModelError::InvalidMap(format!(
                "unknown cell '{}'",
                c as char
            )));
        }

        let nrow = desc.len();
        let mut transitions = Vec::with_capacity(nrow * ncol);
        for row in 0..nrow {
            for col in 0..ncol {
                let s = row * ncol + col;
                let actions: Vec<Vec<Outcome>> = (0..4)
                    .map(|a| {
                        if b"GH".contains(&desc[row][col]) {
                            return vec![Outcome::new(1., s, 0.)];
                        }

                        let directions = if is_slippery {
                            vec![(a + 3) % 4, a, (a + 1) % 4]
                        } else {
                            vec![a]
                        };
                        let p = 1. / directions.len() as f64;
                        directions
                            .into_iter()
                            .map(|b| {
                                let (r, c) = step(row, col, b, nrow, ncol);
                                let reward = if desc[r][c] == b'G' { 1. } else { 0. };
                                Outcome::new(p, r * ncol + c, reward)
                            })
                            .collect()
                    })
                    .collect();
                transitions.push(actions);
            }
        }

        let mdp = TabularMdp::new(nrow * ncol, 4, transitions)?;
        Ok(Self { desc, mdp })
    }

    pub fn new_4x4(is_slippery: bool) -> Result<Self, MalformedModelError> {
        Self::new(&MAP_4X4, is_slippery)
    }

    pub fn new_8x8(is_slippery: bool) -> Result<Self, MalformedModelError> {
        Self::new(&MAP_8X8, is_slippery)
    }

    pub fn nrow(&self) -> usize {
        self.desc.len()
    }

    pub fn ncol(&self) -> usize {
        self.desc[0].len()
    }

    /// One line per grid row: `H`/`G` as is, other cells as the policy's arrow.
    pub fn render_policy(&self, pi: &[Discrete]) -> String {
        let mut out = String::new();
        for (row, cells) in self.desc.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                let ch = match (cell, pi.get(row * self.ncol() + col)) {
                    (b'H' | b'G', _) => cell as char,
                    (_, Some(&LEFT)) => '←',
                    (_, Some(&DOWN)) => '↓',
                    (_, Some(&RIGHT)) => '→',
                    (_, Some(&UP)) => '↑',
                    _ => '?',
                };
                out.push(ch);
            }
            out.push('\n');
        }

        out
    }
}

fn step(row: usize, col: usize, a: Discrete, nrow: usize, ncol: usize) -> (usize, usize) {
    match a {
        LEFT => (row, col.saturating_sub(1)),
        DOWN => ((row + 1).min(nrow - 1), col),
        RIGHT => (row, (col + 1).min(ncol - 1)),
        UP => (row.saturating_sub(1), col),
        _ => (row, col),
    }
}

impl Mdp for FrozenLake {
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

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use itertools::iproduct;

    #[test]
    fn slippery_4x4_matches_gymnasium_table() {
        let fl = FrozenLake::new_4x4(true).unwrap();

        assert_eq!(fl.n_s(), 16);
        assert_eq!(fl.n_a(), 4);
        assert_eq!(
            iproduct!(0..16, 0..4)
                .filter(|&(s, a)| !fl.outcomes(s, a).is_empty())
                .count(),
            64
        );

        let third = 1. / 3.;
        assert_eq!(
            fl.outcomes(0, LEFT),
            &[
                Outcome::new(third, 0, 0.),
                Outcome::new(third, 0, 0.),
                Outcome::new(third, 4, 0.)
            ]
        );
        assert_eq!(
            fl.outcomes(14, RIGHT),
            &[
                Outcome::new(third, 14, 0.),
                Outcome::new(third, 15, 1.),
                Outcome::new(third, 10, 0.)
            ]
        );
        for a in 0..4 {
            assert_eq!(fl.outcomes(5, a), &[Outcome::new(1., 5, 0.)]);
            assert_eq!(fl.outcomes(15, a), &[Outcome::new(1., 15, 0.)]);
        }
    }

    #[test]
    fn deterministic_lake_moves_in_intended_direction() {
        let fl = FrozenLake::new_4x4(false).unwrap();

        assert_eq!(fl.outcomes(0, RIGHT), &[Outcome::new(1., 1, 0.)]);
        assert_eq!(fl.outcomes(0, UP), &[Outcome::new(1., 0, 0.)]);
        assert_eq!(fl.outcomes(11, DOWN), &[Outcome::new(1., 11, 0.)]);
        assert_eq!(fl.outcomes(14, RIGHT), &[Outcome::new(1., 15, 1.)]);
    }

    #[test]
    fn every_row_is_a_distribution() {
        let fl = FrozenLake::new_8x8(true).unwrap();

        assert_eq!(fl.n_s(), 64);
        for (s, a) in iproduct!(0..fl.n_s(), 0..fl.n_a()) {
            let sum: f64 = fl.outcomes(s, a).iter().map(|o| o.probability).sum();
            assert_float_eq!(sum, 1., abs <= 1e-12);
        }
    }

    #[test]
    fn malformed_maps_are_rejected() {
        assert!(FrozenLake::new(&["SFF", "FG"], true).is_err());
        assert!(FrozenLake::new(&["SXFG"], true).is_err());
        assert!(FrozenLake::new::<&str>(&[], true).is_err());
    }

    #[test]
    fn policy_renders_as_arrows() {
        let fl = FrozenLake::new(&["SF", "HG"], false).unwrap();

        assert_eq!(fl.render_policy(&[RIGHT, DOWN, LEFT, UP]), "→↓\nHG\n");
    }
}
