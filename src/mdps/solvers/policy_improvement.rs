use super::common::check_value_function;
use crate::{
    error::{MalformedModelError, Result},
    mdps::mdp::Mdp,
    Continous, Discrete,
};
use itertools::iproduct;
use ndarray::{Array2, ArrayView1, Axis};

/// `Q[s, a] = sum of p * (r + gamma * V[s'])` over the outcomes of `(s, a)`.
pub fn compute_q<M: Mdp + ?Sized>(
    v: &[Continous],
    mdp: &M,
    gamma: Continous,
) -> Result<Array2<Continous>> {
    check_value_function(v, mdp)?;

    let mut q = Array2::<Continous>::zeros((mdp.n_s(), mdp.n_a()));
    for (s, a) in iproduct!(0..mdp.n_s(), 0..mdp.n_a()) {
        let mut total = 0.;
        for o in mdp.outcomes(s, a) {
            let next = v
                .get(o.next_state)
                .ok_or(MalformedModelError::NextStateOutOfRange {
                    state: s,
                    action: a,
                    next_state: o.next_state,
                    n_s: mdp.n_s(),
                })?;
            total += o.probability * (o.reward + gamma * next);
        }
        q[[s, a]] = total;
    }

    Ok(q)
}

/// Greedy policy for `v` along with the action values it was derived from.
pub fn improve<M: Mdp + ?Sized>(
    v: &[Continous],
    mdp: &M,
    gamma: Continous,
) -> Result<(Array2<Continous>, Vec<Discrete>)> {
    let q = compute_q(v, mdp, gamma)?;
    let pi = greedy(&q);

    Ok((q, pi))
}

/// Relative slack under which two action values count as tied.
pub const TIE_TOLERANCE: Continous = 1e-12;

/// Row-wise argmax. Ties go to the lowest action index, where a tie is any
/// value within [`TIE_TOLERANCE`] (relative, floored at 1) of the best so far.
pub fn greedy(q: &Array2<Continous>) -> Vec<Discrete> {
    q.axis_iter(Axis(0)).map(argmax).collect()
}

fn argmax(row: ArrayView1<Continous>) -> Discrete {
    let mut best = 0;
    for (a, &x) in row.iter().enumerate().skip(1) {
        if x > row[best] + TIE_TOLERANCE * row[best].abs().max(1.) {
            best = a;
        }
    }

    best
}
