use super::common::check_policy;
use crate::{
    error::{MalformedModelError, Result, SolverError},
    mdps::mdp::Mdp,
    Continous, Discrete,
};
use nalgebra::{DMatrix, DVector};

/// Exact value of a fixed deterministic policy.
///
/// Solves `(I - gamma * P_pi) V = R_pi` with a dense LU decomposition.
/// `gamma` outside `[0, 1)` is rejected up front. A factorization whose
/// smallest pivot is within rounding of zero (relative to the largest) is
/// reported as [`SolverError::Singular`] instead of being solved.
pub fn evaluate<M: Mdp + ?Sized>(
    pi: &[Discrete],
    mdp: &M,
    gamma: Continous,
) -> Result<Vec<Continous>> {
    check_policy(pi, mdp)?;
    if !(0. ..1.).contains(&gamma) {
        return Err(SolverError::Gamma { gamma }.into());
    }

    let n_s = mdp.n_s();
    let mut a = DMatrix::<Continous>::identity(n_s, n_s);
    let mut b = DVector::<Continous>::zeros(n_s);

    for (s, &action) in pi.iter().enumerate() {
        for o in mdp.outcomes(s, action) {
            if o.next_state >= n_s {
                return Err(MalformedModelError::NextStateOutOfRange {
                    state: s,
                    action,
                    next_state: o.next_state,
                    n_s,
                }
                .into());
            }
            a[(s, o.next_state)] -= gamma * o.probability;
            b[s] += o.probability * o.reward;
        }
    }

    let lu = a.lu();
    let pivots = lu.u().diagonal();
    if !(pivots.amin() > n_s as Continous * Continous::EPSILON * pivots.amax()) {
        return Err(SolverError::Singular { n_s }.into());
    }
    let v = lu.solve(&b).ok_or(SolverError::Singular { n_s })?;
    if let Some(state) = v.iter().position(|x| !x.is_finite()) {
        return Err(SolverError::NonFinite { state }.into());
    }

    Ok(v.iter().copied().collect())
}
