use crate::{
    error::{PolicyIterationError, Result},
    mdps::mdp::Mdp,
    Continous, Discrete,
};

pub fn check_policy<M: Mdp + ?Sized>(pi: &[Discrete], mdp: &M) -> Result<()> {
    if pi.len() != mdp.n_s() || pi.iter().any(|&a| a >= mdp.n_a()) {
        return Err(PolicyIterationError::InvalidPolicy {
            found: pi.len(),
            n_s: mdp.n_s(),
            n_a: mdp.n_a(),
        });
    }

    Ok(())
}

pub fn check_value_function<M: Mdp + ?Sized>(v: &[Continous], mdp: &M) -> Result<()> {
    if v.len() != mdp.n_s() {
        return Err(PolicyIterationError::InvalidValueFunction {
            found: v.len(),
            n_s: mdp.n_s(),
        });
    }

    Ok(())
}

/// Number of states whose action differs between the two policies.
pub fn changed_actions(prev: &[Discrete], next: &[Discrete]) -> usize {
    prev.iter().zip(next).filter(|(a, b)| a != b).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_differing_entries() {
        assert_eq!(changed_actions(&[0, 0, 0], &[0, 2, 0]), 1);
        assert_eq!(changed_actions(&[1, 2, 3], &[1, 2, 3]), 0);
    }
}
