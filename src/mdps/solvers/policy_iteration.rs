use super::{
    common::changed_actions, policy_evaluation::evaluate, policy_improvement::improve,
};
use crate::{
    config::SolverConfig,
    error::Result,
    mdps::{
        mdp::{validate, Mdp},
        mdp_solver::MdpSolver,
    },
    Continous, Discrete,
};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::{
    mem,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};
use tracing::{info, trace, warn};

/// Why a run stopped. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The greedy policy did not change: it is optimal for the model and gamma.
    Converged,
    /// `max_iterations` iterations ran with actions still changing.
    Exhausted,
    /// The cancellation flag was raised between iterations.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initializing,
    Evaluating,
    Improving,
    CheckConverged,
    Terminated(Termination),
}

/// Everything a run produced, one entry per completed iteration.
///
/// `policies` additionally starts with the initial all-zeros policy, so it
/// is always one longer than `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyIterationHistory {
    config: SolverConfig,
    n_s: usize,
    values: Vec<Vec<Continous>>,
    policies: Vec<Vec<Discrete>>,
    changed_actions: Vec<usize>,
    q: Option<Array2<Continous>>,
    termination: Termination,
}

impl PolicyIterationHistory {
    pub fn config(&self) -> SolverConfig {
        self.config
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn is_converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Number of completed evaluate/improve cycles.
    pub fn iterations(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[Vec<Continous>] {
        &self.values
    }

    pub fn policies(&self) -> &[Vec<Discrete>] {
        &self.policies
    }

    pub fn changed_actions(&self) -> &[usize] {
        &self.changed_actions
    }

    pub fn last_changed_actions(&self) -> Option<usize> {
        self.changed_actions.last().copied()
    }

    /// The most recent greedy policy (the initial policy if nothing ran).
    pub fn policy(&self) -> &[Discrete] {
        self.policies.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of the last evaluated policy. On convergence that is also the
    /// value of [`Self::policy`].
    pub fn value(&self) -> Option<&[Continous]> {
        self.values.last().map(Vec::as_slice)
    }

    /// Action values from the last improvement step.
    pub fn q_values(&self) -> Option<&Array2<Continous>> {
        self.q.as_ref()
    }

    /// Value snapshots stacked into an `iterations x n_s` matrix.
    pub fn value_matrix(&self) -> Array2<Continous> {
        let mut m = Array2::zeros((self.values.len(), self.n_s));
        for (mut row, v) in m.rows_mut().into_iter().zip(&self.values) {
            row.assign(&ArrayView1::from(v.as_slice()));
        }

        m
    }
}

impl MdpSolver for PolicyIterationHistory {
    fn v_star(&self, s: Discrete) -> Option<Continous> {
        self.value()?.get(s).copied()
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.q.as_ref()?.get((s, a)).copied()
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        self.policy().get(s).copied()
    }
}

/// Policy iteration - Sutton & Barto 2018, section 4.3.
pub struct PolicyIteration<'a, M: Mdp + ?Sized> {
    mdp: &'a M,
    config: SolverConfig,
}

impl<'a, M: Mdp + ?Sized> PolicyIteration<'a, M> {
    pub fn new(mdp: &'a M, config: SolverConfig) -> Self {
        Self { mdp, config }
    }

    pub fn run(&self) -> Result<PolicyIterationHistory> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Like [`Self::run`], checking `cancel` before each evaluation.
    ///
    /// On error nothing is returned; no partial history from a failed run
    /// escapes.
    pub fn run_until(&self, cancel: &AtomicBool) -> Result<PolicyIterationHistory> {
        self.config.validate()?;
        validate(self.mdp)?;

        let SolverConfig {
            gamma,
            max_iterations,
        } = self.config;
        let n_s = self.mdp.n_s();

        let mut values = Vec::new();
        let mut policies = Vec::new();
        let mut changes = Vec::new();
        let mut q = None;

        let mut pi = Vec::new();
        let mut v = Vec::new();
        let mut candidate = Vec::new();

        let mut phase = Phase::Initializing;
        let termination = loop {
            trace!(?phase);
            phase = match phase {
                Phase::Initializing => {
                    pi = vec![0; n_s];
                    policies.push(pi.clone());
                    Phase::Evaluating
                }

                Phase::Evaluating => {
                    if values.len() == max_iterations {
                        Phase::Terminated(Termination::Exhausted)
                    } else if cancel.load(Ordering::Relaxed) {
                        Phase::Terminated(Termination::Cancelled)
                    } else {
                        v = evaluate(&pi, self.mdp, gamma)?;
                        Phase::Improving
                    }
                }

                Phase::Improving => {
                    let (next_q, next_pi) = improve(&v, self.mdp, gamma)?;
                    trace!(q = ?next_q);
                    q = Some(next_q);
                    candidate = next_pi;
                    Phase::CheckConverged
                }

                Phase::CheckConverged => {
                    let changed = changed_actions(&pi, &candidate);
                    info!(
                        iteration = values.len(),
                        changed_actions = changed,
                        v0 = v[0],
                        "policy iteration step"
                    );

                    values.push(mem::take(&mut v));
                    policies.push(candidate.clone());
                    changes.push(changed);

                    if changed == 0 {
                        Phase::Terminated(Termination::Converged)
                    } else {
                        pi = mem::take(&mut candidate);
                        Phase::Evaluating
                    }
                }

                Phase::Terminated(termination) => break termination,
            };
        };

        match termination {
            Termination::Converged => info!(iterations = values.len(), "policy is stable"),
            Termination::Exhausted => warn!(
                max_iterations,
                last_changed_actions = changes.last().copied().unwrap_or_default(),
                "iteration budget exhausted before policy became stable"
            ),
            Termination::Cancelled => info!(iterations = values.len(), "cancelled"),
        }

        Ok(PolicyIterationHistory {
            config: self.config,
            n_s,
            values,
            policies,
            changed_actions: changes,
            q,
            termination,
        })
    }
}

/// Runs policy iteration from the all-zeros policy.
pub fn run<M: Mdp + ?Sized>(
    mdp: &M,
    gamma: Continous,
    max_iterations: usize,
) -> Result<PolicyIterationHistory> {
    PolicyIteration::new(mdp, SolverConfig::new(gamma, max_iterations)).run()
}

/// One independent run per gamma, in parallel over the shared model.
pub fn sweep<M: Mdp + Sync + ?Sized>(
    mdp: &M,
    gammas: &[Continous],
    max_iterations: usize,
) -> Vec<Result<PolicyIterationHistory>> {
    thread::scope(|scope| {
        let handles = gammas
            .iter()
            .map(|&gamma| scope.spawn(move || run(mdp, gamma, max_iterations)))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}
