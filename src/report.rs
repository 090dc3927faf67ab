use crate::{
    mdps::solvers::{PolicyIterationHistory, Termination},
    Continous, Discrete,
};
use serde::{Deserialize, Serialize};
use std::{fs::File, io, io::BufWriter, path::Path};

/// Serializable view of a run, for plotting convergence curves elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub gamma: Continous,
    pub max_iterations: usize,
    pub termination: Termination,
    pub values: Vec<Vec<Continous>>,
    pub policies: Vec<Vec<Discrete>>,
    pub changed_actions: Vec<usize>,
}

impl From<&PolicyIterationHistory> for HistoryReport {
    fn from(h: &PolicyIterationHistory) -> Self {
        Self {
            gamma: h.config().gamma,
            max_iterations: h.config().max_iterations,
            termination: h.termination(),
            values: h.values().to_vec(),
            policies: h.policies().to_vec(),
            changed_actions: h.changed_actions().to_vec(),
        }
    }
}

impl HistoryReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(w, self)?;

        Ok(())
    }
}

/// The `Iteration | # chg actions | V[0]` progress table.
pub fn iteration_table(h: &PolicyIterationHistory) -> String {
    let mut out = String::new();
    out.push_str("Iteration | # chg actions | V[0]\n");
    out.push_str("----------+---------------+---------\n");
    for (it, (v, changed)) in h.values().iter().zip(h.changed_actions()).enumerate() {
        let v0 = v.first().copied().unwrap_or_default();
        out.push_str(&format!("{it:4}      | {changed:6}        | {v0:6.5}\n"));
    }

    out
}
