//! Sequential graph execution.

use anyhow::{Context, Result};

use super::{Step, TaskGraph};
use crate::debug;

/// Result of one step that did not fail fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Completed, but this many files failed.
    Partial(usize),
}

#[derive(Debug, Default)]
pub struct GraphSummary {
    pub completed: usize,
    /// Steps with failed files, and how many.
    pub partial: Vec<(String, usize)>,
}

impl GraphSummary {
    pub fn is_clean(&self) -> bool {
        self.partial.is_empty()
    }

    pub fn failed_files(&self) -> usize {
        self.partial.iter().map(|(_, n)| n).sum()
    }
}

/// Run every step in order.
///
/// A step returning `Err` is fatal and stops the graph. Partial steps are
/// recorded and the graph continues.
pub fn run_graph<F>(graph: &TaskGraph, mut exec: F) -> Result<GraphSummary>
where
    F: FnMut(&Step) -> Result<StepOutcome>,
{
    let mut summary = GraphSummary::default();
    for step in graph.steps() {
        debug!("graph"; "{} › {}", graph.kind(), step.name);
        match exec(step).with_context(|| format!("step `{}` failed", step.name))? {
            StepOutcome::Done => {}
            StepOutcome::Partial(failed) => summary.partial.push((step.name.clone(), failed)),
        }
        summary.completed += 1;
    }
    Ok(summary)
}
