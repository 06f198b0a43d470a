//! Task graphs: explicit, inspectable step lists.
//!
//! A graph is a list of named steps, each declaring its predecessors. It is
//! validated once at construction (unique names, known predecessors, no
//! cycles) and stored in execution order.
//!
//! ```text
//! dev:   docs:style → docs:markup → … → demo:script → watch → serve
//! build: docs:style → … → demo:script → public-copy → obfuscate → item:style-source
//! ```

mod builder;
mod run;

pub use builder::{build_graph, dev_graph};
pub use run::{GraphSummary, StepOutcome, run_graph};

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::registry::RouteKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphKind {
    /// Build once, then watch and serve.
    Dev,
    /// One-shot build with the public copy.
    Build,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Build => "build",
        })
    }
}

/// What a step does when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run one route's transformation chain.
    Chain(RouteKey),
    /// Mirror the build tree into the public tree.
    PublicCopy,
    /// Rewrite selectors in the public manifest.
    Obfuscate,
    /// Start the change watcher.
    Watch,
    /// Serve the build tree until shutdown.
    Serve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub action: Action,
    /// Names of steps that must finish first.
    pub after: Vec<String>,
}

impl Step {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            after: Vec::new(),
        }
    }

    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after.push(name.into());
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("step `{0}` is declared twice")]
    DuplicateStep(String),

    #[error("step `{step}` runs after unknown step `{after}`")]
    UnknownPredecessor { step: String, after: String },

    #[error("steps form a cycle: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// A validated graph, steps in execution order.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    kind: GraphKind,
    steps: Vec<Step>,
}

impl TaskGraph {
    /// Validate `steps` and order them.
    ///
    /// The order is topological; among ready steps, declaration order wins.
    pub fn new(kind: GraphKind, steps: Vec<Step>) -> Result<Self, GraphError> {
        let mut index = FxHashMap::default();
        for (i, step) in steps.iter().enumerate() {
            if index.insert(step.name.as_str(), i).is_some() {
                return Err(GraphError::DuplicateStep(step.name.clone()));
            }
        }

        let mut indegree = vec![0usize; steps.len()];
        let mut dependents = vec![Vec::new(); steps.len()];
        for (i, step) in steps.iter().enumerate() {
            let unique: FxHashSet<&str> = step.after.iter().map(String::as_str).collect();
            for after in unique {
                let Some(&j) = index.get(after) else {
                    return Err(GraphError::UnknownPredecessor {
                        step: step.name.clone(),
                        after: after.to_string(),
                    });
                };
                indegree[i] += 1;
                dependents[j].push(i);
            }
        }

        let mut order = Vec::with_capacity(steps.len());
        let mut done = vec![false; steps.len()];
        while order.len() < steps.len() {
            let Some(next) = (0..steps.len()).find(|&i| !done[i] && indegree[i] == 0) else {
                let stuck = (0..steps.len())
                    .filter(|&i| !done[i])
                    .map(|i| steps[i].name.clone())
                    .collect();
                return Err(GraphError::Cycle(stuck));
            };
            done[next] = true;
            order.push(next);
            for &d in &dependents[next] {
                indegree[d] -= 1;
            }
        }

        let mut slots: Vec<Option<Step>> = steps.into_iter().map(Some).collect();
        let steps = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        Ok(Self { kind, steps })
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Human-readable step list for `plan`.
    pub fn render(&self) -> String {
        let width = self.steps.iter().map(|s| s.name.len()).max().unwrap_or(0);
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            let after = if step.after.is_empty() {
                "-".to_string()
            } else {
                step.after.join(", ")
            };
            out.push_str(&format!(
                "{:>2}. {:<width$}  after: {}\n",
                i + 1,
                step.name,
                after
            ));
        }
        out
    }
}
