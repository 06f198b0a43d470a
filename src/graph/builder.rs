//! `dev` and `build` graph construction from the registry.

use super::{Action, GraphError, GraphKind, Step, TaskGraph};
use crate::registry::Registry;

/// Section chains in declared order, then watch, then serve.
pub fn dev_graph(registry: &Registry) -> Result<TaskGraph, GraphError> {
    let mut steps = Sequence::default();
    for route in registry.watched_routes() {
        steps.push(route.key.to_string(), Action::Chain(route.key.clone()));
    }
    steps.push("watch", Action::Watch);
    steps.push("serve", Action::Serve);
    TaskGraph::new(GraphKind::Dev, steps.0)
}

/// Section chains, public copy, obfuscation, then style-source passthrough.
pub fn build_graph(registry: &Registry) -> Result<TaskGraph, GraphError> {
    let mut steps = Sequence::default();
    for route in registry.watched_routes() {
        steps.push(route.key.to_string(), Action::Chain(route.key.clone()));
    }
    steps.push("public-copy", Action::PublicCopy);
    steps.push("obfuscate", Action::Obfuscate);
    for route in registry.sections().filter_map(|s| s.style_source()) {
        steps.push(route.key.to_string(), Action::Chain(route.key.clone()));
    }
    TaskGraph::new(GraphKind::Build, steps.0)
}

/// Steps that each run after the previously pushed one.
#[derive(Default)]
struct Sequence(Vec<Step>);

impl Sequence {
    fn push(&mut self, name: impl Into<String>, action: Action) {
        let step = Step::new(name, action);
        let step = match self.0.last() {
            Some(prev) => step.after(prev.name.clone()),
            None => step,
        };
        self.0.push(step);
    }
}
