//! `plan`: print a task graph without running it.

use anyhow::Result;

use crate::core::PipelineContext;
use crate::graph::{GraphKind, TaskGraph, build_graph, dev_graph};

pub fn graph_for(kind: GraphKind, ctx: &PipelineContext) -> Result<TaskGraph> {
    Ok(match kind {
        GraphKind::Dev => dev_graph(&ctx.registry)?,
        GraphKind::Build => build_graph(&ctx.registry)?,
    })
}

pub fn print_plan(kind: GraphKind, ctx: &PipelineContext) -> Result<()> {
    print!("{}", graph_for(kind, ctx)?.render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::core::Mode;

    #[test]
    fn test_plan_matches_graph_kind() {
        let ctx = PipelineContext::new(test_parse_config(""), Mode::Production).unwrap();
        assert_eq!(graph_for(GraphKind::Dev, &ctx).unwrap().kind(), GraphKind::Dev);

        let build = graph_for(GraphKind::Build, &ctx).unwrap();
        assert_eq!(build.kind(), GraphKind::Build);
        assert!(build.render().contains("public-copy"));
    }
}
