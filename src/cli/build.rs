//! One-shot production build: every chain, then the public copy.

use anyhow::{Result, bail};

use super::common::run_chain_step;
use crate::core::PipelineContext;
use crate::graph::{Action, GraphSummary, Step, StepOutcome, build_graph, run_graph};
use crate::log;
use crate::public::{Obfuscator, public_copy, resolve_manifest};

/// Run the `build` graph.
///
/// Failed files do not stop the graph; they are counted in the summary so the
/// caller can exit nonzero.
pub fn build_all(ctx: &PipelineContext) -> Result<GraphSummary> {
    let graph = build_graph(&ctx.registry)?;
    log!("build"; "{} build, {} steps", ctx.mode, graph.steps().len());

    let summary = run_graph(&graph, |step| run_step(step, ctx))?;

    if summary.is_clean() {
        log!("build"; "done");
    } else {
        log!("build"; "finished with {} failed file(s)", summary.failed_files());
    }
    Ok(summary)
}

fn run_step(step: &Step, ctx: &PipelineContext) -> Result<StepOutcome> {
    match &step.action {
        Action::Chain(key) => run_chain_step(key, ctx),
        Action::PublicCopy => {
            let copied = public_copy(&ctx.config.output_dir(), &ctx.config.public_dir())?;
            log!("public"; "copied {} file(s) to {}", copied, ctx.config.root_relative(ctx.config.public_dir()).display());
            Ok(StepOutcome::Done)
        }
        Action::Obfuscate => obfuscate(ctx),
        Action::Watch | Action::Serve => {
            bail!("`{}` is not available in a one-shot build", step.name)
        }
    }
}

fn obfuscate(ctx: &PipelineContext) -> Result<StepOutcome> {
    let public = ctx.config.public_dir();
    let files = resolve_manifest(&public, &ctx.config.effective_public_files(ctx.mode))?;
    let report = Obfuscator::new(&ctx.config.public.obfuscate)?.run(&files)?;
    log!(
        "public";
        "obfuscated {} file(s): {} classes, {} ids, {} keyframes",
        report.files_rewritten, report.classes, report.ids, report.keyframes
    );
    Ok(StepOutcome::Done)
}
