//! Step execution shared by the `dev` and `build` graphs.

use anyhow::{Context, Result};

use crate::core::PipelineContext;
use crate::graph::StepOutcome;
use crate::registry::RouteKey;
use crate::{debug, log};

/// Run one route's chain and log what it did.
///
/// Per-file failures are logged and reported as [`StepOutcome::Partial`];
/// only an unknown route is fatal.
pub(super) fn run_chain_step(key: &RouteKey, ctx: &PipelineContext) -> Result<StepOutcome> {
    let route = ctx
        .registry
        .route(key)
        .with_context(|| format!("no route registered for `{key}`"))?;

    let report = crate::pipeline::run_chain(route, ctx);

    for failure in &report.failed {
        log!("error"; "{}: {}", ctx.config.root_relative(&failure.path).display(), failure.message);
    }

    match (report.written.len(), report.failed.len()) {
        (0, 0) => debug!("build"; "{}: up to date ({} skipped)", key, report.skipped),
        (written, 0) => log!("build"; "{}: {} written", key, written),
        (written, failed) => log!("build"; "{}: {} written, {} failed", key, written, failed),
    }

    Ok(if report.is_ok() {
        StepOutcome::Done
    } else {
        StepOutcome::Partial(report.failed.len())
    })
}
