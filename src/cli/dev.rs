//! `dev`: build every chain, then watch and serve until Ctrl+C.

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result, bail};
use crossbeam::channel;
use tokio::sync::mpsc;

use super::common::run_chain_step;
use crate::actor::{Coordinator, WS_CHANNEL_BUFFER, messages::WsMsg, wait_for_shutdown};
use crate::core::PipelineContext;
use crate::graph::{Action, GraphSummary, StepOutcome, dev_graph, run_graph};
use crate::log;
use crate::serve::DevServer;

/// Run the `dev` graph.
///
/// Initial chain failures are reported but do not prevent watching, so the
/// broken file can be fixed while the server runs.
pub fn serve_dev(ctx: PipelineContext) -> Result<GraphSummary> {
    let ctx = Arc::new(ctx);
    let graph = dev_graph(&ctx.registry)?;
    log!("dev"; "{} mode, {} steps", ctx.mode, graph.steps().len());

    let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(WS_CHANNEL_BUFFER);
    let (shutdown_tx, shutdown_rx) = channel::unbounded();

    let mut ws_rx = Some(ws_rx);
    let mut shutdown_rx = Some(shutdown_rx);
    let mut actors: Option<JoinHandle<()>> = None;

    let summary = run_graph(&graph, |step| match &step.action {
        Action::Chain(key) => run_chain_step(key, &ctx),
        Action::Watch => {
            let (Some(rx), Some(shutdown)) = (ws_rx.take(), shutdown_rx.take()) else {
                bail!("watcher already started");
            };
            let coordinator = Coordinator::new(Arc::clone(&ctx), (ws_tx.clone(), rx), shutdown);
            actors = Some(coordinator.start()?);
            log!("watch"; "watching {} route(s)", ctx.registry.watched_routes().count());
            Ok(StepOutcome::Done)
        }
        Action::Serve => {
            let server = DevServer::bind(&ctx.config, ws_tx.clone(), shutdown_tx.clone())
                .context("Failed to start dev server")?;
            server.run()?;
            wait_for_shutdown(actors.take());
            Ok(StepOutcome::Done)
        }
        Action::PublicCopy | Action::Obfuscate => {
            bail!("`{}` only runs in a build", step.name)
        }
    })?;

    Ok(summary)
}
