//! Actor Coordinator - wires up the watch runtime
//!
//! - Creates the tokio runtime on a dedicated thread
//! - Spawns one chain worker per watched route
//! - Starts the fs and WebSocket actors
//!
//! Watcher setup happens on the caller's thread, so a failure to watch is
//! reported as a startup error rather than lost in the background.

mod runtime;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::WsMsg;
use super::worker::ChainWorkers;
use super::ws::WsActor;
use crate::core::PipelineContext;
use crate::pipeline::{ChainReport, run_chain};

/// Buffer for the dev server -> WsActor channel.
pub const WS_CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    ctx: Arc<PipelineContext>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    shutdown_rx: Receiver<()>,
}

impl Coordinator {
    /// `ws_tx`/`ws_rx` are one channel; the dev server keeps its own sender
    /// clone for client upgrades and mirrored events.
    pub fn new(
        ctx: Arc<PipelineContext>,
        (ws_tx, ws_rx): (mpsc::Sender<WsMsg>, mpsc::Receiver<WsMsg>),
        shutdown_rx: Receiver<()>,
    ) -> Self {
        Self {
            ctx,
            ws_tx,
            ws_rx,
            shutdown_rx,
        }
    }

    /// Start watching and return the runtime thread.
    pub fn start(self) -> Result<JoinHandle<()>> {
        let Self {
            ctx,
            ws_tx,
            ws_rx,
            shutdown_rx,
        } = self;

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let workers = {
            let _guard = rt.enter();
            let runner_ctx = Arc::clone(&ctx);
            ChainWorkers::spawn(
                ctx.registry.watched_routes().map(|r| r.key.clone()),
                move |key| {
                    runner_ctx
                        .registry
                        .route(key)
                        .map(|route| run_chain(route, &runner_ctx))
                        .unwrap_or_else(ChainReport::default)
                },
                ctx.config.output_dir(),
                Some(ws_tx.clone()),
            )
        };

        let fs = FsActor::new(Arc::clone(&ctx), workers.triggers())
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let ws = WsActor::new(ws_rx, ctx.config.serve.ghost);

        crate::debug!("actor"; "start");
        Ok(thread::spawn(move || {
            rt.block_on(runtime::run_actors(fs, ws, workers, ws_tx, shutdown_rx));
            rt.shutdown_timeout(std::time::Duration::from_secs(1));
            crate::debug!("actor"; "stopped");
        }))
    }
}

/// Wait for the actor thread to finish (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
