use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::WsMsg;
use crate::actor::worker::ChainWorkers;
use crate::actor::ws::WsActor;

/// Run all actors until the shutdown signal arrives.
pub(super) async fn run_actors(
    fs: FsActor,
    ws: WsActor,
    workers: ChainWorkers,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Receiver<()>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let ws_handle = tokio::spawn(ws.run());

    while shutdown_rx.try_recv().is_err() && !crate::core::is_shutdown() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    crate::debug!("actor"; "shutdown signal received");

    // Dropping the fs actor drops the last trigger handles.
    fs_handle.abort();
    let _ = fs_handle.await;

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(2), workers.join()).await;
}
