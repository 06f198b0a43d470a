//! Chain workers: one queue and one task per route.
//!
//! A trigger is a unit message on a queue of depth one. While a chain runs,
//! at most one further trigger waits behind it; later triggers fold into the
//! waiting one. A chain therefore never overlaps itself, and a burst of
//! changes costs at most one extra run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::messages::WsMsg;
use crate::logger::{status_error, status_success, status_unchanged};
use crate::pipeline::ChainReport;
use crate::registry::{RouteKey, RouteKind};
use crate::utils::path::to_slash;

/// Cloneable handle that queues chain runs.
#[derive(Clone, Default)]
pub struct ChainTriggers {
    queues: FxHashMap<RouteKey, mpsc::Sender<()>>,
}

impl ChainTriggers {
    /// Queue a run of `key`. Returns `false` for unknown or stopped workers.
    pub fn trigger(&self, key: &RouteKey) -> bool {
        let Some(tx) = self.queues.get(key) else {
            return false;
        };
        match tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                crate::debug!("watch"; "{} already queued", key);
                true
            }
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// The running workers.
pub struct ChainWorkers {
    triggers: ChainTriggers,
    handles: Vec<JoinHandle<()>>,
}

impl ChainWorkers {
    /// Spawn a worker per key on the current runtime.
    ///
    /// `runner` performs the chain on the blocking pool. Completed runs are
    /// reported to `ws_tx`: stylesheet chains as a hot-swap of the written
    /// `.css` files, everything else as a reload.
    pub fn spawn<F>(
        keys: impl IntoIterator<Item = RouteKey>,
        runner: F,
        output_dir: PathBuf,
        ws_tx: Option<mpsc::Sender<WsMsg>>,
    ) -> Self
    where
        F: Fn(&RouteKey) -> ChainReport + Send + Sync + 'static,
    {
        let runner = Arc::new(runner);
        let output_dir = Arc::new(output_dir);
        let mut triggers = ChainTriggers::default();
        let mut handles = Vec::new();

        for key in keys {
            let (tx, rx) = mpsc::channel(1);
            triggers.queues.insert(key.clone(), tx);
            handles.push(tokio::spawn(drain(
                key,
                rx,
                Arc::clone(&runner),
                Arc::clone(&output_dir),
                ws_tx.clone(),
            )));
        }

        Self { triggers, handles }
    }

    pub fn triggers(&self) -> ChainTriggers {
        self.triggers.clone()
    }

    /// Close every queue and wait for in-flight runs.
    ///
    /// Workers stop once every [`ChainTriggers`] clone is dropped.
    pub async fn join(self) {
        drop(self.triggers);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn drain<F>(
    key: RouteKey,
    mut rx: mpsc::Receiver<()>,
    runner: Arc<F>,
    output_dir: Arc<PathBuf>,
    ws_tx: Option<mpsc::Sender<WsMsg>>,
) where
    F: Fn(&RouteKey) -> ChainReport + Send + Sync + 'static,
{
    while rx.recv().await.is_some() {
        let runner = Arc::clone(&runner);
        let run_key = key.clone();
        let report = match tokio::task::spawn_blocking(move || runner(&run_key)).await {
            Ok(report) => report,
            Err(e) => {
                status_error(&format!("{key} panicked"), &e.to_string());
                continue;
            }
        };

        report_status(&key, &report);

        if report.written.is_empty() {
            continue;
        }
        if let Some(tx) = &ws_tx
            && let Some(msg) = notification(&key, &report, &output_dir)
            && tx.send(msg).await.is_err()
        {
            crate::debug!("watch"; "ws actor gone, {} stops notifying", key);
        }
    }
    crate::debug!("watch"; "{} worker stopped", key);
}

fn report_status(key: &RouteKey, report: &ChainReport) {
    if let Some(first) = report.failed.first() {
        let summary = format!("{key}: {} failed", report.failed.len());
        status_error(&summary, &format!("{}: {}", first.path.display(), first.message));
    } else if report.written.is_empty() {
        status_unchanged(&format!("{key}: up to date"));
    } else {
        status_success(&format!("{key}: {} written", report.written.len()));
    }
}

/// Dev server message for a finished chain.
fn notification(key: &RouteKey, report: &ChainReport, output_dir: &Path) -> Option<WsMsg> {
    if key.kind != RouteKind::Style {
        return Some(WsMsg::Reload {
            reason: key.to_string(),
        });
    }
    let paths: Vec<String> = report
        .written
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e == "css"))
        .filter_map(|p| url_path(p, output_dir))
        .collect();
    (!paths.is_empty()).then_some(WsMsg::Css { paths })
}

/// `<output>/item/css/main.css` -> `/item/css/main.css`
fn url_path(path: &Path, output_dir: &Path) -> Option<String> {
    let rel = path.strip_prefix(output_dir).ok()?;
    Some(format!("/{}", to_slash(rel)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn key(kind: RouteKind) -> RouteKey {
        RouteKey::new("item", kind)
    }

    fn written(paths: &[&str]) -> ChainReport {
        ChainReport {
            written: paths.iter().map(PathBuf::from).collect(),
            ..ChainReport::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_chain_never_overlaps_itself() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        let runner = {
            let (active, peak, runs) = (active.clone(), peak.clone(), runs.clone());
            move |_: &RouteKey| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(30));
                active.fetch_sub(1, Ordering::SeqCst);
                runs.fetch_add(1, Ordering::SeqCst);
                ChainReport::default()
            }
        };

        let workers = ChainWorkers::spawn([key(RouteKind::Script)], runner, PathBuf::from("/out"), None);
        let triggers = workers.triggers();
        for _ in 0..5 {
            assert!(triggers.trigger(&key(RouteKind::Script)));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        drop(triggers);
        workers.join().await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        let runs = runs.load(Ordering::SeqCst);
        assert!((1..=5).contains(&runs), "runs = {runs}");
    }

    #[tokio::test]
    async fn test_unknown_key_not_triggered() {
        let workers = ChainWorkers::spawn(
            [key(RouteKind::Script)],
            |_: &RouteKey| ChainReport::default(),
            PathBuf::from("/out"),
            None,
        );
        assert!(!workers.triggers().trigger(&key(RouteKind::Markup)));
        workers.join().await;
    }

    #[tokio::test]
    async fn test_completed_chains_notify() {
        let (ws_tx, mut ws_rx) = mpsc::channel(4);
        let workers = ChainWorkers::spawn(
            [key(RouteKind::Style), key(RouteKind::Script)],
            |k: &RouteKey| match k.kind {
                RouteKind::Style => written(&["/out/item/css/main.css", "/out/item/css/main.min.css"]),
                _ => written(&["/out/item/js/item.js"]),
            },
            PathBuf::from("/out"),
            Some(ws_tx),
        );

        let triggers = workers.triggers();
        triggers.trigger(&key(RouteKind::Style));
        match ws_rx.recv().await {
            Some(WsMsg::Css { paths }) => {
                assert_eq!(paths, ["/item/css/main.css", "/item/css/main.min.css"]);
            }
            other => panic!("expected css message, got {other:?}"),
        }

        triggers.trigger(&key(RouteKind::Script));
        match ws_rx.recv().await {
            Some(WsMsg::Reload { reason }) => assert_eq!(reason, "item:script"),
            other => panic!("expected reload, got {other:?}"),
        }

        drop(triggers);
        workers.join().await;
    }

    #[test]
    fn test_nothing_written_sends_nothing() {
        let report = ChainReport::default();
        assert!(report.written.is_empty());
        assert!(notification(&key(RouteKind::Style), &report, Path::new("/out")).is_none());
    }

    #[test]
    fn test_url_path() {
        let out = Path::new("/site/build");
        assert_eq!(
            url_path(Path::new("/site/build/item/css/main.css"), out).as_deref(),
            Some("/item/css/main.css")
        );
        assert_eq!(url_path(Path::new("/elsewhere/a.css"), out), None);
    }
}
