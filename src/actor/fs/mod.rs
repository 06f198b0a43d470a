//! FileSystem Actor
//!
//! Watches every route's glob base and queues the chains a change triggers.
//! The watcher starts at the dev graph's `watch` step, after the initial
//! chains, so their own output never feeds back as a change.
//!
//! ```text
//! notify → bridge thread → Debouncer (300 ms quiet) → router → ChainTriggers
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;

use super::worker::ChainTriggers;
use crate::core::PipelineContext;
use crate::utils::path::normalize_path;

// Pure timing and deduplication.
mod debouncer;
// Debounced paths -> route keys.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use router::route_changes;
use watch_roots::WatchRoots;

/// How often missing glob bases are re-checked while no events arrive.
const WATCH_ROOT_INTERVAL: Duration = Duration::from_secs(2);

/// FileSystem Actor - watches route sources
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    debouncer: Debouncer,
    /// Canonical project root; changes are matched relative to it
    root: PathBuf,
    ctx: Arc<PipelineContext>,
    triggers: ChainTriggers,
}

impl FsActor {
    /// Start watching immediately; events buffer until [`FsActor::run`].
    pub fn new(ctx: Arc<PipelineContext>, triggers: ChainTriggers) -> notify::Result<Self> {
        let root = normalize_path(ctx.root());
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let paths = ctx
            .registry
            .watch_bases()
            .into_iter()
            .map(|base| root.join(base))
            .collect();
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            debouncer: Debouncer::new(),
            root,
            ctx,
            triggers,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            mut debouncer,
            root,
            ctx,
            triggers,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify only offers a blocking receiver
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut maintenance = tokio::time::interval(WATCH_ROOT_INTERVAL);
        maintenance.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = maintenance.tick() => watch_roots.maintain(&mut watcher),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };
                    for key in route_changes(changes, &root, &ctx.registry) {
                        crate::debug!("watch"; "trigger {}", key);
                        if !triggers.trigger(&key) {
                            crate::log!("watch"; "worker for {} is gone", key);
                        }
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}
