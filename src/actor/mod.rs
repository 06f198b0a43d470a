//! Watch runtime built from actors and per-route workers.
//!
//! ```text
//! ┌─────────┐  RouteKey   ┌───────────────┐  Reload/Css  ┌─────────┐
//! │ FsActor │────────────►│ chain workers │─────────────►│ WsActor │──► clients
//! └─────────┘  (trigger)  │ one per route │              └─────────┘
//!                         └───────────────┘                   ▲
//!                    dev server: AddClient / Mirror ──────────┘
//! ```
//!
//! Each route has its own queue, drained serially, so a chain never runs
//! concurrently with itself while different chains proceed in parallel.

mod coordinator;
mod fs;
pub mod messages;
mod worker;
mod ws;

pub use coordinator::{Coordinator, WS_CHANNEL_BUFFER, wait_for_shutdown};
