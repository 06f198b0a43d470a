//! Core types shared across the codebase.

mod context;
mod mode;
mod state;

pub use context::PipelineContext;
pub use mode::{MODE_ENV, Mode};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
