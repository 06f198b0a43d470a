//! Actor Message Definitions
//!
//! ```text
//! FsActor --trigger--> chain worker --Reload/Css--> WsActor --> Clients
//! HTTP mirror POST -----------------------Mirror--> WsActor --> other Clients
//! HTTP upgrade ---------------------------AddClient--> WsActor
//! ```

use std::io::{Read, Write};

use tungstenite::WebSocket;

use crate::serve::message::MirrorEvent;

/// A byte stream a WebSocket can run over.
///
/// Upgraded HTTP connections arrive as boxed trait objects; tests use an
/// in-memory stream.
pub trait Duplex: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> Duplex for T {}

pub type ClientSocket = WebSocket<Box<dyn Duplex>>;

/// Messages to the WebSocket actor
pub enum WsMsg {
    /// Full reload, e.g. after a markup or script chain
    Reload { reason: String },
    /// Stylesheet hot-swap for these URL paths
    Css { paths: Vec<String> },
    /// Relay to every client except `from`
    Mirror { from: String, event: MirrorEvent },
    /// Register a client after the HTTP upgrade
    AddClient { id: String, ws: ClientSocket },
    /// Close all clients and stop
    Shutdown,
}

impl std::fmt::Debug for WsMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reload { reason } => write!(f, "Reload({reason})"),
            Self::Css { paths } => write!(f, "Css({paths:?})"),
            Self::Mirror { from, event } => write!(f, "Mirror({from}, {})", event.kind),
            Self::AddClient { id, .. } => write!(f, "AddClient({id})"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
