//! Development server with live updates and ghost mode.
//!
//! One port serves everything:
//!
//! | Path                        | Purpose                                  |
//! |-----------------------------|------------------------------------------|
//! | `/`                         | redirect to the start page               |
//! | `/__pipewright/client.js`   | live-update client, served from memory   |
//! | `/__pipewright/ws?id=…`     | WebSocket upgrade, handed to the WsActor |
//! | `POST /__pipewright/mirror` | ghost-mode event, relayed to other tabs  |
//! | anything else               | file under the build directory           |

mod inject;
pub mod message;
mod path;
mod response;

use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel::Sender;
use tiny_http::{Method, Request, Response, Server, StatusCode};
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Role;

use crate::actor::messages::{Duplex, WsMsg};
use crate::config::PipelineConfig;
use crate::embed::serve::{CLIENT_JS, ClientVars};
use crate::{debug, log};

use message::MirrorPost;
use path::{query_param, resolve_path, split_query};
use response::{make_header, owned_header};

/// URL prefix reserved for the server's own endpoints.
pub const PREFIX: &str = "/__pipewright";

/// Tag injected before `</body>` of every served HTML page.
pub const CLIENT_TAG: &str = "<script src=\"/__pipewright/client.js\"></script>";

/// Mirror events are small; anything larger is not one.
const MAX_MIRROR_BODY: u64 = 64 * 1024;

static NEXT_ANON_ID: AtomicU64 = AtomicU64::new(1);

/// Request handling state shared by the pool threads.
struct ServeState {
    root: PathBuf,
    start_path: String,
    ws_tx: mpsc::Sender<WsMsg>,
}

/// Bound server ready to accept requests
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    state: Arc<ServeState>,
}

impl DevServer {
    /// Bind the configured address. A busy port is a startup error.
    pub fn bind(
        config: &PipelineConfig,
        ws_tx: mpsc::Sender<WsMsg>,
        shutdown_tx: Sender<()>,
    ) -> Result<Self> {
        let addr = SocketAddr::new(config.serve.interface, config.serve.port);
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        let server = Arc::new(server);
        crate::core::register_server(Arc::clone(&server), shutdown_tx);

        Ok(Self {
            server,
            addr,
            state: Arc::new(ServeState {
                root: config.output_dir(),
                start_path: config.start_path().to_string(),
                ws_tx,
            }),
        })
    }

    /// Serve until Ctrl+C unblocks the server.
    pub fn run(self) -> Result<()> {
        log!("serve"; "http://{}{}", self.addr, self.state.start_path);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .context("Failed to create request thread pool")?;

        for request in self.server.incoming_requests() {
            let state = Arc::clone(&self.state);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &state) {
                    log!("serve"; "request error: {e:#}");
                }
            });
        }
        Ok(())
    }
}

fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    let (path, query) = split_query(&url);
    debug!("serve"; "{} {}", request.method(), url);

    if path == "/" {
        return response::respond_redirect(request, &state.start_path);
    }

    if let Some(endpoint) = path.strip_prefix(PREFIX) {
        let method = request.method().clone();
        return match (&method, endpoint) {
            (Method::Get, "/client.js") => {
                response::respond_js(request, CLIENT_JS.render(&ClientVars { prefix: PREFIX }))
            }
            (Method::Get, "/ws") => upgrade(request, query, state),
            (Method::Post, "/mirror") => mirror(request, state),
            _ => response::respond_not_found(request),
        };
    }

    match resolve_path(path, &state.root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

/// Complete the WebSocket handshake and hand the socket to the WsActor.
fn upgrade(request: Request, query: &str, state: &ServeState) -> Result<()> {
    let Some(key) = header_value(&request, "Sec-WebSocket-Key") else {
        return response::respond_bad_request(request, "expected a WebSocket upgrade");
    };
    let id = query_param(query, "id")
        .filter(|id| is_valid_client_id(id))
        .unwrap_or_else(|| format!("anon-{}", NEXT_ANON_ID.fetch_add(1, Ordering::Relaxed)));

    let accept = tungstenite::handshake::derive_accept_key(key.as_bytes());
    let response = Response::empty(StatusCode(101))
        .with_header(make_header("Upgrade", "websocket"))
        .with_header(make_header("Connection", "Upgrade"))
        .with_header(owned_header("Sec-WebSocket-Accept", &accept)?);

    let stream: Box<dyn Duplex> = Box::new(request.upgrade("websocket", response));
    let ws = WebSocket::from_raw_socket(stream, Role::Server, None);

    debug!("ws"; "upgrade from client {}", id);
    state
        .ws_tx
        .blocking_send(WsMsg::AddClient { id, ws })
        .map_err(|_| anyhow::anyhow!("live-update channel closed"))
}

/// Relay a ghost-mode event. Disabled kinds are dropped by the WsActor.
fn mirror(mut request: Request, state: &ServeState) -> Result<()> {
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_MIRROR_BODY)
        .read_to_string(&mut body)
        .context("Failed to read mirror event")?;

    let Some(post) = MirrorPost::from_json(&body) else {
        return response::respond_bad_request(request, "malformed mirror event");
    };

    state
        .ws_tx
        .blocking_send(WsMsg::Mirror {
            from: post.id,
            event: post.event,
        })
        .map_err(|_| anyhow::anyhow!("live-update channel closed"))?;
    response::respond_no_content(request)
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}

fn is_valid_client_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
