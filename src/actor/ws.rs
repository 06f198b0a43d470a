//! WebSocket Actor
//!
//! Owns every connected client. Broadcasts reload and stylesheet messages,
//! and relays mirrored interactions to every client except the sender.
//!
//! ```text
//! chain worker --[Reload/Css]--> WsActor --[broadcast]--> Clients
//! mirror POST  --[Mirror]------> WsActor --[all but sender]--> Clients
//! ```

use tokio::sync::mpsc;
use tungstenite::protocol::Message;

use super::messages::{ClientSocket, WsMsg};
use crate::config::GhostMode;
use crate::serve::message::LiveMessage;

struct Client {
    id: String,
    ws: ClientSocket,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Vec<Client>,
    ghost: GhostMode,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, ghost: GhostMode) -> Self {
        Self {
            rx,
            clients: Vec::new(),
            ghost,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if !self.handle(msg) {
                break;
            }
        }
        crate::debug!("ws"; "stopped");
    }

    /// Apply one message. Returns `false` on shutdown.
    fn handle(&mut self, msg: WsMsg) -> bool {
        match msg {
            WsMsg::Reload { reason } => {
                crate::debug!("ws"; "reload: {}", reason);
                self.send_where(&LiveMessage::reload(reason), |_| true);
            }
            WsMsg::Css { paths } => {
                crate::debug!("ws"; "css: {}", paths.join(", "));
                self.send_where(&LiveMessage::Css { paths }, |_| true);
            }
            WsMsg::Mirror { from, event } => {
                if self.ghost.allows(&event.kind) {
                    self.send_where(&LiveMessage::Mirror(event), |client| client.id != from);
                }
            }
            WsMsg::AddClient { id, ws } => self.add_client(id, ws),
            WsMsg::Shutdown => {
                crate::debug!("ws"; "shutting down");
                for mut client in self.clients.drain(..) {
                    let _ = client.ws.close(None);
                    let _ = client.ws.flush();
                }
                return false;
            }
        }
        true
    }

    fn add_client(&mut self, id: String, mut ws: ClientSocket) {
        let hello = LiveMessage::connected(self.ghost);
        if let Err(e) = ws.send(Message::Text(hello.to_json().into())) {
            crate::log!("ws"; "failed to greet client {}: {}", id, e);
            return;
        }
        // A reconnecting page reuses its id; keep only the newest socket.
        self.clients.retain(|c| c.id != id);
        self.clients.push(Client { id, ws });
        crate::debug!("ws"; "client connected (total: {})", self.clients.len());
    }

    /// Send to clients matching `filter`, dropping any whose socket failed.
    fn send_where(&mut self, msg: &LiveMessage, filter: impl Fn(&Client) -> bool) {
        if self.clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let text = msg.to_json();
        let mut sent = 0;
        self.clients.retain_mut(|client| {
            if !filter(client) {
                return true;
            }
            match client.ws.send(Message::Text(text.clone().into())) {
                Ok(_) => {
                    sent += 1;
                    true
                }
                Err(e) => {
                    crate::debug!("ws"; "client {} disconnected: {}", client.id, e);
                    false
                }
            }
        });
        crate::debug!("ws"; "sent to {} clients", sent);
    }

    #[cfg(test)]
    fn client_ids(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Write};
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tungstenite::WebSocket;
    use tungstenite::protocol::Role;

    use super::*;
    use crate::actor::messages::Duplex;
    use crate::serve::message::MirrorEvent;

    /// Write-only stream capturing server frames.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Read for Sink {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    fn socket(sink: &Sink) -> ClientSocket {
        let stream: Box<dyn Duplex> = Box::new(sink.clone());
        WebSocket::from_raw_socket(stream, Role::Server, None)
    }

    fn actor(ghost: GhostMode) -> WsActor {
        let (_tx, rx) = mpsc::channel(1);
        WsActor::new(rx, ghost)
    }

    fn scroll() -> MirrorEvent {
        MirrorEvent {
            kind: "scroll".into(),
            data: serde_json::json!({ "y": 0.25 }),
        }
    }

    #[test]
    fn test_new_client_is_greeted() {
        let mut ws = actor(GhostMode::default());
        let sink = Sink::default();
        ws.handle(WsMsg::AddClient {
            id: "a".into(),
            ws: socket(&sink),
        });
        assert!(sink.text().contains(r#""type":"connected""#));
    }

    #[test]
    fn test_reload_reaches_every_client() {
        let mut ws = actor(GhostMode::default());
        let (a, b) = (Sink::default(), Sink::default());
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&a) });
        ws.handle(WsMsg::AddClient { id: "b".into(), ws: socket(&b) });

        ws.handle(WsMsg::Reload {
            reason: "item:script".into(),
        });
        assert!(a.text().contains(r#"{"type":"reload","reason":"item:script"}"#));
        assert!(b.text().contains(r#"{"type":"reload","reason":"item:script"}"#));
    }

    #[test]
    fn test_mirror_skips_sender() {
        let ghost = GhostMode {
            scroll: true,
            ..GhostMode::default()
        };
        let mut ws = actor(ghost);
        let (a, b) = (Sink::default(), Sink::default());
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&a) });
        ws.handle(WsMsg::AddClient { id: "b".into(), ws: socket(&b) });

        ws.handle(WsMsg::Mirror {
            from: "a".into(),
            event: scroll(),
        });
        assert!(!a.text().contains(r#""type":"mirror""#));
        assert!(b.text().contains(r#""type":"mirror","kind":"scroll""#));
    }

    #[test]
    fn test_mirror_dropped_when_flag_off() {
        let mut ws = actor(GhostMode::default());
        let (a, b) = (Sink::default(), Sink::default());
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&a) });
        ws.handle(WsMsg::AddClient { id: "b".into(), ws: socket(&b) });

        ws.handle(WsMsg::Mirror {
            from: "a".into(),
            event: scroll(),
        });
        assert!(!b.text().contains(r#""type":"mirror""#));
    }

    #[test]
    fn test_reconnect_replaces_client() {
        let mut ws = actor(GhostMode::default());
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&Sink::default()) });
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&Sink::default()) });
        assert_eq!(ws.client_ids(), ["a"]);
    }

    #[test]
    fn test_shutdown_stops() {
        let mut ws = actor(GhostMode::default());
        ws.handle(WsMsg::AddClient { id: "a".into(), ws: socket(&Sink::default()) });
        assert!(!ws.handle(WsMsg::Shutdown));
        assert!(ws.client_ids().is_empty());
    }
}
