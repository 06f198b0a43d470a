//! Live-update message protocol.
//!
//! JSON messages pushed from the dev server to browser clients over the
//! WebSocket channel. Clients never write to the socket; mirrored
//! interactions come in through `POST /__pipewright/mirror` instead.
//!
//! # Message Types
//!
//! - `connected`: handshake done, carries the enabled ghost flags
//! - `reload`: full page reload
//! - `css`: swap the listed stylesheets without reloading
//! - `mirror`: replay another client's interaction

use serde::{Deserialize, Serialize};

use crate::config::GhostMode;

/// Message sent to clients over WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// Connection established
    Connected {
        version: String,
        ghost: GhostMode,
    },

    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet hot-swap, URL paths under the served root
    Css { paths: Vec<String> },

    /// Interaction mirrored from another client
    Mirror(MirrorEvent),
}

/// One mirrored interaction.
///
/// `kind` is `click`, `scroll`, `location` or `input`; `data` is opaque to
/// the server and replayed as-is by the receiving client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorEvent {
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Body of a mirror POST: the sender's client id plus the event.
#[derive(Debug, Deserialize)]
pub struct MirrorPost {
    pub id: String,
    #[serde(flatten)]
    pub event: MirrorEvent,
}

impl LiveMessage {
    pub fn connected(ghost: GhostMode) -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ghost,
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

impl MirrorPost {
    pub fn from_json(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_serialization() {
        let json = LiveMessage::reload("item:script").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"item:script"}"#);

        let bare = LiveMessage::Reload { reason: None }.to_json();
        assert_eq!(bare, r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_css_serialization() {
        let msg = LiveMessage::Css {
            paths: vec!["/item/css/main.css".into()],
        };
        assert_eq!(
            msg.to_json(),
            r#"{"type":"css","paths":["/item/css/main.css"]}"#
        );
    }

    #[test]
    fn test_connected_carries_ghost_flags() {
        let ghost = GhostMode {
            scroll: true,
            ..GhostMode::default()
        };
        let json = LiveMessage::connected(ghost).to_json();
        assert!(json.starts_with(r#"{"type":"connected""#));
        assert!(json.contains(r#""scroll":true"#));
        assert!(json.contains(r#""clicks":false"#));
    }

    #[test]
    fn test_mirror_post_roundtrip_to_message() {
        let post = MirrorPost::from_json(r#"{"id":"c1","kind":"scroll","data":{"y":0.5}}"#).unwrap();
        assert_eq!(post.id, "c1");
        assert_eq!(post.event.kind, "scroll");

        let json = LiveMessage::Mirror(post.event).to_json();
        assert_eq!(json, r#"{"type":"mirror","kind":"scroll","data":{"y":0.5}}"#);
    }

    #[test]
    fn test_mirror_post_rejects_garbage() {
        assert!(MirrorPost::from_json("not json").is_none());
        assert!(MirrorPost::from_json(r#"{"kind":"click"}"#).is_none());
    }
}
