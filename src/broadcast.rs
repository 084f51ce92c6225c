//! Broadcast dispatcher: the single fan-out point for server → client events.
//!
//! Every handler delivers through this type, so sender-inclusion rules live
//! in exactly one place:
//!
//! | Event                         | Sender included? |
//! |-------------------------------|------------------|
//! | `playerMoved`                 | no               |
//! | `newChunk`, `chatMessage`,
//!   `updatePlayerList`, `mapUpdate`,
//!   `objectPlaced`                | yes              |
//! | everything else               | direct reply     |
//!
//! A frame is serialised once and the cheap-clone [`Bytes`] handle is pushed
//! onto every recipient's queue, so a slow connection never blocks the hub.

use std::collections::HashMap;

use bytes::Bytes;
use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::protocol::{Envelope, ServerEvent};
use crate::types::ParticipantId;

/// One wire frame per recipient queue.
pub type Sink = UnboundedSender<Bytes>;

#[derive(Default)]
pub struct Dispatcher {
    sinks: HashMap<ParticipantId, Sink>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: impl Into<ParticipantId>, sink: Sink) {
        self.sinks.insert(id.into(), sink);
    }

    pub fn detach(&mut self, id: &str) {
        self.sinks.remove(id);
    }

    /// Deliver to a single participant.
    pub fn send_to(&self, id: &str, frame: u64, event: &ServerEvent) {
        let Some(payload) = encode(frame, event) else {
            return;
        };
        self.push(id, payload);
    }

    /// Deliver to every listed participant, sender included.
    pub fn broadcast<'a>(
        &self,
        members: impl IntoIterator<Item = &'a ParticipantId>,
        frame: u64,
        event: &ServerEvent,
    ) {
        let Some(payload) = encode(frame, event) else {
            return;
        };
        for id in members {
            self.push(id, payload.clone());
        }
    }

    /// Deliver to every listed participant except `skip` (the sender).
    pub fn broadcast_except<'a>(
        &self,
        members: impl IntoIterator<Item = &'a ParticipantId>,
        skip: &str,
        frame: u64,
        event: &ServerEvent,
    ) {
        let Some(payload) = encode(frame, event) else {
            return;
        };
        for id in members {
            if id != skip {
                self.push(id, payload.clone());
            }
        }
    }

    fn push(&self, id: &str, payload: Bytes) {
        let Some(sink) = self.sinks.get(id) else {
            return;
        };
        // A closed sink just means the connection is mid-teardown.
        if sink.send(payload).is_err() {
            debug!("dropping frame for disconnecting participant {}", id);
        }
    }
}

/// Serialise `event` into a newline-terminated wire frame.
///
/// Errors are logged and swallowed — one unencodable event should not take
/// down the hub.
fn encode(frame: u64, event: &ServerEvent) -> Option<Bytes> {
    match serde_json::to_vec(&Envelope::new(frame, event)) {
        Ok(mut buf) => {
            buf.push(b'\n');
            Some(Bytes::from(buf))
        }
        Err(e) => {
            warn!("failed to serialise outbound event: {}", e);
            None
        }
    }
}
