//! Session wire protocol.
//!
//! This module owns **every message that crosses the session boundary**
//! between the server and a connected client.  Frames are single JSON
//! objects, one per newline-terminated line, in both directions.
//!
//! ## Client → server
//!
//! | Event                       | Data keys                                      |
//! |-----------------------------|------------------------------------------------|
//! | `createRoom`                | kind                                           |
//! | `joinRoom`                  | code                                           |
//! | `playerUpdate` (`playerMove`) | roomCode, x, y, angle, mode, location, speed |
//! | `mineRock`                  | roomCode, resourceId                           |
//! | `acceptQuest` / `completeQuest` | roomCode                                   |
//! | `buyUpgrade`                | roomCode, item                                 |
//! | `refuel`                    | roomCode                                       |
//! | `placeObject`               | roomCode, x, y, w, h, angle                    |
//! | `chatMessage`               | roomCode, text                                 |
//!
//! ## Server → client
//!
//! | Event              | Recipients           | Payload                         |
//! |--------------------|----------------------|---------------------------------|
//! | `roomCreated`      | creator              | code, seed, chunkSize, you      |
//! | `joinedRoom`       | joiner               | full world summary              |
//! | `updatePlayerList` | room                 | players                         |
//! | `playerMoved`      | room minus sender    | id + transform                  |
//! | `newChunk`         | room incl. sender    | cx, cy, chunk                   |
//! | `mapUpdate`        | room                 | location, resourceId, miner     |
//! | `objectPlaced`     | room                 | cx, cy, obstacle, placedBy      |
//! | `questOutcome`     | acting player        | status, quest, reward, money    |
//! | `shopResult`       | acting player        | item, purchased, money, fuel    |
//! | `chatMessage`      | room incl. sender    | id, text                        |
//! | `errorMsg`         | acting player        | message                         |
//!
//! ## Design rules
//!
//! 1. Every struct must be `Serialize + Deserialize`; payload keys are
//!    camelCase to match the browser client.
//! 2. No store-layer types leak out — chunks cross the wire as plain
//!    content records, never as cache handles.
//! 3. Every outbound frame carries `frame: u64`, the per-room sequence
//!    number stamped when the server applied the originating update.

use serde::{Deserialize, Serialize};

use crate::types::{
    Chunk, MovementMode, Obstacle, ParticipantId, Player, Quest, SurfaceMap,
};

// ---------------------------------------------------------------------------
// Common envelope
// ---------------------------------------------------------------------------

/// Every outbound message is wrapped in this envelope.
///
/// The `frame` field lets clients order interleaved streams: a `newChunk`
/// always carries a frame ≤ the frame of any movement that depended on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub frame: u64,
    pub event: T,
}

impl<T> Envelope<T> {
    pub fn new(frame: u64, event: T) -> Self {
        Self { frame, event }
    }
}

// ---------------------------------------------------------------------------
// Chunk transfer record
// ---------------------------------------------------------------------------

/// One chunk together with its coordinate, as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    pub cx: i32,
    pub cy: i32,
    pub chunk: Chunk,
}

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    CreateRoom {
        #[serde(default)]
        kind: Option<String>,
    },
    JoinRoom {
        code: String,
    },
    #[serde(alias = "playerMove")]
    PlayerUpdate {
        room_code: String,
        x: f32,
        y: f32,
        angle: f32,
        mode: MovementMode,
        location: String,
        speed: f32,
    },
    MineRock {
        room_code: String,
        resource_id: String,
    },
    AcceptQuest {
        room_code: String,
    },
    CompleteQuest {
        room_code: String,
    },
    BuyUpgrade {
        room_code: String,
        item: String,
    },
    Refuel {
        room_code: String,
    },
    PlaceObject {
        room_code: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        angle: f32,
    },
    ChatMessage {
        room_code: String,
        text: String,
    },
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Accepted,
    Completed,
    Unfulfilled,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    RoomCreated {
        code: String,
        kind: String,
        seed: u64,
        chunk_size: f32,
        you: Player,
    },
    /// Full world summary for a joining participant: everything generated so
    /// far, so the joiner observes the same world as everyone else.
    JoinedRoom {
        code: String,
        kind: String,
        seed: u64,
        chunk_size: f32,
        you: Player,
        players: Vec<Player>,
        chunks: Vec<ChunkRecord>,
        surfaces: Vec<SurfaceMap>,
    },
    UpdatePlayerList {
        players: Vec<Player>,
    },
    PlayerMoved {
        id: ParticipantId,
        x: f32,
        y: f32,
        angle: f32,
        mode: MovementMode,
        location: String,
        speed: f32,
    },
    NewChunk {
        cx: i32,
        cy: i32,
        chunk: Chunk,
    },
    MapUpdate {
        location: String,
        resource_id: String,
        miner: ParticipantId,
        rocks_held: u32,
    },
    ObjectPlaced {
        cx: i32,
        cy: i32,
        obstacle: Obstacle,
        placed_by: ParticipantId,
    },
    QuestOutcome {
        status: QuestStatus,
        quest: Option<Quest>,
        reward: u32,
        money: u32,
    },
    ShopResult {
        item: String,
        purchased: bool,
        money: u32,
        fuel: f32,
        max_fuel: f32,
    },
    ChatMessage {
        id: ParticipantId,
        text: String,
    },
    ErrorMsg {
        message: String,
    },
}
