//! Drift World Engine
//!
//! A server-authoritative multiplayer session host for a 2D space world.
//! Rooms hold independent participant sets and a procedurally generated,
//! chunk-streamed universe; every participant in a room observes the same
//! generated content and the same peer positions.
//!
//! ## Architecture
//!
//! ```text
//! net  (net.rs)                       ← TCP transport, JSON lines
//!   └── SessionService  (service.rs)  ← single-threaded event core
//!         ├── RoomRegistry  (rooms.rs)     ← room lifecycle
//!         │     └── Room
//!         │           ├── ChunkStore      (chunks.rs)  ← claim-before-generate cache
//!         │           │     └── ChunkGenerator (gen.rs) ← pure, seed-derived
//!         │           └── PlayerDirectory (players.rs) ← movement sync
//!         ├── Dispatcher  (broadcast.rs)   ← single fan-out point
//!         └── quests / economy             ← per-participant state machines
//! ```
//!
//! The transport feeds every inbound event through one hub task, so room
//! state is only ever mutated by one logical thread of control.

// Protocol types are always available (no server feature needed).
pub mod protocol;
pub mod types;

// World engine (always available; pure of the async runtime).
pub mod chunks;
pub mod economy;
pub mod gen;
pub mod players;
pub mod quests;
pub mod rooms;

// Server-side modules require the `server` feature.
#[cfg(feature = "server")]
pub mod broadcast;
#[cfg(feature = "server")]
pub mod net;
#[cfg(feature = "server")]
pub mod service;

// Convenience re-exports
#[cfg(feature = "server")]
pub use broadcast::Dispatcher;
pub use chunks::ChunkStore;
pub use gen::ChunkGenerator;
pub use players::{MovementDelta, PlayerDirectory};
pub use rooms::{Room, RoomRegistry};
#[cfg(feature = "server")]
pub use service::SessionService;
pub use types::{ChunkCoord, Player, RegistryStats, SessionError, Vec2, WorldConfig};
