//! Core world types shared across all modules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Spatial chunking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate of the chunk containing `pos` for the given edge length.
    pub fn from_world(pos: Vec2, chunk_size: f32) -> Self {
        Self {
            x: (pos.x / chunk_size).floor() as i32,
            y: (pos.y / chunk_size).floor() as i32,
        }
    }

    /// The 3×3 block of coordinates centred on `self`, row-major order.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkCoord> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| ChunkCoord::new(self.x + dx, self.y + dy)))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Chunk content
// ---------------------------------------------------------------------------

/// A massive body exerting (client-simulated) gravity: planet, star, moon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GravityBody {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: String,
    pub is_objective: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Meteor,
    Blackhole,
    Wormhole,
}

/// A mobile or field hazard.  Only meteors carry a velocity; the other kinds
/// are stationary and keep `vx`/`vy` at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hazard {
    pub kind: HazardKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
}

/// A static rectangular obstacle, either generated or player-placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpawnBeacon {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Generated content covering one fixed-size square of world space.
///
/// Immutable once stored, except for player-placed obstacles appended to
/// `obstacles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub bodies: Vec<GravityBody>,
    pub hazards: Vec<Hazard>,
    pub obstacles: Vec<Obstacle>,
    pub beacons: Vec<SpawnBeacon>,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// Open space; positions are unconstrained here.
pub const SPACE: &str = "SPACE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Interior,
    Surface,
}

/// A named walkable location with a rectangular extent.
#[derive(Debug, Clone, Copy)]
pub struct LocationInfo {
    pub id: &'static str,
    pub width: f32,
    pub height: f32,
    pub kind: LocationKind,
}

/// Every enterable location in the universe.  `SPACE` is not listed; it has
/// no extent and no surface.
pub const LOCATIONS: &[LocationInfo] = &[
    LocationInfo {
        id: "STATION_1",
        width: 800.0,
        height: 600.0,
        kind: LocationKind::Interior,
    },
    LocationInfo {
        id: "PLANET_RED",
        width: 2000.0,
        height: 2000.0,
        kind: LocationKind::Surface,
    },
    LocationInfo {
        id: "PLANET_BLUE",
        width: 2000.0,
        height: 2000.0,
        kind: LocationKind::Surface,
    },
];

pub fn location_info(id: &str) -> Option<&'static LocationInfo> {
    LOCATIONS.iter().find(|l| l.id == id)
}

/// Rectangular walk extent for a location, `None` for open space and
/// unknown ids.
pub fn location_extent(id: &str) -> Option<(f32, f32)> {
    location_info(id).map(|l| (l.width, l.height))
}

// ---------------------------------------------------------------------------
// Surface resources
// ---------------------------------------------------------------------------

/// A mineable rock on a planet surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rock {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// The mineable-resource layer of one surface location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceMap {
    pub location: String,
    pub rocks: Vec<Rock>,
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

pub type ParticipantId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementMode {
    Ship,
    Walk,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub rocks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub max_speed_observed: f32,
}

/// Transient per-room participant record.
///
/// `money`, `inventory` and `active_quest` are server-owned: nothing a client
/// sends over the movement path can touch them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: ParticipantId,
    pub color: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub mode: MovementMode,
    pub location: String,
    pub fuel: f32,
    pub max_fuel: f32,
    pub money: u32,
    pub inventory: Inventory,
    pub active_quest: Option<Quest>,
    pub stats: PlayerStats,
}

impl Player {
    /// Fresh participant at the room spawn point.
    pub fn spawn(
        id: impl Into<ParticipantId>,
        color: impl Into<String>,
        config: &WorldConfig,
    ) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            x: config.spawn_x,
            y: config.spawn_y,
            angle: 0.0,
            speed: 0.0,
            mode: MovementMode::Ship,
            location: SPACE.to_string(),
            fuel: config.starting_fuel,
            max_fuel: config.starting_fuel,
            money: 0,
            inventory: Inventory::default(),
            active_quest: None,
            stats: PlayerStats::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestKind {
    Delivery,
    Gather,
    Scout,
    Speed,
}

/// A server-issued objective with a one-time monetary reward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quest {
    pub kind: QuestKind,
    /// Station/planet id for delivery and scout quests.
    pub target: Option<String>,
    /// Rock count for gather quests, zero otherwise.
    pub required: u32,
    /// Speed threshold for speed quests, zero otherwise.
    pub threshold: f32,
    pub reward: u32,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub rooms: usize,
    pub participants: usize,
    pub chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width/height of a single streaming chunk in world units.
    pub chunk_size: f32,
    /// Where new participants materialise (open space).
    pub spawn_x: f32,
    pub spawn_y: f32,
    /// Fuel (and initial tank capacity) for a fresh participant.
    pub starting_fuel: f32,
    /// Bounds on how many rocks a surface location rolls.
    pub surface_rocks_min: u32,
    pub surface_rocks_max: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000.0,
            spawn_x: 100.0,
            spawn_y: 100.0,
            starting_fuel: 100.0,
            surface_rocks_min: 12,
            surface_rocks_max: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),
    #[error("Not a member of room {0}")]
    NotInRoom(String),
}
