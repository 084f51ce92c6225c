//! Rooms: one isolated session each, plus the registry that owns them.
//!
//! A room exclusively owns its chunk store, player directory and surface
//! maps.  The registry is the only place rooms are created and destroyed;
//! it is handed to the session service rather than living in ambient state.

use std::collections::HashMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::chunks::ChunkStore;
use crate::gen::ChunkGenerator;
use crate::players::PlayerDirectory;
use crate::protocol::ChunkRecord;
use crate::types::{
    ChunkCoord, LocationKind, RegistryStats, SessionError, SurfaceMap, Vec2, WorldConfig,
    LOCATIONS,
};

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_LEN: usize = 5;

/// Derive a room's world seed from its code, so the seed is reproducible
/// from the code alone.
pub fn seed_from_code(code: &str) -> u64 {
    let digest = md5::compute(code.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    u64::from_le_bytes(bytes)
}

fn random_code(rng: &mut StdRng) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One multiplayer session: a set of participants and their shared world.
pub struct Room {
    pub code: String,
    pub kind: String,
    pub seed: u64,
    pub chunks: ChunkStore,
    pub players: PlayerDirectory,
    surfaces: HashMap<String, SurfaceMap>,
    config: WorldConfig,
    frame: u64,
}

impl Room {
    pub fn new(code: String, kind: String, seed: u64, config: WorldConfig) -> Self {
        let generator = ChunkGenerator::new(seed, config.chunk_size);

        // Surface rock fields are small and fully determined by the seed;
        // rolling them up front keeps every participant's view identical
        // from the first join.
        let surfaces = LOCATIONS
            .iter()
            .filter(|l| l.kind == LocationKind::Surface)
            .map(|l| {
                let map =
                    generator.generate_surface(l, config.surface_rocks_min, config.surface_rocks_max);
                (l.id.to_string(), map)
            })
            .collect();

        Self {
            code,
            kind,
            seed,
            chunks: ChunkStore::new(generator),
            players: PlayerDirectory::new(),
            surfaces,
            config,
            frame: 0,
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.config.chunk_size
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Advance and return the room's event sequence number.
    pub fn next_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Chunk coordinate containing a world position.
    pub fn chunk_at(&self, pos: Vec2) -> ChunkCoord {
        ChunkCoord::from_world(pos, self.config.chunk_size)
    }

    // -----------------------------------------------------------------------
    // Streaming controller
    // -----------------------------------------------------------------------

    /// Pre-stream the 3×3 neighbourhood around a position.
    ///
    /// Returns only the chunks created by this call — a chunk already
    /// present must not be re-broadcast.
    pub fn stream_around(&self, pos: Vec2) -> Vec<ChunkRecord> {
        let center = self.chunk_at(pos);
        let mut fresh = Vec::new();

        for coord in center.neighborhood() {
            let (chunk, created) = self.chunks.ensure(coord);
            if created {
                fresh.push(ChunkRecord {
                    cx: coord.x,
                    cy: coord.y,
                    chunk,
                });
            }
        }

        if !fresh.is_empty() {
            debug!(
                "room {}: streamed {} new chunks around {} ({} cached)",
                self.code,
                fresh.len(),
                center,
                self.chunks.len()
            );
        }
        fresh
    }

    // -----------------------------------------------------------------------
    // Surface resources
    // -----------------------------------------------------------------------

    pub fn surface(&self, location: &str) -> Option<&SurfaceMap> {
        self.surfaces.get(location)
    }

    /// All surface maps, for a joining participant's world summary.
    pub fn surfaces_snapshot(&self) -> Vec<SurfaceMap> {
        let mut maps: Vec<SurfaceMap> = self.surfaces.values().cloned().collect();
        maps.sort_by(|a, b| a.location.cmp(&b.location));
        maps
    }

    /// Remove one rock by id.  Returns `false` when the id is stale or the
    /// location has no surface — both are idempotent no-ops.
    pub fn mine_rock(&mut self, location: &str, resource_id: &str) -> bool {
        let Some(surface) = self.surfaces.get_mut(location) else {
            return false;
        };
        let before = surface.rocks.len();
        surface.rocks.retain(|r| r.id != resource_id);
        surface.rocks.len() != before
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owns every live room; created rooms live until their last participant
/// leaves.
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    config: WorldConfig,
}

impl RoomRegistry {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Allocate a room under a fresh code.
    pub fn create_room(&mut self, kind: &str, rng: &mut StdRng) -> &mut Room {
        let code = loop {
            let candidate = random_code(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let seed = seed_from_code(&code);
        info!("room {} created (kind={}, seed={:#018x})", code, kind, seed);

        let room = Room::new(code.clone(), kind.to_string(), seed, self.config.clone());
        self.rooms.entry(code).or_insert(room)
    }

    pub fn room(&self, code: &str) -> Result<&Room, SessionError> {
        self.rooms
            .get(code)
            .ok_or_else(|| SessionError::RoomNotFound(code.to_string()))
    }

    pub fn room_mut(&mut self, code: &str) -> Result<&mut Room, SessionError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| SessionError::RoomNotFound(code.to_string()))
    }

    /// Room lookup that also checks the caller is a member.
    pub fn resolve_member(&mut self, code: &str, id: &str) -> Result<&mut Room, SessionError> {
        let room = self.room_mut(code)?;
        if !room.players.contains(id) {
            return Err(SessionError::NotInRoom(code.to_string()));
        }
        Ok(room)
    }

    /// Tear a room down, releasing its chunk store and surfaces.
    pub fn remove_room(&mut self, code: &str) {
        if self.rooms.remove(code).is_some() {
            info!("room {} destroyed", code);
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            rooms: self.rooms.len(),
            participants: self.rooms.values().map(|r| r.players.len()).sum(),
            chunks: self.rooms.values().map(|r| r.chunks.len()).sum(),
        }
    }
}
