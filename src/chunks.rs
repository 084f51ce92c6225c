//! Chunk store: per-room cache with at-most-once generation per coordinate.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;
use parking_lot::RwLock;

use crate::gen::ChunkGenerator;
use crate::protocol::ChunkRecord;
use crate::types::{Chunk, ChunkCoord, Obstacle};

/// Per-room chunk cache.
///
/// A missing coordinate is claimed and populated under a single write-lock
/// hold, so any number of callers racing on the same coordinate observe
/// exactly one generation and identical content.  Chunks persist for the
/// life of the room; there is no eviction.
pub struct ChunkStore {
    generator: ChunkGenerator,
    cache: RwLock<HashMap<ChunkCoord, Chunk>>,
}

impl ChunkStore {
    pub fn new(generator: ChunkGenerator) -> Self {
        Self {
            generator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Return the chunk at `coord`, generating and storing it first if this
    /// is the coordinate's first access.  The flag is `true` only for the
    /// call that created the chunk.
    pub fn ensure(&self, coord: ChunkCoord) -> (Chunk, bool) {
        let mut cache = self.cache.write();
        match cache.entry(coord) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(v) => {
                let chunk = self.generator.generate(coord);
                v.insert(chunk.clone());
                debug!("generated chunk {}", coord);
                (chunk, true)
            }
        }
    }

    /// Append a player-placed obstacle, lazily creating the chunk when the
    /// coordinate has never been touched.  Visible to all subsequent reads.
    pub fn append_obstacle(&self, coord: ChunkCoord, obstacle: Obstacle) {
        let mut cache = self.cache.write();
        let chunk = cache
            .entry(coord)
            .or_insert_with(|| self.generator.generate(coord));
        chunk.obstacles.push(obstacle);
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Chunk> {
        self.cache.read().get(&coord).cloned()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.cache.read().contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Every generated chunk, for a joining participant's world summary.
    pub fn snapshot(&self) -> Vec<ChunkRecord> {
        self.cache
            .read()
            .iter()
            .map(|(coord, chunk)| ChunkRecord {
                cx: coord.x,
                cy: coord.y,
                chunk: chunk.clone(),
            })
            .collect()
    }
}
