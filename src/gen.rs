//! Procedural generation: chunk content and surface resource fields.
//!
//! Generation is a pure function of `(room seed, coordinate)` — every draw
//! comes from a `StdRng` seeded by mixing the room seed with the coordinate,
//! so regenerating the same coordinate reproduces identical content.
//! Generation cannot fail; it only produces content.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{
    Chunk, ChunkCoord, GravityBody, Hazard, HazardKind, LocationInfo, Obstacle, Rock, SpawnBeacon,
    SurfaceMap,
};

// Per-chunk roll bounds.
const MAX_BODIES: u32 = 2;
const MAX_OBSTACLES: u32 = 2;
const MAX_HAZARDS: u32 = 3;

// Hazard kind weights: meteors dominate, wormholes are rare.
const METEOR_WEIGHT: f64 = 0.80;
const BLACKHOLE_WEIGHT: f64 = 0.15;

const METEOR_MAX_SPEED: f32 = 2.5;
const OBJECTIVE_CHANCE: f64 = 0.10;

const BODY_RADIUS_MIN: f32 = 40.0;
const BODY_RADIUS_MAX: f32 = 160.0;
const HAZARD_RADIUS_MIN: f32 = 20.0;
const HAZARD_RADIUS_MAX: f32 = 60.0;
const OBSTACLE_EXTENT_MIN: f32 = 30.0;
const OBSTACLE_EXTENT_MAX: f32 = 120.0;
const BEACON_RADIUS: f32 = 80.0;

/// Deterministic content generator for one room.
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    pub seed: u64,
    /// World-space width/height of a single chunk.
    pub chunk_size: f32,
}

impl ChunkGenerator {
    pub fn new(seed: u64, chunk_size: f32) -> Self {
        Self { seed, chunk_size }
    }

    // -----------------------------------------------------------------------
    // Seed mixing
    // -----------------------------------------------------------------------

    /// RNG for one chunk coordinate.  Each axis is spread by a different
    /// odd multiplier before xor-folding into the room seed, so neighbouring
    /// coordinates land in unrelated streams.
    fn chunk_rng(&self, coord: ChunkCoord) -> StdRng {
        let mixed = self
            .seed
            ^ (coord.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (coord.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        StdRng::seed_from_u64(mixed)
    }

    /// RNG for one named surface location.
    fn surface_rng(&self, location: &str) -> StdRng {
        let mixed = location
            .bytes()
            .fold(self.seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        StdRng::seed_from_u64(mixed)
    }

    // -----------------------------------------------------------------------
    // Chunk generation
    // -----------------------------------------------------------------------

    /// Generate the content of one chunk.
    ///
    /// The origin chunk `(0,0)` always contains exactly one spawn beacon and
    /// nothing else; every other chunk rolls bodies, obstacles and hazards
    /// independently.
    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        if coord.x == 0 && coord.y == 0 {
            return self.origin_chunk();
        }

        let mut rng = self.chunk_rng(coord);
        let origin_x = coord.x as f32 * self.chunk_size;
        let origin_y = coord.y as f32 * self.chunk_size;

        let bodies = (0..rng.random_range(0..=MAX_BODIES))
            .map(|_| GravityBody {
                x: origin_x + rng.random_range(0.0..self.chunk_size),
                y: origin_y + rng.random_range(0.0..self.chunk_size),
                radius: rng.random_range(BODY_RADIUS_MIN..BODY_RADIUS_MAX),
                color: random_color(&mut rng),
                is_objective: rng.random_bool(OBJECTIVE_CHANCE),
            })
            .collect();

        let obstacles = (0..rng.random_range(0..=MAX_OBSTACLES))
            .map(|_| Obstacle {
                x: origin_x + rng.random_range(0.0..self.chunk_size),
                y: origin_y + rng.random_range(0.0..self.chunk_size),
                w: rng.random_range(OBSTACLE_EXTENT_MIN..OBSTACLE_EXTENT_MAX),
                h: rng.random_range(OBSTACLE_EXTENT_MIN..OBSTACLE_EXTENT_MAX),
                angle: rng.random_range(0.0..std::f32::consts::TAU),
            })
            .collect();

        let hazards = (0..rng.random_range(0..=MAX_HAZARDS))
            .map(|_| {
                let kind = roll_hazard_kind(&mut rng);
                let (vx, vy) = match kind {
                    HazardKind::Meteor => (
                        rng.random_range(-METEOR_MAX_SPEED..METEOR_MAX_SPEED),
                        rng.random_range(-METEOR_MAX_SPEED..METEOR_MAX_SPEED),
                    ),
                    _ => (0.0, 0.0),
                };
                Hazard {
                    kind,
                    x: origin_x + rng.random_range(0.0..self.chunk_size),
                    y: origin_y + rng.random_range(0.0..self.chunk_size),
                    radius: rng.random_range(HAZARD_RADIUS_MIN..HAZARD_RADIUS_MAX),
                    vx,
                    vy,
                }
            })
            .collect();

        Chunk {
            bodies,
            hazards,
            obstacles,
            beacons: Vec::new(),
        }
    }

    fn origin_chunk(&self) -> Chunk {
        Chunk {
            beacons: vec![SpawnBeacon {
                x: self.chunk_size / 2.0,
                y: self.chunk_size / 2.0,
                radius: BEACON_RADIUS,
            }],
            ..Chunk::default()
        }
    }

    // -----------------------------------------------------------------------
    // Surface generation
    // -----------------------------------------------------------------------

    /// Roll the mineable-rock field for one surface location.
    pub fn generate_surface(
        &self,
        location: &LocationInfo,
        rocks_min: u32,
        rocks_max: u32,
    ) -> SurfaceMap {
        let mut rng = self.surface_rng(location.id);
        let count = rng.random_range(rocks_min..=rocks_max.max(rocks_min));

        let rocks = (0..count)
            .map(|n| Rock {
                id: format!("{}:rock:{}", location.id, n),
                x: rng.random_range(0.0..location.width),
                y: rng.random_range(0.0..location.height),
            })
            .collect();

        SurfaceMap {
            location: location.id.to_string(),
            rocks,
        }
    }
}

// ---------------------------------------------------------------------------
// Draw helpers
// ---------------------------------------------------------------------------

fn roll_hazard_kind(rng: &mut StdRng) -> HazardKind {
    let roll: f64 = rng.random_range(0.0..1.0);
    if roll < METEOR_WEIGHT {
        HazardKind::Meteor
    } else if roll < METEOR_WEIGHT + BLACKHOLE_WEIGHT {
        HazardKind::Blackhole
    } else {
        HazardKind::Wormhole
    }
}

/// Uniform `#RRGGBB` color, same scheme the browser client used for
/// join colors.
pub fn random_color(rng: &mut impl Rng) -> String {
    format!("#{:06X}", rng.random_range(0..0x100_0000u32))
}
