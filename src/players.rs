//! Player directory: participant admission, movement sync, protected state.

use std::collections::HashMap;

use crate::types::{location_extent, MovementMode, ParticipantId, Player};

// ---------------------------------------------------------------------------
// Movement deltas
// ---------------------------------------------------------------------------

/// The transform fields a client is allowed to report.
///
/// Server-owned state (money, inventory, active quest) is not representable
/// here, so a hostile delta cannot touch it.
#[derive(Debug, Clone)]
pub struct MovementDelta {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub mode: MovementMode,
    pub location: String,
}

/// Trust boundary for client-reported transforms.
///
/// Currently accepts every reported value verbatim, matching the observed
/// behaviour of the prototype.  A stricter policy (e.g. bounded delta per
/// update) replaces this function's body without touching the rest of the
/// movement pipeline.
pub fn admit_movement(delta: MovementDelta) -> MovementDelta {
    delta
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Per-room participant records, keyed by participant id.
#[derive(Default)]
pub struct PlayerDirectory {
    players: HashMap<ParticipantId, Player>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn remove(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> + Clone {
        self.players.keys()
    }

    /// All records, sorted by id for stable wire payloads.
    pub fn roster(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }

    /// Apply an accepted movement delta to a participant record.
    ///
    /// Overwrites transform fields only.  In WALK mode the position is
    /// clamped to the current location's rectangular extent; SHIP mode is
    /// unconstrained.  Also folds the observed speed into the participant's
    /// running maximum for quest evaluation.
    pub fn apply_update(&mut self, id: &str, delta: MovementDelta) -> Option<&Player> {
        let player = self.players.get_mut(id)?;
        let delta = admit_movement(delta);

        player.angle = delta.angle;
        player.speed = delta.speed;
        player.mode = delta.mode;
        player.location = delta.location;

        match (player.mode, location_extent(&player.location)) {
            (MovementMode::Walk, Some((width, height))) => {
                player.x = delta.x.clamp(0.0, width);
                player.y = delta.y.clamp(0.0, height);
            }
            _ => {
                player.x = delta.x;
                player.y = delta.y;
            }
        }

        player.stats.max_speed_observed = player.stats.max_speed_observed.max(delta.speed);
        Some(player)
    }
}
