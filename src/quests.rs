//! Quest engine: mission lifecycle per participant.
//!
//! The state machine is `NONE → ACTIVE → NONE`; quests never expire and
//! there is no failure state.  A completion attempt that does not satisfy
//! the quest's predicate leaves the quest active and is reported as
//! not-yet-satisfied, not as an error.

use rand::rngs::StdRng;
use rand::Rng;

use crate::types::{Player, Quest, QuestKind};

const DELIVERY_TARGET: &str = "STATION_1";
const DELIVERY_REWARD: u32 = 200;
const GATHER_AMOUNT: u32 = 5;
const GATHER_REWARD: u32 = 150;
const SCOUT_TARGETS: &[&str] = &["PLANET_RED", "PLANET_BLUE"];
const SCOUT_REWARD: u32 = 100;
const SPEED_THRESHOLD: f32 = 8.0;
const SPEED_REWARD: u32 = 250;

/// Result of a completion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestResult {
    /// Predicate satisfied; `reward` has been credited and the quest cleared.
    Completed { reward: u32 },
    /// Predicate not yet satisfied; the quest stays active.
    Unfulfilled,
    /// No active quest — completing is a no-op.
    NoQuest,
}

/// Materialise a concrete quest from the fixed catalog.
pub fn offer_quest(rng: &mut StdRng) -> Quest {
    match rng.random_range(0..4u32) {
        0 => Quest {
            kind: QuestKind::Delivery,
            target: Some(DELIVERY_TARGET.to_string()),
            required: 0,
            threshold: 0.0,
            reward: DELIVERY_REWARD,
            description: format!("Deliver the sealed cargo pod to {DELIVERY_TARGET}"),
        },
        1 => Quest {
            kind: QuestKind::Gather,
            target: None,
            required: GATHER_AMOUNT,
            threshold: 0.0,
            reward: GATHER_REWARD,
            description: format!("Mine {GATHER_AMOUNT} rocks from any planet surface"),
        },
        2 => {
            let target = SCOUT_TARGETS[rng.random_range(0..SCOUT_TARGETS.len())];
            Quest {
                kind: QuestKind::Scout,
                target: Some(target.to_string()),
                required: 0,
                threshold: 0.0,
                reward: SCOUT_REWARD,
                description: format!("Set foot on {target} and report back"),
            }
        }
        _ => Quest {
            kind: QuestKind::Speed,
            target: None,
            required: 0,
            threshold: SPEED_THRESHOLD,
            reward: SPEED_REWARD,
            description: format!("Push your ship past {SPEED_THRESHOLD} speed"),
        },
    }
}

/// `NONE → ACTIVE`: give the participant a quest if they have none.
///
/// Accepting while a quest is already active is idempotent — the existing
/// quest is returned untouched.
pub fn accept_quest<'a>(player: &'a mut Player, rng: &mut StdRng) -> &'a Quest {
    player.active_quest.get_or_insert_with(|| offer_quest(rng))
}

/// `ACTIVE → NONE`: evaluate the per-kind predicate against the current
/// participant state and settle the quest on success.
///
/// The reward is credited exactly once; gather quests consume the required
/// rocks on success.
pub fn complete_quest(player: &mut Player) -> QuestResult {
    let Some(quest) = player.active_quest.as_ref() else {
        return QuestResult::NoQuest;
    };

    let satisfied = match quest.kind {
        QuestKind::Delivery | QuestKind::Scout => {
            quest.target.as_deref() == Some(player.location.as_str())
        }
        QuestKind::Gather => player.inventory.rocks >= quest.required,
        QuestKind::Speed => player.stats.max_speed_observed >= quest.threshold,
    };

    if !satisfied {
        return QuestResult::Unfulfilled;
    }

    let reward = quest.reward;
    if quest.kind == QuestKind::Gather {
        player.inventory.rocks -= quest.required;
    }
    player.money += reward;
    player.active_quest = None;

    QuestResult::Completed { reward }
}
