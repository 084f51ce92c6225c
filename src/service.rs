//! SessionService – the single-threaded event core.
//!
//! Every inbound client event lands here, one at a time in arrival order;
//! all room, directory and chunk mutations happen inside these handlers.
//! The transport layer only parses frames and forwards them — it never
//! touches session state.
//!
//! ## Event contract (inbound)
//!
//! | Event           | Effect                                                |
//! |-----------------|-------------------------------------------------------|
//! | `createRoom`    | allocate room, admit creator, stream spawn area       |
//! | `joinRoom`      | admit participant, reply with full world summary      |
//! | `playerUpdate`  | movement sync + 3×3 chunk streaming                   |
//! | `mineRock`      | remove surface rock, credit inventory                 |
//! | `acceptQuest`   | `NONE → ACTIVE`                                       |
//! | `completeQuest` | `ACTIVE → NONE` when the predicate holds              |
//! | `buyUpgrade`    | debit fixed price, raise capacity                     |
//! | `refuel`        | fill the tank (free)                                  |
//! | `placeObject`   | append obstacle to owning chunk                       |
//! | `chatMessage`   | relay verbatim to the room                            |

use std::collections::HashMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::broadcast::{Dispatcher, Sink};
use crate::economy;
use crate::gen::random_color;
use crate::players::MovementDelta;
use crate::protocol::{ChunkRecord, ClientEvent, QuestStatus, ServerEvent};
use crate::quests::{self, QuestResult};
use crate::rooms::RoomRegistry;
use crate::types::{
    MovementMode, Obstacle, ParticipantId, Player, RegistryStats, SessionError, Vec2, WorldConfig,
};

/// Color reserved for a room's creator; later joiners roll a random one.
const HOST_COLOR: &str = "#FF0000";
const DEFAULT_ROOM_KIND: &str = "space";

pub struct SessionService {
    registry: RoomRegistry,
    dispatcher: Dispatcher,
    /// Participant id → code of the room they currently occupy.
    memberships: HashMap<ParticipantId, String>,
    rng: StdRng,
}

impl SessionService {
    pub fn new(config: WorldConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Construct with a caller-supplied RNG for reproducible sessions
    /// (room codes, join colors and quest draws all come from it).
    pub fn with_rng(config: WorldConfig, rng: StdRng) -> Self {
        Self {
            registry: RoomRegistry::new(config),
            dispatcher: Dispatcher::new(),
            memberships: HashMap::new(),
            rng,
        }
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Register a participant's outbound queue.
    pub fn connect(&mut self, id: impl Into<ParticipantId>, sink: Sink) {
        let id = id.into();
        debug!("participant {} connected", id);
        self.dispatcher.attach(id, sink);
    }

    /// Synchronously remove a participant.  Tears the room down when its
    /// directory empties; subsequent joins with that code fail as not-found.
    pub fn disconnect(&mut self, id: &str) {
        self.dispatcher.detach(id);
        let Some(code) = self.memberships.remove(id) else {
            return;
        };

        let destroy = {
            let Ok(room) = self.registry.room_mut(&code) else {
                return;
            };
            room.players.remove(id);
            info!("participant {} left room {}", id, code);

            if room.players.is_empty() {
                true
            } else {
                let frame = room.next_frame();
                let players = room.players.roster();
                self.dispatcher.broadcast(
                    room.players.ids(),
                    frame,
                    &ServerEvent::UpdatePlayerList { players },
                );
                false
            }
        };

        if destroy {
            self.registry.remove_room(&code);
        }
    }

    // -----------------------------------------------------------------------
    // Event dispatch
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, id: &str, event: ClientEvent) {
        match event {
            ClientEvent::CreateRoom { kind } => self.create_room(id, kind),
            ClientEvent::JoinRoom { code } => self.join_room(id, &code),
            ClientEvent::PlayerUpdate {
                room_code,
                x,
                y,
                angle,
                mode,
                location,
                speed,
            } => self.player_update(id, &room_code, x, y, angle, mode, location, speed),
            ClientEvent::MineRock {
                room_code,
                resource_id,
            } => self.mine_rock(id, &room_code, resource_id),
            ClientEvent::AcceptQuest { room_code } => self.accept_quest(id, &room_code),
            ClientEvent::CompleteQuest { room_code } => self.complete_quest(id, &room_code),
            ClientEvent::BuyUpgrade { room_code, item } => self.buy_upgrade(id, &room_code, item),
            ClientEvent::Refuel { room_code } => self.refuel(id, &room_code),
            ClientEvent::PlaceObject {
                room_code,
                x,
                y,
                w,
                h,
                angle,
            } => self.place_object(id, &room_code, x, y, w, h, angle),
            ClientEvent::ChatMessage { room_code, text } => self.chat(id, &room_code, text),
        }
    }

    // -----------------------------------------------------------------------
    // Room lifecycle
    // -----------------------------------------------------------------------

    fn create_room(&mut self, id: &str, kind: Option<String>) {
        let kind = kind.unwrap_or_else(|| DEFAULT_ROOM_KIND.to_string());
        let room = self.registry.create_room(&kind, &mut self.rng);

        let player = Player::spawn(id, HOST_COLOR, room.config());
        room.players.insert(player.clone());
        self.memberships.insert(id.to_string(), room.code.clone());

        let frame = room.next_frame();
        self.dispatcher.send_to(
            id,
            frame,
            &ServerEvent::RoomCreated {
                code: room.code.clone(),
                kind: room.kind.clone(),
                seed: room.seed,
                chunk_size: room.chunk_size(),
                you: player,
            },
        );
        self.dispatcher.broadcast(
            room.players.ids(),
            frame,
            &ServerEvent::UpdatePlayerList {
                players: room.players.roster(),
            },
        );

        // The spawn admission counts as the first accepted position update.
        let spawn = Vec2::new(room.config().spawn_x, room.config().spawn_y);
        let fresh = room.stream_around(spawn);
        Self::announce_chunks(&self.dispatcher, room.players.ids(), frame, fresh);
    }

    fn join_room(&mut self, id: &str, code: &str) {
        let code = code.trim().to_uppercase();
        let room = match self.registry.room_mut(&code) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };

        let player = Player::spawn(id, random_color(&mut self.rng), room.config());
        room.players.insert(player.clone());
        self.memberships.insert(id.to_string(), code.clone());
        info!("participant {} joined room {}", id, code);

        let frame = room.next_frame();
        // Snapshot first, then stream: the joiner's summary plus the
        // following newChunk frames add up to exactly the shared world.
        self.dispatcher.send_to(
            id,
            frame,
            &ServerEvent::JoinedRoom {
                code: room.code.clone(),
                kind: room.kind.clone(),
                seed: room.seed,
                chunk_size: room.chunk_size(),
                you: player,
                players: room.players.roster(),
                chunks: room.chunks.snapshot(),
                surfaces: room.surfaces_snapshot(),
            },
        );
        self.dispatcher.broadcast(
            room.players.ids(),
            frame,
            &ServerEvent::UpdatePlayerList {
                players: room.players.roster(),
            },
        );

        let spawn = Vec2::new(room.config().spawn_x, room.config().spawn_y);
        let fresh = room.stream_around(spawn);
        Self::announce_chunks(&self.dispatcher, room.players.ids(), frame, fresh);
    }

    // -----------------------------------------------------------------------
    // Movement & streaming
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn player_update(
        &mut self,
        id: &str,
        room_code: &str,
        x: f32,
        y: f32,
        angle: f32,
        mode: MovementMode,
        location: String,
        speed: f32,
    ) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();

        let delta = MovementDelta {
            x,
            y,
            angle,
            speed,
            mode,
            location,
        };
        let Some(player) = room.players.apply_update(id, delta) else {
            return;
        };
        let position = Vec2::new(player.x, player.y);
        let moved = ServerEvent::PlayerMoved {
            id: player.id.clone(),
            x: player.x,
            y: player.y,
            angle: player.angle,
            mode: player.mode,
            location: player.location.clone(),
            speed: player.speed,
        };

        // New chunks go out first so no one observes movement into terrain
        // they have not received.
        let fresh = room.stream_around(position);
        Self::announce_chunks(&self.dispatcher, room.players.ids(), frame, fresh);

        self.dispatcher
            .broadcast_except(room.players.ids(), id, frame, &moved);
    }

    /// Fan a batch of freshly generated chunks out to the whole room,
    /// triggering participant included.
    fn announce_chunks<'a>(
        dispatcher: &Dispatcher,
        members: impl IntoIterator<Item = &'a ParticipantId> + Clone,
        frame: u64,
        fresh: Vec<ChunkRecord>,
    ) {
        for record in fresh {
            dispatcher.broadcast(
                members.clone(),
                frame,
                &ServerEvent::NewChunk {
                    cx: record.cx,
                    cy: record.cy,
                    chunk: record.chunk,
                },
            );
        }
    }

    // -----------------------------------------------------------------------
    // Mining
    // -----------------------------------------------------------------------

    fn mine_rock(&mut self, id: &str, room_code: &str, resource_id: String) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };

        let Some(location) = room.players.get(id).map(|p| p.location.clone()) else {
            return;
        };
        // Stale resource ids (or locations with no surface) are idempotent
        // no-ops: the client may be acting on an outdated map.
        if !room.mine_rock(&location, &resource_id) {
            return;
        }

        let frame = room.next_frame();
        let Some(player) = room.players.get_mut(id) else {
            return;
        };
        player.inventory.rocks += 1;
        let rocks_held = player.inventory.rocks;

        self.dispatcher.broadcast(
            room.players.ids(),
            frame,
            &ServerEvent::MapUpdate {
                location,
                resource_id,
                miner: id.to_string(),
                rocks_held,
            },
        );
    }

    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    fn accept_quest(&mut self, id: &str, room_code: &str) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();
        let Some(player) = room.players.get_mut(id) else {
            return;
        };

        let quest = quests::accept_quest(player, &mut self.rng).clone();
        let money = player.money;
        self.dispatcher.send_to(
            id,
            frame,
            &ServerEvent::QuestOutcome {
                status: QuestStatus::Accepted,
                quest: Some(quest),
                reward: 0,
                money,
            },
        );
    }

    fn complete_quest(&mut self, id: &str, room_code: &str) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();
        let Some(player) = room.players.get_mut(id) else {
            return;
        };

        let outcome = match quests::complete_quest(player) {
            QuestResult::Completed { reward } => ServerEvent::QuestOutcome {
                status: QuestStatus::Completed,
                quest: None,
                reward,
                money: player.money,
            },
            QuestResult::Unfulfilled => ServerEvent::QuestOutcome {
                status: QuestStatus::Unfulfilled,
                quest: player.active_quest.clone(),
                reward: 0,
                money: player.money,
            },
            QuestResult::NoQuest => ServerEvent::QuestOutcome {
                status: QuestStatus::None,
                quest: None,
                reward: 0,
                money: player.money,
            },
        };
        self.dispatcher.send_to(id, frame, &outcome);
    }

    // -----------------------------------------------------------------------
    // Economy
    // -----------------------------------------------------------------------

    fn buy_upgrade(&mut self, id: &str, room_code: &str, item: String) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();
        let Some(player) = room.players.get_mut(id) else {
            return;
        };

        let purchased = economy::buy_upgrade(player, &item);
        self.dispatcher.send_to(
            id,
            frame,
            &ServerEvent::ShopResult {
                item,
                purchased,
                money: player.money,
                fuel: player.fuel,
                max_fuel: player.max_fuel,
            },
        );
    }

    fn refuel(&mut self, id: &str, room_code: &str) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();
        let Some(player) = room.players.get_mut(id) else {
            return;
        };

        economy::refuel(player);
        self.dispatcher.send_to(
            id,
            frame,
            &ServerEvent::ShopResult {
                item: "refuel".to_string(),
                purchased: true,
                money: player.money,
                fuel: player.fuel,
                max_fuel: player.max_fuel,
            },
        );
    }

    // -----------------------------------------------------------------------
    // Placed objects
    // -----------------------------------------------------------------------

    fn place_object(
        &mut self,
        id: &str,
        room_code: &str,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        angle: f32,
    ) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();

        let coord = room.chunk_at(Vec2::new(x, y));
        // Materialise the owning chunk first so every participant can anchor
        // the obstacle to known terrain.
        let (chunk, created) = room.chunks.ensure(coord);
        if created {
            self.dispatcher.broadcast(
                room.players.ids(),
                frame,
                &ServerEvent::NewChunk {
                    cx: coord.x,
                    cy: coord.y,
                    chunk,
                },
            );
        }

        let obstacle = Obstacle { x, y, w, h, angle };
        room.chunks.append_obstacle(coord, obstacle.clone());

        self.dispatcher.broadcast(
            room.players.ids(),
            frame,
            &ServerEvent::ObjectPlaced {
                cx: coord.x,
                cy: coord.y,
                obstacle,
                placed_by: id.to_string(),
            },
        );
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    fn chat(&mut self, id: &str, room_code: &str, text: String) {
        let room = match self.registry.resolve_member(&room_code.to_uppercase(), id) {
            Ok(room) => room,
            Err(e) => return self.report_error(id, &e),
        };
        let frame = room.next_frame();

        // Relayed verbatim, sender included.
        self.dispatcher.broadcast(
            room.players.ids(),
            frame,
            &ServerEvent::ChatMessage {
                id: id.to_string(),
                text,
            },
        );
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    /// Report a failure to the acting participant only; room state is
    /// untouched.
    fn report_error(&self, id: &str, err: &SessionError) {
        debug!("participant {}: {}", id, err);
        self.dispatcher.send_to(
            id,
            0,
            &ServerEvent::ErrorMsg {
                message: err.to_string(),
            },
        );
    }
}
