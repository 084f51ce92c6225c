//! SessionService integration tests
//!
//! Drives the event core end to end through channel-backed sinks: every
//! assertion is made against the wire frames a client would receive.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use drift_world::protocol::{ClientEvent, Envelope, QuestStatus, ServerEvent};
    use drift_world::rooms::seed_from_code;
    use drift_world::service::SessionService;
    use drift_world::types::{MovementMode, QuestKind, WorldConfig};

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    fn make_service() -> SessionService {
        SessionService::new(WorldConfig::default())
    }

    fn connect(svc: &mut SessionService, id: &str) -> UnboundedReceiver<Bytes> {
        let (tx, rx) = unbounded_channel();
        svc.connect(id, tx);
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<Bytes>) -> Vec<Envelope<ServerEvent>> {
        let mut frames = Vec::new();
        while let Ok(bytes) = rx.try_recv() {
            frames.push(serde_json::from_slice(&bytes).expect("well-formed wire frame"));
        }
        frames
    }

    fn events(rx: &mut UnboundedReceiver<Bytes>) -> Vec<ServerEvent> {
        drain(rx).into_iter().map(|e| e.event).collect()
    }

    fn create_room(
        svc: &mut SessionService,
        id: &str,
        rx: &mut UnboundedReceiver<Bytes>,
    ) -> (String, Vec<ServerEvent>) {
        svc.handle(id, ClientEvent::CreateRoom { kind: None });
        let evs = events(rx);
        let code = evs
            .iter()
            .find_map(|e| match e {
                ServerEvent::RoomCreated { code, .. } => Some(code.clone()),
                _ => None,
            })
            .expect("roomCreated reply");
        (code, evs)
    }

    fn move_to(svc: &mut SessionService, id: &str, code: &str, x: f32, y: f32) {
        svc.handle(
            id,
            ClientEvent::PlayerUpdate {
                room_code: code.to_string(),
                x,
                y,
                angle: 0.0,
                mode: MovementMode::Ship,
                location: "SPACE".to_string(),
                speed: 1.0,
            },
        );
    }

    fn new_chunks(evs: &[ServerEvent]) -> Vec<(i32, i32)> {
        let mut coords: Vec<(i32, i32)> = evs
            .iter()
            .filter_map(|e| match e {
                ServerEvent::NewChunk { cx, cy, .. } => Some((*cx, *cy)),
                _ => None,
            })
            .collect();
        coords.sort_unstable();
        coords
    }

    // -----------------------------------------------------------------------
    // Room creation
    // -----------------------------------------------------------------------

    #[test]
    fn create_room_replies_with_code_seed_and_spawn_area() {
        let mut svc = make_service();
        let mut rx = connect(&mut svc, "alice");
        let (code, evs) = create_room(&mut svc, "alice", &mut rx);

        assert_eq!(code.len(), 5);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        let Some(ServerEvent::RoomCreated {
            kind,
            seed,
            chunk_size,
            you,
            ..
        }) = evs
            .iter()
            .find(|e| matches!(e, ServerEvent::RoomCreated { .. }))
        else {
            panic!("roomCreated missing");
        };
        assert_eq!(kind, "space");
        assert_eq!(*seed, seed_from_code(&code));
        assert_eq!(*chunk_size, 1000.0);
        assert_eq!((you.x, you.y), (100.0, 100.0));
        assert_eq!(you.color, "#FF0000");
        assert_eq!(you.money, 0);

        // The spawn admission streams the 3×3 neighbourhood around (100,100).
        let coords = new_chunks(&evs);
        assert_eq!(coords.len(), 9);
        assert!(coords.contains(&(0, 0)));
        assert!(coords.contains(&(-1, -1)));

        // Origin chunk carries the spawn beacon.
        let origin = evs.iter().find_map(|e| match e {
            ServerEvent::NewChunk { cx: 0, cy: 0, chunk } => Some(chunk),
            _ => None,
        });
        assert_eq!(origin.expect("origin chunk streamed").beacons.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Joining
    // -----------------------------------------------------------------------

    #[test]
    fn join_with_unknown_code_is_reported_not_found() {
        let mut svc = make_service();
        let mut rx = connect(&mut svc, "bob");
        svc.handle(
            "bob",
            ClientEvent::JoinRoom {
                code: "ZZZZZ".to_string(),
            },
        );

        let evs = events(&mut rx);
        assert_eq!(evs.len(), 1);
        match &evs[0] {
            ServerEvent::ErrorMsg { message } => {
                assert!(message.contains("Room not found"), "got: {}", message)
            }
            other => panic!("expected errorMsg, got {:?}", other),
        }
        assert_eq!(svc.stats().rooms, 0);
    }

    #[test]
    fn join_receives_the_full_world_summary() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);

        let mut rx_b = connect(&mut svc, "bob");
        // Codes are matched case-insensitively.
        svc.handle(
            "bob",
            ClientEvent::JoinRoom {
                code: code.to_lowercase(),
            },
        );
        let evs = events(&mut rx_b);

        let Some(ServerEvent::JoinedRoom {
            seed,
            you,
            players,
            chunks,
            surfaces,
            ..
        }) = evs
            .iter()
            .find(|e| matches!(e, ServerEvent::JoinedRoom { .. }))
        else {
            panic!("joinedRoom missing");
        };
        assert_eq!(*seed, seed_from_code(&code));
        assert_eq!(you.id, "bob");
        assert_eq!(players.len(), 2);
        assert_eq!(chunks.len(), 9, "everything generated so far");
        assert_eq!(surfaces.len(), 2);
        for surface in surfaces {
            assert!(surface.rocks.len() >= 12 && surface.rocks.len() <= 20);
        }

        // The spawn area already exists, so the join streams nothing new.
        assert!(new_chunks(&evs).is_empty());

        // The incumbent sees the membership change.
        let evs_a = events(&mut rx_a);
        let roster = evs_a.iter().find_map(|e| match e {
            ServerEvent::UpdatePlayerList { players } => Some(players.len()),
            _ => None,
        });
        assert_eq!(roster, Some(2));
    }

    // -----------------------------------------------------------------------
    // Movement & chunk streaming
    // -----------------------------------------------------------------------

    #[test]
    fn movement_streams_identical_chunks_to_every_participant_once() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code: code.clone() });
        drain(&mut rx_a);
        drain(&mut rx_b);

        // Fresh 3×3 neighbourhood far from spawn.
        move_to(&mut svc, "alice", &code, 5500.0, 5500.0);

        let evs_a = events(&mut rx_a);
        let evs_b = events(&mut rx_b);

        let chunks_a = new_chunks(&evs_a);
        let chunks_b = new_chunks(&evs_b);
        assert_eq!(chunks_a.len(), 9);
        assert_eq!(chunks_a, chunks_b, "both observers share one generated world");
        assert!(chunks_a.contains(&(5, 5)));

        // The trigger sees no movement echo; the peer sees exactly one.
        assert!(!evs_a.iter().any(|e| matches!(e, ServerEvent::PlayerMoved { .. })));
        let moved: Vec<_> = evs_b
            .iter()
            .filter(|e| matches!(e, ServerEvent::PlayerMoved { .. }))
            .collect();
        assert_eq!(moved.len(), 1);
        match moved[0] {
            ServerEvent::PlayerMoved { id, x, y, .. } => {
                assert_eq!(id, "alice");
                assert_eq!((*x, *y), (5500.0, 5500.0));
            }
            _ => unreachable!(),
        }

        // Chunk creation happens-before the movement that depended on it.
        let last_chunk = evs_b
            .iter()
            .rposition(|e| matches!(e, ServerEvent::NewChunk { .. }))
            .expect("chunks present");
        let moved_at = evs_b
            .iter()
            .position(|e| matches!(e, ServerEvent::PlayerMoved { .. }))
            .expect("movement present");
        assert!(last_chunk < moved_at);

        // A repeat move within the same neighbourhood streams nothing.
        move_to(&mut svc, "alice", &code, 5600.0, 5400.0);
        assert!(new_chunks(&events(&mut rx_a)).is_empty());
        let evs_b = events(&mut rx_b);
        assert!(new_chunks(&evs_b).is_empty());
        assert_eq!(
            evs_b
                .iter()
                .filter(|e| matches!(e, ServerEvent::PlayerMoved { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn frames_are_monotonic_per_room() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        move_to(&mut svc, "alice", &code, 3500.0, 0.0);
        move_to(&mut svc, "alice", &code, 7500.0, 0.0);

        let frames: Vec<u64> = drain(&mut rx_a).iter().map(|e| e.frame).collect();
        assert!(!frames.is_empty());
        assert!(frames.windows(2).all(|w| w[0] <= w[1]), "frames: {:?}", frames);
    }

    // -----------------------------------------------------------------------
    // Protected state & clamping
    // -----------------------------------------------------------------------

    #[test]
    fn hostile_delta_cannot_touch_server_owned_state() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);

        // A delta smuggling protected fields: they are simply not part of
        // the movement payload and get dropped at the protocol boundary.
        let raw = format!(
            r#"{{"event":"playerUpdate","data":{{"roomCode":"{code}","x":10.0,"y":20.0,"angle":0.0,"mode":"SHIP","location":"SPACE","speed":2.0,"money":9999,"inventory":{{"rocks":50}},"fuel":1e9}}}}"#
        );
        let event: ClientEvent = serde_json::from_str(&raw).expect("payload parses");
        svc.handle("alice", event);

        // Observe through a fresh joiner's summary.
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code });
        let evs = events(&mut rx_b);
        let Some(ServerEvent::JoinedRoom { players, .. }) = evs
            .iter()
            .find(|e| matches!(e, ServerEvent::JoinedRoom { .. }))
        else {
            panic!("joinedRoom missing");
        };
        let alice = players.iter().find(|p| p.id == "alice").expect("alice listed");
        assert_eq!((alice.x, alice.y), (10.0, 20.0), "transform applied");
        assert_eq!(alice.money, 0);
        assert_eq!(alice.inventory.rocks, 0);
        assert_eq!(alice.fuel, 100.0);
        assert!(alice.active_quest.is_none());
    }

    #[test]
    fn walk_mode_positions_are_clamped_to_the_location() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code: code.clone() });
        drain(&mut rx_b);

        svc.handle(
            "alice",
            ClientEvent::PlayerUpdate {
                room_code: code.clone(),
                x: -500.0,
                y: 99_999.0,
                angle: 0.0,
                mode: MovementMode::Walk,
                location: "PLANET_RED".to_string(),
                speed: 3.0,
            },
        );
        let evs = events(&mut rx_b);
        let clamped = evs.iter().find_map(|e| match e {
            ServerEvent::PlayerMoved { x, y, .. } => Some((*x, *y)),
            _ => None,
        });
        assert_eq!(clamped, Some((0.0, 2000.0)));

        // Ship mode in open space is unconstrained.
        move_to(&mut svc, "alice", &code, -123_456.0, -9.5);
        let evs = events(&mut rx_b);
        let free = evs.iter().find_map(|e| match e {
            ServerEvent::PlayerMoved { x, y, .. } => Some((*x, *y)),
            _ => None,
        });
        assert_eq!(free, Some((-123_456.0, -9.5)));
    }

    // -----------------------------------------------------------------------
    // Quests & mining
    // -----------------------------------------------------------------------

    /// Build a session whose first quest draw is a gather quest, by scanning
    /// deterministic RNG seeds.
    fn gather_session() -> (SessionService, UnboundedReceiver<Bytes>, String) {
        for seed in 0..64u64 {
            let mut svc =
                SessionService::with_rng(WorldConfig::default(), StdRng::seed_from_u64(seed));
            let mut rx = connect(&mut svc, "alice");
            let (code, _) = create_room(&mut svc, "alice", &mut rx);
            svc.handle(
                "alice",
                ClientEvent::AcceptQuest {
                    room_code: code.clone(),
                },
            );
            let evs = events(&mut rx);
            let accepted = evs.iter().find_map(|e| match e {
                ServerEvent::QuestOutcome {
                    status: QuestStatus::Accepted,
                    quest: Some(quest),
                    ..
                } => Some(quest.clone()),
                _ => None,
            });
            let quest = accepted.expect("acceptQuest must answer with a quest");
            if quest.kind == QuestKind::Gather {
                assert_eq!(quest.required, 5);
                return (svc, rx, code);
            }
        }
        panic!("no RNG seed produced a gather quest in 64 tries");
    }

    #[test]
    fn mining_quest_scenario_credits_reward_and_consumes_rocks() {
        let (mut svc, mut rx, code) = gather_session();

        // Walk onto the red planet, where the rocks are.
        svc.handle(
            "alice",
            ClientEvent::PlayerUpdate {
                room_code: code.clone(),
                x: 1000.0,
                y: 1000.0,
                angle: 0.0,
                mode: MovementMode::Walk,
                location: "PLANET_RED".to_string(),
                speed: 3.0,
            },
        );
        drain(&mut rx);

        for n in 0..5 {
            svc.handle(
                "alice",
                ClientEvent::MineRock {
                    room_code: code.clone(),
                    resource_id: format!("PLANET_RED:rock:{}", n),
                },
            );
        }
        let evs = events(&mut rx);
        let held: Vec<u32> = evs
            .iter()
            .filter_map(|e| match e {
                ServerEvent::MapUpdate { rocks_held, .. } => Some(*rocks_held),
                _ => None,
            })
            .collect();
        assert_eq!(held, vec![1, 2, 3, 4, 5]);

        // Mining an already-removed rock is a silent no-op.
        svc.handle(
            "alice",
            ClientEvent::MineRock {
                room_code: code.clone(),
                resource_id: "PLANET_RED:rock:0".to_string(),
            },
        );
        assert!(events(&mut rx).is_empty());

        // Completion pays exactly once and clears the quest.
        svc.handle(
            "alice",
            ClientEvent::CompleteQuest {
                room_code: code.clone(),
            },
        );
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::QuestOutcome {
                status: QuestStatus::Completed,
                reward,
                money,
                quest: None,
            }] => {
                assert_eq!(*reward, 150);
                assert_eq!(*money, 150);
            }
            other => panic!("expected completed questOutcome, got {:?}", other),
        }

        // A second completion attempt with no active quest is a no-op.
        svc.handle(
            "alice",
            ClientEvent::CompleteQuest {
                room_code: code.clone(),
            },
        );
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::QuestOutcome {
                status: QuestStatus::None,
                money,
                ..
            }] => assert_eq!(*money, 150),
            other => panic!("expected no-op questOutcome, got {:?}", other),
        }

        // The five rocks were consumed: the next mined rock is held alone.
        svc.handle(
            "alice",
            ClientEvent::MineRock {
                room_code: code.clone(),
                resource_id: "PLANET_RED:rock:5".to_string(),
            },
        );
        let evs = events(&mut rx);
        let held = evs.iter().find_map(|e| match e {
            ServerEvent::MapUpdate { rocks_held, .. } => Some(*rocks_held),
            _ => None,
        });
        assert_eq!(held, Some(1));

        // The quest payout covers exactly one tank upgrade.
        svc.handle(
            "alice",
            ClientEvent::BuyUpgrade {
                room_code: code.clone(),
                item: "fuelMax".to_string(),
            },
        );
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::ShopResult {
                purchased: true,
                money: 0,
                max_fuel,
                ..
            }] => assert_eq!(*max_fuel, 150.0),
            other => panic!("expected successful shopResult, got {:?}", other),
        }
    }

    #[test]
    fn unfulfilled_completion_keeps_the_quest_active() {
        let (mut svc, mut rx, code) = gather_session();

        svc.handle(
            "alice",
            ClientEvent::CompleteQuest {
                room_code: code.clone(),
            },
        );
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::QuestOutcome {
                status: QuestStatus::Unfulfilled,
                quest: Some(quest),
                reward: 0,
                money: 0,
            }] => assert_eq!(quest.kind, QuestKind::Gather),
            other => panic!("expected unfulfilled questOutcome, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // Economy
    // -----------------------------------------------------------------------

    #[test]
    fn upgrade_without_funds_is_a_noop() {
        let mut svc = make_service();
        let mut rx = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx);

        svc.handle(
            "alice",
            ClientEvent::BuyUpgrade {
                room_code: code,
                item: "fuelMax".to_string(),
            },
        );
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::ShopResult {
                purchased: false,
                money: 0,
                max_fuel,
                ..
            }] => assert_eq!(*max_fuel, 100.0, "no upgrade applied"),
            other => panic!("expected no-op shopResult, got {:?}", other),
        }
    }

    #[test]
    fn refuel_is_free_and_fills_the_tank() {
        let mut svc = make_service();
        let mut rx = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx);

        svc.handle("alice", ClientEvent::Refuel { room_code: code });
        let evs = events(&mut rx);
        match evs.as_slice() {
            [ServerEvent::ShopResult {
                item,
                purchased: true,
                money: 0,
                fuel,
                max_fuel,
            }] => {
                assert_eq!(item, "refuel");
                assert_eq!(fuel, max_fuel);
            }
            other => panic!("expected refuel shopResult, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // Placed objects
    // -----------------------------------------------------------------------

    #[test]
    fn placed_objects_reach_the_room_and_persist_in_the_chunk() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code: code.clone() });
        drain(&mut rx_a);
        drain(&mut rx_b);

        let place = |svc: &mut SessionService, x: f32| {
            svc.handle(
                "alice",
                ClientEvent::PlaceObject {
                    room_code: code.clone(),
                    x,
                    y: 2500.0,
                    w: 50.0,
                    h: 80.0,
                    angle: 1.0,
                },
            );
        };

        // First placement materialises the owning chunk before the obstacle.
        place(&mut svc, 2500.0);
        let evs_b = events(&mut rx_b);
        let chunk_at = evs_b
            .iter()
            .position(|e| matches!(e, ServerEvent::NewChunk { cx: 2, cy: 2, .. }))
            .expect("owning chunk streamed");
        let placed_at = evs_b
            .iter()
            .position(|e| matches!(e, ServerEvent::ObjectPlaced { .. }))
            .expect("objectPlaced broadcast");
        assert!(chunk_at < placed_at);

        // The sender receives the same pair.
        let evs_a = events(&mut rx_a);
        assert!(evs_a.iter().any(|e| matches!(e, ServerEvent::ObjectPlaced { .. })));

        // A second placement in the same chunk streams nothing new.
        place(&mut svc, 2600.0);
        let evs_b = events(&mut rx_b);
        assert!(new_chunks(&evs_b).is_empty());
        match evs_b.as_slice() {
            [ServerEvent::ObjectPlaced {
                cx: 2,
                cy: 2,
                obstacle,
                placed_by,
            }] => {
                assert_eq!(placed_by, "alice");
                assert_eq!(obstacle.x, 2600.0);
            }
            other => panic!("expected objectPlaced, got {:?}", other),
        }

        // A later joiner finds both obstacles in the owning chunk.
        let mut rx_c = connect(&mut svc, "carol");
        svc.handle("carol", ClientEvent::JoinRoom { code: code.clone() });
        let evs = events(&mut rx_c);
        let Some(ServerEvent::JoinedRoom { chunks, .. }) = evs
            .iter()
            .find(|e| matches!(e, ServerEvent::JoinedRoom { .. }))
        else {
            panic!("joinedRoom missing");
        };
        let owning = chunks
            .iter()
            .find(|record| (record.cx, record.cy) == (2, 2))
            .expect("owning chunk in summary");
        let placed: Vec<f32> = owning
            .chunk
            .obstacles
            .iter()
            .filter(|o| o.w == 50.0 && o.h == 80.0)
            .map(|o| o.x)
            .collect();
        assert_eq!(placed, vec![2500.0, 2600.0]);
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    #[test]
    fn chat_reaches_the_room_including_the_sender() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code: code.clone() });
        drain(&mut rx_a);
        drain(&mut rx_b);

        svc.handle(
            "alice",
            ClientEvent::ChatMessage {
                room_code: code,
                text: "o7 commander".to_string(),
            },
        );

        for rx in [&mut rx_a, &mut rx_b] {
            let evs = events(rx);
            match evs.as_slice() {
                [ServerEvent::ChatMessage { id, text }] => {
                    assert_eq!(id, "alice");
                    assert_eq!(text, "o7 commander");
                }
                other => panic!("expected chatMessage, got {:?}", other),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Disconnect & room teardown
    // -----------------------------------------------------------------------

    #[test]
    fn last_disconnect_destroys_the_room() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);
        let mut rx_b = connect(&mut svc, "bob");
        svc.handle("bob", ClientEvent::JoinRoom { code: code.clone() });
        drain(&mut rx_b);
        assert_eq!(svc.stats().rooms, 1);
        assert_eq!(svc.stats().participants, 2);

        // First leaver shrinks the roster.
        svc.disconnect("alice");
        let evs = events(&mut rx_b);
        let roster = evs.iter().find_map(|e| match e {
            ServerEvent::UpdatePlayerList { players } => Some(players.len()),
            _ => None,
        });
        assert_eq!(roster, Some(1));
        assert_eq!(svc.stats().rooms, 1);

        // Last leaver releases the room and its chunk store.
        svc.disconnect("bob");
        assert_eq!(svc.stats().rooms, 0);
        assert_eq!(svc.stats().chunks, 0);

        // The code is gone for good.
        let mut rx_c = connect(&mut svc, "carol");
        svc.handle("carol", ClientEvent::JoinRoom { code });
        let evs = events(&mut rx_c);
        assert!(matches!(evs.as_slice(), [ServerEvent::ErrorMsg { .. }]));
    }

    #[test]
    fn disconnect_of_an_unknown_participant_is_a_noop() {
        let mut svc = make_service();
        let mut rx = connect(&mut svc, "alice");
        let (_, _) = create_room(&mut svc, "alice", &mut rx);

        svc.disconnect("ghost");
        assert_eq!(svc.stats().rooms, 1);
        assert_eq!(svc.stats().participants, 1);
    }

    #[test]
    fn actions_against_foreign_rooms_are_rejected() {
        let mut svc = make_service();
        let mut rx_a = connect(&mut svc, "alice");
        let (code, _) = create_room(&mut svc, "alice", &mut rx_a);

        // Bob never joined; his update must not leak into the room.
        let mut rx_b = connect(&mut svc, "bob");
        move_to(&mut svc, "bob", &code, 9500.0, 9500.0);

        let evs = events(&mut rx_b);
        assert!(matches!(evs.as_slice(), [ServerEvent::ErrorMsg { .. }]));
        assert!(events(&mut rx_a).is_empty(), "room state untouched");
    }
}
