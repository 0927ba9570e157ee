mod support;

use std::io::Cursor;

use glam::Vec3;
use spadenet::ClientConfig;
use spadenet::demo::{DemoCommand, DemoError, DemoPlayer, DemoWriter, PlaybackState};
use spadenet::game::{FollowMode, FollowTarget, GameEvent};
use spadenet::net::{Color, NetError, ProtocolVersion, REPLAY_SPECTATOR_ID, SPECTATOR_TEAM, Tool};

use support::*;

type Player = DemoPlayer<Cursor<Vec<u8>>, RecordingSink, FakeCodec>;

/// Map and state in the first 0.3 s, then one world update per second
/// moving player 0 along x, and a grenade at 5.5 s.
fn demo_log() -> Vec<u8> {
    demo_log_facing(Vec3::X)
}

fn demo_log_facing(front: Vec3) -> Vec<u8> {
    let mut writer = DemoWriter::new(Vec::new(), ProtocolVersion::V075).unwrap();
    writer.write_entry(0.0, &map_start(4)).unwrap();
    writer.write_entry(0.1, &map_chunk(&[1, 2, 3, 4])).unwrap();
    writer
        .write_entry(0.2, &state_data(REPLAY_SPECTATOR_ID))
        .unwrap();
    writer
        .write_entry(
            0.3,
            &existing_player(0, 0, Tool::Weapon, Color::new(5, 5, 5), "alpha"),
        )
        .unwrap();
    for second in 1..=10u8 {
        let x = second as f32;
        writer
            .write_entry(x, &world_update(&[(Vec3::new(x, 1.0, 1.0), front)]))
            .unwrap();
        if second == 5 {
            writer
                .write_entry(5.5, &grenade(Vec3::new(5.0, 5.0, 5.0)))
                .unwrap();
        }
    }
    writer.into_inner()
}

/// Player past the join, with the clock at 0.3 s.
fn started() -> Player {
    started_with(demo_log())
}

fn started_with(log: Vec<u8>) -> Player {
    let mut player = DemoPlayer::open(
        Cursor::new(log),
        RecordingSink::default(),
        FakeCodec::new(4),
        ClientConfig::default(),
        0.0,
    )
    .unwrap();
    assert_eq!(player.duration(), "00:00:10");
    player.poll(0.05).unwrap();
    player.poll(0.2).unwrap();
    assert_eq!(player.clock().delta() as f32, 0.3);
    player
}

fn last_x(player: &Player) -> Option<f32> {
    player.sink().events.iter().rev().find_map(|e| match e {
        GameEvent::PlayerMoved { position, .. } => Some(position.x),
        _ => None,
    })
}

fn grenades(player: &Player) -> usize {
    player
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::GrenadeThrown { .. }))
        .count()
}

#[test]
fn join_inserts_replay_spectator() {
    let player = started();
    let viewer = player.sink().players.get(&REPLAY_SPECTATOR_ID).unwrap();
    assert_eq!(viewer.team, SPECTATOR_TEAM);
    assert!(player.sink().players.contains_key(&0));
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.sink().worlds_set, 1);
}

#[test]
fn entries_wait_for_their_own_time() {
    let mut player = started();
    player.poll(0.8).unwrap();
    assert_eq!(last_x(&player), None);
    player.poll(0.9).unwrap();
    assert_eq!(last_x(&player), Some(1.0));
}

#[test]
fn plays_to_the_end() {
    let mut player = started();
    assert_eq!(player.poll(10.0).unwrap(), PlaybackState::Ended);
    assert_eq!(grenades(&player), 1);
    assert_eq!(
        player.session().status_text(),
        "Demo Ended: End of Recording reached"
    );
    assert_eq!(player.poll(20.0).unwrap(), PlaybackState::Ended);
}

#[test]
fn forward_skip_drops_grenades() {
    let mut player = started();
    player.execute(DemoCommand::Forward(6), 0.2).unwrap();
    player.poll(0.2).unwrap();
    assert_eq!(last_x(&player), Some(6.0));
    assert!(player.clock().skip().is_some());

    player.poll(1.0).unwrap();
    player.poll(1.0).unwrap();
    assert_eq!(last_x(&player), Some(7.0));
    assert_eq!(player.clock().skip(), None);
    assert_eq!(grenades(&player), 0);
}

#[test]
fn backward_skip_replays_from_the_start() {
    let mut player = started();
    player.execute(DemoCommand::Forward(6), 0.2).unwrap();
    player.poll(0.2).unwrap();
    player.poll(1.0).unwrap();
    player.poll(1.0).unwrap();

    player.execute(DemoCommand::Backward(4), 1.0).unwrap();
    player.poll(1.0).unwrap();
    assert_eq!(player.sink().worlds_set, 2);
    assert!(player.sink().players.contains_key(&REPLAY_SPECTATOR_ID));
    assert_eq!(last_x(&player), Some(2.0));

    player.poll(1.5).unwrap();
    player.poll(1.5).unwrap();
    assert_eq!(last_x(&player), Some(3.0));
    assert_eq!(player.clock().skip(), None);
    assert_eq!(player.position(), "00:00:03");
}

#[test]
fn pause_and_step_updates() {
    let mut player = started();
    assert!(player.command("pause", 0.2).unwrap());
    assert_eq!(player.poll(5.0).unwrap(), PlaybackState::Paused);
    assert_eq!(last_x(&player), None);

    assert!(player.command("nu 2", 5.0).unwrap());
    assert_eq!(player.poll(5.0).unwrap(), PlaybackState::Paused);
    assert_eq!(last_x(&player), Some(2.0));
    assert_eq!(player.clock().update_count(), 2);

    assert!(player.command("pu 1", 5.0).unwrap());
    assert_eq!(player.poll(5.0).unwrap(), PlaybackState::Paused);
    assert_eq!(player.position(), "00:00:01");
    assert_eq!(last_x(&player), Some(1.0));
    assert!(player.sink().players.contains_key(&REPLAY_SPECTATOR_ID));
}

#[test]
fn chat_that_is_not_a_command_is_ignored() {
    let mut player = started();
    assert!(!player.command("hello", 0.2).unwrap());
    assert!(player.command("sp 20", 0.2).unwrap());
    assert_eq!(player.clock().speed(), 1.0);
    assert!(player.command("sp 2", 0.2).unwrap());
    assert_eq!(player.clock().speed(), 2.0);
}

fn follow(id: u8) -> FollowTarget {
    FollowTarget {
        player_id: id,
        mode: FollowMode::ThirdPerson,
    }
}

/// Plays to 4 s, then skips back to 2 s following `target`. The rewind
/// clears the world and with it the camera target.
fn skip_back_following(mut player: Player, target: FollowTarget) -> Player {
    player.poll(4.5).unwrap();
    assert_eq!(last_x(&player), Some(4.0));
    player.sink_mut().follow = Some(target);

    player.execute(DemoCommand::Backward(2), 4.5).unwrap();
    assert_eq!(player.sink().follow, None);
    player.poll(5.0).unwrap();
    player.poll(5.0).unwrap();
    assert_eq!(player.clock().skip(), None);
    assert_eq!(last_x(&player), Some(2.0));
    player
}

#[test]
fn update_step_drops_grenades() {
    let mut player = started();
    player.poll(5.2).unwrap();
    assert_eq!(last_x(&player), Some(5.0));

    assert!(player.command("pause", 5.2).unwrap());
    assert!(player.command("nu 1", 5.2).unwrap());
    assert_eq!(player.poll(5.2).unwrap(), PlaybackState::Paused);
    assert_eq!(last_x(&player), Some(6.0));
    assert_eq!(grenades(&player), 0);
}

#[test]
fn forward_skip_restores_follow_target() {
    let mut player = started();
    player.sink_mut().follow = Some(follow(0));
    player.execute(DemoCommand::Forward(6), 0.2).unwrap();
    player.sink_mut().follow = None;

    player.poll(0.2).unwrap();
    assert_eq!(player.sink().follow, None);
    player.poll(1.0).unwrap();
    player.poll(1.0).unwrap();
    assert_eq!(player.clock().skip(), None);
    assert_eq!(player.sink().follow, Some(follow(0)));
}

#[test]
fn backward_skip_restores_follow_target() {
    let player = skip_back_following(started(), follow(0));
    assert_eq!(player.sink().follow, Some(follow(0)));
}

#[test]
fn spectators_are_not_followed_after_skip() {
    let player = skip_back_following(started(), follow(REPLAY_SPECTATOR_ID));
    assert!(player.sink().players.contains_key(&REPLAY_SPECTATOR_ID));
    assert_eq!(player.sink().follow, None);
}

#[test]
fn players_facing_nowhere_are_not_followed_after_skip() {
    let player = skip_back_following(started_with(demo_log_facing(Vec3::ZERO)), follow(0));
    assert_eq!(player.sink().players[&0].front, Vec3::ZERO);
    assert_eq!(player.sink().follow, None);
}

#[test]
fn log_with_untimed_entry_does_not_open() {
    let mut log = demo_log();
    log.extend_from_slice(&f32::INFINITY.to_le_bytes());
    log.extend_from_slice(&[1, 0, 2]);
    let opened = DemoPlayer::open(
        Cursor::new(log),
        RecordingSink::default(),
        FakeCodec::new(4),
        ClientConfig::default(),
        0.0,
    );
    assert!(matches!(
        opened,
        Err(NetError::Demo(DemoError::InvalidTime(t))) if t.is_infinite()
    ));
}
