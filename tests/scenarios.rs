// tests/scenarios.rs - End-to-end behaviour of the gesture engine
mod common;

use common::*;
use gesture_deck::config::{EngineConfig, FivePrecedence};
use gesture_deck::session::SessionLog;
use gesture_deck::source::FrameSource;
use gesture_deck::{Action, GestureEngine, Handedness, ModeFlags};

fn engine_with(flags: ModeFlags) -> GestureEngine<Recorder> {
    GestureEngine::with_flags(EngineConfig::default(), Recorder::default(), flags)
}

fn browsing() -> ModeFlags {
    ModeFlags {
        launcher_opened: true,
        ..ModeFlags::default()
    }
}

fn playing() -> ModeFlags {
    ModeFlags {
        player_opened: true,
        selection_confirmed: true,
        ..ModeFlags::default()
    }
}

#[test]
fn launch_player_is_debounced() {
    let mut engine = engine_with(ModeFlags::default());

    let first = engine.process_frame(&frame(0.0, vec![left(2)]));
    assert_eq!(first.dispatched.len(), 1);
    assert_eq!(first.dispatched[0].action, Action::LaunchPlayer);
    assert!(engine.flags().player_opened);

    let held = engine.process_frame(&frame(1.0, vec![left(2)]));
    assert!(held.dispatched.is_empty());

    let again = engine.process_frame(&frame(2.1, vec![left(2)]));
    assert_eq!(again.dispatched.len(), 1);
    assert_eq!(engine.dispatcher().count(Action::LaunchPlayer), 2);
}

#[test]
fn open_palm_confirms_selection_with_cooldown() {
    let mut engine = engine_with(browsing());

    engine.process_frame(&frame(0.0, vec![right(5, MIDDLE_Y)]));
    assert!(engine.flags().selection_confirmed);

    let held = engine.process_frame(&frame(1.5, vec![right(5, MIDDLE_Y)]));
    assert!(held.dispatched.is_empty());

    engine.process_frame(&frame(2.2, vec![right(5, MIDDLE_Y)]));
    assert_eq!(engine.dispatcher().count(Action::ConfirmSelection), 2);
}

#[test]
fn scrolling_fires_every_frame() {
    let mut engine = engine_with(browsing());
    let high = HEIGHT as f64 * 0.1;

    for i in 0..3 {
        engine.process_frame(&frame(i as f64 * 0.033, vec![right(1, high)]));
    }
    assert_eq!(engine.dispatcher().actions, vec![Action::ScrollUp; 3]);

    let low = HEIGHT as f64 * 0.9;
    engine.process_frame(&frame(0.2, vec![right(1, low)]));
    engine.process_frame(&frame(0.3, vec![right(1, MIDDLE_Y)]));
    assert_eq!(engine.dispatcher().count(Action::ScrollDown), 1);
    assert_eq!(engine.dispatcher().actions.len(), 4);
}

#[test]
fn scroll_needs_an_open_browser() {
    let mut engine = engine_with(ModeFlags::default());
    engine.process_frame(&frame(0.0, vec![right(1, 10.0)]));
    assert!(engine.dispatcher().actions.is_empty());
}

#[test]
fn playback_follows_finger_count() {
    let mut engine = engine_with(playing());
    for i in 0..4 {
        engine.process_frame(&frame(i as f64 * 0.033, vec![right(3, MIDDLE_Y)]));
    }
    assert_eq!(engine.dispatcher().actions, vec![Action::PlayPause; 4]);

    let mut engine = engine_with(playing());
    for (count, action) in [
        (1, Action::VolumeUp),
        (2, Action::VolumeDown),
        (4, Action::NextTrack),
        (5, Action::PrevTrack),
    ] {
        let report = engine.process_frame(&frame(0.0, vec![right(count, MIDDLE_Y)]));
        assert_eq!(report.dispatched.len(), 1, "count {}", count);
        assert_eq!(report.dispatched[0].action, action);
    }
}

#[test]
fn playback_needs_a_confirmed_selection() {
    let flags = ModeFlags {
        player_opened: true,
        ..ModeFlags::default()
    };
    let mut engine = engine_with(flags);
    engine.process_frame(&frame(0.0, vec![right(3, MIDDLE_Y)]));
    assert!(engine.dispatcher().actions.is_empty());
}

#[test]
fn roles_follow_handedness() {
    let mut engine = engine_with(browsing());

    // A right hand never launches, a left hand never scrolls or confirms.
    engine.process_frame(&frame(0.0, vec![right(2, MIDDLE_Y)]));
    engine.process_frame(&frame(0.1, vec![count_pose(Handedness::Left, 5, 10.0)]));
    assert!(engine.dispatcher().actions.is_empty());

    // Unknown hands are ignored outright.
    engine.process_frame(&frame(0.2, vec![count_pose(Handedness::Unknown, 2, 10.0)]));
    assert!(engine.dispatcher().actions.is_empty());

    let report = engine.process_frame(&frame(0.3, vec![right(5, 10.0), left(3)]));
    let actions: Vec<Action> = report.dispatched.iter().map(|d| d.action).collect();
    assert_eq!(
        actions,
        vec![Action::LaunchBrowser, Action::ScrollUp, Action::ConfirmSelection]
    );
}

#[test]
fn first_hand_of_each_side_wins() {
    let mut engine = engine_with(ModeFlags::default());
    let report = engine.process_frame(&frame(0.0, vec![left(2), left(3)]));
    assert_eq!(report.dispatched.len(), 1);
    assert_eq!(report.dispatched[0].action, Action::LaunchPlayer);
}

#[test]
fn five_fingers_prefer_playback_once_media_is_live() {
    let flags = ModeFlags {
        launcher_opened: true,
        player_opened: true,
        selection_confirmed: true,
    };

    let mut engine = engine_with(flags);
    engine.process_frame(&frame(0.0, vec![right(5, MIDDLE_Y)]));
    assert_eq!(engine.dispatcher().actions, vec![Action::PrevTrack]);

    let mut config = EngineConfig::default();
    config.rules.five_precedence = FivePrecedence::Selection;
    let mut engine = GestureEngine::with_flags(config, Recorder::default(), flags);
    engine.process_frame(&frame(0.0, vec![right(5, MIDDLE_Y)]));
    assert_eq!(engine.dispatcher().actions, vec![Action::ConfirmSelection]);

    let mut config = EngineConfig::default();
    config.rules.five_precedence = FivePrecedence::Both;
    let mut engine = GestureEngine::with_flags(config, Recorder::default(), flags);
    engine.process_frame(&frame(0.0, vec![right(5, MIDDLE_Y)]));
    assert_eq!(
        engine.dispatcher().actions,
        vec![Action::ConfirmSelection, Action::PrevTrack]
    );
}

#[test]
fn failed_launch_cools_down_without_opening() {
    let recorder = Recorder::failing(&[Action::LaunchBrowser]);
    let mut engine = GestureEngine::new(EngineConfig::default(), recorder);

    let report = engine.process_frame(&frame(0.0, vec![left(3)]));
    assert_eq!(report.dispatched.len(), 1);
    assert!(!report.dispatched[0].succeeded());
    assert!(!engine.flags().launcher_opened);

    engine.process_frame(&frame(1.0, vec![left(3)]));
    assert_eq!(engine.dispatcher().count(Action::LaunchBrowser), 1);

    let mut config = EngineConfig::default();
    config.rules.optimistic_flags = true;
    let mut engine = GestureEngine::new(config, Recorder::failing(&[Action::LaunchBrowser]));
    engine.process_frame(&frame(0.0, vec![left(3)]));
    assert!(engine.flags().launcher_opened);
}

#[test]
fn full_session_from_browser_to_playback() {
    let mut engine = engine_with(ModeFlags::default());
    let mut t = 0.0;
    let mut step = |engine: &mut GestureEngine<Recorder>, hands| {
        t += 0.5;
        engine.process_frame(&frame(t, hands))
    };

    step(&mut engine, vec![left(3)]);
    step(&mut engine, vec![right(1, 400.0)]);
    step(&mut engine, vec![right(5, MIDDLE_Y)]);
    step(&mut engine, vec![left(2)]);
    step(&mut engine, vec![right(3, MIDDLE_Y)]);

    assert_eq!(
        engine.flags(),
        ModeFlags {
            launcher_opened: true,
            player_opened: true,
            selection_confirmed: true,
        }
    );
    assert_eq!(
        engine.dispatcher().actions,
        vec![
            Action::LaunchBrowser,
            Action::ScrollDown,
            Action::ConfirmSelection,
            Action::LaunchPlayer,
            Action::PlayPause,
        ]
    );
}

#[tokio::test]
async fn json_lines_drive_the_engine_and_land_in_the_session_log() {
    let hand = right(3, MIDDLE_Y);
    let landmarks: Vec<String> = hand
        .landmarks
        .iter()
        .map(|lm| format!("[{}, {}]", lm.x(), lm.y()))
        .collect();
    let line = |t: f64| {
        format!(
            r#"{{"timestamp":{},"width":640,"height":480,"hands":[{{"handedness":"right","landmarks":[{}]}}]}}"#,
            t,
            landmarks.join(",")
        )
    };
    let input = format!("{}\n{{broken\n{}\n", line(0.0), line(0.1));

    let reader = Box::new(std::io::Cursor::new(input.into_bytes()));
    let mut source = FrameSource::from_reader(reader, "test://".into(), false);
    let mut engine = engine_with(playing());
    let dir = tempfile::tempdir().unwrap();
    let mut session = SessionLog::new(dir.path(), Some("scenario".to_string()));

    while let Some(frame) = source.next_frame().await {
        let (report, _) = engine.process_frame_with_metrics(&frame);
        session.record(&report);
    }

    assert_eq!(source.info().malformed, 1);
    assert_eq!(engine.dispatcher().actions, vec![Action::PlayPause; 2]);

    let session_dir = session.export(engine.flags(), engine.metrics()).unwrap();
    let csv = std::fs::read_to_string(session_dir.join("dispatch_log.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(session_dir.join("summary.json").exists());
}
