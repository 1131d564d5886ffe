//! Integration tests for the frame loop, driven by the headless backend

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use tui_engine::app::SnakeApp;
use tui_engine::audio::Audio;
use tui_engine::engine::{Context, Engine, EngineConfig, Game, HeadlessBackend};
use tui_engine::input::{GamepadButtons, GamepadState, ScriptedGamepad};
use tui_engine::snake::Status;
use tui_engine::term::FrameBuffer;
use tui_engine::types::{Color, Direction, Point};

fn config(max_frames: u64) -> EngineConfig {
    EngineConfig {
        fps: 240,
        width: 40,
        height: 12,
        fixed_size: true,
        max_frames: Some(max_frames),
        ..EngineConfig::default()
    }
}

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn key_event(code: KeyCode, kind: KeyEventKind) -> Event {
    Event::Key(KeyEvent::new_with_kind_and_state(
        code,
        KeyModifiers::NONE,
        kind,
        KeyEventState::NONE,
    ))
}

fn release(code: KeyCode) -> Event {
    key_event(code, KeyEventKind::Release)
}

/// Records what the game saw on every frame.
#[derive(Default)]
struct Probe {
    frames: Vec<FrameLog>,
    quit_on: Option<u64>,
}

#[derive(Debug, Default, Clone)]
struct FrameLog {
    space_down: bool,
    space_pressed: bool,
    pad_a_pressed: bool,
    pad_connected: bool,
    width: u16,
}

impl Game for Probe {
    fn update(&mut self, ctx: &mut Context, frame: &mut FrameBuffer) -> Result<()> {
        let n = ctx.time().frame;
        self.frames.push(FrameLog {
            space_down: ctx.keyboard.is_down(KeyCode::Char(' ')),
            space_pressed: ctx.keyboard.was_pressed(KeyCode::Char(' ')),
            pad_a_pressed: ctx.gamepad.was_pressed(GamepadButtons::A),
            pad_connected: ctx.gamepad.connected(),
            width: ctx.size().width,
        });
        // Only frame 0 draws; later frames must still show it.
        if n == 0 {
            frame.put_str(0, 0, "persist", Color::Cyan, Color::Black);
        }
        if self.quit_on == Some(n) {
            ctx.quit();
        }
        Ok(())
    }
}

#[test]
fn test_back_buffer_persists_between_frames() {
    let mut engine = Engine::new(HeadlessBackend::new(40, 12), config(5));
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();

    let backend = engine.into_backend();
    let last = backend.last_frame().unwrap();
    assert_eq!(last.get(0, 0).unwrap().ch, 'p');
    assert_eq!(last.get(6, 0).unwrap().ch, 't');
    assert_eq!(last.get(0, 0).unwrap().fg, Color::Cyan);
}

#[test]
fn test_one_present_per_frame() {
    let mut engine = Engine::new(HeadlessBackend::new(40, 12), config(7));
    let stats = engine.run(&mut Probe::default()).unwrap();
    assert_eq!(stats.frames, 7);
    assert_eq!(engine.backend().frames_presented(), 7);
}

#[test]
fn test_game_quit_stops_after_present() {
    let mut engine = Engine::new(HeadlessBackend::new(40, 12), config(100));
    let mut probe = Probe {
        quit_on: Some(3),
        ..Probe::default()
    };
    let stats = engine.run(&mut probe).unwrap();
    assert_eq!(stats.frames, 4);
    assert_eq!(probe.frames.len(), 4);
}

#[test]
fn test_key_release_events_clear_held_keys() {
    let backend = HeadlessBackend::new(40, 12)
        .with_key_release()
        .with_event(1, press(KeyCode::Char(' ')))
        .with_event(4, release(KeyCode::Char(' ')));
    let mut engine = Engine::new(backend, config(6));
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();

    let down: Vec<bool> = probe.frames.iter().map(|f| f.space_down).collect();
    assert_eq!(down, vec![false, true, true, true, false, false]);
    let pressed: Vec<bool> = probe.frames.iter().map(|f| f.space_pressed).collect();
    assert_eq!(pressed, vec![false, true, false, false, false, false]);
}

#[test]
fn test_slow_frames_keep_repeated_key_held() {
    // 200 ms frames are longer than the 150 ms auto-release timeout.
    let backend = HeadlessBackend::new(40, 12)
        .with_event(1, press(KeyCode::Char(' ')))
        .with_event(2, key_event(KeyCode::Char(' '), KeyEventKind::Repeat))
        .with_event(3, key_event(KeyCode::Char(' '), KeyEventKind::Repeat));
    let cfg = EngineConfig {
        fps: 5,
        key_release_timeout_ms: 150,
        ..config(5)
    };
    let mut engine = Engine::new(backend, cfg);
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();

    let seen: Vec<(bool, bool)> = probe
        .frames
        .iter()
        .map(|f| (f.space_down, f.space_pressed))
        .collect();
    assert_eq!(
        seen,
        vec![
            (false, false),
            (true, true),
            (true, false),
            (true, false),
            // No repeat arrived: released by the timeout.
            (false, false),
        ]
    );
}

#[test]
fn test_gamepad_is_polled_every_frame() {
    let idle = GamepadState {
        packet: 1,
        ..GamepadState::default()
    };
    let a_down = GamepadState {
        packet: 2,
        buttons: GamepadButtons::A,
        ..GamepadState::default()
    };
    let source = ScriptedGamepad::new([None, Some(idle), Some(a_down)]);
    let mut engine =
        Engine::new(HeadlessBackend::new(40, 12), config(4)).with_gamepad_source(Box::new(source));
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();

    let connected: Vec<bool> = probe.frames.iter().map(|f| f.pad_connected).collect();
    assert_eq!(connected, vec![false, true, true, true]);
    let a: Vec<bool> = probe.frames.iter().map(|f| f.pad_a_pressed).collect();
    assert_eq!(a, vec![false, false, true, false]);
}

#[test]
fn test_quit_key_can_be_disabled() {
    let backend = HeadlessBackend::new(40, 12).with_event(1, press(KeyCode::Esc));
    let cfg = EngineConfig {
        exit_on_quit_key: false,
        ..config(3)
    };
    let mut engine = Engine::new(backend, cfg);
    let stats = engine.run(&mut Probe::default()).unwrap();
    assert_eq!(stats.frames, 3);
}

#[test]
fn test_resize_reaches_the_game() {
    let backend = HeadlessBackend::new(40, 12).with_event(2, Event::Resize(60, 20));
    let cfg = EngineConfig {
        fixed_size: false,
        ..config(4)
    };
    let mut engine = Engine::new(backend, cfg);
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();
    let widths: Vec<u16> = probe.frames.iter().map(|f| f.width).collect();
    assert_eq!(widths, vec![40, 40, 60, 60]);
}

#[test]
fn test_invalid_config_is_rejected_before_entering() {
    let cfg = EngineConfig {
        fps: 0,
        ..config(1)
    };
    let mut engine = Engine::new(HeadlessBackend::new(40, 12), cfg);
    assert!(engine.run(&mut Probe::default()).is_err());
    assert!(!engine.backend().entered());
}

#[test]
fn test_snake_app_runs_headless() {
    let backend = HeadlessBackend::new(40, 12).with_event(1, press(KeyCode::Char('p')));
    let mut engine = Engine::new(backend, config(3));
    let mut app = SnakeApp::new(42, Audio::silent()).unwrap();
    engine.run(&mut app).unwrap();

    assert_eq!(app.game().status(), Status::Paused);
    let backend = engine.into_backend();
    assert_eq!(backend.titles().last().map(String::as_str), Some("Snake - score 0"));

    // Rounded border corners around the board.
    let frame = backend.last_frame().unwrap();
    assert_eq!(frame.get(0, 0).unwrap().ch, '╭');
    assert_eq!(frame.get(39, 0).unwrap().ch, '╮');
    // Status bar on the last row.
    let status: String = (0..40).map(|x| frame.get(x, 11).unwrap().ch).collect();
    assert!(status.starts_with(" score 0  level 1  length 3"), "{status:?}");
}

#[test]
fn test_snake_app_steers_from_keyboard() {
    let backend = HeadlessBackend::new(40, 12).with_event(1, press(KeyCode::Up));
    let mut engine = Engine::new(backend, config(2));
    let mut app = SnakeApp::new(42, Audio::silent()).unwrap();
    engine.run(&mut app).unwrap();

    // The turn is queued until the next step; it is not applied yet.
    assert_eq!(app.game().direction(), Direction::Right);
    let mut next = app.game().clone();
    let head = next.head();
    next.tick();
    assert_eq!(next.direction(), Direction::Up);
    assert_eq!(next.head(), Point::new(head.x, head.y - 1));
}

#[test]
fn test_config_json_drives_the_loop() {
    let cfg: EngineConfig = serde_json::from_str(
        r#"{ "title": "demo", "width": 30, "height": 8, "fixed_size": true, "fps": 240, "max_frames": 2 }"#,
    )
    .unwrap();
    cfg.validate().unwrap();

    let mut engine = Engine::new(HeadlessBackend::new(100, 50), cfg);
    let mut probe = Probe::default();
    engine.run(&mut probe).unwrap();

    assert_eq!(probe.frames.len(), 2);
    assert!(probe.frames.iter().all(|f| f.width == 30));
    assert_eq!(engine.backend().titles(), ["demo".to_string()]);
}
