//! Gamepad polling (XInput state model).
//!
//! A [`GamepadSource`] produces raw [`GamepadState`] snapshots for a slot;
//! the [`Gamepad`] tracker keeps the current and previous snapshot so games
//! can ask for held buttons, press/release edges and dead-zoned sticks.

use std::collections::VecDeque;

use crate::types::Direction;

/// Left thumbstick dead zone (raw units).
pub const LEFT_THUMB_DEADZONE: i16 = 7849;
/// Right thumbstick dead zone (raw units).
pub const RIGHT_THUMB_DEADZONE: i16 = 8689;
/// Trigger values at or below this are treated as released.
pub const TRIGGER_THRESHOLD: u8 = 30;

/// Number of controller slots a source may expose.
pub const MAX_SLOTS: u8 = 4;

/// Button bit set, using XInput bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GamepadButtons(u16);

impl GamepadButtons {
    pub const DPAD_UP: Self = Self(0x0001);
    pub const DPAD_DOWN: Self = Self(0x0002);
    pub const DPAD_LEFT: Self = Self(0x0004);
    pub const DPAD_RIGHT: Self = Self(0x0008);
    pub const START: Self = Self(0x0010);
    pub const BACK: Self = Self(0x0020);
    pub const LEFT_THUMB: Self = Self(0x0040);
    pub const RIGHT_THUMB: Self = Self(0x0080);
    pub const LEFT_SHOULDER: Self = Self(0x0100);
    pub const RIGHT_SHOULDER: Self = Self(0x0200);
    pub const A: Self = Self(0x1000);
    pub const B: Self = Self(0x2000);
    pub const X: Self = Self(0x4000);
    pub const Y: Self = Self(0x8000);

    const ALL: [Self; 14] = [
        Self::DPAD_UP,
        Self::DPAD_DOWN,
        Self::DPAD_LEFT,
        Self::DPAD_RIGHT,
        Self::START,
        Self::BACK,
        Self::LEFT_THUMB,
        Self::RIGHT_THUMB,
        Self::LEFT_SHOULDER,
        Self::RIGHT_SHOULDER,
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits. Bits without a button (0x0400, 0x0800) are dropped.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & 0xF3FF)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Individual buttons that are set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = GamepadButtons> {
        Self::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl std::ops::BitOr for GamepadButtons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Raw controller snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadState {
    /// Changes whenever the controller reports new data.
    pub packet: u32,
    pub buttons: GamepadButtons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// Dead-zoned thumbstick reading. `y` is positive upwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stick {
    pub x: f32,
    pub y: f32,
    /// 0.0 inside the dead zone, 1.0 at full deflection.
    pub magnitude: f32,
}

impl Stick {
    /// Normalize raw axis values against a circular dead zone.
    pub fn from_raw(x: i16, y: i16, deadzone: i16) -> Self {
        let (fx, fy) = (x as f32, y as f32);
        let raw = (fx * fx + fy * fy).sqrt();
        let dz = deadzone as f32;
        if raw <= dz {
            return Self::default();
        }
        let max = i16::MAX as f32;
        let magnitude = (raw.min(max) - dz) / (max - dz);
        Self {
            x: fx / raw * magnitude,
            y: fy / raw * magnitude,
            magnitude,
        }
    }

    /// Dominant direction when deflected past `threshold` (0.0..=1.0).
    pub fn direction(&self, threshold: f32) -> Option<Direction> {
        if self.magnitude < threshold {
            return None;
        }
        if self.x.abs() >= self.y.abs() {
            Some(if self.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if self.y > 0.0 {
                Direction::Up
            } else {
                Direction::Down
            })
        }
    }
}

/// Trigger value past the threshold, scaled to 0.0..=1.0.
pub fn normalize_trigger(value: u8) -> f32 {
    if value <= TRIGGER_THRESHOLD {
        return 0.0;
    }
    (value - TRIGGER_THRESHOLD) as f32 / (u8::MAX - TRIGGER_THRESHOLD) as f32
}

/// Anything that can report controller state for a slot.
pub trait GamepadSource {
    /// Current state of `slot`, or `None` when no controller is connected.
    fn poll(&mut self, slot: u8) -> Option<GamepadState>;
}

/// A source with nothing plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGamepad;

impl GamepadSource for NullGamepad {
    fn poll(&mut self, _slot: u8) -> Option<GamepadState> {
        None
    }
}

/// Replays a fixed sequence of snapshots, one per poll, then repeats the last.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGamepad {
    queue: VecDeque<Option<GamepadState>>,
    last: Option<GamepadState>,
}

impl ScriptedGamepad {
    pub fn new(states: impl IntoIterator<Item = Option<GamepadState>>) -> Self {
        Self {
            queue: states.into_iter().collect(),
            last: None,
        }
    }

    pub fn push(&mut self, state: Option<GamepadState>) {
        self.queue.push_back(state);
    }
}

impl GamepadSource for ScriptedGamepad {
    fn poll(&mut self, _slot: u8) -> Option<GamepadState> {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Per-frame controller tracker for one slot.
#[derive(Debug, Clone, Default)]
pub struct Gamepad {
    slot: u8,
    current: Option<GamepadState>,
    previous_buttons: GamepadButtons,
}

impl Gamepad {
    pub fn new(slot: u8) -> Self {
        Self {
            slot: slot.min(MAX_SLOTS - 1),
            current: None,
            previous_buttons: GamepadButtons::empty(),
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Poll `source` once. Call exactly once per frame.
    pub fn update(&mut self, source: &mut dyn GamepadSource) {
        let next = source.poll(self.slot);
        self.previous_buttons = self.buttons();

        match (self.current, next) {
            (None, Some(_)) => log::info!("gamepad {} connected", self.slot),
            (Some(_), None) => log::warn!("gamepad {} disconnected", self.slot),
            _ => {}
        }

        match next {
            // Same packet: the controller has nothing new to report.
            Some(state) if self.current.map(|c| c.packet) == Some(state.packet) => {}
            other => self.current = other,
        }
    }

    pub fn connected(&self) -> bool {
        self.current.is_some()
    }

    pub fn state(&self) -> Option<&GamepadState> {
        self.current.as_ref()
    }

    pub fn buttons(&self) -> GamepadButtons {
        self.current.map(|s| s.buttons).unwrap_or_default()
    }

    pub fn is_down(&self, button: GamepadButtons) -> bool {
        self.buttons().contains(button)
    }

    pub fn was_pressed(&self, button: GamepadButtons) -> bool {
        self.is_down(button) && !self.previous_buttons.contains(button)
    }

    pub fn was_released(&self, button: GamepadButtons) -> bool {
        !self.is_down(button) && self.previous_buttons.contains(button)
    }

    pub fn left_stick(&self) -> Stick {
        self.current
            .map(|s| Stick::from_raw(s.thumb_lx, s.thumb_ly, LEFT_THUMB_DEADZONE))
            .unwrap_or_default()
    }

    pub fn right_stick(&self) -> Stick {
        self.current
            .map(|s| Stick::from_raw(s.thumb_rx, s.thumb_ry, RIGHT_THUMB_DEADZONE))
            .unwrap_or_default()
    }

    pub fn left_trigger(&self) -> f32 {
        self.current
            .map(|s| normalize_trigger(s.left_trigger))
            .unwrap_or(0.0)
    }

    pub fn right_trigger(&self) -> f32 {
        self.current
            .map(|s| normalize_trigger(s.right_trigger))
            .unwrap_or(0.0)
    }

    /// D-pad direction; up/down win over left/right when both are held.
    pub fn dpad_direction(&self) -> Option<Direction> {
        let b = self.buttons();
        if b.contains(GamepadButtons::DPAD_UP) {
            Some(Direction::Up)
        } else if b.contains(GamepadButtons::DPAD_DOWN) {
            Some(Direction::Down)
        } else if b.contains(GamepadButtons::DPAD_LEFT) {
            Some(Direction::Left)
        } else if b.contains(GamepadButtons::DPAD_RIGHT) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

#[cfg(feature = "gilrs")]
pub use self::gilrs_source::GilrsGamepad;

#[cfg(feature = "gilrs")]
mod gilrs_source {
    use anyhow::{anyhow, Result};
    use gilrs::{Axis, Button, Gilrs};

    use super::{GamepadButtons, GamepadSource, GamepadState};

    const BUTTON_MAP: [(Button, GamepadButtons); 14] = [
        (Button::DPadUp, GamepadButtons::DPAD_UP),
        (Button::DPadDown, GamepadButtons::DPAD_DOWN),
        (Button::DPadLeft, GamepadButtons::DPAD_LEFT),
        (Button::DPadRight, GamepadButtons::DPAD_RIGHT),
        (Button::Start, GamepadButtons::START),
        (Button::Select, GamepadButtons::BACK),
        (Button::LeftThumb, GamepadButtons::LEFT_THUMB),
        (Button::RightThumb, GamepadButtons::RIGHT_THUMB),
        (Button::LeftTrigger, GamepadButtons::LEFT_SHOULDER),
        (Button::RightTrigger, GamepadButtons::RIGHT_SHOULDER),
        (Button::South, GamepadButtons::A),
        (Button::East, GamepadButtons::B),
        (Button::West, GamepadButtons::X),
        (Button::North, GamepadButtons::Y),
    ];

    /// Real controllers via `gilrs`. Slot `n` is the n-th connected pad.
    pub struct GilrsGamepad {
        gilrs: Gilrs,
        packet: u32,
    }

    impl GilrsGamepad {
        pub fn new() -> Result<Self> {
            let gilrs = Gilrs::new().map_err(|e| anyhow!("gamepad init failed: {e}"))?;
            Ok(Self { gilrs, packet: 0 })
        }
    }

    impl GamepadSource for GilrsGamepad {
        fn poll(&mut self, slot: u8) -> Option<GamepadState> {
            while self.gilrs.next_event().is_some() {
                self.packet = self.packet.wrapping_add(1);
            }
            let (_, pad) = self
                .gilrs
                .gamepads()
                .filter(|(_, pad)| pad.is_connected())
                .nth(slot as usize)?;

            let mut buttons = GamepadButtons::empty();
            for (button, bit) in BUTTON_MAP {
                if pad.is_pressed(button) {
                    buttons.insert(bit);
                }
            }
            let axis = |a: Axis| (pad.value(a).clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            let trigger = |b: Button| {
                pad.button_data(b)
                    .map(|d| (d.value().clamp(0.0, 1.0) * u8::MAX as f32) as u8)
                    .unwrap_or(0)
            };

            Some(GamepadState {
                packet: self.packet,
                buttons,
                left_trigger: trigger(Button::LeftTrigger2),
                right_trigger: trigger(Button::RightTrigger2),
                thumb_lx: axis(Axis::LeftStickX),
                thumb_ly: axis(Axis::LeftStickY),
                thumb_rx: axis(Axis::RightStickX),
                thumb_ry: axis(Axis::RightStickY),
            })
        }
    }
}
