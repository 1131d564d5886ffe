//! Input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It provides:
//!
//! - [`KeyboardState`]: the set of held keys plus per-frame press/release
//!   edges, with a release timeout for terminals that only report presses
//! - key mapping helpers ([`direction_for_key`], [`should_quit`])
//! - [`Gamepad`]: XInput-style controller polling behind [`GamepadSource`]

pub mod gamepad;
pub mod keyboard;
pub mod map;

pub use tui_engine_types as types;

pub use gamepad::{
    Gamepad, GamepadButtons, GamepadSource, GamepadState, NullGamepad, ScriptedGamepad, Stick,
};
#[cfg(feature = "gilrs")]
pub use gamepad::GilrsGamepad;
pub use keyboard::KeyboardState;
pub use map::{direction_for_key, should_quit};
pub use types::Direction;
