//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for console games.
//! Games draw into a [`FrameBuffer`] of colored character cells; the
//! [`TerminalRenderer`] diffs it against the last presented frame and
//! flushes the changes with a single write.
//!
//! Goals:
//! - Keep drawing pure (no I/O) so it can be unit-tested
//! - One batched terminal write per frame
//! - Console-style data model: 16-color palette, glyph + fg/bg per cell

pub mod fb;
pub mod figlet;
pub mod renderer;
pub mod shapes;

pub use tui_engine_types as types;

pub use fb::{Cell, FrameBuffer};
pub use figlet::FigFont;
pub use renderer::{encode_diff_into, encode_full_into, ColorMode, TerminalRenderer};
pub use shapes::{BorderStyle, Brush, Shape};
