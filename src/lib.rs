//! TUI engine (workspace facade crate).
//!
//! Re-exports the member crates under short names so games and tests can
//! use `tui_engine::{engine, term, input, audio, snake, types}` without
//! depending on each crate directly. [`app`] is the Snake demo game.

pub use tui_engine_audio as audio;
pub use tui_engine_input as input;
pub use tui_engine_runtime as engine;
pub use tui_engine_snake as snake;
pub use tui_engine_term as term;
pub use tui_engine_types as types;

pub mod app;
