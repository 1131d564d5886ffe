//! Frame loop for console games.
//!
//! An [`Engine`] owns a [`Backend`] (the real terminal or an in-memory one)
//! and drives a [`Game`] at a fixed frame rate:
//!
//! 1. drain input events until the frame is due
//! 2. update the keyboard set and poll the gamepad
//! 3. let the game draw into the back-buffer
//! 4. present the back-buffer with one batched write
//!
//! ```no_run
//! use tui_engine_runtime::{Context, Engine, EngineConfig, Game, TerminalBackend};
//! use tui_engine_runtime::term::FrameBuffer;
//! use tui_engine_runtime::types::Color;
//!
//! struct Hello;
//!
//! impl Game for Hello {
//!     fn update(&mut self, ctx: &mut Context, frame: &mut FrameBuffer) -> anyhow::Result<()> {
//!         let fps = ctx.time().fps.to_string();
//!         frame.put_str(0, 0, &fps, Color::Yellow, Color::Black);
//!         Ok(())
//!     }
//! }
//!
//! let config = EngineConfig::default();
//! let backend = TerminalBackend::new(config.color_mode()?);
//! Engine::new(backend, config).run(&mut Hello)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod engine;
pub mod game;
pub mod logging;

pub use tui_engine_input as input;
pub use tui_engine_term as term;
pub use tui_engine_types as types;

pub use backend::{Backend, HeadlessBackend, TerminalBackend};
pub use clock::FrameClock;
pub use config::EngineConfig;
pub use engine::{Engine, RunStats};
pub use game::{Context, FrameTime, Game};
pub use logging::init_file_logger;
