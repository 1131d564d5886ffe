//! Snake rules, independent of any terminal.
//!
//! [`SnakeGame`] is stepped either one cell at a time with
//! [`SnakeGame::tick`] or by elapsed time with [`SnakeGame::update`].

pub mod rng;
pub mod state;

pub use tui_engine_types as types;

pub use rng::SimpleRng;
pub use state::{SnakeGame, Status, StepEvent};
