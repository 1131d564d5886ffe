//! The game-facing side of the frame loop.

use std::time::Duration;

use anyhow::Result;

use crate::input::{Gamepad, KeyboardState};
use crate::term::FrameBuffer;
use crate::types::Size;

/// Timing of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Time since the previous frame started.
    pub delta: Duration,
    /// Time since the loop started.
    pub elapsed: Duration,
    /// Zero-based frame number.
    pub frame: u64,
    /// Frames started during the last second.
    pub fps: u32,
}

impl FrameTime {
    pub fn delta_ms(&self) -> u32 {
        self.delta.as_millis().min(u32::MAX as u128) as u32
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Everything a game can read or request during a frame.
#[derive(Debug)]
pub struct Context {
    pub keyboard: KeyboardState,
    pub gamepad: Gamepad,
    pub(crate) time: FrameTime,
    pub(crate) size: Size,
    title: String,
    title_changed: bool,
    quit: bool,
}

impl Context {
    pub fn new(size: Size, title: impl Into<String>) -> Self {
        Self {
            keyboard: KeyboardState::new(),
            gamepad: Gamepad::new(0),
            time: FrameTime::default(),
            size,
            title: title.into(),
            title_changed: true,
            quit: false,
        }
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Size of the back-buffer.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Change the console window title; applied before the next present.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.title_changed = true;
        }
    }

    pub(crate) fn take_title_change(&mut self) -> Option<&str> {
        if std::mem::take(&mut self.title_changed) {
            Some(&self.title)
        } else {
            None
        }
    }

    /// Stop the loop after the current frame is presented.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn is_quitting(&self) -> bool {
        self.quit
    }
}

/// A game driven by [`crate::Engine`].
///
/// The frame passed to [`Game::update`] keeps its contents between frames;
/// clear it explicitly to redraw from scratch.
pub trait Game {
    fn create(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context, frame: &mut FrameBuffer) -> Result<()>;

    /// Called once after the loop stops, including when it stops on an error.
    fn destroy(&mut self, _ctx: &mut Context) {}
}
