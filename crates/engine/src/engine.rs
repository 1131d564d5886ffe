//! The frame loop.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};

use crate::backend::Backend;
use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::game::{Context, FrameTime, Game};
use crate::input::{should_quit, Gamepad, GamepadSource, NullGamepad};
use crate::term::FrameBuffer;
use crate::types::Size;

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub frames: u64,
    pub elapsed: Duration,
}

pub struct Engine<B: Backend> {
    backend: B,
    config: EngineConfig,
    gamepad_source: Box<dyn GamepadSource>,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            gamepad_source: Box::new(NullGamepad),
        }
    }

    pub fn with_gamepad_source(mut self, source: Box<dyn GamepadSource>) -> Self {
        self.gamepad_source = source;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run `game` until it quits, a quit key is pressed, `max_frames` is
    /// reached, or an error occurs.
    ///
    /// The console is always restored and [`Game::destroy`] always runs once
    /// [`Game::create`] has succeeded; the first error wins.
    pub fn run<G: Game>(&mut self, game: &mut G) -> Result<RunStats> {
        self.config.validate()?;
        self.backend.enter()?;
        log::info!(
            "engine start: title={:?} fps={} fixed_size={}",
            self.config.title,
            self.config.fps,
            self.config.fixed_size
        );

        let started = Instant::now();
        let mut frames = 0u64;
        let result = self.session(game, started, &mut frames);

        let exit = self.backend.exit();
        let stats = RunStats {
            frames,
            elapsed: started.elapsed(),
        };
        match &result {
            Ok(()) => log::info!("engine stop: {} frames in {:?}", stats.frames, stats.elapsed),
            Err(err) => log::error!("engine stop after {} frames: {err:#}", stats.frames),
        }
        result?;
        exit?;
        Ok(stats)
    }

    fn session<G: Game>(&mut self, game: &mut G, started: Instant, frames: &mut u64) -> Result<()> {
        let size = if self.config.fixed_size {
            self.config.size()
        } else {
            self.backend.size().unwrap_or_else(|err| {
                log::warn!("terminal size unavailable, using config: {err:#}");
                self.config.size()
            })
        };

        let key_timeout = if self.backend.reports_key_release() {
            None
        } else {
            self.config.key_release_timeout()
        };
        let mut ctx = Context::new(size, self.config.title.clone());
        ctx.keyboard.set_key_release_timeout_ms(key_timeout);
        ctx.gamepad = Gamepad::new(self.config.gamepad_slot);

        game.create(&mut ctx)?;
        let result = self.frames(game, &mut ctx, size, started, frames);
        game.destroy(&mut ctx);
        result
    }

    fn frames<G: Game>(
        &mut self,
        game: &mut G,
        ctx: &mut Context,
        size: Size,
        started: Instant,
        frames: &mut u64,
    ) -> Result<()> {
        let mut frame = FrameBuffer::new(size.width, size.height);
        let mut clock = FrameClock::new(self.config.fps);

        loop {
            self.pump_events(ctx, &mut frame, &clock, started)?;
            if ctx.is_quitting() {
                return Ok(());
            }

            let now = started.elapsed();
            let delta = clock.tick(now);
            let time = FrameTime {
                delta,
                elapsed: now,
                frame: *frames,
                fps: clock.fps(),
            };
            ctx.time = time;
            ctx.keyboard.update(time.delta_ms());
            ctx.gamepad.update(self.gamepad_source.as_mut());

            game.update(ctx, &mut frame)?;

            if let Some(title) = ctx.take_title_change() {
                self.backend.set_title(title)?;
            }
            self.backend.present(&mut frame)?;
            ctx.keyboard.end_frame();
            *frames += 1;

            if ctx.is_quitting() {
                return Ok(());
            }
            if self.config.max_frames.is_some_and(|max| *frames >= max) {
                log::debug!("frame limit reached");
                return Ok(());
            }
        }
    }

    /// Feed input to the context until the next frame is due.
    ///
    /// The first frame does not wait: its deadline is the start of the run.
    fn pump_events(
        &mut self,
        ctx: &mut Context,
        frame: &mut FrameBuffer,
        clock: &FrameClock,
        started: Instant,
    ) -> Result<()> {
        loop {
            let timeout = clock.remaining(started.elapsed());
            let Some(event) = self.backend.poll_event(timeout)? else {
                if timeout.is_zero() || clock.remaining(started.elapsed()).is_zero() {
                    return Ok(());
                }
                continue;
            };
            match event {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if self.config.exit_on_quit_key && should_quit(key) {
                            log::info!("quit key pressed");
                            ctx.quit();
                            return Ok(());
                        }
                        ctx.keyboard.press(key.code);
                    }
                    KeyEventKind::Release => {
                        ctx.keyboard.release(key.code);
                    }
                },
                Event::Resize(w, h) => {
                    if !self.config.fixed_size && w > 0 && h > 0 {
                        frame.resize(w, h);
                        ctx.size = Size::new(w, h);
                        self.backend.invalidate();
                        log::debug!("resized to {w}x{h}");
                    }
                }
                _ => {}
            }
        }
    }
}
