//! Console backends: where events come from and frames go to.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use crate::term::{ColorMode, FrameBuffer, TerminalRenderer};
use crate::types::Size;

pub trait Backend {
    fn enter(&mut self) -> Result<()>;

    fn exit(&mut self) -> Result<()>;

    fn size(&self) -> Result<Size>;

    /// Wait up to `timeout` for one input event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>>;

    /// Flush the back-buffer to the console. Called once per frame.
    fn present(&mut self, frame: &mut FrameBuffer) -> Result<()>;

    fn set_title(&mut self, title: &str) -> Result<()>;

    /// Next present must repaint everything.
    fn invalidate(&mut self) {}

    /// True when key-up events are delivered, so held keys need no timeout.
    fn reports_key_release(&self) -> bool {
        false
    }
}

/// The real terminal, via crossterm.
pub struct TerminalBackend {
    renderer: TerminalRenderer,
    enhanced_keyboard: bool,
}

impl TerminalBackend {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            renderer: TerminalRenderer::with_color_mode(mode),
            enhanced_keyboard: false,
        }
    }
}

impl Backend for TerminalBackend {
    fn enter(&mut self) -> Result<()> {
        self.renderer.enter()?;
        // Terminals speaking the kitty keyboard protocol can report releases.
        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keyboard = true;
            log::debug!("keyboard enhancement enabled");
        }
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        let popped = if std::mem::take(&mut self.enhanced_keyboard) {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        // Leave raw mode even if the pop failed.
        self.renderer.exit()?;
        Ok(popped?)
    }

    fn size(&self) -> Result<Size> {
        let (w, h) = terminal::size()?;
        Ok(Size::new(w, h))
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    fn present(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        self.renderer.draw_swap(frame)
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.renderer.set_title(title)
    }

    fn invalidate(&mut self) {
        self.renderer.invalidate();
    }

    fn reports_key_release(&self) -> bool {
        cfg!(windows) || self.enhanced_keyboard
    }
}

/// In-memory console for tests and benchmarks.
///
/// Events are scheduled against the number of frames presented so far and
/// are returned without waiting. With nothing scheduled, a poll sleeps out
/// its timeout like an idle terminal would. Presented frames are recorded.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    size: Size,
    scheduled: BTreeMap<u64, VecDeque<Event>>,
    presented: u64,
    polls: u64,
    last_frame: Option<FrameBuffer>,
    titles: Vec<String>,
    invalidations: u32,
    entered: bool,
    exited: bool,
    key_release: bool,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            ..Self::default()
        }
    }

    /// Deliver real key-up events instead of relying on the timeout.
    pub fn with_key_release(mut self) -> Self {
        self.key_release = true;
        self
    }

    /// Deliver `event` while waiting for frame number `frame` (zero-based).
    pub fn schedule(&mut self, frame: u64, event: Event) {
        self.scheduled.entry(frame).or_default().push_back(event);
    }

    pub fn with_event(mut self, frame: u64, event: Event) -> Self {
        self.schedule(frame, event);
        self
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Calls to [`Backend::poll_event`] so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn invalidations(&self) -> u32 {
        self.invalidations
    }

    pub fn entered(&self) -> bool {
        self.entered
    }

    pub fn exited(&self) -> bool {
        self.exited
    }
}

impl Backend for HeadlessBackend {
    fn enter(&mut self) -> Result<()> {
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        self.exited = true;
        Ok(())
    }

    fn size(&self) -> Result<Size> {
        Ok(self.size)
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        self.polls += 1;
        let event = self
            .scheduled
            .get_mut(&self.presented)
            .and_then(VecDeque::pop_front);
        match event {
            Some(Event::Resize(w, h)) => self.size = Size::new(w, h),
            Some(_) => {}
            None => thread::sleep(timeout),
        }
        Ok(event)
    }

    fn present(&mut self, frame: &mut FrameBuffer) -> Result<()> {
        match &mut self.last_frame {
            Some(last) => last.clone_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
        self.presented += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.titles.push(title.to_string());
        Ok(())
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }

    fn reports_key_release(&self) -> bool {
        self.key_release
    }
}
