//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Each frame is encoded into a single byte buffer (only the changed runs,
//! or the full frame after a size change) and written with one `write_all`.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetColors, Colors},
    terminal, QueueableCommand,
};

use crate::fb::{Cell, FrameBuffer};
use crate::types::{Color, Palette};

/// How console colors are sent to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// The terminal's own 16 named colors.
    #[default]
    Named,
    /// 24-bit colors looked up in a palette.
    TrueColor(Palette),
}

impl ColorMode {
    pub fn to_terminal(&self, color: Color) -> TermColor {
        match self {
            ColorMode::Named => named_color(color),
            ColorMode::TrueColor(palette) => {
                let rgb = palette.get(color);
                TermColor::Rgb {
                    r: rgb.r,
                    g: rgb.g,
                    b: rgb.b,
                }
            }
        }
    }
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    mode: ColorMode,
    frames_written: u64,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::with_color_mode(ColorMode::Named)
    }

    pub fn with_color_mode(mode: ColorMode) -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            mode,
            frames_written: 0,
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// Switch color mode; the next draw repaints everything.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.mode != mode {
            self.mode = mode;
            self.invalidate();
        }
    }

    /// Number of frames flushed so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        self.last = None;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.buf.clear();
        self.buf.queue(terminal::SetTitle(title))?;
        self.flush_buf()
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers should keep one `FrameBuffer` and pass it in every frame.
    /// The renderer will diff against the previous frame and then swap buffers
    /// so the caller can reuse the old one without cloning. After the call the
    /// caller's buffer holds the previous frame; since games usually redraw
    /// only part of the screen, it is refreshed with a copy of the presented
    /// frame so the back-buffer keeps its contents across frames.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, self.mode, &mut self.buf)?;
                prev
            }
            Some(mut prev) => {
                encode_full_into(fb, self.mode, &mut self.buf)?;
                prev.resize(fb.width(), fb.height());
                prev
            }
            None => {
                encode_full_into(fb, self.mode, &mut self.buf)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush_buf()?;
        self.frames_written += 1;

        // Swap current into prev so next frame can diff, then bring the
        // back-buffer up to date with what is on screen.
        std::mem::swap(&mut prev, fb);
        fb.clone_from(&prev);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a full-frame redraw into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
pub fn encode_full_into(fb: &FrameBuffer, mode: ColorMode, out: &mut Vec<u8>) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let mut current: Option<(Color, Color)> = None;
    for y in 0..fb.height() {
        out.queue(cursor::MoveTo(0, y))?;
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            put_cell(out, cell, mode, &mut current)?;
        }
    }

    out.queue(ResetColor)?;
    Ok(())
}

/// Encode a diff redraw (changed runs) into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
/// Nothing is emitted when the frames are identical.
pub fn encode_diff_into(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mode: ColorMode,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut current: Option<(Color, Color)> = None;
    let start_len = out.len();

    for_each_changed_run(prev, next, |x, y, len| {
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            put_cell(out, cell, mode, &mut current)?;
        }
        Ok(())
    })?;

    if out.len() != start_len {
        out.queue(ResetColor)?;
    }
    Ok(())
}

fn put_cell(
    out: &mut Vec<u8>,
    cell: Cell,
    mode: ColorMode,
    current: &mut Option<(Color, Color)>,
) -> Result<()> {
    if *current != Some((cell.fg, cell.bg)) {
        out.queue(SetColors(Colors::new(
            mode.to_terminal(cell.fg),
            mode.to_terminal(cell.bg),
        )))?;
        *current = Some((cell.fg, cell.bg));
    }
    // Control characters would move the terminal cursor.
    let ch = if cell.ch.is_control() { ' ' } else { cell.ch };
    out.queue(Print(ch))?;
    Ok(())
}

fn named_color(color: Color) -> TermColor {
    match color {
        Color::Black => TermColor::Black,
        Color::DarkBlue => TermColor::DarkBlue,
        Color::DarkGreen => TermColor::DarkGreen,
        Color::DarkCyan => TermColor::DarkCyan,
        Color::DarkRed => TermColor::DarkRed,
        Color::DarkMagenta => TermColor::DarkMagenta,
        Color::DarkYellow => TermColor::DarkYellow,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::Blue => TermColor::Blue,
        Color::Green => TermColor::Green,
        Color::Cyan => TermColor::Cyan,
        Color::Red => TermColor::Red,
        Color::Magenta => TermColor::Magenta,
        Color::Yellow => TermColor::Yellow,
        Color::White => TermColor::White,
    }
}

/// Visit each horizontal run of cells that differ between `prev` and `next`.
pub fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        // Size changed: treat everything as dirty in a single pass (row runs).
        for y in 0..next.height() {
            f(0, y, next.width())?;
        }
        return Ok(());
    }

    let w = next.width();
    let h = next.height();

    for y in 0..h {
        let mut x = 0;
        while x < w {
            let a = prev.get(x, y).unwrap_or_default();
            let b = next.get(x, y).unwrap_or_default();
            if a == b {
                x += 1;
                continue;
            }

            let start = x;
            x += 1;
            while x < w {
                let a2 = prev.get(x, y).unwrap_or_default();
                let b2 = next.get(x, y).unwrap_or_default();
                if a2 == b2 {
                    break;
                }
                x += 1;
            }
            let len = x - start;
            f(start, y, len)?;
        }
    }

    Ok(())
}
