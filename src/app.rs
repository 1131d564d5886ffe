//! The Snake demo as an engine [`Game`].
//!
//! Screen layout, top to bottom: a figlet banner (when the terminal is tall
//! enough), the board inside a rounded frame, and a one-line status bar.
//! Board cells are two columns wide so the snake looks square.

use anyhow::Result;
use crossterm::event::KeyCode;

use crate::audio::{Audio, Tone};
use crate::engine::{Context, Game};
use crate::input::{direction_for_key, Direction, GamepadButtons};
use crate::snake::{SnakeGame, Status, StepEvent};
use crate::term::{BorderStyle, Brush, Cell, FigFont, FrameBuffer, Shape};
use crate::types::{Color, Point, Rect, Size};

pub const BANNER: &str = "SNAKE";

const EAT_TONE: Tone = Tone::new(880.0, 60);
const CRASH_TONE: Tone = Tone::new(110.0, 300);
const WIN_TONE: Tone = Tone::new(1320.0, 400);

/// Left stick deflection that counts as steering.
const STICK_THRESHOLD: f32 = 0.5;

const DPAD: [(GamepadButtons, Direction); 4] = [
    (GamepadButtons::DPAD_UP, Direction::Up),
    (GamepadButtons::DPAD_DOWN, Direction::Down),
    (GamepadButtons::DPAD_LEFT, Direction::Left),
    (GamepadButtons::DPAD_RIGHT, Direction::Right),
];

/// Where the board sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    banner_y: Option<i32>,
    border: Rect,
    status_y: u16,
}

impl Layout {
    fn new(size: Size, banner_height: usize) -> Self {
        let banner_rows = banner_height as u16 + 1;
        // Banner, a border with at least 4 rows inside, and the status bar.
        let show_banner = size.height >= banner_rows + 2 + 4 + 1;
        let top = if show_banner { banner_rows } else { 0 };
        let border_height = size.height.saturating_sub(top + 1);
        Self {
            banner_y: show_banner.then_some(0),
            border: Rect::new(0, top as i32, size.width, border_height),
            status_y: size.height.saturating_sub(1),
        }
    }

    /// Board size in cells.
    fn grid(&self) -> (u16, u16) {
        (
            self.border.width.saturating_sub(2) / 2,
            self.border.height.saturating_sub(2),
        )
    }

    fn fits(&self) -> bool {
        let (w, h) = self.grid();
        w >= crate::snake::state::MIN_WIDTH && h >= crate::snake::state::MIN_HEIGHT
    }

    fn to_screen(&self, p: Point) -> Point {
        Point::new(self.border.x + 1 + p.x * 2, self.border.y + 1 + p.y)
    }
}

pub struct SnakeApp {
    font: FigFont,
    audio: Audio,
    seed: u32,
    games_started: u32,
    game: SnakeGame,
    screen: Size,
    layout: Layout,
    stick_direction: Option<Direction>,
}

impl SnakeApp {
    pub fn new(seed: u32, audio: Audio) -> Result<Self> {
        let font = FigFont::standard()?;
        let screen = Size::default();
        let layout = Layout::new(screen, font.height());
        let (w, h) = layout.grid();
        Ok(Self {
            font,
            audio,
            seed,
            games_started: 1,
            game: SnakeGame::new(w, h, seed),
            screen,
            layout,
            stick_direction: None,
        })
    }

    pub fn game(&self) -> &SnakeGame {
        &self.game
    }

    /// Fit the board to `screen`. A new board means a new game.
    fn relayout(&mut self, screen: Size) {
        self.screen = screen;
        self.layout = Layout::new(screen, self.font.height());
        let (w, h) = self.layout.grid();
        if (w, h) != (self.game.width(), self.game.height()) {
            log::debug!("board resized to {w}x{h}");
            self.new_game(w, h);
        }
    }

    fn new_game(&mut self, width: u16, height: u16) {
        self.games_started += 1;
        let seed = self.seed.wrapping_add(self.games_started);
        self.game = SnakeGame::new(width, height, seed);
    }

    fn handle_input(&mut self, ctx: &mut Context) {
        let mut turns = Vec::new();
        let mut pause = false;
        let mut restart = false;

        for &code in ctx.keyboard.pressed() {
            if let Some(dir) = direction_for_key(code) {
                turns.push(dir);
                continue;
            }
            match code {
                KeyCode::Char('p') => pause = true,
                KeyCode::Char('r') => restart = true,
                _ => {}
            }
        }

        let pad = &ctx.gamepad;
        if pad.connected() {
            for (button, dir) in DPAD {
                if pad.was_pressed(button) {
                    turns.push(dir);
                }
            }
            let stick = pad.left_stick().direction(STICK_THRESHOLD);
            if stick != self.stick_direction {
                turns.extend(stick);
                self.stick_direction = stick;
            }
            pause |= pad.was_pressed(GamepadButtons::START);
            restart |= pad.was_pressed(GamepadButtons::A);
            if pad.was_pressed(GamepadButtons::BACK) {
                ctx.quit();
            }
        }

        if restart {
            log::info!("restart at score {}", self.game.score());
            self.game.restart();
        }
        if pause {
            self.game.toggle_pause();
        }
        for dir in turns {
            self.game.turn(dir);
        }
    }

    fn play(&mut self, event: StepEvent) {
        let tone = match event {
            StepEvent::Moved => return,
            StepEvent::Ate => EAT_TONE,
            StepEvent::Crashed => {
                log::info!("game over: score {} length {}", self.game.score(), self.game.length());
                CRASH_TONE
            }
            StepEvent::Won => {
                log::info!("board filled: score {}", self.game.score());
                WIN_TONE
            }
        };
        if let Err(err) = self.audio.beep(tone) {
            log::warn!("beep failed: {err:#}");
        }
    }

    fn draw(&self, frame: &mut FrameBuffer) {
        frame.clear(Cell::default());

        if let Some(y) = self.layout.banner_y {
            let (w, _) = self.font.measure(BANNER);
            let x = (self.screen.width as i32 - w as i32) / 2;
            self.font.draw(frame, x, y, BANNER, Color::Green, Color::Black);
        }

        if !self.layout.fits() {
            frame.put_str_centered(self.screen.height / 2, "terminal too small", Color::Red, Color::Black);
            return;
        }

        Shape::Frame(self.layout.border, BorderStyle::Rounded)
            .draw(frame, Brush::new(' ', Color::DarkGray, Color::Black));

        if let Some(food) = self.game.food() {
            let p = self.layout.to_screen(food);
            frame.plot(p.x, p.y, Cell::new('(', Color::Red, Color::Black));
            frame.plot(p.x + 1, p.y, Cell::new(')', Color::Red, Color::Black));
        }

        let body_color = match self.game.status() {
            Status::GameOver => Color::DarkRed,
            Status::Won => Color::Yellow,
            _ => Color::Green,
        };
        for (i, cell) in self.game.body().enumerate() {
            let p = self.layout.to_screen(cell);
            let fg = if i == 0 { Color::White } else { body_color };
            frame.plot(p.x, p.y, Cell::new('█', fg, Color::Black));
            frame.plot(p.x + 1, p.y, Cell::new('█', fg, Color::Black));
        }

        let message = match self.game.status() {
            Status::Playing => None,
            Status::Paused => Some("paused - P to resume"),
            Status::GameOver => Some("game over - R to restart"),
            Status::Won => Some("you win! - R to play again"),
        };
        if let Some(message) = message {
            let y = (self.layout.border.y + self.layout.border.bottom()) / 2;
            frame.put_str_centered(y as u16, message, Color::Yellow, Color::DarkBlue);
        }

        let status = format!(
            " score {}  level {}  length {}   arrows/WASD move  P pause  R restart  Esc quit",
            self.game.score(),
            self.game.level(),
            self.game.length()
        );
        frame.put_str(0, self.layout.status_y, &status, Color::Black, Color::Gray);
    }
}

impl Game for SnakeApp {
    fn create(&mut self, ctx: &mut Context) -> Result<()> {
        self.relayout(ctx.size());
        log::info!(
            "snake on a {}x{} board, audio {}",
            self.game.width(),
            self.game.height(),
            if self.audio.is_silent() { "off" } else { "on" }
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context, frame: &mut FrameBuffer) -> Result<()> {
        if ctx.size() != self.screen {
            self.relayout(ctx.size());
        }
        if self.layout.fits() {
            self.handle_input(ctx);
            if let Some(event) = self.game.update(ctx.time().delta_ms()) {
                self.play(event);
            }
        }
        ctx.set_title(format!("Snake - score {}", self.game.score()));
        self.draw(frame);
        Ok(())
    }

    fn destroy(&mut self, _ctx: &mut Context) {
        self.audio.stop_all();
    }
}
