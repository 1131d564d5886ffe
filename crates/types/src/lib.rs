//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (frame loop, rendering, input, game logic).
//!
//! # Console Colors
//!
//! The engine uses the classic 16-color console model. Every cell stores a
//! foreground and a background [`Color`], each one a 4-bit palette index:
//!
//! | Index | Color | Index | Color |
//! |-------|-------|-------|-------|
//! | 0 | Black | 8 | DarkGray |
//! | 1 | DarkBlue | 9 | Blue |
//! | 2 | DarkGreen | 10 | Green |
//! | 3 | DarkCyan | 11 | Cyan |
//! | 4 | DarkRed | 12 | Red |
//! | 5 | DarkMagenta | 13 | Magenta |
//! | 6 | DarkYellow | 14 | Yellow |
//! | 7 | Gray | 15 | White |
//!
//! A foreground/background pair packs into a single console character
//! attribute (`fg | bg << 4`), see [`Color::attribute`].
//!
//! # Frame Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_FPS` | 30 | Target frame rate of the frame loop |
//! | `MAX_FPS` | 240 | Upper clamp for the target frame rate |
//! | `DEFAULT_KEY_RELEASE_TIMEOUT_MS` | 150 | Auto-release for terminals without key-up events |
//!
//! # Examples
//!
//! ```
//! use tui_engine_types::{Color, Palette, Point, Rect};
//!
//! let attr = Color::attribute(Color::Yellow, Color::DarkBlue);
//! assert_eq!(attr, 0x1E);
//! assert_eq!(Color::from_attribute(attr), (Color::Yellow, Color::DarkBlue));
//!
//! assert_eq!(Color::from_name("dark_red"), Some(Color::DarkRed));
//!
//! let palette = Palette::default();
//! assert_eq!(palette.nearest(palette.get(Color::Cyan)), Color::Cyan);
//!
//! let area = Rect::new(0, 0, 10, 5);
//! assert!(area.contains(Point::new(9, 4)));
//! assert!(!area.contains(Point::new(10, 4)));
//! ```

use std::ops::{Add, Sub};

/// Default console width in columns.
pub const DEFAULT_WIDTH: u16 = 80;

/// Default console height in rows.
pub const DEFAULT_HEIGHT: u16 = 25;

/// Default target frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Highest accepted target frame rate.
pub const MAX_FPS: u32 = 240;

/// Held keys not refreshed within this window are released.
///
/// Most terminals never report key-up events, only presses and auto-repeats.
pub const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// The 16 console colors, in palette index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl Color {
    /// All colors, indexed by palette index.
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::DarkBlue,
        Color::DarkGreen,
        Color::DarkCyan,
        Color::DarkRed,
        Color::DarkMagenta,
        Color::DarkYellow,
        Color::Gray,
        Color::DarkGray,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Yellow,
        Color::White,
    ];

    /// Palette index (0-15).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a color by palette index.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_engine_types::Color;
    ///
    /// assert_eq!(Color::from_index(0), Some(Color::Black));
    /// assert_eq!(Color::from_index(15), Some(Color::White));
    /// assert_eq!(Color::from_index(16), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Pack a foreground/background pair into a console character attribute.
    pub fn attribute(fg: Color, bg: Color) -> u16 {
        (fg.index() as u16) | ((bg.index() as u16) << 4)
    }

    /// Unpack a console character attribute. Bits above the color nibbles are ignored.
    pub fn from_attribute(attr: u16) -> (Color, Color) {
        let fg = Self::ALL[(attr & 0x0F) as usize];
        let bg = Self::ALL[((attr >> 4) & 0x0F) as usize];
        (fg, bg)
    }

    /// Parse color from name (case-insensitive; `_`, `-` and spaces are ignored).
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_engine_types::Color;
    ///
    /// assert_eq!(Color::from_name("DarkBlue"), Some(Color::DarkBlue));
    /// assert_eq!(Color::from_name("dark-blue"), Some(Color::DarkBlue));
    /// assert_eq!(Color::from_name("grey"), Some(Color::Gray));
    /// assert_eq!(Color::from_name("purple"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.replace("grey", "gray");
        Self::ALL.into_iter().find(|c| c.name() == key)
    }

    /// Lowercase name without separators, e.g. `darkblue`.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::DarkBlue => "darkblue",
            Color::DarkGreen => "darkgreen",
            Color::DarkCyan => "darkcyan",
            Color::DarkRed => "darkred",
            Color::DarkMagenta => "darkmagenta",
            Color::DarkYellow => "darkyellow",
            Color::Gray => "gray",
            Color::DarkGray => "darkgray",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Cyan => "cyan",
            Color::Red => "red",
            Color::Magenta => "magenta",
            Color::Yellow => "yellow",
            Color::White => "white",
        }
    }

    /// True for the high-intensity half of the palette (indices 8-15).
    pub fn is_bright(self) -> bool {
        self.index() >= 8
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    ///
    /// ```
    /// use tui_engine_types::Rgb;
    ///
    /// assert_eq!(Rgb::from_hex("#ff8000"), Some(Rgb::new(255, 128, 0)));
    /// assert_eq!(Rgb::from_hex("12345"), None);
    /// ```
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// Sixteen RGB values, one per console [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    entries: [Rgb; 16],
}

/// Classic console palette.
const CLASSIC_PALETTE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(0, 0, 128),
    Rgb::new(0, 128, 0),
    Rgb::new(0, 128, 128),
    Rgb::new(128, 0, 0),
    Rgb::new(128, 0, 128),
    Rgb::new(128, 128, 0),
    Rgb::new(192, 192, 192),
    Rgb::new(128, 128, 128),
    Rgb::new(0, 0, 255),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 255, 255),
];

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: CLASSIC_PALETTE,
        }
    }
}

impl Palette {
    pub const fn new(entries: [Rgb; 16]) -> Self {
        Self { entries }
    }

    pub fn get(&self, color: Color) -> Rgb {
        self.entries[color.index() as usize]
    }

    pub fn set(&mut self, color: Color, rgb: Rgb) {
        self.entries[color.index() as usize] = rgb;
    }

    pub fn entries(&self) -> &[Rgb; 16] {
        &self.entries
    }

    /// Closest palette color by squared RGB distance (lowest index wins ties).
    pub fn nearest(&self, rgb: Rgb) -> Color {
        let mut best = Color::Black;
        let mut best_d = u32::MAX;
        for color in Color::ALL {
            let d = self.get(color).distance_sq(rgb);
            if d < best_d {
                best = color;
                best_d = d;
            }
        }
        best
    }
}

/// One of the four cardinal directions. `Up` is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit step as (dx, dy).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Signed grid position. Shapes may start off-screen, so coordinates are `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Neighbouring point one step in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Console dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Axis-aligned rectangle; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Overlapping area, or `None` when the rectangles do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, (x1 - x0) as u16, (y1 - y0) as u16))
    }
}
