//! Shape primitives drawn into a [`FrameBuffer`].
//!
//! All coordinates are signed and every primitive clips against the buffer,
//! so shapes may be partially (or entirely) off-screen.

use crate::fb::{Cell, FrameBuffer};
use crate::types::{Color, Point, Rect};

/// Glyph and colors used to paint a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Brush {
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    fn cell(&self) -> Cell {
        Cell::new(self.ch, self.fg, self.bg)
    }

    fn with_char(&self, ch: char) -> Cell {
        Cell::new(ch, self.fg, self.bg)
    }
}

/// Box-drawing style for [`Shape::Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Heavy,
    Ascii,
}

impl BorderStyle {
    /// Border glyphs, in order: top-left, top-right, bottom-left, bottom-right,
    /// horizontal, vertical.
    pub fn glyphs(self) -> [char; 6] {
        match self {
            BorderStyle::Single => ['┌', '┐', '└', '┘', '─', '│'],
            BorderStyle::Double => ['╔', '╗', '╚', '╝', '═', '║'],
            BorderStyle::Rounded => ['╭', '╮', '╰', '╯', '─', '│'],
            BorderStyle::Heavy => ['┏', '┓', '┗', '┛', '━', '┃'],
            BorderStyle::Ascii => ['+', '+', '+', '+', '-', '|'],
        }
    }
}

/// A drawable primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Line(Point, Point),
    Rect(Rect),
    FilledRect(Rect),
    /// Rectangle outline drawn with box-drawing glyphs; the brush glyph is ignored.
    Frame(Rect, BorderStyle),
    Circle { center: Point, radius: i32 },
    FilledCircle { center: Point, radius: i32 },
    Triangle(Point, Point, Point),
    FilledTriangle(Point, Point, Point),
}

impl Shape {
    pub fn draw(&self, fb: &mut FrameBuffer, brush: Brush) {
        match *self {
            Shape::Line(a, b) => line(fb, a, b, brush),
            Shape::Rect(r) => rect(fb, r, brush),
            Shape::FilledRect(r) => fill_rect(fb, r, brush),
            Shape::Frame(r, style) => frame(fb, r, style, brush),
            Shape::Circle { center, radius } => circle(fb, center, radius, brush),
            Shape::FilledCircle { center, radius } => fill_circle(fb, center, radius, brush),
            Shape::Triangle(a, b, c) => triangle(fb, a, b, c, brush),
            Shape::FilledTriangle(a, b, c) => fill_triangle(fb, a, b, c, brush),
        }
    }
}

/// Bresenham line, both endpoints inclusive.
///
/// The segment is clipped to the buffer first, so far-away endpoints cost no
/// more than the visible part.
pub fn line(fb: &mut FrameBuffer, from: Point, to: Point, brush: Brush) {
    let Some((from, to)) = clip_line(from, to, fb.width(), fb.height()) else {
        return;
    };
    let cell = brush.cell();
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        fb.plot(x, y, cell);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of a segment to `0..width` x `0..height`.
///
/// Segments already inside come back unchanged. Clipped endpoints are
/// rounded to the nearest cell inside the buffer.
fn clip_line(from: Point, to: Point, width: u16, height: u16) -> Option<(Point, Point)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (max_x, max_y) = (i32::from(width) - 1, i32::from(height) - 1);
    let inside = |p: Point| (0..=max_x).contains(&p.x) && (0..=max_y).contains(&p.y);
    if inside(from) && inside(to) {
        return Some((from, to));
    }

    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, x0),
        (dx, f64::from(max_x) - x0),
        (-dy, y0),
        (dy, f64::from(max_y) - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        let x = (x0 + t * dx).round().clamp(0.0, f64::from(max_x)) as i32;
        let y = (y0 + t * dy).round().clamp(0.0, f64::from(max_y)) as i32;
        Point::new(x, y)
    };
    Some((at(t0), at(t1)))
}

pub fn rect(fb: &mut FrameBuffer, r: Rect, brush: Brush) {
    if r.is_empty() {
        return;
    }
    let cell = brush.cell();
    let (x1, y1) = (r.right() - 1, r.bottom() - 1);
    for x in r.x..=x1 {
        fb.plot(x, r.y, cell);
        fb.plot(x, y1, cell);
    }
    for y in r.y..=y1 {
        fb.plot(r.x, y, cell);
        fb.plot(x1, y, cell);
    }
}

pub fn fill_rect(fb: &mut FrameBuffer, r: Rect, brush: Brush) {
    let bounds = Rect::new(0, 0, fb.width(), fb.height());
    let Some(clip) = r.intersect(&bounds) else {
        return;
    };
    let cell = brush.cell();
    for y in clip.y..clip.bottom() {
        for x in clip.x..clip.right() {
            fb.plot(x, y, cell);
        }
    }
}

pub fn frame(fb: &mut FrameBuffer, r: Rect, style: BorderStyle, brush: Brush) {
    if r.width < 2 || r.height < 2 {
        return;
    }
    let [tl, tr, bl, br, h, v] = style.glyphs();
    let (x1, y1) = (r.right() - 1, r.bottom() - 1);

    for x in r.x + 1..x1 {
        fb.plot(x, r.y, brush.with_char(h));
        fb.plot(x, y1, brush.with_char(h));
    }
    for y in r.y + 1..y1 {
        fb.plot(r.x, y, brush.with_char(v));
        fb.plot(x1, y, brush.with_char(v));
    }
    fb.plot(r.x, r.y, brush.with_char(tl));
    fb.plot(x1, r.y, brush.with_char(tr));
    fb.plot(r.x, y1, brush.with_char(bl));
    fb.plot(x1, y1, brush.with_char(br));
}

/// Midpoint circle outline. A zero radius plots the center only.
pub fn circle(fb: &mut FrameBuffer, center: Point, radius: i32, brush: Brush) {
    if radius < 0 {
        return;
    }
    let cell = brush.cell();
    let (cx, cy) = (center.x, center.y);
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            fb.plot(cx + px, cy + py, cell);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

pub fn fill_circle(fb: &mut FrameBuffer, center: Point, radius: i32, brush: Brush) {
    if radius < 0 {
        return;
    }
    let cell = brush.cell();
    let (cx, cy) = (center.x, center.y);
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        span(fb, cx - x, cx + x, cy + y, cell);
        span(fb, cx - x, cx + x, cy - y, cell);
        span(fb, cx - y, cx + y, cy + x, cell);
        span(fb, cx - y, cx + y, cy - x, cell);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

pub fn triangle(fb: &mut FrameBuffer, a: Point, b: Point, c: Point, brush: Brush) {
    line(fb, a, b, brush);
    line(fb, b, c, brush);
    line(fb, c, a, brush);
}

/// Scanline fill. The outline is drawn as well so thin triangles never
/// leave gaps between rows.
pub fn fill_triangle(fb: &mut FrameBuffer, a: Point, b: Point, c: Point, brush: Brush) {
    let cell = brush.cell();
    let mut v = [a, b, c];
    v.sort_by_key(|p| p.y);
    let [v0, v1, v2] = v;

    let y_start = v0.y.max(0);
    let y_end = v2.y.min(fb.height() as i32 - 1);
    for y in y_start..=y_end {
        let long = edge_x(v0, v2, y);
        let short = if y < v1.y {
            edge_x(v0, v1, y)
        } else {
            edge_x(v1, v2, y)
        };
        span(fb, long.min(short), long.max(short), y, cell);
    }

    triangle(fb, a, b, c, brush);
}

/// X coordinate where edge `p`-`q` crosses row `y`, rounded to nearest.
fn edge_x(p: Point, q: Point, y: i32) -> i32 {
    if q.y == p.y {
        return p.x.min(q.x);
    }
    let t = (y - p.y) as f32 / (q.y - p.y) as f32;
    (p.x as f32 + t * (q.x - p.x) as f32).round() as i32
}

fn span(fb: &mut FrameBuffer, x0: i32, x1: i32, y: i32, cell: Cell) {
    if y < 0 || y >= fb.height() as i32 {
        return;
    }
    let from = x0.max(0);
    let to = x1.min(fb.width() as i32 - 1);
    for x in from..=to {
        fb.plot(x, y, cell);
    }
}
