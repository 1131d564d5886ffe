//! FIGfont parsing and banner text rendering.
//!
//! Fonts use the `flf2a` format: a header line, comment lines, then one
//! glyph per character. Each glyph is `height` lines, each terminated by an
//! end-mark character (usually `@`, doubled on the glyph's last line).
//!
//! Only full-width layout is implemented: glyphs are placed side by side
//! without kerning or smushing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::fb::{Cell, FrameBuffer};
use crate::types::Color;

const BUILTIN_BLOCK: &str = include_str!("../fonts/block.flf");

/// German characters that follow the required ASCII range in every FIGfont.
const DEUTSCH: [char; 7] = ['Ä', 'Ö', 'Ü', 'ä', 'ö', 'ü', 'ß'];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Glyph {
    width: usize,
    rows: Vec<String>,
}

/// A parsed FIGfont.
#[derive(Debug, Clone)]
pub struct FigFont {
    height: usize,
    baseline: usize,
    glyphs: HashMap<char, Glyph>,
}

impl FigFont {
    /// The built-in 5-row block font.
    pub fn standard() -> Result<Self> {
        Self::parse(BUILTIN_BLOCK).context("built-in block font")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read font {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse font {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| anyhow!("empty font file"))?;
        let Some(rest) = header.strip_prefix("flf2a") else {
            bail!("missing flf2a signature");
        };
        let mut chars = rest.chars();
        let hardblank = chars
            .next()
            .ok_or_else(|| anyhow!("missing hardblank in header"))?;
        let params: Vec<&str> = chars.as_str().split_whitespace().collect();
        if params.len() < 5 {
            bail!("header needs at least 5 numeric fields, got {}", params.len());
        }
        let height = parse_field(params[0], "height")?;
        let baseline = parse_field(params[1], "baseline")?;
        let _max_length = parse_field(params[2], "max length")?;
        let _old_layout: i32 = params[3]
            .parse()
            .map_err(|_| anyhow!("invalid old layout {:?}", params[3]))?;
        let comment_lines = parse_field(params[4], "comment lines")?;

        if height == 0 {
            bail!("font height must be at least 1");
        }
        if baseline == 0 || baseline > height {
            bail!("baseline {baseline} outside 1..={height}");
        }

        for i in 0..comment_lines {
            lines
                .next()
                .ok_or_else(|| anyhow!("truncated comments: expected {comment_lines}, got {i}"))?;
        }

        let mut glyphs = HashMap::new();
        for code in 32u8..=126 {
            let ch = code as char;
            let glyph = read_glyph(&mut lines, height, hardblank)
                .with_context(|| format!("glyph {ch:?}"))?
                .ok_or_else(|| anyhow!("truncated font: glyph {ch:?} missing"))?;
            glyphs.insert(ch, glyph);
        }

        // Optional sections: German characters, then code-tagged glyphs.
        for ch in DEUTSCH {
            match read_glyph(&mut lines, height, hardblank)? {
                Some(glyph) => {
                    glyphs.insert(ch, glyph);
                }
                None => return Ok(Self { height, baseline, glyphs }),
            }
        }
        while let Some(tag) = lines.next() {
            let Some(code) = parse_code_tag(tag) else {
                break;
            };
            let glyph = read_glyph(&mut lines, height, hardblank)
                .with_context(|| format!("code-tagged glyph {tag:?}"))?
                .ok_or_else(|| anyhow!("truncated code-tagged glyph {tag:?}"))?;
            // Negative codes have no character; their rows are skipped.
            if let CodeTag::Char(ch) = code {
                glyphs.insert(ch, glyph);
            }
        }

        Ok(Self {
            height,
            baseline,
            glyphs,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn baseline(&self) -> usize {
        self.baseline
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Render `text` into banner rows. Each `\n` starts a new banner below.
    pub fn render(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for line in text.split('\n') {
            let mut rows = vec![String::new(); self.height];
            for ch in line.chars() {
                let Some(glyph) = self.glyph(ch) else {
                    continue;
                };
                for (row, src) in rows.iter_mut().zip(&glyph.rows) {
                    row.push_str(src);
                    let pad = glyph.width - src.chars().count();
                    row.extend(std::iter::repeat(' ').take(pad));
                }
            }
            out.extend(rows);
        }
        out
    }

    /// Width and height of the rendered banner in cells.
    pub fn measure(&self, text: &str) -> (usize, usize) {
        let rows = self.render(text);
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        (width, rows.len())
    }

    /// Draw the banner with its top-left corner at (`x`, `y`).
    ///
    /// Only non-space glyph cells are written, so the banner overlays
    /// whatever is already in the framebuffer.
    pub fn draw(&self, fb: &mut FrameBuffer, x: i32, y: i32, text: &str, fg: Color, bg: Color) {
        for (dy, row) in self.render(text).iter().enumerate() {
            for (dx, ch) in row.chars().enumerate() {
                if ch != ' ' {
                    fb.plot(x + dx as i32, y + dy as i32, Cell::new(ch, fg, bg));
                }
            }
        }
    }
}

fn parse_field(s: &str, name: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| anyhow!("invalid {name} {s:?} in header"))
}

/// Read one glyph. Returns `Ok(None)` at end of input before the first row.
fn read_glyph<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    height: usize,
    hardblank: char,
) -> Result<Option<Glyph>> {
    let mut rows = Vec::with_capacity(height);
    for i in 0..height {
        let Some(raw) = lines.next() else {
            if i == 0 {
                return Ok(None);
            }
            bail!("expected {height} rows, got {i}");
        };
        rows.push(strip_endmarks(raw).replace(hardblank, " "));
    }
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    Ok(Some(Glyph { width, rows }))
}

fn strip_endmarks(raw: &str) -> &str {
    let raw = raw.trim_end_matches(['\r', '\n']);
    match raw.chars().last() {
        Some(mark) => raw.trim_end_matches(mark),
        None => raw,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeTag {
    Char(char),
    /// A valid tag that maps to no character: negative or not a Unicode scalar.
    Unmapped,
}

/// Parse the leading code of a code-tagged glyph line (`196`, `0x00C4`, `0304`,
/// `-2`). `None` when the line is not a code tag.
fn parse_code_tag(line: &str) -> Option<CodeTag> {
    let token = line.split_whitespace().next()?;
    let (negative, token) = match token.strip_prefix('-') {
        Some(t) => (true, t),
        None => (false, token),
    };
    let code = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else if token.len() > 1 && token.starts_with('0') {
        u32::from_str_radix(&token[1..], 8).ok()?
    } else {
        token.parse().ok()?
    };
    if negative {
        return Some(CodeTag::Unmapped);
    }
    Some(char::from_u32(code).map_or(CodeTag::Unmapped, CodeTag::Char))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "flf2a$ 2 2 4 0 1\n\
        a comment\n\
        $@\n$@@\n";

    fn tiny_font() -> String {
        // 95 required glyphs, 2 rows each; 'A' gets a visible shape.
        let mut s = String::from("flf2a$ 2 2 4 0 1\ntiny test font\n");
        for code in 32u8..=126 {
            if code == b'A' {
                s.push_str("/\\@\n/\\@@\n");
            } else if code == b'?' {
                s.push_str("?@\n.@@\n");
            } else {
                s.push_str("$@\n$@@\n");
            }
        }
        s
    }

    #[test]
    fn rejects_missing_signature() {
        assert!(FigFont::parse("flf3a$ 1 1 1 0 0\n").is_err());
    }

    #[test]
    fn rejects_truncated_glyphs() {
        let err = FigFont::parse(TINY).unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
    }

    #[test]
    fn strips_endmarks_and_hardblanks() {
        let font = FigFont::parse(&tiny_font()).unwrap();
        assert_eq!(font.height(), 2);
        assert_eq!(font.render("A"), vec!["/\\", "/\\"]);
        assert_eq!(font.render(" "), vec![" ", " "]);
    }

    #[test]
    fn unknown_chars_use_question_mark_glyph() {
        let font = FigFont::parse(&tiny_font()).unwrap();
        assert_eq!(font.render("\u{263A}"), vec!["?", "."]);
    }

    #[test]
    fn code_tagged_glyphs_are_loaded() {
        let mut s = tiny_font();
        for _ in DEUTSCH {
            s.push_str("D@\nD@@\n");
        }
        s.push_str("0x263A  SMILE\n:)@\n:)@@\n");
        let font = FigFont::parse(&s).unwrap();
        assert!(font.has_glyph('ß'));
        assert_eq!(font.render("\u{263A}"), vec![":)", ":)"]);
    }

    #[test]
    fn negative_code_tag_is_skipped_and_later_glyphs_load() {
        let mut s = tiny_font();
        for _ in DEUTSCH {
            s.push_str("D@\nD@@\n");
        }
        s.push_str("-2  UNMAPPED\nxx@\nxx@@\n");
        s.push_str("0x263A  SMILE\n:)@\n:)@@\n");
        let font = FigFont::parse(&s).unwrap();
        assert!(font.has_glyph('\u{263A}'));
        assert_eq!(font.render("\u{263A}"), vec![":)", ":)"]);
    }

    #[test]
    fn code_tag_radixes() {
        assert_eq!(parse_code_tag("196 A-umlaut"), Some(CodeTag::Char('Ä')));
        assert_eq!(parse_code_tag("0xC4"), Some(CodeTag::Char('Ä')));
        assert_eq!(parse_code_tag("0304"), Some(CodeTag::Char('Ä')));
        assert_eq!(parse_code_tag("-2 negative"), Some(CodeTag::Unmapped));
        assert_eq!(parse_code_tag("0xD800"), Some(CodeTag::Unmapped));
        assert_eq!(parse_code_tag("not a tag"), None);
    }

    #[test]
    fn builtin_font_parses() {
        let font = FigFont::standard().unwrap();
        assert_eq!(font.height(), 5);
        for code in 32u8..=126 {
            assert!(font.has_glyph(code as char));
        }
    }
}
