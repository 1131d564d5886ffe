//! Engine settings, loadable from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::term::ColorMode;
use crate::types::{
    Color, Palette, Rgb, Size, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_KEY_RELEASE_TIMEOUT_MS,
    DEFAULT_WIDTH, MAX_FPS,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub title: String,
    /// Used when `fixed_size` is set or the terminal size is unknown.
    pub width: u16,
    pub height: u16,
    /// Ignore the terminal size and resize events.
    pub fixed_size: bool,
    pub fps: u32,
    pub true_color: bool,
    /// Sixteen `#rrggbb` entries in console color order.
    pub palette: Option<Vec<String>>,
    /// 0 disables auto-release.
    pub key_release_timeout_ms: u32,
    pub gamepad_slot: u8,
    /// Esc / Ctrl+C stop the loop.
    pub exit_on_quit_key: bool,
    pub max_frames: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "tui-engine".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fixed_size: false,
            fps: DEFAULT_FPS,
            true_color: false,
            palette: None,
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
            gamepad_slot: 0,
            exit_on_quit_key: true,
            max_frames: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            bail!("fps must be in 1..={MAX_FPS}, got {}", self.fps);
        }
        if self.max_frames == Some(0) {
            bail!("max_frames must be at least 1 when set");
        }
        if self.gamepad_slot >= 4 {
            bail!("gamepad_slot must be in 0..4, got {}", self.gamepad_slot);
        }
        self.palette()?;
        Ok(())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn palette(&self) -> Result<Palette> {
        let Some(entries) = &self.palette else {
            return Ok(Palette::default());
        };
        if entries.len() != 16 {
            bail!("palette needs 16 entries, got {}", entries.len());
        }
        let mut palette = Palette::default();
        for (color, hex) in Color::ALL.into_iter().zip(entries) {
            let rgb = Rgb::from_hex(hex)
                .with_context(|| format!("palette entry {} ({hex:?})", color.name()))?;
            palette.set(color, rgb);
        }
        Ok(palette)
    }

    pub fn color_mode(&self) -> Result<ColorMode> {
        if self.true_color {
            Ok(ColorMode::TrueColor(self.palette()?))
        } else {
            Ok(ColorMode::Named)
        }
    }

    pub fn key_release_timeout(&self) -> Option<u32> {
        (self.key_release_timeout_ms > 0).then_some(self.key_release_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = EngineConfig::default();
        c.validate().unwrap();
        assert_eq!(c.color_mode().unwrap(), ColorMode::Named);
        assert_eq!(c.key_release_timeout(), Some(DEFAULT_KEY_RELEASE_TIMEOUT_MS));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{ "fps": 60, "title": "x" }"#).unwrap();
        assert_eq!(c.fps, 60);
        assert_eq!(c.title, "x");
        assert_eq!(c.width, DEFAULT_WIDTH);
        assert!(c.exit_on_quit_key);
    }

    #[test]
    fn rejects_bad_fps_and_size() {
        let c = EngineConfig {
            fps: 0,
            ..EngineConfig::default()
        };
        assert!(c.validate().is_err());
        let c = EngineConfig {
            width: 0,
            ..EngineConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_zero_frame_limit() {
        let c = EngineConfig {
            max_frames: Some(0),
            ..EngineConfig::default()
        };
        let err = c.validate().unwrap_err();
        assert!(format!("{err:#}").contains("max_frames"));

        let c = EngineConfig {
            max_frames: Some(1),
            ..EngineConfig::default()
        };
        c.validate().unwrap();
    }

    #[test]
    fn palette_must_have_sixteen_valid_entries() {
        let mut c = EngineConfig {
            palette: Some(vec!["#000000".into(); 15]),
            ..EngineConfig::default()
        };
        assert!(c.validate().is_err());

        let mut entries = vec!["#000000".to_string(); 16];
        entries[12] = "#ff0000".into();
        c.palette = Some(entries.clone());
        c.true_color = true;
        let ColorMode::TrueColor(p) = c.color_mode().unwrap() else {
            panic!("expected true color");
        };
        assert_eq!(p.get(Color::Red), Rgb::new(255, 0, 0));

        entries[3] = "nope".into();
        c.palette = Some(entries);
        let err = c.validate().unwrap_err();
        assert!(format!("{err:#}").contains("darkcyan"));
    }

    #[test]
    fn zero_timeout_disables_auto_release() {
        let c = EngineConfig {
            key_release_timeout_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(c.key_release_timeout(), None);
    }

    #[test]
    fn load_reports_path_on_error() {
        let path = std::env::temp_dir().join("tui-engine-config-missing.json");
        let _ = std::fs::remove_file(&path);
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }

    #[test]
    fn load_round_trips_file() {
        let path = std::env::temp_dir().join(format!("tui-engine-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 40, "height": 20, "fixed_size": true }"#).unwrap();
        let c = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(c.size(), Size::new(40, 20));
        assert!(c.fixed_size);
    }
}
