//! Snake in the terminal (default binary).
//!
//! Keyboard: arrows / WASD / HJKL steer, P pauses, R restarts, Esc quits.
//! Gamepad: d-pad or left stick steer, Start pauses, A restarts, Back quits.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use clap::Parser;

use tui_engine::app::SnakeApp;
use tui_engine::audio::Audio;
use tui_engine::engine::{init_file_logger, Engine, EngineConfig, TerminalBackend};
use tui_engine::input::{GamepadSource, NullGamepad};

#[derive(Parser, Debug)]
#[command(name = "snake")]
#[command(about = "Snake on the tui-engine frame loop")]
struct Cli {
    /// JSON engine config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Fixed screen width (implies a fixed size).
    #[arg(long)]
    width: Option<u16>,

    /// Fixed screen height (implies a fixed size).
    #[arg(long)]
    height: Option<u16>,

    /// Seed for food placement (default: time based).
    #[arg(long)]
    seed: Option<u32>,

    /// Append log records to this file.
    #[arg(long)]
    log: Option<PathBuf>,

    /// No sound.
    #[arg(long, default_value_t = false)]
    mute: bool,

    /// Emit RGB colors from the palette instead of named colors.
    #[arg(long, default_value_t = false)]
    true_color: bool,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig {
                title: "Snake".to_string(),
                ..EngineConfig::default()
            },
        };
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(width) = self.width {
            config.width = width;
            config.fixed_size = true;
        }
        if let Some(height) = self.height {
            config.height = height;
            config.fixed_size = true;
        }
        config.true_color |= self.true_color;
        config.validate()?;
        Ok(config)
    }

    fn seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

#[cfg(feature = "gilrs")]
fn gamepad_source() -> Box<dyn GamepadSource> {
    match tui_engine::input::GilrsGamepad::new() {
        Ok(pad) => Box::new(pad),
        Err(err) => {
            log::warn!("gamepad support disabled: {err:#}");
            Box::new(NullGamepad)
        }
    }
}

#[cfg(not(feature = "gilrs"))]
fn gamepad_source() -> Box<dyn GamepadSource> {
    Box::new(NullGamepad)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        init_file_logger(path)?;
    }
    let config = cli.engine_config()?;
    let seed = cli.seed();
    log::info!("seed {seed}");

    let audio = if cli.mute {
        Audio::silent()
    } else {
        Audio::open_or_silent()
    };
    let mut app = SnakeApp::new(seed, audio)?;

    let backend = TerminalBackend::new(config.color_mode()?);
    let mut engine = Engine::new(backend, config).with_gamepad_source(gamepad_source());
    let stats = engine.run(&mut app)?;

    println!(
        "score {}  length {}  ({} frames)",
        app.game().score(),
        app.game().length(),
        stats.frames
    );
    Ok(())
}
