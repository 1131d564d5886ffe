//! Sound playback for console games.
//!
//! Sounds are fire-and-forget: [`Audio::play`] queues a decoded file on its
//! own sink and returns immediately. [`Tone`] synthesizes short beeps without
//! any sound file.
//!
//! Real output needs the `audio` feature (rodio). Without it, or when no
//! output device is available and [`Audio::open_or_silent`] is used, every
//! call succeeds and nothing is heard.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

/// Sample rate used for synthesized tones.
pub const TONE_SAMPLE_RATE: u32 = 44_100;

/// A short sine beep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    /// 0.0..=1.0
    pub volume: f32,
}

impl Tone {
    pub const fn new(frequency_hz: f32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            volume: 0.2,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Mono samples with a linear fade-out, so the beep ends without a click.
    pub fn samples(&self, sample_rate: u32) -> Vec<f32> {
        let count = (sample_rate as u64 * self.duration_ms as u64 / 1000) as usize;
        let volume = self.volume.clamp(0.0, 1.0);
        let step = std::f32::consts::TAU * self.frequency_hz / sample_rate as f32;
        (0..count)
            .map(|i| {
                let fade = 1.0 - i as f32 / count as f32;
                (step * i as f32).sin() * volume * fade
            })
            .collect()
    }
}

/// An encoded sound file (wav/ogg) held in memory.
#[derive(Debug, Clone)]
pub struct Sound {
    bytes: Arc<[u8]>,
    volume: f32,
}

impl Sound {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("read sound {}", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            volume: 1.0,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

enum Output {
    Silent,
    #[cfg(feature = "audio")]
    Device(device::Device),
}

/// Audio output device.
pub struct Audio {
    output: Output,
    master_volume: f32,
}

impl Audio {
    /// Open the default output device.
    #[cfg(feature = "audio")]
    pub fn open() -> Result<Self> {
        Ok(Self {
            output: Output::Device(device::Device::open()?),
            master_volume: 1.0,
        })
    }

    /// Open the default output device.
    #[cfg(not(feature = "audio"))]
    pub fn open() -> Result<Self> {
        anyhow::bail!("built without the `audio` feature")
    }

    /// Open the default device, falling back to a silent one.
    pub fn open_or_silent() -> Self {
        match Self::open() {
            Ok(audio) => audio,
            Err(err) => {
                log::warn!("audio disabled: {err:#}");
                Self::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Self {
            output: Output::Silent,
            master_volume: 1.0,
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self.output, Output::Silent)
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Applies to sounds started afterwards.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    #[cfg_attr(not(feature = "audio"), allow(unused_variables))]
    pub fn play(&mut self, sound: &Sound) -> Result<()> {
        match &mut self.output {
            Output::Silent => Ok(()),
            #[cfg(feature = "audio")]
            Output::Device(dev) => {
                dev.play_bytes(sound.bytes.clone(), self.master_volume * sound.volume)
            }
        }
    }

    #[cfg_attr(not(feature = "audio"), allow(unused_variables))]
    pub fn beep(&mut self, tone: Tone) -> Result<()> {
        match &mut self.output {
            Output::Silent => Ok(()),
            #[cfg(feature = "audio")]
            Output::Device(dev) => dev.play_samples(tone.samples(TONE_SAMPLE_RATE), self.master_volume),
        }
    }

    /// Stop everything that is currently playing.
    pub fn stop_all(&mut self) {
        match &mut self.output {
            Output::Silent => {}
            #[cfg(feature = "audio")]
            Output::Device(dev) => dev.stop_all(),
        }
    }
}

#[cfg(feature = "audio")]
mod device {
    use std::io::Cursor;
    use std::sync::Arc;

    use anyhow::Result;
    use rodio::{buffer::SamplesBuffer, Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::TONE_SAMPLE_RATE;

    pub(crate) struct Device {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sinks: Vec<Sink>,
    }

    impl Device {
        pub(crate) fn open() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
                sinks: Vec::new(),
            })
        }

        fn sink(&mut self, volume: f32) -> Result<&Sink> {
            self.sinks.retain(|s| !s.empty());
            let sink = Sink::try_new(&self.handle)?;
            sink.set_volume(volume);
            self.sinks.push(sink);
            Ok(&self.sinks[self.sinks.len() - 1])
        }

        pub(crate) fn play_bytes(&mut self, bytes: Arc<[u8]>, volume: f32) -> Result<()> {
            let source = Decoder::new(Cursor::new(bytes))?;
            self.sink(volume)?.append(source);
            Ok(())
        }

        pub(crate) fn play_samples(&mut self, samples: Vec<f32>, volume: f32) -> Result<()> {
            let source = SamplesBuffer::new(1, TONE_SAMPLE_RATE, samples);
            self.sink(volume)?.append(source);
            Ok(())
        }

        pub(crate) fn stop_all(&mut self) {
            for sink in self.sinks.drain(..) {
                sink.stop();
            }
        }
    }
}
