//! Audio output seam
//!
//! The engine never touches an audio API directly; the host hands it an
//! [`AudioSink`] and the engine drives it from transport transitions.
//! [`NullSink`] backs headless use and tests.

use crate::error::Result;
use url::Url;

/// Platform audio output
pub trait AudioSink: Send {
    /// Load a playable URL, replacing any current source
    fn load(&mut self, url: &Url) -> Result<()>;

    /// Start or resume playback of the loaded source
    fn play(&mut self) -> Result<()>;

    /// Pause, keeping the position
    fn pause(&mut self);

    /// Stop and discard the loaded source
    fn stop(&mut self);

    /// Seek to a position in seconds
    fn seek(&mut self, position_seconds: f64);

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f32);
}

/// Sink that accepts everything and plays nothing
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn load(&mut self, _url: &Url) -> Result<()> {
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn stop(&mut self) {}

    fn seek(&mut self, _position_seconds: f64) {}

    fn set_volume(&mut self, _volume: f32) {}
}
