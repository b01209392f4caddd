use std::time::Duration;

use crate::foundation::error::TalkheadResult;
use crate::media::source::AudioTrack;

/// Plays an [`AudioTrack`] to completion on the calling thread.
pub trait AudioOutput: Send + Sync {
    /// Block until the whole track has played.
    fn play_blocking(&self, track: &AudioTrack) -> TalkheadResult<()>;
}

/// Audio output without a device: waits out the track's duration in real time.
///
/// `speed` scales the wait (`2.0` finishes twice as fast); tests use a large factor.
#[derive(Clone, Copy, Debug)]
pub struct ClockAudio {
    speed: f64,
}

impl ClockAudio {
    /// Real-time clock.
    pub fn new() -> Self {
        Self { speed: 1.0 }
    }

    /// Clock running `speed` times faster than real time.
    pub fn with_speed(speed: f64) -> Self {
        Self {
            speed: if speed.is_finite() && speed > 0.0 {
                speed
            } else {
                1.0
            },
        }
    }
}

impl Default for ClockAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for ClockAudio {
    fn play_blocking(&self, track: &AudioTrack) -> TalkheadResult<()> {
        let wait = Duration::from_secs_f64(track.duration().as_secs_f64() / self.speed);
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        Ok(())
    }
}

/// Plays through the default output device with `rodio`.
#[cfg(feature = "audio-rodio")]
#[derive(Clone, Copy, Debug, Default)]
pub struct RodioAudio;

#[cfg(feature = "audio-rodio")]
impl AudioOutput for RodioAudio {
    fn play_blocking(&self, track: &AudioTrack) -> TalkheadResult<()> {
        use anyhow::Context as _;
        use rodio::{OutputStream, Sink, buffer::SamplesBuffer};

        if track.is_empty() {
            return Ok(());
        }

        // The stream must stay alive (and on this thread) until playback ends.
        let (_stream, stream_handle) =
            OutputStream::try_default().context("open default audio output")?;
        let sink = Sink::try_new(&stream_handle).context("create audio sink")?;
        sink.append(SamplesBuffer::new(
            track.channels,
            track.sample_rate,
            track.interleaved_f32.clone(),
        ));
        sink.sleep_until_end();
        Ok(())
    }
}
