use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::{Fps, Frame, FrameIndex};
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::media::decode::{
    PLAYBACK_SAMPLE_RATE, decode_audio_f32_stereo, decode_video_frames_rgba8,
};
use crate::media::probe::probe_video;

/// Decoded interleaved floating-point PCM, independent of the container it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioTrack {
    /// An empty track.
    pub fn silent(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: Vec::new(),
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        (self.interleaved_f32.len() / self.channels as usize) as u64
    }

    /// Return `true` when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Wall-clock length of the track.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Ordered decoded frames plus their native rate. Immutable once built.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Arc<Frame>>,
    fps: Fps,
}

impl FrameSequence {
    /// Build a sequence; fails with [`TalkheadError::AssetLoad`] when `frames` is empty.
    pub fn new(frames: Vec<Frame>, fps: Fps) -> TalkheadResult<Self> {
        if frames.is_empty() {
            return Err(TalkheadError::asset_load("frame sequence has zero duration"));
        }
        Ok(Self {
            frames: frames.into_iter().map(Arc::new).collect(),
            fps,
        })
    }

    /// Native frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Number of frames in the sequence.
    pub fn duration_frames(&self) -> u64 {
        self.frames.len() as u64
    }

    /// Borrow a frame by index.
    pub fn get(&self, idx: FrameIndex) -> Option<&Arc<Frame>> {
        self.frames.get(usize::try_from(idx.0).ok()?)
    }

    /// Borrow all frames in order.
    pub fn frames(&self) -> &[Arc<Frame>] {
        &self.frames
    }
}

/// A video asset split into its independent video and audio artifacts.
#[derive(Clone, Debug)]
pub struct LoadedClip {
    /// Decoded video frames.
    pub frames: FrameSequence,
    /// Extracted audio track (possibly empty).
    pub audio: AudioTrack,
}

impl LoadedClip {
    /// Native frame rate of the video.
    pub fn fps(&self) -> Fps {
        self.frames.fps()
    }
}

/// Loads a video file into frames and audio.
pub trait FrameSource: Send + Sync {
    /// Decode `path`; fails with [`TalkheadError::AssetLoad`] if the file is unreadable,
    /// unsupported, or has zero duration.
    fn load(&self, path: &Path) -> TalkheadResult<LoadedClip>;
}

/// [`FrameSource`] backed by the system `ffprobe`/`ffmpeg` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegSource {
    sample_rate: u32,
}

impl FfmpegSource {
    /// Create a source that resamples audio to [`PLAYBACK_SAMPLE_RATE`].
    pub fn new() -> Self {
        Self {
            sample_rate: PLAYBACK_SAMPLE_RATE,
        }
    }
}

impl Default for FfmpegSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegSource {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    fn load(&self, path: &Path) -> TalkheadResult<LoadedClip> {
        let info = probe_video(path)?;

        // Audio is extracted first so it exists as its own artifact before frame access.
        let audio = if info.has_audio {
            decode_audio_f32_stereo(path, self.sample_rate)?
        } else {
            AudioTrack::silent(self.sample_rate, 2)
        };

        let frames = decode_video_frames_rgba8(&info, info.duration_frames)?;
        if (frames.len() as u64) < info.duration_frames {
            tracing::debug!(
                expected = info.duration_frames,
                decoded = frames.len(),
                "container reported more frames than it decoded"
            );
        }
        let frames = FrameSequence::new(frames, info.fps)?;

        tracing::debug!(
            frames = frames.duration_frames(),
            fps = info.fps.as_f64(),
            audio_secs = audio.duration().as_secs_f64(),
            "loaded clip"
        );
        Ok(LoadedClip { frames, audio })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
