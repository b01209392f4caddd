use std::path::Path;

use crate::foundation::core::Frame;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::media::probe::VideoSourceInfo;
use crate::media::source::AudioTrack;

/// Sample rate audio tracks are resampled to when extracted from a container.
pub const PLAYBACK_SAMPLE_RATE: u32 = 48_000;

#[cfg(feature = "media-ffmpeg")]
/// Decode up to `frame_count` sequential RGBA frames from the start of the source video.
pub(crate) fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    frame_count: u64,
) -> TalkheadResult<Vec<Frame>> {
    if frame_count == 0 {
        return Ok(Vec::new());
    }

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args([
            "-an",
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            TalkheadError::asset_load(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(TalkheadError::asset_load(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    split_raw_frames(source.width, source.height, &out.stdout, frame_count)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode up to `frame_count` sequential RGBA frames from the start of the source video.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub(crate) fn decode_video_frames_rgba8(
    _source: &VideoSourceInfo,
    _frame_count: u64,
) -> TalkheadResult<Vec<Frame>> {
    Err(TalkheadError::asset_load(
        "video assets require the 'media-ffmpeg' feature",
    ))
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) fn split_raw_frames(
    width: u32,
    height: u32,
    bytes: &[u8],
    max_frames: u64,
) -> TalkheadResult<Vec<Frame>> {
    let expected_len = width as usize * height as usize * 4;
    if expected_len == 0 {
        return Err(TalkheadError::asset_load(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !bytes.len().is_multiple_of(expected_len) {
        return Err(TalkheadError::asset_load(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {expected_len}",
            bytes.len()
        )));
    }

    let available = (bytes.len() / expected_len).min(max_frames as usize);
    let mut frames = Vec::with_capacity(available);
    for chunk in bytes.chunks_exact(expected_len).take(available) {
        frames.push(Frame::new(width, height, chunk.to_vec())?);
    }
    Ok(frames)
}

#[cfg(feature = "media-ffmpeg")]
/// Decode audio from a media container to stereo interleaved `f32` PCM.
///
/// Containers without an audio stream yield an empty track.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> TalkheadResult<AudioTrack> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            TalkheadError::asset_load(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // ffmpeg reports a missing audio stream as an error.
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
            || msg.contains("does not contain any stream")
        {
            return Ok(AudioTrack::silent(sample_rate, 2));
        }
        return Err(TalkheadError::asset_load(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    pcm_from_f32le(&out.stdout, sample_rate, 2)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode audio from a media container to stereo interleaved `f32` PCM.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_audio_f32_stereo(_path: &Path, _sample_rate: u32) -> TalkheadResult<AudioTrack> {
    Err(TalkheadError::asset_load(
        "video assets require the 'media-ffmpeg' feature",
    ))
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) fn pcm_from_f32le(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> TalkheadResult<AudioTrack> {
    if !bytes.len().is_multiple_of(4) {
        return Err(TalkheadError::asset_load(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(AudioTrack {
        sample_rate,
        channels,
        interleaved_f32: pcm,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
