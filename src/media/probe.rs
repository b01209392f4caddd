use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::{TalkheadError, TalkheadResult};

/// Basic metadata about a source video file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Native frame rate of the video stream.
    pub fps: Fps,
    /// Number of frames the clip is expected to hold.
    pub duration_frames: u64,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe source video metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> TalkheadResult<VideoSourceInfo> {
    if !source_path.is_file() {
        return Err(TalkheadError::asset_load(format!(
            "'{}' is not a readable file",
            source_path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| TalkheadError::asset_load(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(TalkheadError::asset_load(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source video metadata through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(_source_path: &Path) -> TalkheadResult<VideoSourceInfo> {
    Err(TalkheadError::asset_load(
        "video assets require the 'media-ffmpeg' feature",
    ))
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub(crate) fn parse_probe_json(source_path: &Path, json: &[u8]) -> TalkheadResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| TalkheadError::asset_load(format!("ffprobe json parse failed: {e}")))?;

    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            TalkheadError::asset_load(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| TalkheadError::asset_load("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| TalkheadError::asset_load("missing video height from ffprobe"))?;
    if width == 0 || height == 0 {
        return Err(TalkheadError::asset_load(format!(
            "video stream has invalid dimensions {width}x{height}"
        )));
    }

    // Prefer the nominal rate; some containers report 0/0 there but a usable average.
    let fps = [&video_stream.r_frame_rate, &video_stream.avg_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|rate| Fps::parse_ratio(rate).ok())
        .ok_or_else(|| TalkheadError::asset_load("video stream has no usable frame rate"))?;

    let duration_frames = match video_stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
    {
        Some(n) if n > 0 => n,
        _ => {
            let secs = video_stream
                .duration
                .as_deref()
                .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0);
            fps.secs_to_frames_floor(secs)
        }
    };
    if duration_frames == 0 {
        return Err(TalkheadError::asset_load(format!(
            "'{}' has zero duration",
            source_path.display()
        )));
    }

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        duration_frames,
        has_audio,
    })
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
