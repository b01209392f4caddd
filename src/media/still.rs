use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Frame;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::media::decode::decode_video_frames_rgba8;
use crate::media::probe::probe_video;

/// Whether an asset is a single image or a video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A still image (png, jpg, ...).
    StillImage,
    /// A video that loops while shown.
    LoopingVideo,
}

impl AssetKind {
    const VIDEO_EXTENSIONS: [&'static str; 5] = ["mp4", "mov", "mkv", "webm", "avi"];

    /// Infer the kind from the file extension; unknown extensions are treated as images.
    pub fn infer(path: &Path) -> Self {
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                Self::VIDEO_EXTENSIONS
                    .iter()
                    .any(|v| e.eq_ignore_ascii_case(v))
            })
            .unwrap_or(false);
        if is_video {
            Self::LoopingVideo
        } else {
            Self::StillImage
        }
    }
}

/// Decode an image file into straight-alpha RGBA8.
pub fn load_still_image(path: &Path) -> TalkheadResult<Frame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))
        .map_err(|e| TalkheadError::asset_load(format!("{e:#}")))?;
    decode_image(&bytes)
        .map_err(|e| TalkheadError::asset_load(format!("'{}': {e}", path.display())))
}

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> TalkheadResult<Frame> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TalkheadError::asset_load(format!("decode image from memory: {e}")))?;
    let frame = Frame::from(dyn_img.to_rgba8());
    if frame.is_empty() {
        return Err(TalkheadError::asset_load("image has no pixels"));
    }
    Ok(frame)
}

/// Load the reference face: the image itself, or the first frame of a video.
pub fn load_reference(path: &Path, kind: AssetKind) -> TalkheadResult<Frame> {
    match kind {
        AssetKind::StillImage => load_still_image(path),
        AssetKind::LoopingVideo => {
            let info = probe_video(path)?;
            decode_video_frames_rgba8(&info, 1)?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    TalkheadError::asset_load(format!(
                        "ffmpeg returned no video frames for '{}'",
                        path.display()
                    ))
                })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/still.rs"]
mod tests;
