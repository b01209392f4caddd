use std::time::Duration;

use crate::foundation::error::{TalkheadError, TalkheadResult};

/// 0-based frame index within a single clip.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TalkheadResult<Self> {
        if den == 0 {
            return Err(TalkheadError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TalkheadError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffprobe-style rate such as `24/1`, `30000/1001` or `25`.
    pub fn parse_ratio(s: &str) -> TalkheadResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|e| TalkheadError::validation(format!("invalid fps numerator '{num}': {e}")))?;
        let den = den.parse::<u32>().map_err(|e| {
            TalkheadError::validation(format!("invalid fps denominator '{den}': {e}"))
        })?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Duration of one frame as a timer period.
    pub fn frame_period(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Create a validated, non-empty canvas size.
    pub fn new(width: u32, height: u32) -> TalkheadResult<Self> {
        if width == 0 || height == 0 {
            return Err(TalkheadError::validation(format!(
                "canvas size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

/// A decoded image as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap an RGBA8 buffer, checking that it matches `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> TalkheadResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TalkheadError::validation(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} rgba8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with a single straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Return `true` when the frame holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Convert into an [`image::RgbaImage`].
    pub fn into_rgba_image(self) -> TalkheadResult<image::RgbaImage> {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.data).ok_or_else(|| {
            TalkheadError::validation(format!("frame buffer does not fit {w}x{h} rgba8"))
        })
    }
}

impl From<image::RgbaImage> for Frame {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// Top-left origin that centers a `width x height` image on `canvas`.
///
/// Uses floor division, so images larger than the canvas get a negative origin and are clipped
/// evenly on both sides.
pub fn centered_origin(canvas: CanvasSize, width: u32, height: u32) -> (i64, i64) {
    let x = (i64::from(canvas.width) - i64::from(width)).div_euclid(2);
    let y = (i64::from(canvas.height) - i64::from(height)).div_euclid(2);
    (x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
