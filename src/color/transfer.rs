//! Statistical color transfer (mean/std alignment in L*a*b*).
//!
//! The grader is pure: the output depends only on the reference statistics and the input frame,
//! so a sequence can be graded in any order (or in parallel) with identical results.

use crate::color::lab::{Lab, lab_to_rgb8, rgb8_to_lab};
use crate::foundation::core::Frame;
use crate::foundation::error::{TalkheadError, TalkheadResult};

/// Standard deviations below this are treated as a flat channel.
const MIN_STD: f64 = 1e-6;

const L_RANGE: (f64, f64) = (0.0, 100.0);
const AB_RANGE: (f64, f64) = (-128.0, 127.0);

/// Per-channel L*a*b* statistics of an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabStats {
    /// Channel means `[L, a, b]`.
    pub mean: [f64; 3],
    /// Channel population standard deviations `[L, a, b]`.
    pub std: [f64; 3],
}

impl LabStats {
    /// Measure the statistics of `frame`.
    ///
    /// Fails with [`TalkheadError::Pipeline`] on an empty or malformed frame.
    pub fn measure(frame: &Frame) -> TalkheadResult<Self> {
        let lab = frame_to_lab(frame)?;
        Ok(Self::from_lab(&lab))
    }

    fn from_lab(pixels: &[Lab]) -> Self {
        let n = pixels.len() as f64;
        let mut mean = [0.0f64; 3];
        for px in pixels {
            for c in 0..3 {
                mean[c] += px[c];
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = [0.0f64; 3];
        for px in pixels {
            for c in 0..3 {
                let d = px[c] - mean[c];
                var[c] += d * d;
            }
        }

        Self {
            mean,
            std: var.map(|v| (v / n).sqrt()),
        }
    }

    /// Scale factor mapping `source` channel spread onto `self`.
    ///
    /// Degenerate (flat or non-finite) channels on either side map with a factor of 1.0.
    fn scale_from(&self, source: &LabStats, channel: usize) -> f64 {
        let target = self.std[channel];
        let src = source.std[channel];
        if !target.is_finite() || !src.is_finite() || target < MIN_STD || src < MIN_STD {
            return 1.0;
        }
        target / src
    }
}

/// Re-grade `frame` so its L*a*b* mean and spread match `reference`.
///
/// `reference` and `frame` may have different dimensions; the output always has `frame`'s
/// dimensions and alpha channel.
pub fn correct(reference: &Frame, frame: &Frame) -> TalkheadResult<Frame> {
    let stats = LabStats::measure(reference)?;
    correct_with_stats(&stats, frame)
}

/// Same as [`correct`], with the reference statistics measured up front.
pub fn correct_with_stats(reference: &LabStats, frame: &Frame) -> TalkheadResult<Frame> {
    let lab = frame_to_lab(frame)?;
    let source = LabStats::from_lab(&lab);
    let scale = [
        reference.scale_from(&source, 0),
        reference.scale_from(&source, 1),
        reference.scale_from(&source, 2),
    ];

    let mut out = Vec::with_capacity(frame.data.len());
    for (px, src) in lab.iter().zip(frame.data.chunks_exact(4)) {
        let mut graded = [0.0f64; 3];
        for c in 0..3 {
            graded[c] = (px[c] - source.mean[c]) * scale[c] + reference.mean[c];
        }
        graded[0] = graded[0].clamp(L_RANGE.0, L_RANGE.1);
        graded[1] = graded[1].clamp(AB_RANGE.0, AB_RANGE.1);
        graded[2] = graded[2].clamp(AB_RANGE.0, AB_RANGE.1);

        let rgb = lab_to_rgb8(graded);
        out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], src[3]]);
    }

    Frame::new(frame.width, frame.height, out)
        .map_err(|e| TalkheadError::pipeline(format!("graded frame is malformed: {e}")))
}

fn frame_to_lab(frame: &Frame) -> TalkheadResult<Vec<Lab>> {
    if frame.is_empty() {
        return Err(TalkheadError::pipeline(format!(
            "cannot grade an empty {}x{} frame",
            frame.width, frame.height
        )));
    }
    if frame.data.len() != frame.pixel_count() * 4 {
        return Err(TalkheadError::pipeline(format!(
            "frame buffer has {} bytes, expected {} for {}x{} rgba8",
            frame.data.len(),
            frame.pixel_count() * 4,
            frame.width,
            frame.height
        )));
    }

    Ok(frame
        .data
        .chunks_exact(4)
        .map(|px| rgb8_to_lab(px[0], px[1], px[2]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/color/transfer.rs"]
mod tests;
