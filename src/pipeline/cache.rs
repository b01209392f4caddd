use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::color::transfer::{LabStats, correct_with_stats};
use crate::foundation::core::{Fps, Frame, FrameIndex};
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::media::source::FrameSequence;

/// The idle-scene face every generated frame is graded against.
///
/// Read-only and shared across jobs; its statistics are measured once.
#[derive(Clone, Debug)]
pub struct ReferenceImage {
    stats: LabStats,
}

impl ReferenceImage {
    /// Wrap a decoded reference frame.
    pub fn new(frame: Frame) -> TalkheadResult<Self> {
        Ok(Self {
            stats: LabStats::measure(&frame)?,
        })
    }

    /// Pre-measured L*a*b* statistics.
    pub fn stats(&self) -> &LabStats {
        &self.stats
    }
}

/// Color-corrected frames, index-aligned with the [`FrameSequence`] they were built from.
#[derive(Clone, Debug)]
pub struct CorrectedFrameSequence {
    frames: Vec<Arc<Frame>>,
    fps: Fps,
}

impl CorrectedFrameSequence {
    /// Native frame rate of the source sequence.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Number of frames, always equal to the source sequence length.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Borrow a corrected frame by index.
    pub fn get(&self, idx: FrameIndex) -> Option<&Arc<Frame>> {
        self.frames.get(usize::try_from(idx.0).ok()?)
    }

    /// Borrow all corrected frames in order.
    pub fn frames(&self) -> &[Arc<Frame>] {
        &self.frames
    }
}

/// Threading controls for the correction pre-pass.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CorrectionThreading {
    /// Grade frames on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for CorrectionThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

/// Batch pre-pass that grades every frame of a job before playback starts.
///
/// Playback never sees a partially corrected sequence: [`CorrectionCache::build_all`] either
/// returns every frame or fails the whole job.
pub struct CorrectionCache {
    pool: Option<rayon::ThreadPool>,
}

impl CorrectionCache {
    /// Create a cache, building the worker pool up front when parallel grading is enabled.
    pub fn new(threading: &CorrectionThreading) -> TalkheadResult<Self> {
        let pool = if threading.parallel {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };
        Ok(Self { pool })
    }

    /// Grade every frame of `sequence` against `reference`, in index order.
    #[tracing::instrument(skip_all, fields(frames = sequence.duration_frames()))]
    pub fn build_all(
        &self,
        sequence: &FrameSequence,
        reference: &ReferenceImage,
    ) -> TalkheadResult<CorrectedFrameSequence> {
        let started = Instant::now();
        let stats = reference.stats();
        let grade = |(idx, frame): (usize, &Arc<Frame>)| -> TalkheadResult<Arc<Frame>> {
            correct_with_stats(stats, frame)
                .map(Arc::new)
                .map_err(|e| TalkheadError::pipeline(format!("frame {idx}: {e}")))
        };

        let frames = match &self.pool {
            Some(pool) => pool.install(|| {
                sequence
                    .frames()
                    .par_iter()
                    .enumerate()
                    .map(grade)
                    .collect::<TalkheadResult<Vec<_>>>()
            })?,
            None => sequence
                .frames()
                .iter()
                .enumerate()
                .map(grade)
                .collect::<TalkheadResult<Vec<_>>>()?,
        };

        debug_assert_eq!(frames.len() as u64, sequence.duration_frames());
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corrected frame sequence"
        );
        Ok(CorrectedFrameSequence {
            frames,
            fps: sequence.fps(),
        })
    }
}

fn build_thread_pool(threads: Option<usize>) -> TalkheadResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TalkheadError::validation(
            "correction threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("grade-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TalkheadError::pipeline(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/cache.rs"]
mod tests;
