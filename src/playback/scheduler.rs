//! Per-job playback state machine: `Idle -> Loading -> Correcting -> Playing -> Idle`.
//!
//! While `Playing`, audio and video run on two threads released by a common start barrier and
//! never resynchronized afterwards; sync is best effort. There is no cancellation and no timeout:
//! a hung decode or audio device stalls the job (and the queue behind it) indefinitely.

use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::idle::IdleRenderer;
use crate::media::source::{AudioTrack, FrameSource};
use crate::pipeline::cache::{CorrectedFrameSequence, CorrectionCache, ReferenceImage};
use crate::playback::audio::AudioOutput;
use crate::playback::cursor::PlaybackCursor;
use crate::queue::Job;
use crate::render::thread::{Owner, RenderHandle};

/// Where the scheduler is in the lifecycle of the current job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No job; the idle scene owns the canvas.
    Idle,
    /// Decoding the generated video.
    Loading,
    /// Color-correcting every frame.
    Correcting,
    /// Frames and audio are playing.
    Playing,
}

/// Outcome of one successfully played job.
#[derive(Clone, Debug)]
pub struct PlaybackReport {
    /// The job that played.
    pub job_id: u64,
    /// Frames handed to the render thread, in index order.
    pub frames_rendered: u64,
    /// Length of the audio track.
    pub audio_duration: Duration,
    /// Audio failure after playback started, if any. Video still plays to the end.
    pub audio_error: Option<String>,
    /// Wall-clock time spent in `Playing`.
    pub playing_time: Duration,
}

/// Drives one job at a time from file path to finished playback.
pub struct PlaybackScheduler {
    source: Arc<dyn FrameSource>,
    cache: CorrectionCache,
    reference: ReferenceImage,
    audio: Arc<dyn AudioOutput>,
    render: RenderHandle,
    idle: Arc<IdleRenderer>,
    state: Mutex<PlaybackState>,
    listeners: Mutex<Vec<Sender<PlaybackState>>>,
}

impl PlaybackScheduler {
    /// Wire a scheduler to its collaborators. Starts in [`PlaybackState::Idle`].
    pub fn new(
        source: Arc<dyn FrameSource>,
        cache: CorrectionCache,
        reference: ReferenceImage,
        audio: Arc<dyn AudioOutput>,
        render: RenderHandle,
        idle: Arc<IdleRenderer>,
    ) -> Self {
        Self {
            source,
            cache,
            reference,
            audio,
            render,
            idle,
            state: Mutex::new(PlaybackState::Idle),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    /// Receive every state transition from now on.
    pub fn subscribe(&self) -> Receiver<PlaybackState> {
        let (tx, rx) = unbounded();
        self.listeners.lock().push(tx);
        rx
    }

    /// Load, correct and play `job`, returning once audio and video have both finished.
    ///
    /// Failures while loading or correcting return the scheduler to `Idle` without ever showing
    /// a frame of the job.
    #[tracing::instrument(skip(self), fields(job = job.id, path = %job.path.display()))]
    pub fn play_job(&self, job: &Job) -> TalkheadResult<PlaybackReport> {
        self.transition(PlaybackState::Loading);
        let clip = match self.source.load(&job.path) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!("dropping job, load failed: {e}");
                self.transition(PlaybackState::Idle);
                return Err(e);
            }
        };

        self.transition(PlaybackState::Correcting);
        let corrected = match self.cache.build_all(&clip.frames, &self.reference) {
            Ok(corrected) => corrected,
            Err(e) => {
                tracing::warn!("dropping job, correction failed: {e}");
                self.transition(PlaybackState::Idle);
                return Err(e);
            }
        };

        self.idle.pause();
        self.render.set_owner(Owner::Playback);
        self.transition(PlaybackState::Playing);

        let result = self.play_corrected(job.id, &corrected, &clip.audio);

        self.render.set_owner(Owner::Idle);
        self.idle.resume();
        self.transition(PlaybackState::Idle);
        result
    }

    fn play_corrected(
        &self,
        job_id: u64,
        corrected: &CorrectedFrameSequence,
        audio: &AudioTrack,
    ) -> TalkheadResult<PlaybackReport> {
        let started = Instant::now();

        let (frames_rendered, audio_result) = self.run_av_threads(corrected, audio)?;

        let audio_error = audio_result.err().map(|e| {
            tracing::warn!("audio playback failed: {e}");
            e.to_string()
        });

        let report = PlaybackReport {
            job_id,
            frames_rendered,
            audio_duration: audio.duration(),
            audio_error,
            playing_time: started.elapsed(),
        };
        tracing::info!(
            frames = report.frames_rendered,
            playing_ms = report.playing_time.as_millis() as u64,
            "job finished playing"
        );
        Ok(report)
    }

    /// Run audio and the frame timer on two scoped threads released together; joins both.
    fn run_av_threads(
        &self,
        corrected: &CorrectedFrameSequence,
        audio: &AudioTrack,
    ) -> TalkheadResult<(u64, TalkheadResult<()>)> {
        let start = Barrier::new(2);
        std::thread::scope(|scope| -> TalkheadResult<(u64, TalkheadResult<()>)> {
            let audio_thread = std::thread::Builder::new()
                .name("playback-audio".to_string())
                .spawn_scoped(scope, || {
                    start.wait();
                    self.audio.play_blocking(audio)
                })
                .map_err(|e| {
                    TalkheadError::Other(anyhow::Error::new(e).context("spawn audio thread"))
                })?;

            let video_thread = std::thread::Builder::new()
                .name("playback-video".to_string())
                .spawn_scoped(scope, || {
                    start.wait();
                    run_frame_timer(corrected, &self.render)
                });
            let video_thread = match video_thread {
                Ok(handle) => handle,
                Err(e) => {
                    // Release the audio thread so the scope can end.
                    start.wait();
                    let _ = audio_thread.join();
                    return Err(TalkheadError::Other(
                        anyhow::Error::new(e).context("spawn video thread"),
                    ));
                }
            };

            let frames = video_thread
                .join()
                .map_err(|_| TalkheadError::pipeline("frame timer thread panicked"))?;
            let audio = audio_thread
                .join()
                .map_err(|_| TalkheadError::pipeline("audio thread panicked"))?;
            Ok((frames, audio))
        })
    }

    fn transition(&self, next: PlaybackState) {
        let prev = std::mem::replace(&mut *self.state.lock(), next);
        tracing::debug!(?prev, ?next, "playback state");
        self.listeners.lock().retain(|tx| tx.send(next).is_ok());
    }
}

/// Show every corrected frame in index order at the sequence's native rate.
///
/// Deadlines are measured from the timer's own start, so the timer does not accumulate drift,
/// but it never looks at the audio clock. Returns once the last frame has been presented.
fn run_frame_timer(corrected: &CorrectedFrameSequence, render: &RenderHandle) -> u64 {
    let period = corrected.fps().frame_period();
    let mut cursor = PlaybackCursor::once(corrected.len() as u64);
    let started = Instant::now();
    let mut rendered = 0u64;

    while let Some(idx) = cursor.advance() {
        if let Some(frame) = corrected.get(idx) {
            render.draw(Owner::Playback, idx.0, frame.clone());
            rendered += 1;
        }
        let ticks = u32::try_from(idx.0 + 1).unwrap_or(u32::MAX);
        let deadline = started + period.saturating_mul(ticks);
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }

    render.sync();
    rendered
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
