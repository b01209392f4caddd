//! UI-facing core: submit text, resize the canvas, observe the playing/idle status.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::config::{AppConfig, DisplayKind, Secrets};
use crate::foundation::core::CanvasSize;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::generate::{CommandGenerator, GenerationRequest, Generator};
use crate::idle::{IdleRenderer, IdleScene};
use crate::media::source::{FfmpegSource, FrameSource};
use crate::media::still::{AssetKind, load_reference, load_still_image};
use crate::pipeline::cache::{CorrectionCache, CorrectionThreading, ReferenceImage};
use crate::playback::audio::AudioOutput;
use crate::playback::scheduler::{PlaybackScheduler, PlaybackState};
use crate::queue::{Job, RequestQueue, spawn_worker};
use crate::render::display::{Display, FfplayDisplay, NullDisplay};
use crate::render::thread::RenderThread;

/// Label shown while a request is being generated or played.
pub const BUSY_LABEL: &str = "Processing...";

/// Message shown when submit is pressed with no text.
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text.";

/// Status signal for the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// Disable input and show `label`.
    Busy {
        /// Status text.
        label: String,
    },
    /// Re-enable input; clear the text field when `clear_text` is set.
    Ready {
        /// Whether the submitted text was played and can be cleared.
        clear_text: bool,
    },
    /// Show an error to the user.
    Error {
        /// Human-readable message.
        message: String,
    },
}

/// Everything a [`Stage`] is wired from.
pub struct StageParts {
    /// Generation service.
    pub generator: Arc<dyn Generator>,
    /// Video decoder.
    pub source: Arc<dyn FrameSource>,
    /// Audio device.
    pub audio: Arc<dyn AudioOutput>,
    /// Output display, moved onto the render thread.
    pub display: Box<dyn Display>,
    /// Face every clip is graded against.
    pub reference: ReferenceImage,
    /// Idle background.
    pub idle_scene: IdleScene,
    /// Initial canvas size.
    pub canvas: CanvasSize,
    /// Canvas clear color.
    pub background_rgba: [u8; 4],
    /// Correction pre-pass threading.
    pub threading: CorrectionThreading,
    /// Face asset passed to the generator.
    pub face_path: PathBuf,
    /// Voice pitch shift passed to the generator.
    pub pitch_shift: i32,
}

/// The running avatar: generation threads feed the queue, one worker plays jobs.
pub struct Stage {
    generator: Arc<dyn Generator>,
    queue: Arc<RequestQueue>,
    scheduler: Arc<PlaybackScheduler>,
    idle: Arc<IdleRenderer>,
    render: Option<RenderThread>,
    worker: Option<JoinHandle<()>>,
    generations: Mutex<Vec<JoinHandle<()>>>,
    events_tx: Sender<StageEvent>,
    events_rx: Receiver<StageEvent>,
    face_path: PathBuf,
    pitch_shift: i32,
}

impl Stage {
    /// Start the render thread, idle scene and playback worker.
    pub fn start(parts: StageParts) -> TalkheadResult<Self> {
        let render = RenderThread::spawn(parts.display, parts.canvas, parts.background_rgba)?;
        let idle = IdleRenderer::start(parts.idle_scene, render.handle())?;
        let scheduler = Arc::new(PlaybackScheduler::new(
            parts.source,
            CorrectionCache::new(&parts.threading)?,
            parts.reference,
            parts.audio,
            render.handle(),
            idle.clone(),
        ));

        let (events_tx, events_rx) = unbounded();
        let queue = Arc::new(RequestQueue::new());
        let worker = {
            let scheduler = scheduler.clone();
            let events = events_tx.clone();
            spawn_worker(queue.clone(), move |job| {
                let event = match scheduler.play_job(&job) {
                    Ok(_) => StageEvent::Ready { clear_text: true },
                    Err(e) => {
                        let _ = events.send(StageEvent::Error {
                            message: e.to_string(),
                        });
                        StageEvent::Ready { clear_text: false }
                    }
                };
                let _ = events.send(event);
            })?
        };

        Ok(Self {
            generator: parts.generator,
            queue,
            scheduler,
            idle,
            render: Some(render),
            worker: Some(worker),
            generations: Mutex::new(Vec::new()),
            events_tx,
            events_rx,
            face_path: parts.face_path,
            pitch_shift: parts.pitch_shift,
        })
    }

    /// Build every collaborator from `config` and start.
    pub fn from_config(
        config: &AppConfig,
        secrets: &Secrets,
        audio: Arc<dyn AudioOutput>,
    ) -> TalkheadResult<Self> {
        let source: Arc<dyn FrameSource> = Arc::new(FfmpegSource::new());

        let reference = ReferenceImage::new(load_reference(&config.face_path, config.face_kind())?)?;
        let idle_scene = match config.idle_kind() {
            AssetKind::StillImage => {
                IdleScene::StillImage(Arc::new(load_still_image(&config.idle_path)?))
            }
            AssetKind::LoopingVideo => IdleScene::LoopingVideo(source.load(&config.idle_path)?.frames),
        };

        let display: Box<dyn Display> = match config.display {
            DisplayKind::Null => Box::new(NullDisplay::default()),
            DisplayKind::Ffplay => Box::new(FfplayDisplay::new("Video Output")),
        };

        let generator = CommandGenerator::new(
            config.generator.program.clone(),
            config.generator.args.clone(),
            config.generator_context(secrets),
        );

        Self::start(StageParts {
            generator: Arc::new(generator),
            source,
            audio,
            display,
            reference,
            idle_scene,
            canvas: config.canvas,
            background_rgba: config.background_rgba,
            threading: config.correction.clone(),
            face_path: config.face_path.clone(),
            pitch_shift: config.pitch_shift,
        })
    }

    /// UI status events. Every clone shares one stream.
    pub fn events(&self) -> Receiver<StageEvent> {
        self.events_rx.clone()
    }

    /// Playback state transitions from now on.
    pub fn playback_states(&self) -> Receiver<PlaybackState> {
        self.scheduler.subscribe()
    }

    /// Current playback state.
    pub fn playback_state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    /// Generate a clip for `text` in the background and queue it for playback.
    ///
    /// Clips are queued when generation *finishes*, so two quick submissions may play in the
    /// opposite order. Empty text is rejected without generating anything.
    pub fn submit(&self, text: &str) -> TalkheadResult<()> {
        if text.trim().is_empty() {
            self.emit(StageEvent::Error {
                message: EMPTY_TEXT_MESSAGE.to_string(),
            });
            return Err(TalkheadError::validation(EMPTY_TEXT_MESSAGE));
        }

        self.emit(StageEvent::Busy {
            label: BUSY_LABEL.to_string(),
        });

        let request = GenerationRequest {
            text: text.to_string(),
            face_path: self.face_path.clone(),
            pitch_shift: self.pitch_shift,
        };
        let generator = self.generator.clone();
        let queue = self.queue.clone();
        let events = self.events_tx.clone();
        let join = std::thread::Builder::new()
            .name("generate".to_string())
            .spawn(move || match generator.generate(&request) {
                Ok(path) => {
                    if let Err(e) = queue.enqueue(Job::new(path)) {
                        tracing::warn!("{e}");
                    }
                }
                Err(e) => {
                    tracing::warn!("generation failed: {e}");
                    let _ = events.send(StageEvent::Error {
                        message: e.to_string(),
                    });
                    let _ = events.send(StageEvent::Ready { clear_text: false });
                }
            })
            .map_err(|e| TalkheadError::Other(anyhow::Error::new(e).context("spawn generator")))?;

        let mut generations = self.generations.lock();
        generations.retain(|h| !h.is_finished());
        generations.push(join);
        Ok(())
    }

    /// Queue an existing video for playback, skipping generation.
    pub fn play_file(&self, path: impl Into<PathBuf>) -> TalkheadResult<()> {
        self.emit(StageEvent::Busy {
            label: BUSY_LABEL.to_string(),
        });
        self.queue.enqueue(Job::new(path))
    }

    /// The window was resized; re-center whatever is on screen.
    pub fn resize(&self, width: u32, height: u32) -> TalkheadResult<()> {
        let size = CanvasSize::new(width, height)?;
        if let Some(render) = &self.render {
            render.handle().resize(size);
        }
        Ok(())
    }

    /// Wait for in-flight generations and the current job, drop queued jobs, stop all threads.
    pub fn shutdown(mut self) {
        for join in self.generations.lock().drain(..) {
            if join.join().is_err() {
                tracing::error!("generation thread panicked");
            }
        }

        let dropped = self.queue.close();
        if !dropped.is_empty() {
            tracing::warn!(count = dropped.len(), "dropping queued jobs on shutdown");
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("playback worker panicked");
        }

        self.idle.shutdown();
        if let Some(render) = self.render.take() {
            render.shutdown();
        }
    }

    fn emit(&self, event: StageEvent) {
        let _ = self.events_tx.send(event);
    }
}

#[cfg(test)]
#[path = "../tests/unit/app.rs"]
mod tests;
