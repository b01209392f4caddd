//! Talkhead drives a desktop talking-head avatar.
//!
//! Text goes to an external generation service that returns a lip-synced video clip. Each clip is
//! color-graded against a reference face, then played with its audio over an idle background:
//!
//! - Build a [`Stage`] from an [`AppConfig`] (or from hand-made [`StageParts`])
//! - [`Stage::submit`] text; watch [`StageEvent`]s and [`PlaybackState`]s
//! - Clips play one at a time in the order their generation finished
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod app;
pub(crate) mod color;
pub(crate) mod config;
pub(crate) mod generate;
pub(crate) mod idle;
pub(crate) mod media;
pub(crate) mod pipeline;
pub(crate) mod playback;
pub(crate) mod queue;
pub(crate) mod render;

pub use crate::foundation::core::{CanvasSize, Fps, Frame, FrameIndex, centered_origin};
pub use crate::foundation::error::{TalkheadError, TalkheadResult};

pub use crate::app::{BUSY_LABEL, EMPTY_TEXT_MESSAGE, Stage, StageEvent, StageParts};
pub use crate::color::transfer::{LabStats, correct, correct_with_stats};
pub use crate::config::{AppConfig, DisplayKind, GeneratorCommand, Secrets};
pub use crate::generate::{CommandGenerator, GenerationRequest, Generator, GeneratorContext};
pub use crate::idle::{IdleRenderer, IdleScene};
pub use crate::media::decode::{PLAYBACK_SAMPLE_RATE, decode_audio_f32_stereo};
pub use crate::media::probe::{VideoSourceInfo, is_ffmpeg_on_path, probe_video};
pub use crate::media::source::{AudioTrack, FfmpegSource, FrameSequence, FrameSource, LoadedClip};
pub use crate::media::still::{AssetKind, decode_image, load_reference, load_still_image};
pub use crate::pipeline::cache::{
    CorrectedFrameSequence, CorrectionCache, CorrectionThreading, ReferenceImage,
};
#[cfg(feature = "audio-rodio")]
pub use crate::playback::audio::RodioAudio;
pub use crate::playback::audio::{AudioOutput, ClockAudio};
pub use crate::playback::cursor::PlaybackCursor;
pub use crate::playback::scheduler::{PlaybackReport, PlaybackScheduler, PlaybackState};
pub use crate::queue::{Job, RequestQueue, spawn_worker};
pub use crate::render::canvas::Canvas;
pub use crate::render::display::{
    Display, FfplayDisplay, InMemoryDisplay, NullDisplay, PresentInfo,
};
pub use crate::render::thread::{Owner, RenderHandle, RenderThread};
