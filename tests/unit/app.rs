use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, bounded};

use super::*;
use crate::foundation::core::{Fps, Frame};
use crate::media::source::{AudioTrack, FrameSequence, LoadedClip};
use crate::playback::audio::ClockAudio;
use crate::render::display::InMemoryDisplay;

const WAIT: Duration = Duration::from_secs(10);

/// Returns a fixed path per text, optionally blocking until its gate opens.
struct ScriptedGenerator {
    outputs: HashMap<String, (PathBuf, Option<Receiver<()>>)>,
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerationRequest) -> TalkheadResult<PathBuf> {
        let (path, gate) = self
            .outputs
            .get(&request.text)
            .ok_or_else(|| TalkheadError::generation("service unavailable"))?;
        if let Some(gate) = gate {
            gate.recv()
                .map_err(|_| TalkheadError::generation("gate dropped"))?;
        }
        Ok(path.clone())
    }
}

/// Any path loads as a short clip; records the order of loads.
#[derive(Default)]
struct RecordingSource {
    loads: Mutex<Vec<PathBuf>>,
}

impl FrameSource for RecordingSource {
    fn load(&self, path: &Path) -> TalkheadResult<LoadedClip> {
        self.loads.lock().push(path.to_path_buf());
        let frames = (0..4u8)
            .map(|i| Frame::solid(4, 4, [i, 80, 160, 255]))
            .collect();
        Ok(LoadedClip {
            frames: FrameSequence::new(frames, Fps::new(200, 1)?)?,
            audio: AudioTrack::silent(1000, 1),
        })
    }
}

fn start(generator: ScriptedGenerator, source: Arc<RecordingSource>) -> Stage {
    Stage::start(StageParts {
        generator: Arc::new(generator),
        source,
        audio: Arc::new(ClockAudio::new()),
        display: Box::new(InMemoryDisplay::new()),
        reference: ReferenceImage::new(Frame::solid(2, 2, [180, 140, 120, 255])).unwrap(),
        idle_scene: IdleScene::StillImage(Arc::new(Frame::solid(8, 8, [20, 20, 20, 255]))),
        canvas: CanvasSize::new(16, 16).unwrap(),
        background_rgba: [0, 0, 0, 255],
        threading: CorrectionThreading::default(),
        face_path: PathBuf::from("face.png"),
        pitch_shift: 6,
    })
    .unwrap()
}

fn next(events: &Receiver<StageEvent>) -> StageEvent {
    events.recv_timeout(WAIT).unwrap()
}

fn busy() -> StageEvent {
    StageEvent::Busy {
        label: BUSY_LABEL.to_string(),
    }
}

#[test]
fn empty_text_is_rejected_without_generating() {
    let source = Arc::new(RecordingSource::default());
    let stage = start(
        ScriptedGenerator {
            outputs: HashMap::new(),
        },
        source.clone(),
    );
    let events = stage.events();

    let err = stage.submit("   ").unwrap_err();
    assert!(matches!(err, TalkheadError::Validation(_)));
    assert_eq!(
        next(&events),
        StageEvent::Error {
            message: EMPTY_TEXT_MESSAGE.to_string()
        }
    );
    assert!(events.try_recv().is_err());

    stage.shutdown();
    assert!(source.loads.lock().is_empty());
}

#[test]
fn generation_failure_reports_and_reenables_input() {
    let source = Arc::new(RecordingSource::default());
    let stage = start(
        ScriptedGenerator {
            outputs: HashMap::new(),
        },
        source.clone(),
    );
    let events = stage.events();
    let states = stage.playback_states();

    stage.submit("hello").unwrap();
    assert_eq!(next(&events), busy());
    match next(&events) {
        StageEvent::Error { message } => assert!(message.contains("service unavailable")),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(next(&events), StageEvent::Ready { clear_text: false });

    stage.shutdown();
    assert!(source.loads.lock().is_empty());
    assert!(states.try_iter().next().is_none());
}

#[test]
fn plays_clips_in_generation_completion_order() {
    let (open_a, gate_a) = bounded(1);
    let (open_b, gate_b) = bounded(1);
    let source = Arc::new(RecordingSource::default());
    let stage = start(
        ScriptedGenerator {
            outputs: HashMap::from([
                ("a".to_string(), (PathBuf::from("a.mp4"), Some(gate_a))),
                ("b".to_string(), (PathBuf::from("b.mp4"), Some(gate_b))),
            ]),
        },
        source.clone(),
    );
    let events = stage.events();

    stage.submit("a").unwrap();
    stage.submit("b").unwrap();
    assert_eq!(next(&events), busy());
    assert_eq!(next(&events), busy());

    open_b.send(()).unwrap();
    assert_eq!(next(&events), StageEvent::Ready { clear_text: true });
    open_a.send(()).unwrap();
    assert_eq!(next(&events), StageEvent::Ready { clear_text: true });

    stage.shutdown();
    assert_eq!(
        *source.loads.lock(),
        vec![PathBuf::from("b.mp4"), PathBuf::from("a.mp4")]
    );
}

#[test]
fn queued_files_play_one_at_a_time_in_order() {
    let source = Arc::new(RecordingSource::default());
    let stage = start(
        ScriptedGenerator {
            outputs: HashMap::new(),
        },
        source.clone(),
    );
    let events = stage.events();
    let states = stage.playback_states();

    stage.play_file("one.mp4").unwrap();
    stage.play_file("two.mp4").unwrap();
    stage.play_file("three.mp4").unwrap();
    let readies = std::iter::from_fn(|| Some(next(&events)))
        .filter(|e| matches!(e, StageEvent::Ready { .. }))
        .take(3)
        .count();
    assert_eq!(readies, 3);

    stage.shutdown();
    assert_eq!(
        *source.loads.lock(),
        vec![
            PathBuf::from("one.mp4"),
            PathBuf::from("two.mp4"),
            PathBuf::from("three.mp4")
        ]
    );
    let cycle = [
        PlaybackState::Loading,
        PlaybackState::Correcting,
        PlaybackState::Playing,
        PlaybackState::Idle,
    ];
    let seen: Vec<_> = states.try_iter().collect();
    assert_eq!(seen, cycle.repeat(3));
}

#[test]
fn resize_rejects_zero_dimensions() {
    let stage = start(
        ScriptedGenerator {
            outputs: HashMap::new(),
        },
        Arc::new(RecordingSource::default()),
    );
    assert!(stage.resize(0, 10).is_err());
    assert!(stage.resize(640, 480).is_ok());
    stage.shutdown();
}
