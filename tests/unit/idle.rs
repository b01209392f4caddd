use std::time::Duration;

use super::*;
use crate::foundation::core::{CanvasSize, Fps};
use crate::render::display::InMemoryDisplay;
use crate::render::thread::RenderThread;

fn render_thread(display: &InMemoryDisplay) -> RenderThread {
    RenderThread::spawn(
        Box::new(display.clone()),
        CanvasSize {
            width: 8,
            height: 8,
        },
        [0, 0, 0, 255],
    )
    .unwrap()
}

fn looping_scene(frames: u8, fps: u32) -> IdleScene {
    let frames = (0..frames)
        .map(|i| Frame::solid(2, 2, [i, i, i, 255]))
        .collect();
    IdleScene::LoopingVideo(FrameSequence::new(frames, Fps::new(fps, 1).unwrap()).unwrap())
}

#[test]
fn still_image_is_drawn_on_start_and_resume() {
    let display = InMemoryDisplay::new();
    let thread = render_thread(&display);
    let scene = IdleScene::StillImage(Arc::new(Frame::solid(4, 2, [5, 5, 5, 255])));
    let idle = IdleRenderer::start(scene, thread.handle()).unwrap();

    idle.pause();
    idle.render();
    idle.resume();
    thread.handle().sync();

    let presents = display.presents();
    assert_eq!(presents.len(), 2);
    assert!(presents.iter().all(|p| p.owner == Owner::Idle && p.origin == (2, 3)));

    idle.shutdown();
    thread.shutdown();
}

#[test]
fn looping_video_wraps_and_stops_while_paused() {
    let display = InMemoryDisplay::new();
    let thread = render_thread(&display);
    let idle = IdleRenderer::start(looping_scene(3, 200), thread.handle()).unwrap();

    std::thread::sleep(Duration::from_millis(100));
    idle.pause();
    thread.handle().sync();
    let while_running = display.presents();
    let indices: Vec<u64> = while_running.iter().filter_map(|p| p.index).collect();
    assert!(indices.len() >= 4, "expected the loop to wrap, got {indices:?}");
    for (i, idx) in indices.iter().enumerate() {
        assert_eq!(*idx, i as u64 % 3);
    }

    std::thread::sleep(Duration::from_millis(50));
    thread.handle().sync();
    assert_eq!(display.presents().len(), while_running.len());
    assert!(idle.is_paused());

    idle.resume();
    std::thread::sleep(Duration::from_millis(50));
    idle.shutdown();
    thread.handle().sync();
    assert!(display.presents().len() > while_running.len());

    thread.shutdown();
}
