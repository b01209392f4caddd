//! Idle scene shown whenever no job is playing.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::foundation::core::Frame;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::media::source::FrameSequence;
use crate::playback::cursor::PlaybackCursor;
use crate::render::thread::{Owner, RenderHandle};

/// Background content for the idle state.
#[derive(Clone, Debug)]
pub enum IdleScene {
    /// A static background image.
    StillImage(Arc<Frame>),
    /// A background video looped at its own frame rate.
    LoopingVideo(FrameSequence),
}

#[derive(Debug, Default)]
struct IdleControl {
    paused: bool,
    shutdown: bool,
}

struct Shared {
    ctl: Mutex<IdleControl>,
    wake: Condvar,
}

/// Draws the idle scene through the render thread and yields the canvas while a job plays.
pub struct IdleRenderer {
    scene: IdleScene,
    render: RenderHandle,
    shared: Arc<Shared>,
    looper: Mutex<Option<JoinHandle<()>>>,
}

impl IdleRenderer {
    /// Start rendering `scene`. Looping scenes get their own frame timer thread.
    pub fn start(scene: IdleScene, render: RenderHandle) -> TalkheadResult<Arc<Self>> {
        let shared = Arc::new(Shared {
            ctl: Mutex::new(IdleControl::default()),
            wake: Condvar::new(),
        });

        let looper = match &scene {
            IdleScene::StillImage(frame) => {
                render.draw(Owner::Idle, 0, frame.clone());
                None
            }
            IdleScene::LoopingVideo(sequence) => {
                let sequence = sequence.clone();
                let render = render.clone();
                let shared = shared.clone();
                let join = std::thread::Builder::new()
                    .name("idle-loop".to_string())
                    .spawn(move || run_loop(&sequence, &render, &shared))
                    .map_err(|e| {
                        TalkheadError::Other(anyhow::Error::new(e).context("spawn idle loop"))
                    })?;
                Some(join)
            }
        };

        Ok(Arc::new(Self {
            scene,
            render,
            shared,
            looper: Mutex::new(looper),
        }))
    }

    /// Stop drawing. Once this returns, no further idle draw will be sent until
    /// [`IdleRenderer::resume`].
    pub fn pause(&self) {
        let mut ctl = self.shared.ctl.lock();
        ctl.paused = true;
        self.shared.wake.notify_all();
    }

    /// Resume drawing after a job finished.
    pub fn resume(&self) {
        {
            let mut ctl = self.shared.ctl.lock();
            if ctl.shutdown {
                return;
            }
            ctl.paused = false;
            self.shared.wake.notify_all();
        }
        self.render();
    }

    /// Redraw the still background. Looping scenes redraw on their next tick.
    pub fn render(&self) {
        if let IdleScene::StillImage(frame) = &self.scene {
            let ctl = self.shared.ctl.lock();
            if !ctl.paused && !ctl.shutdown {
                self.render.draw(Owner::Idle, 0, frame.clone());
            }
        }
    }

    /// Return `true` while paused for a playing job.
    pub fn is_paused(&self) -> bool {
        self.shared.ctl.lock().paused
    }

    /// Stop the loop thread (if any) and wait for it.
    pub fn shutdown(&self) {
        {
            let mut ctl = self.shared.ctl.lock();
            ctl.shutdown = true;
            self.shared.wake.notify_all();
        }
        if let Some(join) = self.looper.lock().take()
            && join.join().is_err()
        {
            tracing::error!("idle loop thread panicked");
        }
    }
}

/// Frame timer for a looping idle video. Draws are sent while holding the control lock, so a
/// completed `pause()` guarantees no later idle draw.
fn run_loop(sequence: &FrameSequence, render: &RenderHandle, shared: &Shared) {
    let period = sequence.fps().frame_period();
    let mut cursor = PlaybackCursor::looping(sequence.duration_frames());
    let mut next_tick = Instant::now();

    let mut ctl = shared.ctl.lock();
    loop {
        if ctl.shutdown {
            break;
        }
        if ctl.paused {
            shared.wake.wait(&mut ctl);
            // Restart the clock so a long pause does not cause a burst of catch-up frames.
            next_tick = Instant::now();
            continue;
        }

        let now = Instant::now();
        if now < next_tick {
            shared.wake.wait_until(&mut ctl, next_tick);
            continue;
        }

        let Some(idx) = cursor.advance() else {
            break;
        };
        if let Some(frame) = sequence.get(idx) {
            render.draw(Owner::Idle, idx.0, frame.clone());
        }
        next_tick += period;
        if next_tick < now {
            next_tick = now + period;
        }
    }
    tracing::debug!("idle loop stopped");
}

#[cfg(test)]
#[path = "../tests/unit/idle.rs"]
mod tests;
