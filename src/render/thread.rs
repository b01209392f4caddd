//! Single-owner render thread.
//!
//! Every canvas write goes through one thread. Playback, idle and resize requests arrive as
//! messages, so no two writers ever touch the canvas at once. Draws are tagged with an [`Owner`];
//! only the current owner's draws reach the screen, and ownership changes only via
//! [`RenderHandle::set_owner`].

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::foundation::core::{CanvasSize, Frame};
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::render::canvas::Canvas;
use crate::render::display::{Display, PresentInfo};

/// Who currently holds the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The idle scene renderer.
    Idle,
    /// The playback scheduler, while a job is playing.
    Playback,
}

enum RenderCommand {
    SetOwner(Owner),
    Draw {
        owner: Owner,
        index: u64,
        frame: Arc<Frame>,
    },
    Resize(CanvasSize),
    Sync(Sender<()>),
    Shutdown,
}

/// Cloneable sender side of the render thread.
#[derive(Clone)]
pub struct RenderHandle {
    tx: Sender<RenderCommand>,
}

impl RenderHandle {
    /// Hand the canvas to `owner`; draws from anyone else are dropped from now on.
    pub fn set_owner(&self, owner: Owner) {
        self.send(RenderCommand::SetOwner(owner));
    }

    /// Draw `frame` centered, if `owner` holds the canvas when the message is processed.
    pub fn draw(&self, owner: Owner, index: u64, frame: Arc<Frame>) {
        self.send(RenderCommand::Draw {
            owner,
            index,
            frame,
        });
    }

    /// Resize the canvas and re-center whatever is currently displayed.
    pub fn resize(&self, size: CanvasSize) {
        self.send(RenderCommand::Resize(size));
    }

    /// Block until every command sent before this call has been processed.
    pub fn sync(&self) {
        let (tx, rx) = bounded(1);
        if self.tx.send(RenderCommand::Sync(tx)).is_ok() {
            let _ = rx.recv();
        }
    }

    fn send(&self, cmd: RenderCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!("render thread has stopped; dropping command");
        }
    }
}

/// Owns the render thread; dropping without [`RenderThread::shutdown`] detaches it.
pub struct RenderThread {
    handle: RenderHandle,
    join: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawn the render thread. The canvas starts owned by [`Owner::Idle`].
    pub fn spawn(
        display: Box<dyn Display>,
        size: CanvasSize,
        background: [u8; 4],
    ) -> TalkheadResult<Self> {
        let (tx, rx) = unbounded();
        let join = std::thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                let mut state = RenderState {
                    canvas: Canvas::new(size, background),
                    display,
                    owner: Owner::Idle,
                    current: None,
                };
                state.run(rx);
            })
            .map_err(|e| {
                TalkheadError::Other(anyhow::Error::new(e).context("spawn render thread"))
            })?;

        Ok(Self {
            handle: RenderHandle { tx },
            join: Some(join),
        })
    }

    /// A sender for this thread.
    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    /// Process outstanding commands, then stop the thread and wait for it.
    pub fn shutdown(mut self) {
        self.handle.send(RenderCommand::Shutdown);
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            tracing::error!("render thread panicked");
        }
    }
}

struct Current {
    owner: Owner,
    index: u64,
    frame: Arc<Frame>,
}

struct RenderState {
    canvas: Canvas,
    display: Box<dyn Display>,
    owner: Owner,
    current: Option<Current>,
}

impl RenderState {
    fn run(&mut self, rx: Receiver<RenderCommand>) {
        while let Ok(cmd) = rx.recv() {
            match cmd {
                RenderCommand::SetOwner(owner) => {
                    tracing::debug!(?owner, "canvas owner changed");
                    if owner != self.owner {
                        // The previous owner's frame must not be repainted on resize.
                        self.current = None;
                    }
                    self.owner = owner;
                }
                RenderCommand::Draw {
                    owner,
                    index,
                    frame,
                } => {
                    if owner != self.owner {
                        tracing::trace!(?owner, index, "dropping draw from non-owner");
                        continue;
                    }
                    self.current = Some(Current {
                        owner,
                        index,
                        frame,
                    });
                    self.repaint();
                }
                RenderCommand::Resize(size) => {
                    if size != self.canvas.size() {
                        self.canvas.resize(size);
                        self.repaint();
                    }
                }
                RenderCommand::Sync(ack) => {
                    let _ = ack.send(());
                }
                RenderCommand::Shutdown => break,
            }
        }
    }

    /// Redraw the current content centered on the current canvas.
    fn repaint(&mut self) {
        let info = match &self.current {
            Some(current) => {
                let origin = self.canvas.draw_centered(&current.frame);
                PresentInfo {
                    owner: current.owner,
                    index: Some(current.index),
                    origin,
                    canvas: self.canvas.size(),
                }
            }
            None => {
                self.canvas.clear();
                PresentInfo {
                    owner: self.owner,
                    index: None,
                    origin: (0, 0),
                    canvas: self.canvas.size(),
                }
            }
        };
        if let Err(e) = self.display.present(&self.canvas, &info) {
            tracing::warn!("display present failed: {e}");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/thread.rs"]
mod tests;
