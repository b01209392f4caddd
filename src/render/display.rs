use std::io::Write as _;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::core::CanvasSize;
use crate::foundation::error::{TalkheadError, TalkheadResult};
use crate::render::canvas::Canvas;
use crate::render::thread::Owner;

/// What was drawn for one presented canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentInfo {
    /// Who drew the content.
    pub owner: Owner,
    /// Frame index within the owner's sequence, `None` for a bare clear.
    pub index: Option<u64>,
    /// Top-left origin of the drawn frame.
    pub origin: (i64, i64),
    /// Canvas size at present time.
    pub canvas: CanvasSize,
}

/// Sink for composited canvases. Only the render thread calls it.
pub trait Display: Send {
    /// Show `canvas` on screen.
    fn present(&mut self, canvas: &Canvas, info: &PresentInfo) -> TalkheadResult<()>;
}

/// Display that discards everything.
#[derive(Debug, Default)]
pub struct NullDisplay {
    presented: u64,
}

impl Display for NullDisplay {
    fn present(&mut self, _canvas: &Canvas, info: &PresentInfo) -> TalkheadResult<()> {
        self.presented += 1;
        tracing::trace!(presented = self.presented, ?info, "present");
        Ok(())
    }
}

/// Display that records every present, for tests and debugging.
///
/// Clones share the same record.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDisplay {
    log: Arc<Mutex<Vec<PresentInfo>>>,
    last: Arc<Mutex<Option<Canvas>>>,
}

impl InMemoryDisplay {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all presents so far, in order.
    pub fn presents(&self) -> Vec<PresentInfo> {
        self.log.lock().clone()
    }

    /// The most recently presented canvas.
    pub fn last_canvas(&self) -> Option<Canvas> {
        self.last.lock().clone()
    }
}

impl Display for InMemoryDisplay {
    fn present(&mut self, canvas: &Canvas, info: &PresentInfo) -> TalkheadResult<()> {
        self.log.lock().push(*info);
        *self.last.lock() = Some(canvas.clone());
        Ok(())
    }
}

/// Streams the canvas as raw RGBA8 into an `ffplay` window.
///
/// `ffplay` cannot change its input size on the fly, so a resize respawns the child.
pub struct FfplayDisplay {
    title: String,
    child: Option<(CanvasSize, Child, ChildStdin)>,
}

impl FfplayDisplay {
    /// Create a display; the window opens on the first present.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            child: None,
        }
    }

    fn spawn(&self, size: CanvasSize) -> TalkheadResult<(Child, ChildStdin)> {
        let mut child = Command::new("ffplay")
            .args(ffplay_args(&self.title, size))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                TalkheadError::validation(format!(
                    "failed to spawn ffplay (is it installed and on PATH?): {e}"
                ))
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TalkheadError::validation("failed to open ffplay stdin (unexpected)"))?;
        Ok((child, stdin))
    }

    fn close(&mut self) {
        if let Some((_, mut child, stdin)) = self.child.take() {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Frames are stamped on arrival so ffplay shows them as soon as they are read and never
/// paces (and so blocks) the pipe at its own default input rate.
fn ffplay_args(title: &str, size: CanvasSize) -> Vec<String> {
    [
        "-loglevel",
        "error",
        "-fflags",
        "nobuffer",
        "-flags",
        "low_delay",
        "-framedrop",
        "-window_title",
        title,
        "-f",
        "rawvideo",
        "-pixel_format",
        "rgba",
        "-video_size",
        &format!("{}x{}", size.width, size.height),
        "-use_wallclock_as_timestamps",
        "1",
        "-i",
        "pipe:0",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Display for FfplayDisplay {
    fn present(&mut self, canvas: &Canvas, _info: &PresentInfo) -> TalkheadResult<()> {
        let size = canvas.size();
        if self.child.as_ref().is_some_and(|(s, _, _)| *s != size) {
            self.close();
        }
        if self.child.is_none() {
            let (child, stdin) = self.spawn(size)?;
            self.child = Some((size, child, stdin));
        }

        let Some((_, _, stdin)) = self.child.as_mut() else {
            return Err(TalkheadError::validation("ffplay display is not running"));
        };
        if let Err(e) = stdin.write_all(canvas.pixels()) {
            // The window was closed; reopen on the next present.
            self.close();
            return Err(TalkheadError::Other(anyhow::Error::new(e).context("write to ffplay")));
        }
        Ok(())
    }
}

impl Drop for FfplayDisplay {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
