use crate::foundation::core::FrameIndex;

/// Index of the next frame to display within a sequence.
///
/// Strictly monotonic for one-shot playback; looping cursors wrap to 0 after the last frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackCursor {
    next: u64,
    len: u64,
    looping: bool,
}

impl PlaybackCursor {
    /// A cursor that stops after the last frame.
    pub fn once(len: u64) -> Self {
        Self {
            next: 0,
            len,
            looping: false,
        }
    }

    /// A cursor that wraps around forever (empty sequences still yield nothing).
    pub fn looping(len: u64) -> Self {
        Self {
            next: 0,
            len,
            looping: true,
        }
    }

    /// Return the frame to show now and move past it; `None` once a one-shot cursor is done.
    pub fn advance(&mut self) -> Option<FrameIndex> {
        if self.next >= self.len {
            if !self.looping || self.len == 0 {
                return None;
            }
            self.next = 0;
        }
        let idx = FrameIndex(self.next);
        self.next += 1;
        Some(idx)
    }

    /// Return `true` when a one-shot cursor has shown every frame.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.next >= self.len
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/cursor.rs"]
mod tests;
