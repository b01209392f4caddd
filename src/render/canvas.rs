use crate::foundation::core::{CanvasSize, Frame, centered_origin};

/// The output surface: a straight-alpha RGBA8 buffer the size of the window.
#[derive(Clone, Debug)]
pub struct Canvas {
    size: CanvasSize,
    background: [u8; 4],
    pixels: Vec<u8>,
}

impl Canvas {
    /// Create a canvas cleared to `background`.
    pub fn new(size: CanvasSize, background: [u8; 4]) -> Self {
        let mut canvas = Self {
            size,
            background,
            pixels: Vec::new(),
        };
        canvas.clear();
        canvas
    }

    /// Current dimensions.
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Packed RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reallocate for a new size and clear.
    pub fn resize(&mut self, size: CanvasSize) {
        self.size = size;
        self.clear();
    }

    /// Fill the whole canvas with the background color.
    pub fn clear(&mut self) {
        let n = self.size.width as usize * self.size.height as usize;
        self.pixels.clear();
        self.pixels.reserve(n * 4);
        for _ in 0..n {
            self.pixels.extend_from_slice(&self.background);
        }
    }

    /// Clear, then draw `frame` centered. Returns the top-left origin used.
    pub fn draw_centered(&mut self, frame: &Frame) -> (i64, i64) {
        let origin = centered_origin(self.size, frame.width, frame.height);
        self.clear();
        self.blit(frame, origin);
        origin
    }

    /// Composite `frame` with its top-left corner at `origin`, clipping to the canvas.
    pub fn blit(&mut self, frame: &Frame, origin: (i64, i64)) {
        let cw = i64::from(self.size.width);
        let ch = i64::from(self.size.height);
        let fw = i64::from(frame.width);
        let fh = i64::from(frame.height);
        if frame.data.len() != frame.pixel_count() * 4 {
            return;
        }

        let x0 = origin.0.max(0);
        let y0 = origin.1.max(0);
        let x1 = (origin.0 + fw).min(cw);
        let y1 = (origin.1 + fh).min(ch);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            let src_row = ((y - origin.1) * fw) as usize * 4;
            let dst_row = (y * cw) as usize * 4;
            for x in x0..x1 {
                let s = src_row + (x - origin.0) as usize * 4;
                let d = dst_row + x as usize * 4;
                over(&mut self.pixels[d..d + 4], &frame.data[s..s + 4]);
            }
        }
    }
}

/// Straight-alpha source-over onto an opaque destination.
fn over(dst: &mut [u8], src: &[u8]) {
    let a = u32::from(src[3]);
    if a == 255 {
        dst[..3].copy_from_slice(&src[..3]);
        dst[3] = 255;
        return;
    }
    if a == 0 {
        return;
    }
    let inv = 255 - a;
    for c in 0..3 {
        let v = u32::from(src[c]) * a + u32::from(dst[c]) * inv;
        dst[c] = ((v + 127) / 255) as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
