//! Aspect-preserving resize with centered padding, and its inverse.
//!
//! The reference pipeline feeds a 416x416 network input made by scaling the
//! source image uniformly and padding the short side equally on both ends.
//! Boxes decoded in network space are mapped back with [`Letterbox::to_source`].

use crate::geometry::BoundingBox;
use crate::util::{DecodeError, DecodeResult};

/// Scale and padding relating a source image to a letterboxed network input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    src_width: f32,
    src_height: f32,
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    /// Computes the letterbox that fits `src` into `dst`.
    pub fn fit(
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    ) -> DecodeResult<Self> {
        if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
            return Err(DecodeError::InvalidInput("letterbox dimensions must be non-zero"));
        }
        let (sw, sh) = (src_width as f32, src_height as f32);
        let (dw, dh) = (dst_width as f32, dst_height as f32);
        let scale = (dw / sw).min(dh / sh);
        Ok(Self {
            src_width: sw,
            src_height: sh,
            scale,
            pad_x: (dw - sw * scale) / 2.0,
            pad_y: (dh - sh * scale) / 2.0,
        })
    }

    /// Uniform scale from source to network pixels.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Horizontal and vertical padding in network pixels.
    pub fn padding(&self) -> (f32, f32) {
        (self.pad_x, self.pad_y)
    }

    /// Maps a network-space box to source pixels, clamped to the source image.
    pub fn to_source(&self, bbox: &BoundingBox) -> BoundingBox {
        let x = |v: f32| ((v - self.pad_x) / self.scale).clamp(0.0, self.src_width);
        let y = |v: f32| ((v - self.pad_y) / self.scale).clamp(0.0, self.src_height);
        BoundingBox::new(x(bbox.x1), y(bbox.y1), x(bbox.x2), y(bbox.y2))
    }

    /// Maps a source-space box into network pixels.
    pub fn to_network(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            bbox.x1 * self.scale + self.pad_x,
            bbox.y1 * self.scale + self.pad_y,
            bbox.x2 * self.scale + self.pad_x,
            bbox.y2 * self.scale + self.pad_y,
        )
    }
}
