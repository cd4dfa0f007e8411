//! Drawing detections onto images (requires the `image-io` feature).
//!
//! Each detection gets a translucent fill, a solid outline, and optionally a
//! `"label 0.00"` caption at its top-left corner when a font is supplied.

pub mod io;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::assemble::Detection;
use crate::geometry::BoundingBox;

/// Colors and sizes used by [`draw_detections`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawStyle {
    /// Outline and fill color.
    pub box_color: Rgb<u8>,
    /// Fill opacity out of 255; 0 disables the fill.
    pub fill_alpha: u8,
    /// Caption color.
    pub text_color: Rgb<u8>,
    /// Caption height in pixels.
    pub text_scale: f32,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            box_color: Rgb([255, 0, 0]),
            fill_alpha: 50,
            text_color: Rgb([0, 0, 255]),
            text_scale: 16.0,
        }
    }
}

/// Draws every detection onto `image`.
///
/// Boxes must already be in `image` pixel space. Parts outside the image are
/// clipped and boxes with no visible area are skipped.
pub fn draw_detections(
    image: &mut RgbImage,
    detections: &[Detection],
    style: &DrawStyle,
    font: Option<&FontArc>,
) {
    for det in detections {
        let Some(rect) = clip_rect(&det.bbox, image.width(), image.height()) else {
            continue;
        };
        if style.fill_alpha > 0 {
            blend_rect(image, rect, style.box_color, style.fill_alpha);
        }
        draw_hollow_rect_mut(image, rect, style.box_color);

        if let Some(font) = font {
            let caption = format!("{} {:.2}", det.label, det.confidence);
            draw_text_mut(
                image,
                style.text_color,
                rect.left(),
                rect.top(),
                PxScale::from(style.text_scale),
                font,
                &caption,
            );
        }
    }
}

fn clip_rect(bbox: &BoundingBox, width: u32, height: u32) -> Option<Rect> {
    let (w, h) = (width as f32, height as f32);
    let x1 = bbox.x1.clamp(0.0, w).floor();
    let y1 = bbox.y1.clamp(0.0, h).floor();
    let x2 = bbox.x2.clamp(0.0, w).ceil();
    let y2 = bbox.y2.clamp(0.0, h).ceil();
    if !(x2 > x1 && y2 > y1) {
        return None;
    }
    Some(Rect::at(x1 as i32, y1 as i32).of_size((x2 - x1) as u32, (y2 - y1) as u32))
}

fn blend_rect(image: &mut RgbImage, rect: Rect, color: Rgb<u8>, alpha: u8) {
    let a = u32::from(alpha);
    let x_end = (rect.right() + 1).min(image.width() as i32) as u32;
    let y_end = (rect.bottom() + 1).min(image.height() as i32) as u32;
    for y in rect.top() as u32..y_end {
        for x in rect.left() as u32..x_end {
            let pixel = image.get_pixel_mut(x, y);
            for (dst, src) in pixel.0.iter_mut().zip(color.0) {
                *dst = ((u32::from(src) * a + u32::from(*dst) * (255 - a) + 127) / 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection {
            bbox: BoundingBox::new(x1, y1, x2, y2),
            class_index: 0,
            label: "car".to_owned(),
            confidence: 0.9,
        }
    }

    #[test]
    fn outline_and_fill_are_drawn() {
        let mut image = RgbImage::new(20, 20);
        draw_detections(
            &mut image,
            &[detection(2.0, 2.0, 10.0, 10.0)],
            &DrawStyle::default(),
            None,
        );
        assert_eq!(*image.get_pixel(2, 2), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(5, 5), Rgb([50, 0, 0]));
        assert_eq!(*image.get_pixel(15, 15), Rgb([0, 0, 0]));
    }

    #[test]
    fn boxes_outside_the_image_are_skipped() {
        let mut image = RgbImage::new(8, 8);
        draw_detections(
            &mut image,
            &[detection(20.0, 20.0, 30.0, 30.0), detection(4.0, 4.0, 4.0, 9.0)],
            &DrawStyle::default(),
            None,
        );
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
