//! Axis-aligned boxes and overlap measures.
//!
//! `BoundingBox` always stores corners as `(x1, y1, x2, y2)`. Raw model
//! outputs may use a different coordinate order; `BoxOrder` records which one
//! and converts in both directions, so the order survives a decode round trip.

/// Coordinate order of a raw 4-float box in a model output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum BoxOrder {
    /// `[x1, y1, x2, y2]`.
    #[default]
    XyXy,
    /// `[y1, x1, y2, x2]`, as emitted by the ONNX model-zoo YOLOv3 export.
    YxYx,
}

/// Axis-aligned box with named corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

impl BoundingBox {
    /// Creates a box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Interprets four raw floats using the given coordinate order.
    pub fn from_raw(raw: [f32; 4], order: BoxOrder) -> Self {
        match order {
            BoxOrder::XyXy => Self::new(raw[0], raw[1], raw[2], raw[3]),
            BoxOrder::YxYx => Self::new(raw[1], raw[0], raw[3], raw[2]),
        }
    }

    /// Writes the box back out in the given coordinate order.
    pub fn to_raw(&self, order: BoxOrder) -> [f32; 4] {
        match order {
            BoxOrder::XyXy => [self.x1, self.y1, self.x2, self.y2],
            BoxOrder::YxYx => [self.y1, self.x1, self.y2, self.x2],
        }
    }

    /// Width, or zero for an inverted box.
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Height, or zero for an inverted box.
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Area; zero when either side is zero or negative.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Area of the overlap with `other`.
    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection-over-union with `other`, in `[0, 1]`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        iou(self, other)
    }
}

/// Intersection-over-union of two boxes.
///
/// Returns 0 when the union is empty, so degenerate boxes never overlap
/// anything. Non-finite coordinates also yield 0.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let inter = a.intersection(b);
    if inter <= 0.0 {
        return 0.0;
    }
    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    let value = inter / union;
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{iou, BoundingBox, BoxOrder};

    #[test]
    fn raw_order_round_trips() {
        let raw = [1.0, 2.0, 3.0, 4.0];
        let yx = BoundingBox::from_raw(raw, BoxOrder::YxYx);
        assert_eq!(yx, BoundingBox::new(2.0, 1.0, 4.0, 3.0));
        assert_eq!(yx.to_raw(BoxOrder::YxYx), raw);
        assert_eq!(yx.to_raw(BoxOrder::XyXy), [2.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn iou_of_known_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(1.0, 1.0, 11.0, 11.0);
        let expected = 81.0 / 119.0;
        assert!((iou(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn degenerate_boxes_have_zero_area_and_overlap() {
        let point = BoundingBox::new(5.0, 5.0, 5.0, 5.0);
        let inverted = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(point.area(), 0.0);
        assert_eq!(inverted.area(), 0.0);
        assert_eq!(iou(&point, &point), 0.0);
        assert_eq!(iou(&inverted, &BoundingBox::new(0.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        assert_eq!(iou(&a, &b), 0.0);
    }
}
