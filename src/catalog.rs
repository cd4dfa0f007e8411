//! Ordered class names addressed by class index.

use crate::util::{DecodeError, DecodeResult};

/// The 80 COCO class names in the order the reference YOLOv3 weights use.
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorbike",
    "aeroplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "sofa",
    "pottedplant",
    "bed",
    "diningtable",
    "toilet",
    "tvmonitor",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// The 18 document-layout region classes of the `bboxes`/`classes` export.
pub const DOCUMENT_LAYOUT_CLASSES: [&str; 18] = [
    "caption",
    "chart",
    "credit",
    "drop-capital",
    "floating",
    "footer",
    "frame",
    "graphics",
    "header",
    "heading",
    "image",
    "linedrawing",
    "maths",
    "noise",
    "page-number",
    "paragraph",
    "separator",
    "table",
];

/// Read-only, index-addressable list of class names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Creates a catalog from names in class-index order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The COCO catalog.
    pub fn coco() -> Self {
        Self::new(COCO_CLASSES)
    }

    /// The document-layout catalog.
    pub fn document_layout() -> Self {
        Self::new(DOCUMENT_LAYOUT_CLASSES)
    }

    /// Parses a labels file with one class name per line.
    ///
    /// Surrounding whitespace is trimmed and blank lines are skipped.
    pub fn from_lines(text: &str) -> DecodeResult<Self> {
        let catalog = Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        );
        if catalog.is_empty() {
            return Err(DecodeError::InvalidInput("labels file has no class names"));
        }
        Ok(catalog)
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the catalog has no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name of class `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the name of class `index` or a `ClassIndexOutOfRange` error.
    pub fn label(&self, index: i64) -> DecodeResult<&str> {
        crate::util::math::index_in(index, self.names.len())
            .and_then(|idx| self.get(idx))
            .ok_or(DecodeError::ClassIndexOutOfRange {
                index,
                len: self.names.len(),
            })
    }

    /// Iterates over the names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
