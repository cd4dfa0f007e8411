use yolov3_decode::{
    decode, AutoDecoder, BoundingBox, BoxOrder, ClassCatalog, DecodeConfig, DecodeError, Decoder,
    IndexTriple, OutputShape, PostNmsDecoder, PreNmsDecoder, RawDetectionOutput, TensorLayout,
    YOLOV3_BOX_COUNT,
};

const N: usize = YOLOV3_BOX_COUNT;

fn empty_tensors(num_classes: usize) -> (Vec<f32>, Vec<f32>) {
    (vec![0.0; N * 4], vec![0.0; N * num_classes])
}

fn set_box(boxes: &mut [f32], n: usize, raw: [f32; 4]) {
    boxes[n * 4..n * 4 + 4].copy_from_slice(&raw);
}

#[test]
fn pre_nms_keeps_only_the_stronger_overlapping_box() {
    let catalog = ClassCatalog::coco();
    let (mut boxes, mut scores) = empty_tensors(catalog.len());
    set_box(&mut boxes, 100, [0.0, 0.0, 10.0, 10.0]);
    set_box(&mut boxes, 5000, [1.0, 1.0, 11.0, 11.0]);
    let class = 2;
    scores[class * N + 100] = 0.9;
    scores[class * N + 5000] = 0.8;

    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores).unwrap();
    let decoder = PreNmsDecoder::new().with_config(DecodeConfig {
        confidence_threshold: 0.3,
        iou_threshold: 0.5,
        ..DecodeConfig::default()
    });
    let dets = decoder.decode(&out, &catalog).unwrap();

    assert_eq!(dets.len(), 1);
    assert_eq!(dets[0].label, "car");
    assert_eq!(dets[0].class_index, 2);
    assert_eq!(dets[0].confidence, 0.9);
    assert_eq!(dets[0].bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn pre_nms_keeps_overlapping_boxes_of_different_classes() {
    let catalog = ClassCatalog::coco();
    let (mut boxes, mut scores) = empty_tensors(catalog.len());
    set_box(&mut boxes, 7, [0.0, 0.0, 10.0, 10.0]);
    scores[7] = 0.9;
    scores[N + 7] = 0.6;

    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores).unwrap();
    let dets = PreNmsDecoder::new().decode(&out, &catalog).unwrap();
    let labels: Vec<_> = dets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["person", "bicycle"]);
}

#[test]
fn post_nms_gathers_box_and_score_by_index() {
    let catalog = ClassCatalog::coco();
    let (mut boxes, mut scores) = empty_tensors(catalog.len());
    set_box(&mut boxes, 5, [11.0, 12.0, 13.0, 14.0]);
    scores[5 + 2 * N] = 0.77;

    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores)
        .unwrap()
        .with_indices(vec![IndexTriple::new(0, 2, 5)]);
    let layout = TensorLayout::yolov3_onnx_nms();
    let dets = PostNmsDecoder::new(layout).decode(&out, &catalog).unwrap();

    assert_eq!(dets.len(), 1);
    assert_eq!(dets[0].confidence, out.scores()[5 + 2 * N]);
    assert_eq!(dets[0].bbox.to_raw(layout.box_order), [11.0, 12.0, 13.0, 14.0]);
    assert_eq!(&out.boxes()[20..24], &dets[0].bbox.to_raw(BoxOrder::YxYx));
    assert_eq!(dets[0].bbox, BoundingBox::new(12.0, 11.0, 14.0, 13.0));
    assert_eq!(dets[0].label, "car");
}

#[test]
fn post_nms_with_no_indices_is_empty_not_an_error() {
    let catalog = ClassCatalog::coco();
    let (boxes, scores) = empty_tensors(catalog.len());
    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores)
        .unwrap()
        .with_indices(Vec::new());

    let dets = AutoDecoder::new().decode(&out, &catalog).unwrap();
    assert!(dets.is_empty());
}

#[test]
fn post_nms_preserves_engine_order() {
    let catalog = ClassCatalog::new(["a", "b", "c"]);
    let shape = OutputShape::new(4, 3);
    let scores: Vec<f32> = (0..12).map(|v| v as f32 / 12.0).collect();
    let out = RawDetectionOutput::new(shape, vec![0.0; 16], scores)
        .unwrap()
        .with_indices(vec![
            IndexTriple::new(0, 2, 0),
            IndexTriple::new(0, 0, 3),
            IndexTriple::new(0, 1, 1),
        ]);

    let dets = decode(&out, &catalog, &DecodeConfig::default()).unwrap();
    let labels: Vec<_> = dets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["c", "a", "b"]);
}

#[test]
fn post_nms_rejects_box_index_past_the_tensor() {
    let catalog = ClassCatalog::coco();
    let (boxes, scores) = empty_tensors(catalog.len());
    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores)
        .unwrap()
        .with_indices(vec![IndexTriple::new(0, 0, N as i64)]);

    let err = AutoDecoder::new().decode(&out, &catalog).unwrap_err();
    assert_eq!(
        err,
        DecodeError::BoxIndexOutOfRange {
            index: N as i64,
            len: N,
        }
    );
}

#[test]
fn decoding_is_deterministic() {
    let catalog = ClassCatalog::coco();
    let (mut boxes, mut scores) = empty_tensors(catalog.len());
    for n in 0..200 {
        let offset = (n % 17) as f32 * 3.0;
        set_box(&mut boxes, n * 50, [offset, offset, offset + 20.0, offset + 25.0]);
        scores[(n % 5) * N + n * 50] = 0.25 + (n % 7) as f32 * 0.1;
    }
    let out = RawDetectionOutput::new(OutputShape::yolov3(catalog.len()), boxes, scores).unwrap();
    let cfg = DecodeConfig {
        confidence_threshold: 0.3,
        iou_threshold: 0.45,
        ..DecodeConfig::default()
    };

    let first = decode(&out, &catalog, &cfg).unwrap();
    for _ in 0..3 {
        assert_eq!(decode(&out, &catalog, &cfg).unwrap(), first);
    }
    assert!(!first.is_empty());
}

#[test]
fn invalid_thresholds_are_reported() {
    let catalog = ClassCatalog::new(["x"]);
    let out = RawDetectionOutput::new(OutputShape::new(1, 1), vec![0.0; 4], vec![0.5]).unwrap();
    let cfg = DecodeConfig {
        confidence_threshold: 1.5,
        ..DecodeConfig::default()
    };
    let err = decode(&out, &catalog, &cfg).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidThreshold {
            name: "confidence_threshold",
            value: 1.5,
        }
    );
}
