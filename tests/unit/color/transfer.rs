use super::*;

fn gradient(width: u32, height: u32, base: [u8; 3], step: u8) -> Frame {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let k = ((x + y) as u8).wrapping_mul(step);
            data.extend_from_slice(&[
                base[0].saturating_add(k),
                base[1].saturating_add(k / 2),
                base[2].saturating_add(k / 3),
                255,
            ]);
        }
    }
    Frame::new(width, height, data).unwrap()
}

fn mean_l(frame: &Frame) -> f64 {
    LabStats::measure(frame).unwrap().mean[0]
}

#[test]
fn output_keeps_frame_dimensions_with_mismatched_reference() {
    let reference = gradient(7, 3, [120, 80, 60], 9);
    let frame = gradient(4, 5, [20, 30, 40], 11);
    let out = correct(&reference, &frame).unwrap();
    assert_eq!((out.width, out.height), (4, 5));
    assert_eq!(out.data.len(), 4 * 5 * 4);
}

#[test]
fn zero_variance_channels_do_not_blow_up() {
    let flat_ref = Frame::solid(3, 3, [90, 90, 90, 255]);
    let flat_frame = Frame::solid(5, 2, [10, 200, 30, 255]);

    let out = correct(&flat_ref, &flat_frame).unwrap();
    assert_eq!((out.width, out.height), (5, 2));
    // A flat frame graded against a flat reference lands on the reference color.
    for px in out.data.chunks_exact(4) {
        assert!((i16::from(px[0]) - 90).abs() <= 1);
        assert!((i16::from(px[1]) - 90).abs() <= 1);
        assert!((i16::from(px[2]) - 90).abs() <= 1);
    }

    let varied = gradient(4, 4, [10, 10, 10], 13);
    assert!(correct(&flat_ref, &varied).is_ok());
    assert!(correct(&varied, &flat_frame).is_ok());
}

#[test]
fn grading_moves_brightness_toward_reference() {
    let bright = gradient(6, 6, [200, 190, 180], 5);
    let dark = gradient(6, 6, [20, 25, 30], 5);
    let out = correct(&bright, &dark).unwrap();
    assert!(mean_l(&out) > mean_l(&dark) + 30.0);
    assert!((mean_l(&out) - mean_l(&bright)).abs() < 5.0);
}

#[test]
fn self_reference_is_near_identity() {
    let frame = gradient(8, 8, [60, 100, 140], 7);
    let out = correct(&frame, &frame).unwrap();
    for (a, b) in out.data.iter().zip(frame.data.iter()) {
        assert!((i16::from(*a) - i16::from(*b)).abs() <= 1);
    }
}

#[test]
fn alpha_channel_is_preserved() {
    let reference = gradient(2, 2, [100, 100, 100], 40);
    let mut frame = gradient(2, 2, [10, 20, 30], 40);
    frame.data[3] = 17;
    frame.data[7] = 0;
    let out = correct(&reference, &frame).unwrap();
    assert_eq!(out.data[3], 17);
    assert_eq!(out.data[7], 0);
}

#[test]
fn grading_is_deterministic() {
    let reference = gradient(5, 4, [150, 90, 70], 9);
    let frame = gradient(9, 2, [30, 60, 90], 3);
    assert_eq!(
        correct(&reference, &frame).unwrap(),
        correct(&reference, &frame).unwrap()
    );
}

#[test]
fn empty_or_malformed_frames_are_pipeline_errors() {
    let reference = gradient(2, 2, [1, 2, 3], 1);
    let empty = Frame {
        width: 0,
        height: 0,
        data: Vec::new(),
    };
    assert!(matches!(
        correct(&reference, &empty),
        Err(TalkheadError::Pipeline(_))
    ));

    let truncated = Frame {
        width: 2,
        height: 2,
        data: vec![0; 7],
    };
    assert!(matches!(
        correct(&truncated, &reference),
        Err(TalkheadError::Pipeline(_))
    ));
}
