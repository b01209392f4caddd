use super::*;
use crate::color::transfer::correct;

fn ramp_sequence(n: u8) -> FrameSequence {
    let frames = (0..n)
        .map(|i| {
            let mut data = Vec::new();
            for p in 0..6u8 {
                data.extend_from_slice(&[i.wrapping_mul(20), p * 30, 90, 255]);
            }
            Frame::new(3, 2, data).unwrap()
        })
        .collect();
    FrameSequence::new(frames, Fps::new(24, 1).unwrap()).unwrap()
}

fn reference_frame() -> Frame {
    let mut data = Vec::new();
    for p in 0..16u8 {
        data.extend_from_slice(&[180, 120 + p, 100 + p * 2, 255]);
    }
    Frame::new(4, 4, data).unwrap()
}

fn reference() -> ReferenceImage {
    ReferenceImage::new(reference_frame()).unwrap()
}

#[test]
fn output_is_index_aligned_with_input() {
    let seq = ramp_sequence(12);
    let reference = reference();
    let cache = CorrectionCache::new(&CorrectionThreading::default()).unwrap();
    let out = cache.build_all(&seq, &reference).unwrap();

    assert_eq!(out.len() as u64, seq.duration_frames());
    assert_eq!(out.fps(), seq.fps());
    for (i, frame) in seq.frames().iter().enumerate() {
        let expected = correct(&reference_frame(), frame).unwrap();
        assert_eq!(out.frames()[i].as_ref(), &expected, "frame {i}");
    }
}

#[test]
fn parallel_and_serial_builds_are_bit_identical() {
    let seq = ramp_sequence(20);
    let reference = reference();
    let serial = CorrectionCache::new(&CorrectionThreading {
        parallel: false,
        threads: None,
    })
    .unwrap();
    let parallel = CorrectionCache::new(&CorrectionThreading {
        parallel: true,
        threads: Some(3),
    })
    .unwrap();

    let a = serial.build_all(&seq, &reference).unwrap();
    let b = parallel.build_all(&seq, &reference).unwrap();
    let c = parallel.build_all(&seq, &reference).unwrap();
    assert_eq!(a.frames(), b.frames());
    assert_eq!(b.frames(), c.frames());
}

#[test]
fn one_bad_frame_fails_the_whole_job() {
    let mut frames: Vec<Frame> = ramp_sequence(4)
        .frames()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    frames[2].data.truncate(5);
    let seq = FrameSequence::new(frames, Fps::new(24, 1).unwrap()).unwrap();

    let cache = CorrectionCache::new(&CorrectionThreading::default()).unwrap();
    let err = cache.build_all(&seq, &reference()).unwrap_err();
    assert!(matches!(err, TalkheadError::Pipeline(ref m) if m.contains("frame 2")));
}

#[test]
fn zero_threads_is_rejected() {
    let err = CorrectionCache::new(&CorrectionThreading {
        parallel: true,
        threads: Some(0),
    })
    .err()
    .unwrap();
    assert!(matches!(err, TalkheadError::Validation(_)));
}
