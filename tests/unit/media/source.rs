use super::*;

#[test]
fn empty_sequence_is_zero_duration_error() {
    let err = FrameSequence::new(Vec::new(), Fps::new(24, 1).unwrap()).unwrap_err();
    assert!(matches!(err, TalkheadError::AssetLoad(_)));
}

#[test]
fn sequence_indexes_frames_in_order() {
    let frames = (0..3u8).map(|i| Frame::solid(1, 1, [i, i, i, 255])).collect();
    let seq = FrameSequence::new(frames, Fps::new(24, 1).unwrap()).unwrap();
    assert_eq!(seq.duration_frames(), 3);
    assert_eq!(seq.get(FrameIndex(2)).unwrap().data[0], 2);
    assert!(seq.get(FrameIndex(3)).is_none());
}

#[test]
fn audio_track_duration_counts_sample_frames() {
    let track = AudioTrack {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.0; 16],
    };
    assert_eq!(track.frames(), 8);
    assert_eq!(track.duration(), Duration::from_secs(2));
    assert!(AudioTrack::silent(48_000, 2).is_empty());
}

#[test]
fn missing_file_is_asset_load_error() {
    let err = FfmpegSource::new()
        .load(Path::new("/definitely/not/here.mp4"))
        .unwrap_err();
    assert!(matches!(err, TalkheadError::AssetLoad(_)));
}
