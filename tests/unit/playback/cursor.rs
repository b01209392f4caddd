use super::*;

#[test]
fn one_shot_cursor_visits_every_index_once() {
    let mut cursor = PlaybackCursor::once(3);
    let seen: Vec<u64> = std::iter::from_fn(|| cursor.advance()).map(|i| i.0).collect();
    assert_eq!(seen, vec![0, 1, 2]);
    assert!(cursor.is_finished());
    assert_eq!(cursor.advance(), None);
}

#[test]
fn looping_cursor_wraps_after_last_frame() {
    let mut cursor = PlaybackCursor::looping(3);
    let seen: Vec<u64> = (0..7).filter_map(|_| cursor.advance()).map(|i| i.0).collect();
    assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    assert!(!cursor.is_finished());
}

#[test]
fn empty_sequences_yield_nothing() {
    assert_eq!(PlaybackCursor::looping(0).advance(), None);
    assert_eq!(PlaybackCursor::once(0).advance(), None);
}
