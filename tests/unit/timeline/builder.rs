use super::*;
use crate::foundation::core::MouthShape::{A, B, C, E, X};

fn ev(timestamp: f64, shape: MouthShape) -> VisemeEvent {
    VisemeEvent::new(timestamp, shape)
}

fn spans(schedule: &FrameSchedule) -> Vec<(f64, f64, MouthShape)> {
    schedule
        .segments()
        .iter()
        .map(|s| (s.start, s.end, s.shape))
        .collect()
}

fn frames(shapes: &[MouthShape]) -> FrameSet {
    shapes
        .iter()
        .map(|s| (*s, PathBuf::from("/work/frames").join(s.file_name())))
        .collect()
}

#[test]
fn trailing_audio_holds_last_shape() {
    let schedule = TimelineBuilder::new(3.0)
        .build(&[ev(1.0, A), ev(2.5, B)])
        .unwrap();
    assert_eq!(
        spans(&schedule),
        vec![(0.0, 1.0, A), (1.0, 2.5, B), (2.5, 3.0, B)]
    );
}

#[test]
fn zero_length_interval_is_dropped() {
    let schedule = TimelineBuilder::new(1.0)
        .build(&[ev(1.0, A), ev(1.0, B)])
        .unwrap();
    assert_eq!(spans(&schedule), vec![(0.0, 1.0, A)]);
}

#[test]
fn full_coverage_adds_no_tail() {
    let schedule = TimelineBuilder::new(2.0)
        .build(&[ev(0.5, X), ev(2.0, C)])
        .unwrap();
    assert_eq!(spans(&schedule), vec![(0.0, 0.5, X), (0.5, 2.0, C)]);
    assert_eq!(schedule.segments().last().unwrap().end, 2.0);
}

#[test]
fn overhanging_events_are_clamped_to_audio() {
    let schedule = TimelineBuilder::new(2.0)
        .build(&[ev(1.0, A), ev(2.4, B), ev(3.0, C)])
        .unwrap();
    assert_eq!(spans(&schedule), vec![(0.0, 1.0, A), (1.0, 2.0, B)]);
    assert_eq!(schedule.segments().last().unwrap().end, 2.0);
}

#[test]
fn non_monotonic_timestamps_never_overlap() {
    let schedule = TimelineBuilder::new(4.0)
        .build(&[ev(2.0, A), ev(1.5, B), ev(3.0, E)])
        .unwrap();
    assert_eq!(spans(&schedule), vec![(0.0, 2.0, A), (2.0, 3.0, E), (3.0, 4.0, E)]);

    let segs = schedule.segments();
    for pair in segs.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(schedule.total_duration(), 4.0);
}

#[test]
fn backwards_final_timestamp_tails_from_latest_time() {
    let schedule = TimelineBuilder::new(3.0)
        .build(&[ev(2.0, A), ev(1.0, C)])
        .unwrap();
    assert_eq!(spans(&schedule), vec![(0.0, 2.0, A), (2.0, 3.0, C)]);
    assert_eq!(schedule.total_duration(), 3.0);
}

#[test]
fn nothing_displayable_is_malformed() {
    let err = TimelineBuilder::new(0.0)
        .build(&[ev(0.5, A), ev(1.0, B)])
        .unwrap_err();
    assert!(matches!(err, LipsyncError::MalformedTimeline(_)));
    assert!(err.to_string().contains("no displayable segments"));
}

#[test]
fn increasing_events_are_contiguous_and_cover_audio() {
    let events = (1..=40)
        .map(|i| ev(f64::from(i) * 0.137, MouthShape::ALL[i as usize % 9]))
        .collect::<Vec<_>>();
    let duration = 6.01;
    let schedule = TimelineBuilder::new(duration).build(&events).unwrap();

    let segs = schedule.segments();
    assert_eq!(segs.first().unwrap().start, 0.0);
    for pair in segs.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(segs.last().unwrap().end, duration);
    assert!((schedule.total_duration() - duration).abs() < 1e-9);
    assert_eq!(schedule.audio_duration(), duration);
}

#[test]
fn empty_events_are_malformed() {
    let err = TimelineBuilder::new(1.0).build(&[]).unwrap_err();
    assert!(matches!(err, LipsyncError::MalformedTimeline(_)));
}

#[test]
fn invalid_audio_duration_is_malformed() {
    for duration in [f64::NAN, f64::INFINITY, -1.0] {
        let err = TimelineBuilder::new(duration)
            .build(&[ev(1.0, A)])
            .unwrap_err();
        assert!(matches!(err, LipsyncError::MalformedTimeline(_)));
    }
}

#[test]
fn resolve_substitutes_rest_frame_and_records_it() {
    let schedule = TimelineBuilder::new(3.0)
        .build(&[ev(1.0, A), ev(2.0, E), ev(3.0, A)])
        .unwrap();
    let resolved = schedule.resolve(&frames(&[A, X])).unwrap();

    let paths = resolved
        .entries()
        .iter()
        .map(|e| e.frame.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/work/frames/mouth_A.png"),
            PathBuf::from("/work/frames/mouth_X.png"),
            PathBuf::from("/work/frames/mouth_A.png"),
        ]
    );
    assert_eq!(resolved.entries()[1].shape, X);
    assert_eq!(
        resolved.substitutions(),
        &[Substitution {
            index: 1,
            requested: E,
            used: X,
        }]
    );
}

#[test]
fn resolve_without_rest_frame_fails_instead_of_emitting_missing_path() {
    let schedule = TimelineBuilder::new(2.0)
        .build(&[ev(1.0, A), ev(2.0, B)])
        .unwrap();
    let err = schedule.resolve(&frames(&[A])).unwrap_err();
    assert!(matches!(err, LipsyncError::Configuration(_)));
    assert!(err.to_string().contains("mouth_X.png"));

    // Nothing to substitute: a missing rest frame is irrelevant.
    let resolved = schedule.resolve(&frames(&[A, B])).unwrap();
    assert!(resolved.substitutions().is_empty());
    assert_eq!(resolved.len(), 2);
}
