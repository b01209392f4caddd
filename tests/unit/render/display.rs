use super::*;

#[test]
fn ffplay_timestamps_frames_on_arrival() {
    let args = ffplay_args(
        "Video Output",
        CanvasSize {
            width: 1080,
            height: 1080,
        },
    );
    let input = args.iter().position(|a| a == "-i").unwrap();
    let wallclock = args
        .iter()
        .position(|a| a == "-use_wallclock_as_timestamps")
        .unwrap();
    assert!(wallclock < input, "input option must precede -i");
    assert_eq!(args[wallclock + 1], "1");
    assert_eq!(args[input + 1], "pipe:0");
    assert!(args.windows(2).any(|w| w[0] == "-video_size" && w[1] == "1080x1080"));
    assert!(!args.iter().any(|a| a == "-framerate" || a == "-re"));
}

#[test]
fn in_memory_display_records_every_present() {
    let mut display = InMemoryDisplay::new();
    let size = CanvasSize {
        width: 4,
        height: 4,
    };
    let canvas = Canvas::new(size, [9, 9, 9, 255]);
    let info = PresentInfo {
        owner: Owner::Idle,
        index: Some(3),
        origin: (1, 1),
        canvas: size,
    };
    let observer = display.clone();

    display.present(&canvas, &info).unwrap();
    display.present(&canvas, &info).unwrap();

    assert_eq!(observer.presents(), vec![info, info]);
    assert_eq!(&observer.last_canvas().unwrap().pixels()[..4], &[9, 9, 9, 255]);
}
