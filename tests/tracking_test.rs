// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 追踪场景测试: 合成帧 → Tracker / run

use std::collections::VecDeque;
use std::fs;
use std::thread;
use std::time::Duration;

use balltrack_rs::input::{ChannelSource, ImageSequenceSource};
use balltrack_rs::output::{ArchiveSink, OffsetWriter};
use balltrack_rs::{
    run, ColorRange, FinishReason, FrameSink, FrameSource, NextFrame, Offset, RawFrame,
    RunOptions, StopHandle, TrackState, Tracker, TrackerConfig,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

struct VecSource {
    frames: VecDeque<RawFrame>,
    calls: usize,
}

impl VecSource {
    fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().map(RawFrame::from_rgb_image).collect(),
            calls: 0,
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> NextFrame {
        self.calls += 1;
        match self.frames.pop_front() {
            Some(frame) => NextFrame::Frame(frame),
            None => NextFrame::EndOfStream,
        }
    }

    fn name(&self) -> &str {
        "vec"
    }
}

fn blue_tracker() -> Tracker {
    let range = ColorRange::preset("blue").unwrap();
    Tracker::new(TrackerConfig::with_color("blue", range)).unwrap()
}

fn frame_with_discs(width: u32, height: u32, discs: &[(i32, i32, i32)]) -> RgbImage {
    let mut frame = RgbImage::new(width, height);
    for &(cx, cy, r) in discs {
        draw_filled_circle_mut(&mut frame, (cx, cy), r, BLUE);
    }
    frame
}

/// 逐帧收集偏移量
fn collect_offsets(tracker: &Tracker, source: &mut VecSource) -> Vec<Offset> {
    let mut offsets = Vec::new();
    let mut state = tracker.start(source);
    while let TrackState::Running(running) = &mut state {
        offsets.push(tracker.detect(running));
        state = tracker.acquire(state, source);
    }
    offsets
}

#[test]
fn test_disc_moving_right() {
    let frames = (0..10)
        .map(|i| frame_with_discs(600, 400, &[(300 + 5 * i, 200, 30)]))
        .collect();
    let mut source = VecSource::new(frames);
    let offsets = collect_offsets(&blue_tracker(), &mut source);

    assert_eq!(offsets.len(), 10);
    for pair in offsets.windows(2) {
        let step = pair[1].x - pair[0].x;
        assert!((4..=6).contains(&step), "step {} in {:?}", step, offsets);
    }
    for offset in &offsets {
        assert!(offset.y.abs() <= 1, "{:?}", offsets);
    }
    assert!(offsets[0].x.abs() <= 1);
}

#[test]
fn test_larger_disc_wins() {
    let frame = frame_with_discs(600, 400, &[(150, 150, 20), (420, 250, 50)]);
    let mut source = VecSource::new(vec![frame]);
    let offsets = collect_offsets(&blue_tracker(), &mut source);

    let offset = offsets[0];
    assert!((offset.x - 120).abs() <= 1, "{:?}", offset);
    assert!((offset.y + 50).abs() <= 1, "{:?}", offset);
}

#[test]
fn test_large_frames_are_scaled_to_working_width() {
    let frame = frame_with_discs(1200, 800, &[(840, 260, 80)]);
    let tracker = blue_tracker();
    let mut source = VecSource::new(vec![frame]);

    let mut state = tracker.start(&mut source);
    let TrackState::Running(running) = &mut state else {
        panic!("expected running state");
    };
    assert_eq!(running.frame().dimensions(), (600, 400));

    let offset = tracker.detect(running);
    assert!((offset.x - 120).abs() <= 1, "{:?}", offset);
    assert!((offset.y - 70).abs() <= 1, "{:?}", offset);
}

#[test]
fn test_acquire_resets_offset() {
    let tracker = blue_tracker();
    let mut source = VecSource::new(vec![
        frame_with_discs(600, 400, &[(450, 200, 30)]),
        RgbImage::new(600, 400),
    ]);

    let mut state = tracker.start(&mut source);
    if let TrackState::Running(running) = &mut state {
        assert_ne!(tracker.detect(running), Offset::ZERO);
    }
    let state = tracker.acquire(state, &mut source);
    let running = state.as_running().unwrap();
    assert_eq!(running.offset(), Offset::ZERO);
    assert!(running.detection().is_none());
}

#[test]
fn test_render_keeps_offset() {
    let tracker = blue_tracker();
    let mut source = VecSource::new(vec![frame_with_discs(600, 400, &[(200, 100, 40)])]);
    let mut state = tracker.start(&mut source);
    let TrackState::Running(running) = &mut state else {
        panic!("expected running state");
    };
    let offset = tracker.detect(running);
    let annotated = tracker.render(running);
    assert_eq!(annotated.dimensions(), (600, 400));
    assert_eq!(running.offset(), offset);
    assert_eq!(tracker.detect(running), offset);
}

#[test]
fn test_end_of_stream_on_first_call() {
    let tracker = blue_tracker();
    let mut source = VecSource::new(vec![]);
    let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();

    let summary = run(&tracker, &mut source, &mut sinks, &RunOptions::default());
    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.detections, 0);
    assert_eq!(summary.finished, FinishReason::EndOfStream);
    assert_eq!(source.calls, 1);
}

#[test]
fn test_frame_limit_stops_run() {
    let tracker = blue_tracker();
    let frames = (0..5)
        .map(|_| frame_with_discs(600, 400, &[(300, 200, 30)]))
        .collect();
    let mut source = VecSource::new(frames);
    let options = RunOptions {
        max_frames: Some(3),
        ..RunOptions::default()
    };

    let summary = run(&tracker, &mut source, &mut [], &options);
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.detections, 3);
    assert_eq!(summary.finished, FinishReason::Stopped);
    assert_eq!(source.calls, 3);
}

#[test]
fn test_stop_request_before_run() {
    let tracker = blue_tracker();
    let mut source = VecSource::new(vec![RgbImage::new(600, 400), RgbImage::new(600, 400)]);
    let options = RunOptions::default();
    options.stop.request();

    let summary = run(&tracker, &mut source, &mut [], &options);
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.finished, FinishReason::Stopped);
}

#[test]
fn test_stop_while_waiting_on_live_source() {
    let tracker = blue_tracker();
    let stop = StopHandle::new();
    let (tx, source) = ChannelSource::bounded("live", 2, stop.clone());
    let mut source = source.with_poll_interval(Duration::from_millis(5));
    tx.send(RawFrame::from_rgb_image(RgbImage::new(600, 400))).unwrap();

    let stopper = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stop.request();
        })
    };
    let options = RunOptions {
        stop,
        max_frames: None,
    };
    let summary = run(&tracker, &mut source, &mut [], &options);
    stopper.join().unwrap();
    drop(tx);

    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.finished, FinishReason::Stopped);
}

#[test]
fn test_image_sequence_to_offsets_and_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("frames");
    fs::create_dir(&input).unwrap();
    for (i, cx) in [300, 350, 400].into_iter().enumerate() {
        frame_with_discs(600, 400, &[(cx, 200, 30)])
            .save(input.join(format!("{:03}.png", i)))
            .unwrap();
    }
    fs::write(input.join("notes.txt"), "not an image").unwrap();

    let offsets_path = tmp.path().join("offsets.jsonl");
    let archive = ArchiveSink::in_dir(tmp.path().join("archive"), 2).unwrap();
    let writer = OffsetWriter::new(fs::File::create(&offsets_path).unwrap());
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(archive), Box::new(writer)];

    let mut source = ImageSequenceSource::open(&input).unwrap();
    let summary = run(&blue_tracker(), &mut source, &mut sinks, &RunOptions::default());
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.detections, 3);
    assert_eq!(summary.finished, FinishReason::EndOfStream);

    let text = fs::read_to_string(&offsets_path).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record["frame_id"], i as u64);
        assert_eq!(record["detected"], true);
        let x = record["x"].as_i64().unwrap();
        assert!((x - 50 * i as i64).abs() <= 1, "{}", text);
    }

    let archived = fs::read_dir(tmp.path().join("archive")).unwrap().count();
    assert_eq!(archived, 2);
}
