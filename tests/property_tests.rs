// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use balltrack_rs::detection::ColorDetector;
use balltrack_rs::{ColorRange, FrameGeometry, Offset, TrackerConfig};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use proptest::prelude::*;

const WIDTH: u32 = 200;
const HEIGHT: u32 = 150;

fn detector() -> ColorDetector {
    let range = ColorRange::preset("red").unwrap();
    ColorDetector::new(&TrackerConfig::with_color("red", range))
}

fn geometry() -> FrameGeometry {
    FrameGeometry::new(WIDTH, HEIGHT)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_color_range_validation(lower in any::<[u8; 3]>(), upper in any::<[u8; 3]>()) {
        let valid = (0..3).all(|i| lower[i] <= upper[i]) && upper[0] <= 179;
        prop_assert_eq!(ColorRange::new(lower, upper).is_ok(), valid);
    }

    #[test]
    fn test_gray_frames_have_zero_offset(
        background in any::<u8>(),
        patches in prop::collection::vec((0i32..190, 0i32..140, 5u32..60, 5u32..60, any::<u8>()), 0..6),
    ) {
        let mut frame = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([background; 3]));
        for (x, y, w, h, level) in patches {
            draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(w, h), Rgb([level; 3]));
        }
        let (offset, detection) = detector().compute_offset(&frame, &geometry());
        prop_assert_eq!(offset, Offset::ZERO);
        prop_assert!(detection.is_none());
    }

    #[test]
    fn test_disc_offset_matches_center(cx in 40i32..160, cy in 40i32..110, r in 12i32..30) {
        let mut frame = RgbImage::new(WIDTH, HEIGHT);
        draw_filled_circle_mut(&mut frame, (cx, cy), r, Rgb([255, 0, 0]));

        let geometry = geometry();
        let (offset, _) = detector().compute_offset(&frame, &geometry);
        let expected = geometry.offset_of(cx, cy);
        prop_assert!((offset.x - expected.x).abs() <= 1, "{:?} vs {:?}", offset, expected);
        prop_assert!((offset.y - expected.y).abs() <= 1, "{:?} vs {:?}", offset, expected);

        // 同一帧重复检测结果一致
        let (again, _) = detector().compute_offset(&frame, &geometry);
        prop_assert_eq!(offset, again);
    }

    #[test]
    fn test_small_disc_is_ignored(cx in 20i32..180, cy in 20i32..130, r in 1i32..=6) {
        let mut frame = RgbImage::new(WIDTH, HEIGHT);
        draw_filled_circle_mut(&mut frame, (cx, cy), r, Rgb([255, 0, 0]));
        let (offset, _) = detector().compute_offset(&frame, &geometry());
        prop_assert_eq!(offset, Offset::ZERO);
    }

    #[test]
    fn test_gate_follows_measured_radius(cx in 30i32..170, cy in 30i32..120, r in 7i32..=12) {
        let mut frame = RgbImage::new(WIDTH, HEIGHT);
        draw_filled_circle_mut(&mut frame, (cx, cy), r, Rgb([255, 0, 0]));
        let (offset, detection) = detector().compute_offset(&frame, &geometry());
        let d = detection.unwrap();
        prop_assert_eq!(d.accepted, d.circle.radius > 10.0);
        if !d.accepted {
            prop_assert_eq!(offset, Offset::ZERO);
        }
    }
}
