// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测器 (Detector)
//! 职责: 工作帧 → 模糊 → HSV阈值 → 开运算 → 外轮廓 → 最大轮廓质心 → 偏移量

use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};
use tracing::trace;

use super::color::{in_range, to_hsv};
use super::contour::{contour_area, min_enclosing_circle, polygon_moments};
use super::types::{Detection, FrameGeometry, Offset};
use crate::config::{ColorRange, TrackerConfig};

/// 基于颜色的单目标检测器 (无状态, 给定帧和颜色范围结果确定)
#[derive(Clone, Debug)]
pub struct ColorDetector {
    color_range: ColorRange,
    min_radius: f32,
    morph_iterations: u8,
    blur_sigma: f32,
}

impl ColorDetector {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            color_range: config.color_range,
            min_radius: config.min_radius,
            morph_iterations: config.morph_iterations,
            blur_sigma: config.blur_sigma,
        }
    }

    pub fn color_range(&self) -> &ColorRange {
        &self.color_range
    }

    /// 步骤1-4: 模糊 → HSV → 阈值 → 腐蚀+膨胀
    pub fn mask(&self, frame: &RgbImage) -> GrayImage {
        // 1. 高斯模糊抑制传感器噪声
        let blurred = gaussian_blur_f32(frame, self.blur_sigma);

        // 2-3. HSV 阈值
        let hsv = to_hsv(&blurred);
        let mask = in_range(&hsv, &self.color_range);

        // 4. 开运算: 3x3 结构元迭代 k 次等价于 L∞ 距离 k
        if self.morph_iterations == 0 {
            return mask;
        }
        let eroded = erode(&mask, Norm::LInf, self.morph_iterations);
        dilate(&eroded, Norm::LInf, self.morph_iterations)
    }

    /// 步骤5-8: 提取外轮廓并选出最大者
    ///
    /// 返回 None 表示本帧无候选 (无轮廓 / 空帧 / M00 为零)
    pub fn detect(&self, frame: &RgbImage) -> Option<Detection> {
        if frame.width() == 0 || frame.height() == 0 {
            return None;
        }

        let mask = self.mask(frame);

        // 5. 只保留最外层边界
        let contours: Vec<Contour<i32>> = find_contours::<i32>(&mask)
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .collect();

        if contours.is_empty() {
            return None;
        }

        // 7. 面积最大的轮廓 (面积相等时取先出现者)
        let mut best: Option<(usize, f64)> = None;
        for (index, contour) in contours.iter().enumerate() {
            let area = contour_area(&contour.points);
            match best {
                Some((_, best_area)) if area <= best_area => {}
                _ => best = Some((index, area)),
            }
        }
        let (index, area) = best?;
        let selected = &contours[index];

        let moments = polygon_moments(&selected.points);
        let Some((cx, cy)) = moments.centroid() else {
            trace!("最大轮廓面积为零, 视为未检测");
            return None;
        };
        let circle = min_enclosing_circle(&selected.points)?;

        // 8. 最小半径门限: 比较掩码轮廓的外接圆半径 (含模糊扩散), 而非目标真实半径
        let accepted = circle.radius > self.min_radius;

        Some(Detection {
            candidates: contours.len(),
            area,
            circle,
            centroid: (cx as f32, cy as f32),
            accepted,
        })
    }

    /// 完整检测: 返回偏移量与检测结果
    pub fn compute_offset(
        &self,
        frame: &RgbImage,
        geometry: &FrameGeometry,
    ) -> (Offset, Option<Detection>) {
        let detection = self.detect(frame);
        let offset = match &detection {
            Some(d) if d.accepted => {
                let (px, py) = d.centroid_px();
                geometry.offset_of(px, py)
            }
            _ => Offset::ZERO,
        };
        (offset, detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MIN_RADIUS;
    use image::Rgb;
    use imageproc::drawing::draw_filled_circle_mut;

    fn detector() -> ColorDetector {
        let range = ColorRange::new([50, 100, 100], [70, 255, 255]).unwrap();
        ColorDetector::new(&TrackerConfig::with_color("green", range))
    }

    fn frame_with_disc(cx: i32, cy: i32, radius: i32) -> RgbImage {
        let mut frame = RgbImage::new(600, 400);
        draw_filled_circle_mut(&mut frame, (cx, cy), radius, Rgb([0, 200, 0]));
        frame
    }

    #[test]
    fn test_empty_frame_has_no_detection() {
        let detector = detector();
        assert!(detector.detect(&RgbImage::new(0, 0)).is_none());
        assert!(detector.detect(&RgbImage::new(600, 400)).is_none());
    }

    #[test]
    fn test_disc_centroid_and_radius() {
        let detection = detector().detect(&frame_with_disc(420, 130, 40)).unwrap();
        assert!(detection.accepted);
        assert_eq!(detection.candidates, 1);
        assert!((detection.centroid.0 - 420.0).abs() <= 1.5);
        assert!((detection.centroid.1 - 130.0).abs() <= 1.5);
        assert!((detection.circle.radius - 40.0).abs() <= 3.0);
    }

    #[test]
    fn test_small_disc_is_gated() {
        let detector = detector();
        let frame = frame_with_disc(300, 200, 7);
        let geometry = FrameGeometry::new(600, 400);
        let (offset, detection) = detector.compute_offset(&frame, &geometry);
        assert_eq!(offset, Offset::ZERO);
        if let Some(d) = detection {
            assert!(!d.accepted);
        }
    }

    fn detector_with_gate(min_radius: f32) -> ColorDetector {
        let range = ColorRange::new([50, 100, 100], [70, 255, 255]).unwrap();
        ColorDetector::new(&TrackerConfig {
            min_radius,
            ..TrackerConfig::with_color("green", range)
        })
    }

    #[test]
    fn test_gate_boundary_on_measured_radius() {
        let frame = frame_with_disc(420, 130, 10);
        let geometry = FrameGeometry::new(600, 400);
        let measured = detector().detect(&frame).unwrap().circle.radius;

        // 半径等于门限: 拒绝
        let (offset, detection) = detector_with_gate(measured).compute_offset(&frame, &geometry);
        assert_eq!(offset, Offset::ZERO);
        assert!(!detection.unwrap().accepted);

        // 略大于门限: 接受
        let (offset, detection) =
            detector_with_gate(measured - 0.01).compute_offset(&frame, &geometry);
        assert!(detection.unwrap().accepted);
        assert!((offset.x - 120).abs() <= 1 && (offset.y - 70).abs() <= 1, "{:?}", offset);
    }

    #[test]
    fn test_blur_spread_counts_towards_radius() {
        // 低亮度下界的范围会把模糊边缘也纳入掩码
        let range = ColorRange::preset("blue").unwrap();
        let detector = ColorDetector::new(&TrackerConfig::with_color("blue", range));
        let geometry = FrameGeometry::new(600, 400);

        for (radius, expect_accepted) in [(8, false), (10, true)] {
            let mut frame = RgbImage::new(600, 400);
            draw_filled_circle_mut(&mut frame, (400, 100), radius, Rgb([0, 0, 255]));
            let (offset, detection) = detector.compute_offset(&frame, &geometry);
            let d = detection.unwrap();
            assert!(d.circle.radius > radius as f32, "r={} measured {}", radius, d.circle.radius);
            assert_eq!(d.accepted, d.circle.radius > DEFAULT_MIN_RADIUS);
            assert_eq!(d.accepted, expect_accepted, "r={} measured {}", radius, d.circle.radius);
            assert_eq!(offset.is_zero(), !expect_accepted);
        }
    }

    #[test]
    fn test_speckle_noise_removed_by_opening() {
        let mut frame = RgbImage::new(600, 400);
        for (x, y) in [(10, 10), (100, 300), (550, 50), (420, 390)] {
            frame.put_pixel(x, y, Rgb([0, 255, 0]));
        }
        let mask = detector().mask(&frame);
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }
}
