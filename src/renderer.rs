// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 叠加层渲染 (Overlay Renderer)
//!
//! 在工作帧副本上绘制: 颜色标签、外接圆、质心、中心→目标方向箭头。
//! 纯展示用途, 不影响偏移量和状态机。

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use tracing::{info, warn};

use crate::config::TrackerConfig;
use crate::detection::color::hsv8_to_rgb;
use crate::detection::types::{Detection, FrameGeometry, Offset};

const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 255, 0]); // 黄
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]); // 红
const ARROW_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const MARKER_RADIUS: i32 = 5;
const ARROW_THICKNESS: i32 = 5;
const ARROW_TIP_RATIO: f32 = 0.1;
const SWATCH_SIZE: u32 = 24;
const LABEL_SCALE: f32 = 22.0;

pub struct OverlayRenderer {
    label: String,
    swatch: Rgb<u8>,
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(config: &TrackerConfig) -> Self {
        let font = config.label_font.as_deref().and_then(load_font);
        if font.is_none() {
            info!("🔤 未配置标签字体, 仅绘制颜色色块");
        }
        Self {
            label: format!("Color: {}", config.color_name),
            swatch: hsv8_to_rgb(config.color_range.midpoint()),
            font,
        }
    }

    /// 生成带标注的帧副本
    pub fn render(
        &self,
        frame: &RgbImage,
        geometry: &FrameGeometry,
        offset: Offset,
        detection: Option<&Detection>,
    ) -> RgbImage {
        let mut canvas = frame.clone();

        self.draw_label(&mut canvas);

        if let Some(d) = detection.filter(|d| d.accepted) {
            let center = (d.circle.cx.round() as i32, d.circle.cy.round() as i32);
            let radius = d.circle.radius.round() as i32;
            // 线宽2
            draw_hollow_circle_mut(&mut canvas, center, radius, CIRCLE_COLOR);
            draw_hollow_circle_mut(&mut canvas, center, radius + 1, CIRCLE_COLOR);

            draw_filled_circle_mut(&mut canvas, d.centroid_px(), MARKER_RADIUS, MARKER_COLOR);
        }

        let start = (geometry.midx, geometry.midy);
        let end = geometry.point_of(offset);
        draw_arrow(&mut canvas, start, end, ARROW_COLOR);

        canvas
    }

    fn draw_label(&self, canvas: &mut RgbImage) {
        let swatch = Rect::at(8, 8).of_size(SWATCH_SIZE, SWATCH_SIZE);
        draw_filled_rect_mut(canvas, swatch, self.swatch);
        draw_hollow_rect_mut(canvas, swatch, LABEL_COLOR);

        if let Some(font) = &self.font {
            draw_text_mut(
                canvas,
                LABEL_COLOR,
                8 + SWATCH_SIZE as i32 + 8,
                8,
                LABEL_SCALE,
                font,
                &self.label,
            );
        }
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("⚠️ 字体读取失败 {}: {}", path.display(), e);
            return None;
        }
    };
    match FontVec::try_from_vec(bytes) {
        Ok(font) => {
            info!("✅ 标签字体加载成功: {}", path.display());
            Some(font)
        }
        Err(e) => {
            warn!("⚠️ 字体解析失败 {}: {}", path.display(), e);
            None
        }
    }
}

/// 粗线箭头 (箭头长度为线长的 10%, 与 cv2.arrowedLine 一致)
fn draw_arrow(canvas: &mut RgbImage, start: (i32, i32), end: (i32, i32), color: Rgb<u8>) {
    if start == end {
        return;
    }
    let (x0, y0) = (start.0 as f32, start.1 as f32);
    let (x1, y1) = (end.0 as f32, end.1 as f32);

    draw_thick_line(canvas, (x0, y0), (x1, y1), color);

    let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
    let tip = len * ARROW_TIP_RATIO;
    let angle = (y0 - y1).atan2(x0 - x1);
    for side in [std::f32::consts::FRAC_PI_4, -std::f32::consts::FRAC_PI_4] {
        let wing = (x1 + tip * (angle + side).cos(), y1 + tip * (angle + side).sin());
        draw_thick_line(canvas, (x1, y1), wing, color);
    }
}

fn draw_thick_line(canvas: &mut RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    // 单位法向量
    let (nx, ny) = (-dy / len, dx / len);
    let half = ARROW_THICKNESS / 2;
    for i in -half..=half {
        let shift = i as f32;
        draw_line_segment_mut(
            canvas,
            (start.0 + nx * shift, start.1 + ny * shift),
            (end.0 + nx * shift, end.1 + ny * shift),
            color,
        );
    }
}
