// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 颜色空间转换与阈值分割
//! RGB → HSV (OpenCV 8位约定: H ∈ [0,180), S/V ∈ [0,255])

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::config::ColorRange;

/// RGB转HSV (单像素)
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 色调减半以放入 8 位, 180 回绕到 0
    let h8 = (h / 2.0).round() as u32 % 180;

    [h8 as u8, s.round() as u8, v as u8]
}

/// HSV转RGB (h: 角度 0-360, s/v: 0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// 8位 HSV 像素 → RGB 显示色
pub fn hsv8_to_rgb(hsv: [u8; 3]) -> Rgb<u8> {
    let (r, g, b) = hsv_to_rgb(
        hsv[0] as f32 * 2.0,
        hsv[1] as f32 / 255.0,
        hsv[2] as f32 / 255.0,
    );
    Rgb([r, g, b])
}

/// 整帧转换为 HSV (三通道依次为 H, S, V)
pub fn to_hsv(image: &RgbImage) -> RgbImage {
    let mut hsv = RgbImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(hsv.pixels_mut()) {
        let [r, g, b] = src.0;
        *dst = Rgb(rgb_to_hsv(r, g, b));
    }
    hsv
}

/// 阈值分割: 落在范围内的像素置 255, 否则 0
pub fn in_range(hsv: &RgbImage, range: &ColorRange) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
        if range.contains(src.0) {
            *dst = Luma([255]);
        }
    }
    mask
}
