// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 原始帧与工作帧
//! Raw frames delivered by sources, normalized to the fixed working width

use fast_image_resize as fr;
use image::{DynamicImage, RgbImage};

use crate::error::{Result, TrackError};

/// 像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// 原始帧 (输入源 → 追踪器)
#[derive(Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl RawFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    pub fn from_rgb_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelFormat::Rgb8, image.into_raw())
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgb_image(image.to_rgb8())
    }

    /// 零尺寸或数据长度与尺寸不符
    pub fn is_degenerate(&self) -> bool {
        let expected = self.width as usize * self.height as usize * self.format.channels();
        self.width == 0 || self.height == 0 || self.data.len() != expected
    }

    /// RGBA → RGB (丢弃 Alpha), 退化帧返回 None
    pub fn into_rgb(self) -> Option<RgbImage> {
        if self.is_degenerate() {
            return None;
        }
        let data = match self.format {
            PixelFormat::Rgb8 => self.data,
            PixelFormat::Rgba8 => {
                let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
                for chunk in self.data.chunks_exact(4) {
                    rgb.push(chunk[0]); // R
                    rgb.push(chunk[1]); // G
                    rgb.push(chunk[2]); // B
                }
                rgb
            }
        };
        RgbImage::from_raw(self.width, self.height, data)
    }
}

/// 工作帧高度上限, 超出视为退化帧 (极端宽高比)
pub const MAX_WORKING_HEIGHT: u32 = 4096;

/// 保持宽高比时的工作帧高度
pub fn working_height(width: u32, height: u32, working_width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let scaled = (height as f64 * working_width as f64 / width as f64).round() as u32;
    scaled.max(1)
}

/// 缩放到固定工作宽度 (宽度一致时直接返回)
pub fn to_working(image: RgbImage, working_width: u32) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    let target_height = working_height(width, height, working_width);
    if target_height > MAX_WORKING_HEIGHT {
        return Err(TrackError::Resize(format!(
            "{}x{} 缩放后高度 {} 超出上限 {}",
            width, height, target_height, MAX_WORKING_HEIGHT
        )));
    }
    if width == working_width {
        return Ok(image);
    }

    let src_image =
        fr::images::Image::from_vec_u8(width, height, image.into_raw(), fr::PixelType::U8x3)
            .map_err(|e| TrackError::Resize(e.to_string()))?;
    let mut dst_image = fr::images::Image::new(working_width, target_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        )
        .map_err(|e| TrackError::Resize(e.to_string()))?;

    RgbImage::from_raw(working_width, target_height, dst_image.buffer().to_vec())
        .ok_or_else(|| TrackError::Resize("缩放结果缓冲区长度不符".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_degenerate_frames() {
        assert!(RawFrame::new(0, 10, PixelFormat::Rgb8, vec![]).is_degenerate());
        assert!(RawFrame::new(2, 2, PixelFormat::Rgb8, vec![0; 11]).is_degenerate());
        assert!(!RawFrame::new(2, 2, PixelFormat::Rgba8, vec![0; 16]).is_degenerate());
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let raw = RawFrame::new(1, 1, PixelFormat::Rgba8, vec![10, 20, 30, 255]);
        let rgb = raw.into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_working_height_keeps_aspect() {
        assert_eq!(working_height(1280, 720, 600), 338);
        assert_eq!(working_height(600, 400, 600), 400);
        assert_eq!(working_height(4000, 1, 600), 1);
    }

    #[test]
    fn test_resize_to_working_width() {
        let image = RgbImage::from_pixel(1200, 800, Rgb([0, 200, 0]));
        let working = to_working(image, 600).unwrap();
        assert_eq!(working.dimensions(), (600, 400));
        assert_eq!(working.get_pixel(300, 200), &Rgb([0, 200, 0]));
    }

    #[test]
    fn test_extreme_aspect_ratio_is_rejected() {
        let tall = RgbImage::new(1, 4000);
        assert!(matches!(to_working(tall, 600), Err(TrackError::Resize(_))));

        let already_wide = RgbImage::new(600, MAX_WORKING_HEIGHT + 1);
        assert!(to_working(already_wide, 600).is_err());

        let limit = RgbImage::new(600, MAX_WORKING_HEIGHT);
        assert!(to_working(limit, 600).is_ok());
    }
}
