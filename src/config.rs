// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 追踪器配置 - 通过JSON文件调整参数

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TrackError};

/// OpenCV 约定下 8 位 HSV 的色调上限 (H ∈ [0, 179])
pub const HUE_MAX: u8 = 179;

/// 默认工作帧宽度 (像素)
pub const DEFAULT_WORKING_WIDTH: u32 = 600;

/// 默认最小半径 (工作分辨率下的像素)
pub const DEFAULT_MIN_RADIUS: f32 = 10.0;

/// HSV 颜色范围 (闭区间, 逐分量比较)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorBounds", into = "ColorBounds")]
pub struct ColorRange {
    lower: [u8; 3],
    upper: [u8; 3],
}

/// 序列化用的原始边界 (反序列化时经过校验)
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct ColorBounds {
    lower: [u8; 3],
    upper: [u8; 3],
}

impl TryFrom<ColorBounds> for ColorRange {
    type Error = TrackError;

    fn try_from(bounds: ColorBounds) -> Result<Self> {
        ColorRange::new(bounds.lower, bounds.upper)
    }
}

impl From<ColorRange> for ColorBounds {
    fn from(range: ColorRange) -> Self {
        Self {
            lower: range.lower,
            upper: range.upper,
        }
    }
}

impl ColorRange {
    /// 创建颜色范围, 要求 lower <= upper 且色调不超过 179
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Result<Self> {
        for i in 0..3 {
            if lower[i] > upper[i] {
                return Err(TrackError::InvalidColorRange(format!(
                    "通道{}: 下界 {} 大于上界 {}",
                    i, lower[i], upper[i]
                )));
            }
        }
        if upper[0] > HUE_MAX {
            return Err(TrackError::InvalidColorRange(format!(
                "色调上界 {} 超出 [0, {}]",
                upper[0], HUE_MAX
            )));
        }
        Ok(Self { lower, upper })
    }

    /// 内置颜色预设 (green / red / blue)
    pub fn preset(name: &str) -> Option<Self> {
        let (lower, upper) = match name.to_lowercase().as_str() {
            "green" => ([40, 20, 25], [55, 255, 120]),
            "red" => ([0, 50, 50], [20, 255, 255]),
            "blue" => ([110, 50, 50], [130, 255, 255]),
            _ => return None,
        };
        Some(Self { lower, upper })
    }

    pub fn lower(&self) -> [u8; 3] {
        self.lower
    }

    pub fn upper(&self) -> [u8; 3] {
        self.upper
    }

    /// 判断 HSV 像素是否落在范围内
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }

    /// 范围中点 (用于叠加层色块)
    pub fn midpoint(&self) -> [u8; 3] {
        [
            ((self.lower[0] as u16 + self.upper[0] as u16) / 2) as u8,
            ((self.lower[1] as u16 + self.upper[1] as u16) / 2) as u8,
            ((self.lower[2] as u16 + self.upper[2] as u16) / 2) as u8,
        ]
    }
}

/// 追踪器参数配置 (构造后不可变)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    // === 颜色分割 ===
    pub color_name: String,   // 颜色名称 (叠加层标签)
    pub color_range: ColorRange,

    // === 几何 ===
    pub working_width: u32, // 工作帧宽度, 保持宽高比缩放
    pub min_radius: f32,    // 最小外接圆半径, 小于等于视为未检测

    // === 预处理 ===
    pub morph_iterations: u8, // 腐蚀/膨胀迭代次数 (3x3)
    pub blur_sigma: f32,      // 高斯模糊 sigma

    // === 叠加层 ===
    #[serde(default)]
    pub label_font: Option<PathBuf>, // TTF/OTF 字体, 缺省时不绘制文字
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            color_name: "green".to_string(),
            color_range: ColorRange {
                lower: [40, 20, 25],
                upper: [55, 255, 120],
            },
            working_width: DEFAULT_WORKING_WIDTH,
            min_radius: DEFAULT_MIN_RADIUS,
            morph_iterations: 2,
            // 对应 OpenCV 11x11 高斯核的默认 sigma
            blur_sigma: 2.0,
            label_font: None,
        }
    }
}

impl TrackerConfig {
    /// 使用指定颜色范围, 其余参数取默认值
    pub fn with_color(name: impl Into<String>, color_range: ColorRange) -> Self {
        Self {
            color_name: name.into(),
            color_range,
            ..Default::default()
        }
    }

    /// 从JSON文件加载配置, 文件不存在时写入默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("📝 配置文件不存在,创建默认配置: {}", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!("✅ 配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!("💾 配置已保存到 {}", path.as_ref().display());
        Ok(())
    }

    /// 校验参数
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 {
            return Err(TrackError::Config("工作帧宽度必须大于0".to_string()));
        }
        if !self.min_radius.is_finite() || self.min_radius < 0.0 {
            return Err(TrackError::Config(format!(
                "最小半径无效: {}",
                self.min_radius
            )));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            return Err(TrackError::Config(format!(
                "高斯模糊 sigma 必须为正数: {}",
                self.blur_sigma
            )));
        }
        // 反序列化已校验, 这里覆盖直接构造的情况
        ColorRange::new(self.color_range.lower, self.color_range.upper)?;
        Ok(())
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        info!("🎛️  当前追踪器配置:");
        info!(
            "  颜色: {} {:?} - {:?}",
            self.color_name,
            self.color_range.lower(),
            self.color_range.upper()
        );
        info!("  工作宽度: {}px", self.working_width);
        info!("  最小半径: {:.1}px", self.min_radius);
        info!(
            "  形态学迭代: {} | 模糊 sigma: {:.1}",
            self.morph_iterations, self.blur_sigma
        );
    }
}
