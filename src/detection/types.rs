// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 颜色追踪数据结构定义
/// Data structures for color tracking
use serde::{Deserialize, Serialize};

// ========== 数据结构 ==========

/// 方向向量 (以帧中心为原点, Y轴向上为正)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// 帧几何 (首帧确定, 之后保持不变)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub midx: i32,
    pub midy: i32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            midx: (width / 2) as i32,
            midy: (height / 2) as i32,
        }
    }

    /// 像素坐标 → 偏移量 (Y轴翻转)
    pub fn offset_of(&self, px: i32, py: i32) -> Offset {
        Offset {
            x: px - self.midx,
            y: self.midy - py,
        }
    }

    /// 偏移量 → 像素坐标
    pub fn point_of(&self, offset: Offset) -> (i32, i32) {
        (self.midx + offset.x, self.midy - offset.y)
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// 最小外接圆
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

/// 单帧检测结果 (帧结束后丢弃)
#[derive(Clone, Debug)]
pub struct Detection {
    pub candidates: usize,       // 外轮廓数量
    pub area: f64,               // 选中轮廓面积
    pub circle: Circle,          // 最小外接圆
    pub centroid: (f32, f32),    // 面积加权质心 (M10/M00, M01/M00)
    pub accepted: bool,          // 是否通过最小半径门限
}

impl Detection {
    /// 质心像素坐标 (向下取整)
    pub fn centroid_px(&self) -> (i32, i32) {
        (self.centroid.0.floor() as i32, self.centroid.1.floor() as i32)
    }
}
