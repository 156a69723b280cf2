// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 颜色检测系统 (Color Detection)
///
/// 单帧处理, 不保留历史
/// - color:    RGB → HSV 与阈值分割
/// - contour:  轮廓矩、最小外接圆
/// - detector: 模糊 → 分割 → 开运算 → 最大外轮廓 → 偏移量
pub mod color;
pub mod contour;
pub mod detector;
pub mod types;

pub use detector::ColorDetector;
pub use types::{Circle, Detection, FrameGeometry, Offset};
