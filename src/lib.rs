// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 颜色目标追踪 → 无人机方向向量
//!
//! 帧源 → Tracker (acquire / detect / render) → 输出端

pub mod config; // 追踪参数配置
pub mod detection; // 颜色检测
pub mod error; // 错误类型
pub mod frame; // 原始帧与工作帧
pub mod input; // 视频输入系统
pub mod output; // 存档与偏移量输出
pub mod pipeline; // 追踪主循环
pub mod renderer; // 叠加层渲染
pub mod tracker; // 状态机

pub use crate::config::{ColorRange, TrackerConfig};
pub use crate::detection::types::{Detection, FrameGeometry, Offset};
pub use crate::error::{Result, TrackError};
pub use crate::frame::{PixelFormat, RawFrame};
pub use crate::input::{FrameSource, NextFrame, StopHandle};
pub use crate::output::{CycleOutput, FrameSink};
pub use crate::pipeline::{run, RunOptions, RunSummary};
pub use crate::tracker::{FinishReason, Finished, Running, TrackState, Tracker};

/// 本地时间字符串, 各字段以 `delimiter` 分隔 (用于存档目录名)
pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%3f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_time_string_fields() {
        let s = gen_time_string("-");
        assert_eq!(s.split('-').count(), 7);
        assert!(s.chars().all(|c| c.is_ascii_digit() || c == '-'));
    }
}
