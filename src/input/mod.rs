// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 视频输入系统 (Video Input System)
///
/// 追踪器只通过拉取接口 `FrameSource` 获取帧, 与传输方式无关
/// - ImageSequenceSource: 文件输入 (图片目录 / 单张图片)
/// - ChannelSource:       实时流输入 (生产线程 → 有界通道)
/// - FfmpegSource:        FFmpeg 解码 (视频文件 / 无人机UDP流, 需启用 `ffmpeg` 特性)
pub mod channel;
pub mod sequence;

#[cfg(feature = "ffmpeg")]
pub mod decode_filter;
#[cfg(feature = "ffmpeg")]
pub mod decoder;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::frame::RawFrame;

pub use channel::ChannelSource;
#[cfg(feature = "ffmpeg")]
pub use decoder::FfmpegSource;
pub use sequence::ImageSequenceSource;

/// 拉取结果
#[derive(Debug)]
pub enum NextFrame {
    Frame(RawFrame),
    EndOfStream,
}

/// 帧输入源
///
/// 必须按到达顺序交付帧; 连接断开、解码失败等错误由输入源自行重试,
/// 或转换为 `EndOfStream`
pub trait FrameSource {
    /// 取下一帧 (阻塞或立即返回)
    fn next_frame(&mut self) -> NextFrame;

    /// 输入源名称 (日志用)
    fn name(&self) -> &str;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> NextFrame {
        (**self).next_frame()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// 停止信号 (调用方持有, 可跨线程克隆)
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
