// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 实时流输入模块
//!
//! 生产线程 (解码器 / 网络接收) 异步写入有界通道, 追踪循环同步拉取

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::info;

use super::{FrameSource, NextFrame, StopHandle};
use crate::frame::RawFrame;

/// 等待帧时检查停止信号的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 通道输入源
pub struct ChannelSource {
    name: String,
    rx: Receiver<RawFrame>,
    stop: StopHandle,
    poll_interval: Duration,
}

impl ChannelSource {
    pub fn new(name: impl Into<String>, rx: Receiver<RawFrame>, stop: StopHandle) -> Self {
        Self {
            name: name.into(),
            rx,
            stop,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// 创建有界通道与对应的输入源
    pub fn bounded(
        name: impl Into<String>,
        capacity: usize,
        stop: StopHandle,
    ) -> (Sender<RawFrame>, Self) {
        let (tx, rx) = bounded(capacity);
        (tx, Self::new(name, rx, stop))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl FrameSource for ChannelSource {
    fn next_frame(&mut self) -> NextFrame {
        loop {
            if self.stop.is_requested() {
                info!("🛑 收到停止信号, 输入源 {} 结束", self.name);
                return NextFrame::EndOfStream;
            }
            match self.rx.recv_timeout(self.poll_interval) {
                Ok(frame) => return NextFrame::Frame(frame),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!("📹 生产线程已退出, 输入源 {} 结束", self.name);
                    return NextFrame::EndOfStream;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
