// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// FFmpeg 输入源: 视频文件 / RTSP / 无人机UDP流
/// Decoding runs on a worker thread and feeds a ChannelSource
use std::thread::{self, JoinHandle};

use ez_ffmpeg::core::context::null_output::create_null_output;
use ez_ffmpeg::filter::frame_pipeline_builder::FramePipelineBuilder;
use ez_ffmpeg::{AVMediaType, FfmpegContext, Input};
use tracing::{error, info};

use super::channel::ChannelSource;
use super::decode_filter::DecodeFilter;
use super::{FrameSource, NextFrame, StopHandle};
use crate::error::{Result, TrackError};

/// 解码线程与追踪循环之间的缓冲帧数
const CHANNEL_CAPACITY: usize = 8;

/// FFmpeg解码输入源
pub struct FfmpegSource {
    inner: ChannelSource,
    worker: Option<JoinHandle<()>>,
}

impl FfmpegSource {
    /// 打开输入, `live` 为真时通道满则丢帧 (保持低延迟)
    pub fn open(url: &str, live: bool, stop: StopHandle) -> Result<Self> {
        let (tx, inner) = ChannelSource::bounded(url, CHANNEL_CAPACITY, stop);
        let filter = DecodeFilter::new(tx, live);
        let url_owned = url.to_string();

        let worker = thread::Builder::new()
            .name("ffmpeg-decode".to_string())
            .spawn(move || {
                info!("🎬 解码器启动: {}", url_owned);
                match decode(&url_owned, filter) {
                    Ok(()) => info!("✅ 解码线程正常退出"),
                    Err(e) => error!("❌ 解码失败: {}", e),
                }
            })
            .map_err(|e| TrackError::Source(format!("解码线程启动失败: {}", e)))?;

        Ok(Self {
            inner,
            worker: Some(worker),
        })
    }
}

fn decode(url: &str, filter: DecodeFilter) -> std::result::Result<(), String> {
    let pipe: FramePipelineBuilder = AVMediaType::AVMEDIA_TYPE_VIDEO.into();
    let pipe = pipe.filter("decode", Box::new(filter));
    let out = create_null_output().add_frame_pipeline(pipe);

    let input = if url.starts_with("rtsp://") {
        Input::new(url).set_input_opts(
            [
                ("rtsp_transport", "tcp"),
                ("buffer_size", "67108864"),
                ("rtsp_flags", "prefer_tcp"),
            ]
            .into(),
        )
    } else if url.starts_with("udp://") {
        // 无人机视频流: 低延迟
        Input::new(url).set_input_opts([("fflags", "nobuffer"), ("flags", "low_delay")].into())
    } else {
        Input::new(url)
    };

    // 构建FFmpeg上下文, 统一输出 YUV420P
    let ctx = FfmpegContext::builder()
        .input(input)
        .filter_descs(["format=yuv420p"].into())
        .output(out)
        .build()
        .map_err(|e| format!("构建失败: {}", e))?;

    let sch = ctx.start().map_err(|e| format!("启动失败: {}", e))?;
    sch.wait().map_err(|e| format!("解码中断: {}", e))?;
    Ok(())
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> NextFrame {
        let next = self.inner.next_frame();
        if matches!(next, NextFrame::EndOfStream) {
            if let Some(worker) = self.worker.take() {
                if worker.is_finished() {
                    let _ = worker.join();
                }
            }
        }
        next
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
