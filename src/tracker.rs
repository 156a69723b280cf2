// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 追踪器状态机 (Tracker State Machine)
//!
//! `Running` → `Finished`, 状态按值传递:
//! - start:   首次取帧, 输入源立即结束则直接 `Finished`
//! - acquire: 取下一帧并归一化到工作宽度, 偏移量清零
//! - detect:  颜色检测并覆盖偏移量
//! - render:  生成叠加层副本
//! - stop:    强制结束 (已结束则原样返回)

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::detection::detector::ColorDetector;
use crate::detection::types::{Detection, FrameGeometry, Offset};
use crate::error::Result;
use crate::frame::{to_working, RawFrame};
use crate::input::{FrameSource, NextFrame};
use crate::renderer::OverlayRenderer;

/// 结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    EndOfStream,
    Stopped,
}

/// 运行态: 持有当前工作帧
#[derive(Debug)]
pub struct Running {
    frame: RgbImage,
    geometry: FrameGeometry,
    frame_id: u64,
    usable: bool,
    offset: Offset,
    detection: Option<Detection>,
}

impl Running {
    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// 从 0 开始的帧序号
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// 当前帧是否可用于检测 (退化帧为 false)
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }
}

/// 终止态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub reason: FinishReason,
    pub frames: u64, // 已获取的帧数
}

#[derive(Debug)]
pub enum TrackState {
    Running(Running),
    Finished(Finished),
}

impl TrackState {
    pub fn is_running(&self) -> bool {
        matches!(self, TrackState::Running(_))
    }

    pub fn as_running(&self) -> Option<&Running> {
        match self {
            TrackState::Running(r) => Some(r),
            TrackState::Finished(_) => None,
        }
    }

    pub fn finished(&self) -> Option<Finished> {
        match self {
            TrackState::Running(_) => None,
            TrackState::Finished(f) => Some(*f),
        }
    }
}

/// 颜色追踪器 (配置在构造时固定)
pub struct Tracker {
    config: TrackerConfig,
    detector: ColorDetector,
    renderer: OverlayRenderer,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let detector = ColorDetector::new(&config);
        let renderer = OverlayRenderer::new(&config);
        Ok(Self {
            config,
            detector,
            renderer,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// 首次取帧, 跳过几何信息无法确定的退化帧
    pub fn start<S: FrameSource + ?Sized>(&self, source: &mut S) -> TrackState {
        let mut skipped = 0u64;
        loop {
            match source.next_frame() {
                NextFrame::EndOfStream => {
                    info!(
                        "📭 输入源 {} 未产生可用帧 (跳过{}帧), 追踪结束",
                        source.name(),
                        skipped
                    );
                    return TrackState::Finished(Finished {
                        reason: FinishReason::EndOfStream,
                        frames: 0,
                    });
                }
                NextFrame::Frame(raw) => match self.normalize(raw) {
                    Some(frame) => {
                        let geometry = FrameGeometry::new(frame.width(), frame.height());
                        info!(
                            "▶️ 开始追踪 {}: 工作帧 {}x{}, 中心 ({}, {})",
                            source.name(),
                            geometry.width,
                            geometry.height,
                            geometry.midx,
                            geometry.midy
                        );
                        return TrackState::Running(Running {
                            frame,
                            geometry,
                            frame_id: 0,
                            usable: true,
                            offset: Offset::ZERO,
                            detection: None,
                        });
                    }
                    None => {
                        skipped += 1;
                        warn!("⚠️ 首帧前的退化帧已丢弃 (#{})", skipped);
                    }
                },
            }
        }
    }

    /// 取下一帧; 已结束的状态原样返回, 不访问输入源
    pub fn acquire<S: FrameSource + ?Sized>(&self, state: TrackState, source: &mut S) -> TrackState {
        let mut running = match state {
            TrackState::Running(r) => r,
            finished @ TrackState::Finished(_) => return finished,
        };

        match source.next_frame() {
            NextFrame::EndOfStream => {
                let frames = running.frame_id + 1;
                info!("🏁 输入源 {} 结束, 共 {} 帧", source.name(), frames);
                TrackState::Finished(Finished {
                    reason: FinishReason::EndOfStream,
                    frames,
                })
            }
            NextFrame::Frame(raw) => {
                running.frame_id += 1;
                running.offset = Offset::ZERO;
                running.detection = None;

                let geometry = running.geometry;
                match self
                    .normalize(raw)
                    .filter(|f| geometry.matches(f.width(), f.height()))
                {
                    Some(frame) => {
                        running.frame = frame;
                        running.usable = true;
                    }
                    None => {
                        warn!("⚠️ 帧 #{} 无法使用, 本周期不检测", running.frame_id);
                        running.frame = RgbImage::new(geometry.width, geometry.height);
                        running.usable = false;
                    }
                }
                TrackState::Running(running)
            }
        }
    }

    /// 检测目标并更新偏移量
    pub fn detect(&self, running: &mut Running) -> Offset {
        if !running.usable {
            running.offset = Offset::ZERO;
            running.detection = None;
            return Offset::ZERO;
        }

        let (offset, detection) = self
            .detector
            .compute_offset(&running.frame, &running.geometry);

        if let Some(d) = &detection {
            debug!(
                "🎯 帧 #{}: 候选{} | 半径{:.1} | 面积{:.0} | 偏移({}, {}){}",
                running.frame_id,
                d.candidates,
                d.circle.radius,
                d.area,
                offset.x,
                offset.y,
                if d.accepted { "" } else { " (过小)" }
            );
        }

        running.offset = offset;
        running.detection = detection;
        offset
    }

    /// 叠加层渲染 (不修改状态)
    pub fn render(&self, running: &Running) -> RgbImage {
        self.renderer.render(
            &running.frame,
            &running.geometry,
            running.offset,
            running.detection.as_ref(),
        )
    }

    /// 强制结束, 已结束则不重复转换
    pub fn stop(&self, state: TrackState) -> TrackState {
        match state {
            TrackState::Running(r) => {
                let frames = r.frame_id + 1;
                info!("🛑 追踪已停止, 共 {} 帧", frames);
                TrackState::Finished(Finished {
                    reason: FinishReason::Stopped,
                    frames,
                })
            }
            finished @ TrackState::Finished(_) => finished,
        }
    }

    fn normalize(&self, raw: RawFrame) -> Option<RgbImage> {
        let (width, height) = (raw.width, raw.height);
        let Some(rgb) = raw.into_rgb() else {
            warn!("⚠️ 退化帧 {}x{}", width, height);
            return None;
        };
        match to_working(rgb, self.config.working_width) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("⚠️ 帧缩放失败: {}", e);
                None
            }
        }
    }
}
