// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 追踪主循环 (Tracking Loop)
//!
//! 调用方持有循环: 取帧 → 检测 → 渲染 → 输出, 直到输入结束或收到停止信号

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::input::{FrameSource, StopHandle};
use crate::output::{CycleOutput, FrameSink};
use crate::tracker::{FinishReason, TrackState, Tracker};

/// 运行统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,     // 完成检测的周期数
    pub detections: u64, // 通过半径门限的周期数
    pub finished: FinishReason,
}

/// 循环控制参数
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub stop: StopHandle,
    pub max_frames: Option<u64>, // 帧数上限, 达到后按停止处理
}

pub fn run<S>(
    tracker: &Tracker,
    source: &mut S,
    sinks: &mut [Box<dyn FrameSink>],
    options: &RunOptions,
) -> RunSummary
where
    S: FrameSource + ?Sized,
{
    let mut cycles = 0u64;
    let mut detections = 0u64;

    // 统计
    let mut count = 0u64;
    let mut last = Instant::now();

    let mut state = tracker.start(source);

    while let TrackState::Running(running) = &mut state {
        let offset = tracker.detect(running);
        let detected = running.detection().is_some_and(|d| d.accepted);
        let annotated = tracker.render(running);

        let output = CycleOutput {
            frame_id: running.frame_id(),
            offset,
            detected,
            annotated,
        };
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.emit(&output) {
                warn!("⚠️ 输出端 {} 写入失败 (帧 #{}): {}", sink.name(), output.frame_id, e);
            }
        }

        cycles += 1;
        if detected {
            detections += 1;
        }
        count += 1;

        if last.elapsed().as_secs_f64() >= 1.0 {
            let elapsed = last.elapsed().as_secs_f64();
            info!(
                "📊 追踪统计: {:.1}fps | 周期{} | 检出{} | 当前偏移({}, {})",
                count as f64 / elapsed,
                cycles,
                detections,
                offset.x,
                offset.y
            );
            last = Instant::now();
            count = 0;
        }

        let limit_reached = options.max_frames.is_some_and(|max| cycles >= max);
        state = if options.stop.is_requested() || limit_reached {
            if limit_reached {
                debug!("⏹️ 已达帧数上限 {}", cycles);
            }
            tracker.stop(state)
        } else {
            tracker.acquire(state, source)
        };
    }

    for sink in sinks.iter_mut() {
        if let Err(e) = sink.finish() {
            warn!("⚠️ 输出端 {} 结束失败: {}", sink.name(), e);
        }
    }

    // 输入源因停止信号提前结束时按停止处理
    let finished = match state.finished().map(|f| f.reason) {
        Some(FinishReason::EndOfStream) if options.stop.is_requested() => FinishReason::Stopped,
        Some(reason) => reason,
        None => FinishReason::Stopped,
    };

    info!(
        "✅ 追踪结束 ({:?}): 周期{} | 检出{}",
        finished, cycles, detections
    );

    RunSummary {
        cycles,
        detections,
        finished,
    }
}
