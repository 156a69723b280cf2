// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 输出系统 (Output Sinks)
///
/// 每个周期输出一帧标注图像 + 一个偏移量, 以帧序号配对
/// - ArchiveSink:  标注帧存档 (带时间戳的目录, 帧数上限)
/// - OffsetWriter: 运动控制偏移量 (JSON 行)
pub mod archive;
pub mod offsets;

use image::RgbImage;

use crate::detection::types::Offset;
use crate::error::Result;

pub use archive::ArchiveSink;
pub use offsets::OffsetWriter;

/// 单个周期的输出
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub frame_id: u64,
    pub offset: Offset,
    pub detected: bool, // 目标通过半径门限
    pub annotated: RgbImage,
}

/// 输出端
pub trait FrameSink {
    fn emit(&mut self, output: &CycleOutput) -> Result<()>;

    /// 结束时调用 (刷新缓冲等)
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn emit(&mut self, output: &CycleOutput) -> Result<()> {
        (**self).emit(output)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
