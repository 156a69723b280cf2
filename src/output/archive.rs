// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 标注帧存档
//!
//! 每帧保存为 `frame_000000.jpg`, 达到上限后停止写入 (不影响追踪)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{CycleOutput, FrameSink};
use crate::error::{Result, TrackError};
use crate::gen_time_string;

/// 默认存档帧数上限
pub const DEFAULT_MAX_FRAMES: u64 = 500;

pub struct ArchiveSink {
    dir: PathBuf,
    max_frames: u64,
    written: u64,
}

impl ArchiveSink {
    /// 在 `root` 下创建 `archive_<时间戳>` 目录
    pub fn create(root: impl AsRef<Path>, max_frames: u64) -> Result<Self> {
        let dir = root
            .as_ref()
            .join(format!("archive_{}", gen_time_string("-")));
        Self::in_dir(dir, max_frames)
    }

    /// 直接使用指定目录
    pub fn in_dir(dir: impl Into<PathBuf>, max_frames: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("📼 存档目录: {} (上限{}帧)", dir.display(), max_frames);
        Ok(Self {
            dir,
            max_frames,
            written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn is_full(&self) -> bool {
        self.written >= self.max_frames
    }
}

impl FrameSink for ArchiveSink {
    fn emit(&mut self, output: &CycleOutput) -> Result<()> {
        if self.is_full() {
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:06}.jpg", output.frame_id));
        output
            .annotated
            .save(&path)
            .map_err(|e| TrackError::Sink(format!("{}: {}", path.display(), e)))?;
        self.written += 1;
        if self.is_full() {
            info!("📼 存档已达上限 {} 帧, 停止写入", self.max_frames);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        info!("📼 存档完成: {} 帧 → {}", self.written, self.dir.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "archive"
    }
}
