// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 文件输入模块 - 图片序列
//!
//! 按文件名顺序读取目录中的图片 (或单张图片), 作为录制视频的帧来源

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{FrameSource, NextFrame};
use crate::error::{Result, TrackError};
use crate::frame::RawFrame;

/// 支持的图片扩展名
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// 连续读取失败次数上限, 超过后视为流结束
const DEFAULT_MAX_FAILURES: usize = 5;

/// 图片序列输入源
pub struct ImageSequenceSource {
    name: String,
    pending: VecDeque<PathBuf>,
    max_consecutive_failures: usize,
    delivered: u64,
}

impl ImageSequenceSource {
    /// 打开目录或单个图片文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image(p))
                .collect();
            files.sort();
            files
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(TrackError::Source(format!(
                "输入路径不存在: {}",
                path.display()
            )));
        };

        info!("📂 图片序列: {} ({} 帧)", path.display(), files.len());
        Ok(Self::from_paths(path.display().to_string(), files))
    }

    /// 直接使用文件列表 (按给定顺序)
    pub fn from_paths(name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            pending: files.into(),
            max_consecutive_failures: DEFAULT_MAX_FAILURES,
            delivered: 0,
        }
    }

    pub fn with_max_failures(mut self, max_consecutive_failures: usize) -> Self {
        self.max_consecutive_failures = max_consecutive_failures;
        self
    }

    /// 剩余待读取文件数
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> NextFrame {
        let mut failures = 0;
        while let Some(path) = self.pending.pop_front() {
            match image::open(&path) {
                Ok(img) => {
                    self.delivered += 1;
                    return NextFrame::Frame(RawFrame::from_dynamic(img));
                }
                Err(e) => {
                    failures += 1;
                    warn!("⚠️ 跳过无法读取的帧 {}: {}", path.display(), e);
                    if failures >= self.max_consecutive_failures {
                        warn!("❌ 连续 {} 帧读取失败, 结束输入", failures);
                        self.pending.clear();
                        break;
                    }
                }
            }
        }
        info!("📹 图片序列结束 (共 {} 帧)", self.delivered);
        NextFrame::EndOfStream
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
