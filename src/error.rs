// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 追踪系统错误类型
//! Error types for the tracking system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("颜色范围无效: {0}")]
    InvalidColorRange(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("输入源错误: {0}")]
    Source(String),

    #[error("输出错误: {0}")]
    Sink(String),

    #[error("缩放失败: {0}")]
    Resize(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("图像错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
