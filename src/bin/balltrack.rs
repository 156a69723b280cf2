// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// 颜色目标追踪 (Ball Tracker)
///
/// 从视频输入中追踪指定颜色的目标, 输出相对画面中心的方向向量
///
/// 运行方式:
/// 1. 图片序列: balltrack --source frames/ --color red
/// 2. 视频/无人机流: balltrack --url udp://0.0.0.0:11111 (需启用 ffmpeg 特性)
///
/// 标准输入键入 q 回车停止
use std::fs::File;
use std::io::{self, BufRead, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use balltrack_rs::input::ImageSequenceSource;
use balltrack_rs::output::archive::{ArchiveSink, DEFAULT_MAX_FRAMES};
use balltrack_rs::output::OffsetWriter;
use balltrack_rs::{
    run, ColorRange, FrameSink, FrameSource, RunOptions, StopHandle, Tracker, TrackerConfig,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// 颜色追踪参数
#[derive(Parser, Debug)]
#[command(author, version, about = "颜色目标追踪 - 无人机方向向量", long_about = None)]
struct Args {
    /// 图片目录或单张图片
    #[arg(short, long, conflicts_with = "url")]
    source: Option<PathBuf>,

    /// 视频文件或流地址 (rtsp:// / udp://)
    #[arg(short, long)]
    url: Option<String>,

    /// 颜色预设: green / red / blue
    #[arg(short, long)]
    color: Option<String>,

    /// HSV下限 "h,s,v" (需与 --upper 同时使用)
    #[arg(long, requires = "upper")]
    lower: Option<String>,

    /// HSV上限 "h,s,v"
    #[arg(long, requires = "lower")]
    upper: Option<String>,

    /// 配置文件 (JSON), 不存在时自动创建
    #[arg(long)]
    config: Option<PathBuf>,

    /// 工作帧宽度
    #[arg(short, long)]
    width: Option<u32>,

    /// 最小半径
    #[arg(long)]
    min_radius: Option<f32>,

    /// 存档根目录
    #[arg(long)]
    archive: Option<PathBuf>,

    /// 存档帧数上限
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    archive_frames: u64,

    /// 处理帧数上限
    #[arg(long)]
    max_frames: Option<u64>,

    /// 偏移量输出文件 (JSON行), "-" 为标准输出
    #[arg(long)]
    offsets: Option<String>,

    /// 标签字体 (TTF/OTF)
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = build_config(&args)?;
    config.print_summary();
    let tracker = Tracker::new(config).context("追踪器参数无效")?;

    let stop = StopHandle::new();
    spawn_stdin_watcher(stop.clone());

    let mut source = open_source(&args, stop.clone())?;
    info!("📹 输入源: {}", source.name());

    let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
    if let Some(root) = &args.archive {
        let sink = ArchiveSink::create(root, args.archive_frames)
            .with_context(|| format!("无法创建存档目录: {}", root.display()))?;
        sinks.push(Box::new(sink));
    }
    match args.offsets.as_deref() {
        Some("-") => sinks.push(Box::new(OffsetWriter::new(io::stdout()))),
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("无法创建偏移量文件: {}", path))?;
            sinks.push(Box::new(OffsetWriter::new(BufWriter::new(file))));
        }
        None => {}
    }

    let options = RunOptions {
        stop,
        max_frames: args.max_frames,
    };
    let summary = run(&tracker, &mut source, &mut sinks, &options);

    info!(
        "🏁 运行结束: {:?} | 周期{} | 检出{}",
        summary.finished, summary.cycles, summary.detections
    );
    Ok(())
}

// ========== 配置 ==========

fn build_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)
            .with_context(|| format!("配置文件加载失败: {}", path.display()))?,
        None => TrackerConfig::default(),
    };

    if let Some(name) = &args.color {
        let range = ColorRange::preset(name)
            .with_context(|| format!("未知颜色预设: {} (可选 green/red/blue)", name))?;
        config.color_name = name.clone();
        config.color_range = range;
    }
    if let (Some(lower), Some(upper)) = (&args.lower, &args.upper) {
        config.color_range = ColorRange::new(parse_hsv(lower)?, parse_hsv(upper)?)?;
        if args.color.is_none() {
            config.color_name = "custom".to_string();
        }
    }
    if let Some(width) = args.width {
        config.working_width = width;
    }
    if let Some(min_radius) = args.min_radius {
        config.min_radius = min_radius;
    }
    if args.font.is_some() {
        config.label_font = args.font.clone();
    }
    Ok(config)
}

fn parse_hsv(text: &str) -> Result<[u8; 3]> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        bail!("HSV格式应为 h,s,v: {}", text);
    }
    let mut hsv = [0u8; 3];
    for (slot, part) in hsv.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("HSV分量无效: {}", part))?;
    }
    Ok(hsv)
}

// ========== 输入 ==========

fn open_source(args: &Args, stop: StopHandle) -> Result<Box<dyn FrameSource>> {
    if let Some(path) = &args.source {
        let source = ImageSequenceSource::open(path)
            .with_context(|| format!("无法打开输入: {}", path.display()))?;
        return Ok(Box::new(source));
    }
    if let Some(url) = &args.url {
        return open_stream(url, stop);
    }
    bail!("请指定 --source 或 --url")
}

#[cfg(feature = "ffmpeg")]
fn open_stream(url: &str, stop: StopHandle) -> Result<Box<dyn FrameSource>> {
    let live = url.contains("://");
    let source = balltrack_rs::input::FfmpegSource::open(url, live, stop)
        .with_context(|| format!("无法打开视频流: {}", url))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "ffmpeg"))]
fn open_stream(url: &str, _stop: StopHandle) -> Result<Box<dyn FrameSource>> {
    bail!("未启用 ffmpeg 特性, 无法打开: {}", url)
}

/// 标准输入键入 q 停止追踪
fn spawn_stdin_watcher(stop: StopHandle) {
    let spawned = std::thread::Builder::new()
        .name("stdin-watcher".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                        info!("⌨️ 收到退出指令");
                        stop.request();
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        warn!("⚠️ 无法监听标准输入: {}", e);
    }
}
