// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 偏移量输出 (运动控制)
//! 每周期一行 JSON: {"frame_id":0,"x":12,"y":-3,"detected":true}

use std::io::Write;

use serde::Serialize;

use super::{CycleOutput, FrameSink};
use crate::error::Result;

#[derive(Serialize)]
struct OffsetRecord {
    frame_id: u64,
    x: i32,
    y: i32,
    detected: bool,
}

pub struct OffsetWriter<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> OffsetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for OffsetWriter<W> {
    fn emit(&mut self, output: &CycleOutput) -> Result<()> {
        let record = OffsetRecord {
            frame_id: output.frame_id,
            x: output.offset.x,
            y: output.offset.y,
            detected: output.detected,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "offsets"
    }
}
