//! Aspect classification with ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use vidforge_core::AspectClass;

use crate::error::ProcessingError;
use crate::staging::StagedFile;
use crate::validator::{validate_path, validate_tool_path};

#[async_trait]
pub trait VideoProber: Send + Sync {
    /// Classify the first video stream of a staged file.
    async fn classify(&self, file: &StagedFile) -> Result<AspectClass, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Width and height of the first stream in ffprobe's JSON output.
pub fn parse_dimensions(stdout: &[u8]) -> Result<(u32, u32), ProcessingError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .first()
        .ok_or_else(|| ProcessingError::Probe("No video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(ProcessingError::Probe(
            "Incomplete video metadata: missing width or height".to_string(),
        )),
    }
}

pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self, ProcessingError> {
        let ffprobe_path = ffprobe_path.into();
        validate_tool_path(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl VideoProber for FfprobeProber {
    #[tracing::instrument(skip(self, file), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn classify(&self, file: &StagedFile) -> Result<AspectClass, ProcessingError> {
        let start = std::time::Instant::now();
        validate_path(&file.path().to_string_lossy())?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(file.path())
            .output()
            .await
            .map_err(|e| ProcessingError::Probe(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProcessingError::Probe(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let (width, height) = parse_dimensions(&output.stdout)?;
        let aspect = AspectClass::from_dimensions(width, height);

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = width,
            height = height,
            aspect = %aspect,
            "Video probe completed"
        );

        Ok(aspect)
    }
}
