//! Fast-start remux: move the `moov` atom to the front without re-encoding.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::ProcessingError;
use crate::staging::{StagedFile, StagedOrigin, StagingArea};
use crate::validator::{validate_path, validate_tool_path};

#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Rewrite `input` into a new staged file. The input is left untouched.
    async fn fast_start(
        &self,
        input: &StagedFile,
        staging: &StagingArea,
    ) -> Result<StagedFile, ProcessingError>;
}

/// Argument list for a stream-copy remux.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    output_args: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Copy every stream as-is.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("faststart")
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
        ];
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, ProcessingError> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }

    async fn run(&self, cmd: &FfmpegCommand) -> Result<(), ProcessingError> {
        let args = cmd.build_args();
        tracing::debug!(args = %args.join(" "), "Running ffmpeg");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProcessingError::Remux(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(ProcessingError::Remux(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self, input, staging), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux"
    ))]
    async fn fast_start(
        &self,
        input: &StagedFile,
        staging: &StagingArea,
    ) -> Result<StagedFile, ProcessingError> {
        let start = std::time::Instant::now();
        validate_path(&input.path().to_string_lossy())?;

        let output = staging.reserve(StagedOrigin::Remuxed, ".mp4")?;
        let cmd = FfmpegCommand::new(input.path(), output.path())
            .stream_copy()
            .faststart()
            .format("mp4");

        if let Err(e) = self.run(&cmd).await {
            output.release().await;
            return Err(e);
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            "Remux completed"
        );

        Ok(output)
    }
}
