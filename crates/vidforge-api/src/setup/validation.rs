//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use vidforge_core::Config;
use vidforge_processing::validator::validate_tool_path;

/// Validate critical configuration values
///
/// Runs the field checks in `Config::validate` plus the checks that only
/// matter when serving HTTP.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    // Validate CORS configuration in production
    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    validate_tool_path(config.ffprobe_path())
        .map_err(|e| anyhow::anyhow!("Invalid FFPROBE_PATH: {}", e))?;
    validate_tool_path(config.ffmpeg_path())
        .map_err(|e| anyhow::anyhow!("Invalid FFMPEG_PATH: {}", e))?;

    if config.scratch_dir() == config.assets_root() {
        return Err(anyhow::anyhow!(
            "SCRATCH_DIR and ASSETS_ROOT must be different directories"
        ));
    }

    Ok(())
}
