//! Configuration module
//!
//! This module provides the configuration of the upload service: HTTP server,
//! database, authentication, storage targets, external tool paths and upload
//! ceilings. Values come from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Server, database and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub public_host: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct VidforgeConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Durable storage for published videos
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, R2, ...)
    pub aws_region: Option<String>,
    pub s3_distribution_host: Option<String>,
    // Local asset directory (thumbnails, and videos with the local backend)
    pub assets_root: PathBuf,
    // Processing
    pub scratch_dir: PathBuf,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct Config(pub Box<VidforgeConfig>);

impl Config {
    fn inner(&self) -> &VidforgeConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = VidforgeConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn public_host(&self) -> &str {
        &self.inner().base.public_host
    }

    /// Base URL under which `/assets` is reachable from clients.
    pub fn assets_base_url(&self) -> String {
        format!(
            "http://{}:{}/assets",
            self.public_host(),
            self.server_port()
        )
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> Option<&str> {
        self.inner().base.jwt_issuer.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn s3_distribution_host(&self) -> Option<&str> {
        self.inner().s3_distribution_host.as_deref()
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.inner().assets_root
    }

    pub fn scratch_dir(&self) -> &PathBuf {
        &self.inner().scratch_dir
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.inner().max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> u64 {
        self.inner().max_thumbnail_size_bytes
    }
}

impl VidforgeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            public_host: env::var("PUBLIC_HOST").unwrap_or_else(|_| "localhost".to_string()),
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_issuer: non_empty_var("JWT_ISSUER"),
            environment,
        };

        let storage_backend = match non_empty_var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let max_thumbnail_size_mb = env::var("MAX_THUMBNAIL_SIZE_MB")
            .unwrap_or_else(|_| MAX_THUMBNAIL_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_THUMBNAIL_SIZE_MB);

        Ok(VidforgeConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: non_empty_var("S3_BUCKET"),
            s3_region: non_empty_var("S3_REGION"),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            aws_region: non_empty_var("AWS_REGION"),
            s3_distribution_host: non_empty_var("S3_DISTRIBUTION_HOST"),
            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),
            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("vidforge")),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            max_video_size_bytes: max_video_size_mb * BYTES_PER_MB,
            max_thumbnail_size_bytes: max_thumbnail_size_mb * BYTES_PER_MB,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_SIZE_MB and MAX_THUMBNAIL_SIZE_MB must be greater than zero"
            ));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() && self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VidforgeConfig {
        VidforgeConfig {
            base: BaseConfig {
                server_port: 8091,
                public_host: "media.local".to_string(),
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                jwt_secret: "x".repeat(32),
                jwt_issuer: None,
                environment: "development".to_string(),
            },
            database_url: "postgresql://localhost/vidforge".to_string(),
            storage_backend: StorageBackend::S3,
            s3_bucket: Some("videos".to_string()),
            s3_region: None,
            s3_endpoint: None,
            aws_region: Some("eu-west-1".to_string()),
            s3_distribution_host: Some("cdn.example.com".to_string()),
            assets_root: PathBuf::from("./assets"),
            scratch_dir: env::temp_dir().join("vidforge"),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_MB * BYTES_PER_MB,
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut cfg = sample();
        cfg.base.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_requires_bucket_for_s3() {
        let mut cfg = sample();
        cfg.s3_bucket = None;
        assert!(cfg.validate().is_err());

        cfg.storage_backend = StorageBackend::Local;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_region_falls_back_to_aws_region() {
        let config = Config(Box::new(sample()));
        assert_eq!(config.s3_region(), Some("eu-west-1"));
        assert_eq!(config.assets_base_url(), "http://media.local:8091/assets");
        assert_eq!(config.max_thumbnail_size_bytes(), 10 * 1024 * 1024);
    }
}
