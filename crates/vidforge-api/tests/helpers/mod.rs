//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidforge-api --test upload_test`.
//! The record store is in memory, storage is local temp directories, and
//! ffprobe/ffmpeg are shell scripts whose behavior is chosen by the uploaded
//! bytes (see [`fake_tools`]).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;
use uuid::Uuid;
use vidforge_api::auth::{JwtAuthenticator, JwtClaims};
use vidforge_api::setup::routes;
use vidforge_api::{AppState, UploadGate, UploadLimits, UploadPipeline};
use vidforge_core::{AppError, BaseConfig, Config, StorageBackend, VidforgeConfig, VideoRecord};
use vidforge_db::VideoRepository;
use vidforge_processing::{FfmpegRemuxer, FfprobeProber, StagingArea};
use vidforge_storage::{LocalStorage, Storage, StorageError, StorageKey, StorageResult};

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";
pub const VIDEO_BASE_URL: &str = "https://cdn.vidforge.test";

/// Record store kept in a map. Updates can be made to fail.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, VideoRecord>>,
    fail_updates: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn insert(&self, owner: Uuid) -> VideoRecord {
        let now = Utc::now();
        let record = VideoRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Test video".to_string(),
            description: String::new(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: Uuid) -> Option<VideoRecord> {
        self.videos.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, record: &VideoRecord) -> Result<VideoRecord, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&record.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", record.id)))?;
        *stored = VideoRecord {
            updated_at: Utc::now(),
            ..record.clone()
        };
        Ok(stored.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Storage whose uploads always fail.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_file(
        &self,
        _key: &StorageKey,
        _path: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed("bucket unreachable".to_string()))
    }

    async fn exists(&self, _key: &StorageKey) -> StorageResult<bool> {
        Ok(false)
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", VIDEO_BASE_URL, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Fake ffprobe and ffmpeg, written once per test process.
///
/// ffprobe reads the staged file: `corrupt...` fails, otherwise the first
/// word is `<width>x<height>`. ffmpeg fails when the file contains `badmux`
/// and copies it otherwise.
pub fn fake_tools() -> (String, String) {
    static TOOLS: OnceLock<(TempDir, PathBuf, PathBuf)> = OnceLock::new();
    let (_, ffprobe, ffmpeg) = TOOLS.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let ffprobe = write_script(
            dir.path(),
            "ffprobe",
            r#"for last; do :; done
content=$(cat "$last")
case "$content" in
  corrupt*) echo "Invalid data found when processing input" >&2; exit 1;;
esac
dims=${content%% *}
printf '{"streams":[{"index":0,"codec_type":"video","width":%s,"height":%s}]}\n' "${dims%x*}" "${dims#*x}"
"#,
        );
        let ffmpeg = write_script(
            dir.path(),
            "ffmpeg",
            r#"for last; do :; done
case "$(cat "$5")" in
  *badmux*) echo "moov atom not found" >&2; exit 1;;
esac
cp "$5" "$last"
"#,
        );
        (dir, ffprobe, ffmpeg)
    });
    (
        ffprobe.to_string_lossy().to_string(),
        ffmpeg.to_string_lossy().to_string(),
    )
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Bearer token for `user_id`, valid for an hour.
pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}

/// Every regular file below `dir`.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}

pub struct TestOptions {
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
    pub video_storage: Option<Arc<dyn Storage>>,
    pub fail_updates: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            max_video_bytes: 1024 * 1024,
            max_thumbnail_bytes: 64 * 1024,
            video_storage: None,
            fail_updates: false,
        }
    }
}

/// Test application: server, record store and owned directories.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub scratch_dir: PathBuf,
    pub published_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn scratch_files(&self) -> Vec<PathBuf> {
        files_under(&self.scratch_dir)
    }

    pub fn published_files(&self) -> Vec<PathBuf> {
        files_under(&self.published_dir)
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(temp_dir.path(), &options);
    let published_dir = temp_dir.path().join("published");

    let videos = Arc::new(InMemoryVideoRepository::default());
    videos
        .fail_updates
        .store(options.fail_updates, Ordering::SeqCst);

    let video_storage: Arc<dyn Storage> = match options.video_storage {
        Some(storage) => storage,
        None => Arc::new(
            LocalStorage::new(published_dir.clone(), VIDEO_BASE_URL.to_string())
                .await
                .unwrap(),
        ),
    };
    let asset_storage = LocalStorage::new(config.assets_root().clone(), config.assets_base_url())
        .await
        .unwrap();

    let (ffprobe, ffmpeg) = fake_tools();
    let limits = UploadLimits {
        max_video_bytes: config.max_video_size_bytes(),
        max_thumbnail_bytes: config.max_thumbnail_size_bytes(),
    };

    let gate = UploadGate::new(
        videos.clone(),
        Arc::new(JwtAuthenticator::new(TEST_JWT_SECRET, None)),
        limits,
    );
    let uploads = UploadPipeline {
        staging: StagingArea::new(config.scratch_dir().clone()).await.unwrap(),
        prober: Arc::new(FfprobeProber::new(ffprobe).unwrap()),
        remuxer: Arc::new(FfmpegRemuxer::new(ffmpeg).unwrap()),
        video_storage,
        asset_storage: Arc::new(asset_storage),
        videos: videos.clone(),
        limits,
    };

    let state = AppState::new(gate, uploads);
    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        scratch_dir: config.scratch_dir().clone(),
        published_dir,
        assets_dir: config.assets_root().clone(),
        _temp_dir: temp_dir,
    }
}

fn create_test_config(root: &Path, options: &TestOptions) -> Config {
    let base = BaseConfig {
        server_port: 8091,
        public_host: "localhost".to_string(),
        cors_origins: vec!["*".to_string()],
        db_max_connections: 5,
        db_timeout_seconds: 30,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_issuer: None,
        environment: "test".to_string(),
    };

    Config(Box::new(VidforgeConfig {
        base,
        database_url: "postgresql://unused@localhost/vidforge_test".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        s3_distribution_host: None,
        assets_root: root.join("assets"),
        scratch_dir: root.join("scratch"),
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        max_video_size_bytes: options.max_video_bytes,
        max_thumbnail_size_bytes: options.max_thumbnail_bytes,
    }))
}
