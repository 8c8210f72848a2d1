//! Application state shared by every handler.

use std::sync::Arc;

use vidforge_db::VideoRepository;
use vidforge_storage::Storage;

use crate::services::upload::{UploadGate, UploadPipeline};

#[derive(Clone)]
pub struct AppState {
    /// Checks run before a request body is read
    pub gate: UploadGate,
    pub uploads: UploadPipeline,
}

impl AppState {
    pub fn new(gate: UploadGate, uploads: UploadPipeline) -> Arc<Self> {
        Arc::new(Self { gate, uploads })
    }

    pub fn videos(&self) -> &Arc<dyn VideoRepository> {
        &self.uploads.videos
    }

    pub fn video_storage(&self) -> &Arc<dyn Storage> {
        &self.uploads.video_storage
    }
}
