//! Types used by the upload gate and pipeline

use std::fmt::{Display, Formatter, Result as FmtResult};
use vidforge_core::AssetClass;

/// Allowance for multipart boundaries and part headers on top of the file
/// size ceiling when checking a declared request length.
pub const MULTIPART_SLACK_BYTES: u64 = 64 * 1024;

/// Per-asset size ceilings in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
}

impl UploadLimits {
    pub fn for_asset(&self, asset: AssetClass) -> u64 {
        match asset {
            AssetClass::Video => self.max_video_bytes,
            AssetClass::Thumbnail => self.max_thumbnail_bytes,
        }
    }

    /// Largest request body accepted for an asset.
    pub fn request_ceiling(&self, asset: AssetClass) -> u64 {
        self.for_asset(asset).saturating_add(MULTIPART_SLACK_BYTES)
    }
}

/// What the client declared about the uploaded part.
#[derive(Debug, Clone, Default)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl FilePart {
    pub fn from_field(field: &axum::extract::multipart::Field<'_>) -> Self {
        Self {
            file_name: field.file_name().map(String::from),
            content_type: field.content_type().map(String::from),
        }
    }
}

/// Last stage an upload run reached. Logged when a run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Validated,
    Staged,
    Classified,
    Remuxed,
    Keyed,
    Published,
    Committed,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Validated => "validated",
            UploadStage::Staged => "staged",
            UploadStage::Classified => "classified",
            UploadStage::Remuxed => "remuxed",
            UploadStage::Keyed => "keyed",
            UploadStage::Published => "published",
            UploadStage::Committed => "committed",
        }
    }
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
