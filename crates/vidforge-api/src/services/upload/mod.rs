//! Upload services for video files and thumbnails

pub mod gate;
pub mod pipeline;
pub mod types;

pub use gate::UploadGate;
pub use pipeline::UploadPipeline;
pub use types::{FilePart, UploadLimits, UploadStage, MULTIPART_SLACK_BYTES};
