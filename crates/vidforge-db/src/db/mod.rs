//! Database repositories for data access layer
//
// Video records (owner, metadata, published URLs)
pub mod video;

pub use video::{PgVideoRepository, VideoRepository};
