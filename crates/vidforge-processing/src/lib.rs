//! Vidforge Processing Library
//!
//! Scratch-file staging and the two external tools run against a staged
//! upload: `ffprobe` for geometry and `ffmpeg` for the fast-start remux.

pub mod error;
pub mod probe;
pub mod remux;
pub mod staging;
pub mod validator;

#[cfg(all(test, unix))]
pub(crate) mod test_support;

pub use error::ProcessingError;
pub use probe::{FfprobeProber, VideoProber};
pub use remux::{FfmpegRemuxer, Remuxer};
pub use staging::{StagedFile, StagedHandle, StagedOrigin, StagingArea, StagingScope};
