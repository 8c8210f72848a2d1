//! Data models for the application

mod upload;
mod video;

pub use upload::*;
pub use video::*;
