//! Vidforge API Library
//!
//! This crate provides the HTTP handlers, the upload pipeline wiring and
//! application setup.

mod api_doc;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{UploadGate, UploadLimits, UploadPipeline};
pub use state::AppState;
