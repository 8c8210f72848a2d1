//! Vidforge database layer
//!
//! Repository traits consumed by the upload pipeline and their PostgreSQL
//! implementations.

pub mod db;

pub use db::{PgVideoRepository, VideoRepository};
