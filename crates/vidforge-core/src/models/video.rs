use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tolerance applied when matching a width/height ratio against 16:9 or 9:16.
pub const ASPECT_TOLERANCE: f64 = 0.1;

/// A video owned by a single user.
///
/// The upload pipeline writes `video_url`; the thumbnail pipeline writes
/// `thumbnail_url`. Everything else is managed elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Orientation bucket of a video, used as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classify by width/height ratio.
    ///
    /// Callers must reject zero dimensions before classifying.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let ratio = f64::from(width) / f64::from(height);
        if (ratio - 16.0 / 9.0).abs() < ASPECT_TOLERANCE {
            AspectClass::Landscape
        } else if (ratio - 9.0 / 16.0).abs() < ASPECT_TOLERANCE {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
