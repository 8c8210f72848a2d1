use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The kind of asset being uploaded for a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Video,
    Thumbnail,
}

impl AssetClass {
    /// Name of the multipart field carrying the file.
    pub fn field_name(&self) -> &'static str {
        match self {
            AssetClass::Video => "video",
            AssetClass::Thumbnail => "thumbnail",
        }
    }

    /// Content type is normalized by the caller (parameters stripped, lower-cased).
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        match self {
            AssetClass::Video => content_type == "video/mp4",
            AssetClass::Thumbnail => !content_type.is_empty(),
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.field_name())
    }
}

/// Strip parameters from a content type and lower-case it:
/// `"Video/MP4; codecs=avc1"` becomes `"video/mp4"`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("Video/MP4; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_content_type(""), "");
    }

    #[test]
    fn test_video_accepts_only_mp4() {
        assert!(AssetClass::Video.accepts_content_type("video/mp4"));
        assert!(!AssetClass::Video.accepts_content_type("video/quicktime"));
        assert!(!AssetClass::Video.accepts_content_type("video/webm"));
    }

    #[test]
    fn test_thumbnail_accepts_any_declared_type() {
        assert!(AssetClass::Thumbnail.accepts_content_type("image/png"));
        assert!(!AssetClass::Thumbnail.accepts_content_type(""));
    }
}
