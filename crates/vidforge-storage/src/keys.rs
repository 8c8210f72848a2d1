//! Shared key generation for storage backends.
//!
//! Video keys: `{aspect}/{hex}.{ext}`. Thumbnail keys: `{video_id}.{ext}`.

use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;
use vidforge_core::AspectClass;

/// Number of random bytes behind a video key (256 bits).
pub const KEY_ENTROPY_BYTES: usize = 32;

const FALLBACK_EXTENSION: &str = ".bin";

/// Opaque object key, relative to the backend root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an existing key, rejecting traversal and absolute paths.
    pub fn parse(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return None;
        }
        Some(StorageKey(key))
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Derive a fresh key for a published video.
///
/// The random part comes from the thread-local CSPRNG (seeded from the OS).
/// Collisions are not checked.
pub fn derive_video_key(aspect: AspectClass, content_type: &str) -> StorageKey {
    let mut bytes = [0u8; KEY_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    StorageKey(format!(
        "{}/{}{}",
        aspect.as_str(),
        hex::encode(bytes),
        extension_for(content_type)
    ))
}

/// Key of the single thumbnail of a video. Re-uploading overwrites it.
pub fn thumbnail_key(video_id: Uuid, content_type: &str) -> StorageKey {
    StorageKey(format!("{}{}", video_id, extension_for(content_type)))
}

/// File extension for a content type, with the leading dot.
///
/// `video/mp4` gives `.mp4`; anything not shaped like `type/subtype` gives `.bin`.
pub fn extension_for(content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    let mut parts = essence.splitn(2, '/');
    let (Some(kind), Some(subtype)) = (parts.next(), parts.next()) else {
        return FALLBACK_EXTENSION.to_string();
    };

    let subtype = subtype.trim().to_lowercase();
    let valid = !kind.trim().is_empty()
        && !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
    if !valid || subtype.contains("..") {
        return FALLBACK_EXTENSION.to_string();
    }

    format!(".{}", subtype)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_video_key_layout() {
        let key = derive_video_key(AspectClass::Landscape, "video/mp4");
        let s = key.as_str();
        assert!(s.starts_with("landscape/"));
        assert!(s.ends_with(".mp4"));

        let hex_part = &s["landscape/".len()..s.len() - ".mp4".len()];
        assert_eq!(hex_part.len(), KEY_ENTROPY_BYTES * 2);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_video_keys_are_distinct() {
        let keys: HashSet<StorageKey> = (0..10_000)
            .map(|_| derive_video_key(AspectClass::Other, "video/mp4"))
            .collect();
        assert_eq!(keys.len(), 10_000);
    }

    #[test]
    fn test_thumbnail_key_is_stable() {
        let id = Uuid::new_v4();
        assert_eq!(thumbnail_key(id, "image/png"), thumbnail_key(id, "image/png"));
        assert_eq!(thumbnail_key(id, "image/png").as_str(), format!("{}.png", id));
        assert_ne!(thumbnail_key(id, "image/png"), thumbnail_key(id, "image/jpeg"));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("video/mp4"), ".mp4");
        assert_eq!(extension_for("image/jpeg; charset=binary"), ".jpeg");
        assert_eq!(extension_for("image/svg+xml"), ".svg+xml");
        assert_eq!(extension_for("mp4"), ".bin");
        assert_eq!(extension_for(""), ".bin");
        assert_eq!(extension_for("image/"), ".bin");
        assert_eq!(extension_for("image/../../etc"), ".bin");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert!(StorageKey::parse("../secret").is_none());
        assert!(StorageKey::parse("/abs").is_none());
        assert!(StorageKey::parse("portrait/abc.mp4").is_some());
    }
}
