//! Checks applied to paths before they reach a subprocess argument list.

use crate::error::ProcessingError;

const DANGEROUS_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

/// Reject shell metacharacters and directory traversal.
pub fn validate_path(path: &str) -> Result<(), ProcessingError> {
    if path.chars().any(|c| DANGEROUS_CHARS.contains(&c)) {
        return Err(ProcessingError::InvalidPath(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProcessingError::InvalidPath(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Tool paths are either a bare program name resolved through `PATH` or a
/// plain filesystem path.
pub fn validate_tool_path(path: &str) -> Result<(), ProcessingError> {
    validate_path(path)?;

    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(ProcessingError::InvalidPath(format!(
            "Tool path contains unsafe characters: {}",
            path
        )));
    }

    Ok(())
}
