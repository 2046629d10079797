//! Resource failures. Every loader in the workspace reports through this one
//! type; a `ResourceError` at startup means the game never enters its loop.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Validation failed for {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("Missing {kind} '{name}' referenced by {}", .path.display())]
    Missing {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },
}

impl ResourceError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, message: impl ToString) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn missing(kind: &'static str, name: impl Into<String>, path: &Path) -> Self {
        Self::Missing {
            kind,
            name: name.into(),
            path: path.to_path_buf(),
        }
    }

    /// Path of the resource that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Invalid { path, .. }
            | Self::Missing { path, .. } => path,
        }
    }
}

/// Read a whole text resource, mapping I/O failures to [`ResourceError::Read`].
pub fn read_text(path: &Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|e| ResourceError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_reports_missing_file_with_path() {
        let path = std::env::temp_dir().join("hop_error_test_definitely_missing.txt");
        let err = read_text(&path).expect_err("missing file should fail");
        assert!(matches!(err, ResourceError::Read { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn invalid_message_includes_path_and_reason() {
        let err = ResourceError::invalid(Path::new("maps/level1.txt"), "map is empty");
        let text = err.to_string();
        assert!(text.contains("maps/level1.txt"));
        assert!(text.contains("map is empty"));
    }

    #[test]
    fn missing_message_names_the_reference() {
        let err = ResourceError::missing("animation clip", "dead", Path::new("player.json"));
        assert_eq!(
            err.to_string(),
            "Missing animation clip 'dead' referenced by player.json"
        );
    }
}
