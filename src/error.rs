use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds surfaced by the asset pipeline.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("decode {content_type} failed: {source}")]
    Decode {
        content_type: String,
        #[source]
        source: image::ImageError,
    },

    #[error("encode {content_type} failed: {source}")]
    Encode {
        content_type: String,
        #[source]
        source: image::ImageError,
    },

    #[error("{op} {} failed: {source}", path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("no free filename after {attempts} attempts")]
    NamesExhausted { attempts: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedContentType,
    Decode,
    Encode,
    Filesystem,
    InvalidFilename,
    NamesExhausted,
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;

impl AssetError {
    pub fn filesystem(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        AssetError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::UnsupportedContentType(_) => ErrorKind::UnsupportedContentType,
            AssetError::Decode { .. } => ErrorKind::Decode,
            AssetError::Encode { .. } => ErrorKind::Encode,
            AssetError::Filesystem { .. } => ErrorKind::Filesystem,
            AssetError::InvalidFilename(_) => ErrorKind::InvalidFilename,
            AssetError::NamesExhausted { .. } => ErrorKind::NamesExhausted,
        }
    }

    /// True for filesystem failures caused by a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssetError::Filesystem { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }

    /// Errors caused by what the caller sent rather than by the server.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedContentType | ErrorKind::Decode | ErrorKind::InvalidFilename
        )
    }
}
