//! Error types for reading HAR recordings

use std::path::PathBuf;

/// Errors raised while decoding a HAR file or one of its entries
#[derive(Debug, thiserror::Error)]
pub enum HarError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text is not JSON, or a field has the wrong shape
    #[error("invalid HAR document: {0}")]
    Json(#[from] serde_json::Error),

    /// Required field absent from the document
    #[error("missing field {0:?}")]
    MissingField(&'static str),

    /// Method outside of GET, POST, PUT, OPTIONS, DELETE
    #[error("unsupported HTTP method: {0:?}")]
    UnsupportedMethod(String),

    /// `startedDateTime` is not a date nor a date-time
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// `request.url` can't be parsed as an absolute URL
    #[error("invalid URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// `request.postData` is not usable as a request body
    #[error("invalid HAR postData object: {0}")]
    InvalidPostData(String),
}

impl HarError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create post data error
    pub fn invalid_post_data(reason: impl Into<String>) -> Self {
        Self::InvalidPostData(reason.into())
    }
}

/// Result type alias for HAR decoding
pub type HarResult<T> = Result<T, HarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        assert_eq!(
            HarError::MissingField("startedDateTime").to_string(),
            "missing field \"startedDateTime\""
        );
    }

    #[test]
    fn io_error_names_path() {
        let err = HarError::io_error(
            "a/b.har",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().starts_with("io error reading a/b.har"));
    }
}
