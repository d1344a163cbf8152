use std::error::Error;
use std::fmt;

/// Error type for metadata fetch operations. Always non-fatal to ingestion:
/// a failed fetch just leaves the metadata entity absent.
#[derive(Debug)]
pub enum MetadataError {
    /// Transport-level failure
    RequestError(reqwest::Error),
    /// The endpoint answered but not with a usable document
    ResponseError(String),
    /// The document did not parse into the expected shape
    ParseError(String),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::RequestError(e) => write!(f, "Metadata request error: {}", e),
            MetadataError::ResponseError(msg) => write!(f, "Metadata response error: {}", msg),
            MetadataError::ParseError(msg) => write!(f, "Metadata parse error: {}", msg),
        }
    }
}

impl Error for MetadataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MetadataError::RequestError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(error: reqwest::Error) -> Self {
        MetadataError::RequestError(error)
    }
}
