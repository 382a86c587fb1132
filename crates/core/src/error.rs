//! Error taxonomy for gallery operations

use thiserror::Error;

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;

/// Boxed transport failure carried by [`GalleryError::Network`]
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// Connection, timeout or body transfer failure
    #[error("network error talking to {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The device description has no usable ContentDirectory service
    #[error("ContentDirectory service not found: {0}")]
    NotFound(String),

    /// Malformed SOAP envelope or DIDL-Lite payload
    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("traversal cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl GalleryError {
    pub fn network(url: impl Into<String>, source: impl Into<TransportError>) -> Self {
        GalleryError::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn decode(what: &'static str, message: impl ToString) -> Self {
        GalleryError::Decode {
            what,
            message: message.to_string(),
        }
    }

    /// Only transport failures are worth retrying; the rest will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GalleryError::Network { .. })
    }
}
