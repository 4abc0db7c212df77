use haulgeo_engine::ProviderError;
use thiserror::Error;

/// Errors returned by the AMap web-service client.
#[derive(Debug, Error)]
pub enum AmapError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with `"status": "0"`.
    #[error("AMap API error ({infocode}): {info}")]
    Api { infocode: String, info: String },

    /// The service rejected the call for exceeding a rate limit.
    #[error("AMap rate limit ({infocode}): {info}")]
    RateLimited { infocode: String, info: String },

    #[error("invalid AMap base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AmapError> for ProviderError {
    fn from(err: AmapError) -> Self {
        match err {
            AmapError::Http(e) => ProviderError::Transport(Box::new(e)),
            AmapError::Api { infocode, info } | AmapError::RateLimited { infocode, info } => {
                ProviderError::Rejected {
                    code: infocode,
                    message: info,
                }
            }
            AmapError::InvalidBaseUrl { .. } | AmapError::Deserialize { .. } => {
                ProviderError::Malformed(err.to_string())
            }
        }
    }
}
