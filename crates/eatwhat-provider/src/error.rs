use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited on {endpoint} (retry after {retry_after_secs}s)")]
    RateLimited {
        endpoint: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// HTTP succeeded but the provider reported `status != "1"`.
    #[error("provider rejected {endpoint}: {info}")]
    Rejected { endpoint: String, info: String },

    #[error("invalid provider base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("no POI provider API key configured (set EATWHAT_POI_API_KEY)")]
    MissingApiKey,
}

impl ProviderError {
    /// Whether the failure happened below the provider's own status envelope:
    /// the request never produced a readable provider answer.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        !matches!(
            self,
            ProviderError::Rejected { .. }
                | ProviderError::InvalidBaseUrl { .. }
                | ProviderError::MissingApiKey
        )
    }
}
