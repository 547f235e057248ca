//! Error types used throughout podvault.
//!
//! [`ProviderError`] is the closed taxonomy every upstream provider translates
//! its transport and GraphQL failures into before they cross the provider
//! boundary. [`Error`] is the crate-wide error that services and the catalog
//! facade return; it carries enough context to derive an HTTP-style status
//! code via [`Error::http_status`] and a structured [`ErrorBody`].

use serde::Serialize;

use crate::types::ProviderKind;

/// Failure reported by an upstream provider.
///
/// Every variant carries the provider that failed so callers can include it
/// in error responses without inspecting the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered HTTP 429 and any retries were spent.
    #[error("[{provider}] {message}")]
    RateLimitExceeded {
        /// Provider that rejected the request.
        provider: ProviderKind,
        /// Human-readable description.
        message: String,
    },

    /// Every configured credential pair has spent its quota.
    #[error("[{provider}] {message}")]
    QuotaExhausted {
        /// Provider whose quota is spent.
        provider: ProviderKind,
        /// Human-readable description.
        message: String,
    },

    /// Network error, unexpected status, GraphQL error or malformed payload.
    #[error("[{provider}] {message}")]
    ProviderUnavailable {
        /// Provider that could not be reached or understood.
        provider: ProviderKind,
        /// Human-readable description.
        message: String,
    },
}

impl ProviderError {
    /// Create a new RateLimitExceeded error.
    pub fn rate_limited(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::RateLimitExceeded {
            provider,
            message: message.into(),
        }
    }

    /// Create a new QuotaExhausted error.
    pub fn quota_exhausted(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::QuotaExhausted {
            provider,
            message: message.into(),
        }
    }

    /// Create a new ProviderUnavailable error.
    pub fn unavailable(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    /// The provider that produced this error.
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::RateLimitExceeded { provider, .. }
            | Self::QuotaExhausted { provider, .. }
            | Self::ProviderUnavailable { provider, .. } => *provider,
        }
    }

    /// The human-readable message without the provider prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::RateLimitExceeded { message, .. }
            | Self::QuotaExhausted { message, .. }
            | Self::ProviderUnavailable { message, .. } => message,
        }
    }

    /// Stable name of the failure kind, used as `error_kind` in error bodies.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RateLimitExceeded",
            Self::QuotaExhausted { .. } => "QuotaExhausted",
            Self::ProviderUnavailable { .. } => "ProviderUnavailable",
        }
    }

    /// Map this error to an HTTP status code class.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::RateLimitExceeded { .. } => 429,
            Self::QuotaExhausted { .. } => 503,
            Self::ProviderUnavailable { .. } => 502,
        }
    }

    /// Whether this is a terminal quota failure.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
}

/// Common error type for podvault.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Caller input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description.
        message: String,
        /// Accepted values, when the input must be one of a fixed set.
        available: Vec<String>,
    },

    /// The requested resource does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An upstream provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The cache backend failed or held an unreadable payload.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation {
            message: msg.into(),
            available: Vec::new(),
        }
    }

    /// Validation error for a provider name outside [`ProviderKind::ALL`].
    pub fn unknown_provider(name: &str) -> Self {
        Self::Validation {
            message: format!("Unknown provider '{name}'."),
            available: ProviderKind::names().into_iter().map(String::from).collect(),
        }
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Provider(e) => e.http_status(),
            Self::Cache(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// The provider error wrapped by this error, if any.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }

    /// Render the structured error payload handed to callers.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation { message, available } => ErrorBody {
                error_kind: "ValidationError".to_string(),
                detail: message.clone(),
                provider: None,
                available: (!available.is_empty()).then(|| available.clone()),
            },
            Self::NotFound(msg) => ErrorBody::plain("NotFound", msg),
            Self::Provider(e) => ErrorBody {
                error_kind: e.kind_name().to_string(),
                detail: e.to_string(),
                provider: Some(e.provider().to_string()),
                available: None,
            },
            Self::Cache(msg) => ErrorBody::plain("CacheError", msg),
            Self::Internal(msg) => ErrorBody::plain("InternalError", msg),
        }
    }
}

/// Structured error payload: kind, human detail and the provider involved.
///
/// `provider` is always present (null when no provider was involved);
/// `available` is only rendered for validation errors over a fixed set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error_kind: String,
    pub detail: String,
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl ErrorBody {
    fn plain(kind: &str, detail: &str) -> Self {
        Self {
            error_kind: kind.to_string(),
            detail: detail.to_string(),
            provider: None,
            available: None,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
