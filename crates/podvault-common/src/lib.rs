//! Podvault-Common: Shared types and the error taxonomy.
//!
//! This crate provides common functionality used across podvault:
//!
//! - **Provider Kinds**: The closed set of upstream podcast providers
//! - **Error Handling**: Provider failure kinds, the crate-wide error type,
//!   and the structured error body handed to callers
//!
//! # Examples
//!
//! ```
//! use podvault_common::{Error, ProviderError, ProviderKind, Result};
//!
//! let kind: ProviderKind = "iTunes".parse().unwrap();
//! assert_eq!(kind, ProviderKind::Itunes);
//!
//! fn example() -> Result<()> {
//!     Err(ProviderError::unavailable(ProviderKind::Taddy, "connection reset").into())
//! }
//! assert_eq!(example().unwrap_err().http_status(), 502);
//! ```

pub mod error;
pub mod types;

pub use error::{Error, ErrorBody, ProviderError, Result};
pub use types::*;
