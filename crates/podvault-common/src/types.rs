//! Core type definitions shared by providers, services and callers.
//!
//! Provider kinds are serialized in lowercase, matching the names callers pass
//! in search requests and the `provider` field of normalized records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Upstream podcast metadata provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Apple iTunes Search API (no auth, base metadata).
    Itunes,
    /// Taddy GraphQL API (header credentials).
    Taddy,
    /// Podchaser GraphQL API (ratings and credits).
    Podchaser,
}

impl ProviderKind {
    /// Every provider, in registry order.
    pub const ALL: [ProviderKind; 3] = [Self::Itunes, Self::Taddy, Self::Podchaser];

    /// Lowercase name used in cache keys, payloads and requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Itunes => "itunes",
            Self::Taddy => "taddy",
            Self::Podchaser => "podchaser",
        }
    }

    /// Names of all available providers.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(ProviderKind::as_str).collect()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "itunes" => Ok(Self::Itunes),
            "taddy" => Ok(Self::Taddy),
            "podchaser" => Ok(Self::Podchaser),
            other => Err(Error::unknown_provider(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Itunes.to_string(), "itunes");
        assert_eq!(ProviderKind::Taddy.to_string(), "taddy");
        assert_eq!(ProviderKind::Podchaser.to_string(), "podchaser");
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("itunes".parse::<ProviderKind>().unwrap(), ProviderKind::Itunes);
        assert_eq!(" Podchaser ".parse::<ProviderKind>().unwrap(), ProviderKind::Podchaser);
        assert_eq!("TADDY".parse::<ProviderKind>().unwrap(), ProviderKind::Taddy);
    }

    #[test]
    fn test_provider_kind_parse_unknown() {
        let err = "spotify".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("spotify"));
    }

    #[test]
    fn test_provider_kind_serialization() {
        let json = serde_json::to_string(&ProviderKind::Podchaser).unwrap();
        assert_eq!(json, "\"podchaser\"");

        let kind: ProviderKind = serde_json::from_str("\"itunes\"").unwrap();
        assert_eq!(kind, ProviderKind::Itunes);
    }

    #[test]
    fn test_names_in_registry_order() {
        assert_eq!(ProviderKind::names(), vec!["itunes", "taddy", "podchaser"]);
    }
}
