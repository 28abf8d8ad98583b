//! Hotspot identity and metadata.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a tracked hotspot (its on-chain address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address, rejecting blank input.
    pub fn parse(raw: impl AsRef<str>) -> crate::Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(crate::Error::invalid_input("address must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines and narrow columns.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Address {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Online status as reported by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnlineStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl OnlineStatus {
    /// Parse the API's free-form status string.
    pub fn from_api(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "online" => Self::Online,
            "offline" => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Geographic position of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Metadata snapshot for a hotspot.
///
/// Replaced wholesale by each fresher fetch; never patched field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HotspotInfo {
    /// Human-readable animal name (e.g. "Tangy Pink Parrot").
    pub name: String,
    /// Owner wallet address.
    pub owner: String,
    /// Advertised public network address, if any.
    pub public_address: Option<String>,
    /// Online status.
    pub status: OnlineStatus,
    /// Asserted location.
    pub location: Option<GeoPoint>,
    /// City from the reverse geocode, if known.
    pub city: Option<String>,
    /// Reward scale (transmit scale) reported by the network.
    pub reward_scale: Option<f64>,
}

impl HotspotInfo {
    /// Convenience constructor used mostly by tests and fakes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == OnlineStatus::Online
    }
}
