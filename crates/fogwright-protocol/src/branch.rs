//! Deployment branches

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deployment channel of the game backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Branch {
    Live,
    Ptb,
    Dev,
    Qa,
    Stage,
    Cert,
    Uat,
}

impl Branch {
    pub const ALL: [Self; 7] = [
        Self::Live,
        Self::Ptb,
        Self::Dev,
        Self::Qa,
        Self::Stage,
        Self::Cert,
        Self::Uat,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Ptb => "ptb",
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Stage => "stage",
            Self::Cert => "cert",
            Self::Uat => "uat",
        }
    }

    /// Branches served through the Steam-family API hosts
    pub const fn uses_steam_api(self) -> bool {
        matches!(self, Self::Live | Self::Ptb | Self::Qa)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Branch {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Branch> for String {
    fn from(branch: Branch) -> Self {
        branch.as_str().to_string()
    }
}

impl FromStr for Branch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownBranch(s.to_string()))
    }
}
