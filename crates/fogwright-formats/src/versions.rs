//! Version-check response parsing and latest-version selection
//!
//! The endpoint answers with a mapping from candidate version to an opaque
//! value whose last `-`-delimited segment is a timestamp:
//!
//! ```json
//! { "availableVersions": { "8.1.0_2047380live": "8.1.0_2047380live-1720000000" } }
//! ```
//!
//! The wrapper object is optional.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One selectable version with its publication timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    /// Version string as served
    pub version: String,
    /// Trailing timestamp of the value
    pub timestamp: i64,
}

/// Parsed version-check response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableVersions {
    candidates: Vec<VersionCandidate>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseShape {
    Wrapped {
        #[serde(rename = "availableVersions")]
        available_versions: BTreeMap<String, serde_json::Value>,
    },
    Flat(BTreeMap<String, serde_json::Value>),
}

impl AvailableVersions {
    /// Parse a response body
    ///
    /// Entries whose value is not a string or has no integer trailing segment
    /// are dropped.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let map = match serde_json::from_str::<ResponseShape>(body)? {
            ResponseShape::Wrapped { available_versions } => available_versions,
            ResponseShape::Flat(map) => map,
        };

        let candidates = map
            .into_iter()
            .filter_map(|(version, value)| {
                let timestamp = trailing_timestamp(value.as_str()?)?;
                Some(VersionCandidate { version, timestamp })
            })
            .collect();

        Ok(Self { candidates })
    }

    /// Build from already-parsed candidates
    pub fn from_candidates(candidates: Vec<VersionCandidate>) -> Self {
        Self { candidates }
    }

    /// All usable candidates
    pub fn candidates(&self) -> &[VersionCandidate] {
        &self.candidates
    }

    /// Number of usable candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no usable candidate was served
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate with the greatest timestamp
    ///
    /// Equal timestamps resolve to the lexicographically smallest version.
    pub fn latest(&self) -> Option<&VersionCandidate> {
        self.candidates.iter().min_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.version.cmp(&b.version))
        })
    }
}

fn trailing_timestamp(value: &str) -> Option<i64> {
    value.rsplit('-').next()?.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_by_timestamp() {
        let versions =
            AvailableVersions::parse(r#"{"4.6.0":"x-1000","4.6.1":"x-5000","4.5.9":"x-3000"}"#)
                .expect("parse");
        assert_eq!(versions.len(), 3);
        assert_eq!(versions.latest().expect("latest").version, "4.6.1");
    }

    #[test]
    fn test_wrapped_response() {
        let body = r#"{"availableVersions":{"8.1.0_2047380live":"8.1.0_2047380live-1720000000","8.1.0_2040000live":"8.1.0_2040000live-1710000000"}}"#;
        let versions = AvailableVersions::parse(body).expect("parse");
        let latest = versions.latest().expect("latest");
        assert_eq!(latest.version, "8.1.0_2047380live");
        assert_eq!(latest.timestamp, 1_720_000_000);
    }

    #[test]
    fn test_empty_response() {
        assert!(AvailableVersions::parse("{}").expect("parse").is_empty());
        assert!(
            AvailableVersions::parse(r#"{"availableVersions":{}}"#)
                .expect("parse")
                .latest()
                .is_none()
        );
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let versions =
            AvailableVersions::parse(r#"{"b":"v-10","a":"v-10","c":"v-9"}"#).expect("parse");
        assert_eq!(versions.latest().expect("latest").version, "a");
    }

    #[test]
    fn test_unparsable_values_are_ignored() {
        let versions =
            AvailableVersions::parse(r#"{"a":"no-timestamp","b":42,"c":"v-7"}"#).expect("parse");
        assert_eq!(versions.candidates().len(), 1);
        assert_eq!(versions.latest().expect("latest").version, "c");
    }

    #[test]
    fn test_value_without_dash() {
        let versions = AvailableVersions::parse(r#"{"a":"123"}"#).expect("parse");
        assert_eq!(versions.latest().expect("latest").timestamp, 123);
    }

    #[test]
    fn test_not_an_object() {
        assert!(AvailableVersions::parse("[1,2]").is_err());
    }
}
