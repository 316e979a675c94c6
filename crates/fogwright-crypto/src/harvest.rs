//! Access key harvesting from extracted configuration text
//!
//! The source is an INI-style resource. Keys live in a single section, one per
//! line, each line carrying a `KeyId="..."` and a `Key="..."` attribute:
//!
//! ```text
//! [AccessKeys]
//! +Keys=(KeyId="8.1.0_live",Key="q2v1...=")
//! +Keys=(KeyId="8.1.0_ptb",Key="Zm9v...=")
//!
//! [NextSection]
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::keys::AccessKey;

#[allow(clippy::expect_used)]
// expect_used: the patterns are literals and known to compile
static KEY_ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|[^A-Za-z0-9_])KeyId\s*=\s*"([^"]*)""#).expect("valid regex"));

#[allow(clippy::expect_used)]
static KEY_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|[^A-Za-z0-9_])Key\s*=\s*"([^"]*)""#).expect("valid regex"));

/// Parse all access keys in `section`
///
/// `section` is the full header line, brackets included. Lines outside the
/// section, comments, and lines missing either attribute are skipped. When an
/// id repeats, the first occurrence wins.
pub fn parse_access_keys(text: &str, section: &str) -> Vec<AccessKey> {
    let section = section.trim();
    let mut in_section = false;
    let mut keys: Vec<AccessKey> = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            in_section = line == section;
            continue;
        }

        if !in_section || line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        let Some(key_id) = capture(&KEY_ID_ATTR, line) else {
            continue;
        };
        let Some(key) = capture(&KEY_ATTR, line) else {
            continue;
        };

        if key_id.is_empty() || keys.iter().any(|k| k.id == key_id) {
            continue;
        }

        keys.push(AccessKey::new(key_id, key));
    }

    keys
}

fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::keys::KeyStore;
    use pretty_assertions::assert_eq;

    const SECTION: &str = "[AccessKeys]";

    const SOURCE: &str = r#"
[/Script/Engine.RendererSettings]
+Keys=(KeyId="ignored_outside",Key="AAAA")

[AccessKeys]
; comment line
+Keys=(KeyId="8.1.0_live",Key="bGl2ZQ==")
+Keys=(KeyId="8.1.0_ptb", Key="cHRi")
+Keys=(Key="b3JkZXI=",KeyId="8.0.2_live")
+Keys=(KeyId="missing_key")
+Keys=(KeyId="8.1.0_live",Key="ZHVwbGljYXRl")

[Other]
+Keys=(KeyId="after_section",Key="BBBB")
"#;

    #[test]
    fn test_parse_section_only() {
        let keys = parse_access_keys(SOURCE, SECTION);
        let ids: Vec<&str> = keys.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, vec!["8.1.0_live", "8.1.0_ptb", "8.0.2_live"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let keys = parse_access_keys(SOURCE, SECTION);
        assert_eq!(keys[0].key, "bGl2ZQ==");
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let keys = parse_access_keys(SOURCE, SECTION);
        assert_eq!(keys[2], AccessKey::new("8.0.2_live", "b3JkZXI="));
    }

    #[test]
    fn test_key_id_is_not_mistaken_for_key() {
        let keys = parse_access_keys("[S]\nKeyId=\"a\",Key=\"b\"\n", "[S]");
        assert_eq!(keys, vec![AccessKey::new("a", "b")]);
    }

    #[test]
    fn test_missing_section() {
        assert!(parse_access_keys(SOURCE, "[Nope]").is_empty());
    }

    #[test]
    fn test_harvest_is_idempotent() {
        let mut store = KeyStore::new();
        let first = store.harvest(SOURCE, SECTION);
        assert_eq!(first.len(), 3);

        let second = store.harvest(SOURCE, SECTION);
        assert!(second.is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_harvest_returns_only_new_entries() {
        let mut store = KeyStore::new();
        store.insert(AccessKey::new("8.1.0_ptb", "existing"));

        let new_keys = store.harvest(SOURCE, SECTION);
        let ids: Vec<&str> = new_keys.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, vec!["8.1.0_live", "8.0.2_live"]);
        assert_eq!(store.get("8.1.0_ptb"), Some("existing"));
    }
}
