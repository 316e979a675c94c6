#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for layered payload decoding
//!
//! Builds payloads the way the CDN serves them and checks that every layer
//! order decodes back to the original JSON, and that key problems surface as
//! typed errors rather than garbage text.

use fogwright_crypto::{AccessKey, KeyStore};
use fogwright_formats::payload::{DecodeError, LayerTag, LayeredDecoder, PayloadBuilder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const CATALOG: &str = r#"[{"contentHash":"3f2a","downloadStrategy":"lazy","packagedPath":"/Game/UI/Icons/Perk_01.Perk_01","schema":"image","uri":"icons/perk_01.png"}]"#;

fn live_key() -> AccessKey {
    AccessKey::from_material("8.1.0_live", &[0x5a; 32])
}

fn harvested_store() -> KeyStore {
    let source = format!(
        "[AccessKeys]\n+Keys=(KeyId=\"{}\",Key=\"{}\")\n",
        live_key().id,
        live_key().key
    );
    let mut store = KeyStore::new();
    store.harvest(&source, "[AccessKeys]");
    store
}

// --- Layer orders seen on the CDN ---

#[test]
fn decode_asset_over_zlib() {
    let payload = PayloadBuilder::new(CATALOG)
        .compress()
        .unwrap()
        .encrypt_asset("live", &live_key())
        .unwrap()
        .build();
    assert_eq!(LayerTag::detect(&payload), Some(LayerTag::AssetEncrypted));

    let keys = harvested_store();
    let text = LayeredDecoder::new(&keys, "live").decode(&payload).unwrap();
    assert_eq!(text, CATALOG);
}

#[test]
fn decode_profile_over_zlib() {
    let payload = PayloadBuilder::new(CATALOG)
        .compress()
        .unwrap()
        .encrypt_profile()
        .unwrap()
        .build();

    let keys = KeyStore::new();
    let text = LayeredDecoder::new(&keys, "live").decode(&payload).unwrap();
    assert_eq!(text, CATALOG);
}

#[test]
fn decode_zlib_over_asset() {
    let payload = PayloadBuilder::new(CATALOG)
        .encrypt_asset("live", &live_key())
        .unwrap()
        .compress()
        .unwrap()
        .build();

    let keys = harvested_store();
    let text = LayeredDecoder::new(&keys, "live").decode(&payload).unwrap();
    assert_eq!(text, CATALOG);
}

// --- Key problems ---

#[test]
fn missing_key_is_reported_by_id() {
    let payload = PayloadBuilder::new(CATALOG)
        .encrypt_asset("live", &live_key())
        .unwrap()
        .build();

    let keys = KeyStore::new();
    let err = LayeredDecoder::new(&keys, "live")
        .decode(&payload)
        .unwrap_err();
    assert!(err.is_key_problem());
    match err {
        DecodeError::UnknownKey { key_id } => assert_eq!(key_id, "8.1.0_live"),
        other => panic!("expected UnknownKey, got {other}"),
    }
}

#[test]
fn branch_mismatch_reads_a_different_key_id() {
    let payload = PayloadBuilder::new(CATALOG)
        .encrypt_asset("live", &live_key())
        .unwrap()
        .build();

    // A longer branch name widens the id field into the ciphertext
    let keys = harvested_store();
    let err = LayeredDecoder::new(&keys, "stage")
        .decode(&payload)
        .unwrap_err();
    assert!(err.is_key_problem(), "unexpected error: {err}");
}

// --- Properties ---

proptest! {
    #[test]
    fn zlib_roundtrip_any_json_string(text in "\\PC{0,120}") {
        let json = serde_json::to_string(&text).unwrap();
        let payload = PayloadBuilder::new(json.clone()).compress().unwrap().build();

        let keys = KeyStore::new();
        let decoded = LayeredDecoder::new(&keys, "live").decode(&payload).unwrap();
        prop_assert_eq!(decoded, json);
    }

    #[test]
    fn profile_roundtrip_ascii_json(text in "[ -~]{0,120}") {
        let json = serde_json::to_string(&text).unwrap();
        let payload = PayloadBuilder::new(json.clone()).encrypt_profile().unwrap().build();

        let keys = KeyStore::new();
        let decoded = LayeredDecoder::new(&keys, "live").decode(&payload).unwrap();
        prop_assert_eq!(decoded, json);
    }
}
