//! Payload and document formats for the fogwright CDN client
//!
#![allow(clippy::cast_possible_wrap)] // Length prefixes are signed on the wire
#![allow(clippy::doc_markdown)] // CDN terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate turns raw CDN response bodies into usable text and structures.
//!
//! # Supported Formats
//!
//! - **Layered payloads**: asset-encrypted, profile-encrypted and
//!   zlib-compressed layers stacked in any order over JSON text
//! - **Version-check responses**: candidate versions with publication
//!   timestamps
//! - **Dynamic content catalogs**: individually downloadable assets and the
//!   mapping from packaged paths to local paths
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every payload layer can be decoded and built
//! - **No partial output**: a payload either decodes to JSON or fails with a
//!   typed error
//! - **No I/O**: parsing works on text already in memory

#![warn(missing_docs)]

/// Dynamic content catalog and local path mapping
pub mod catalog;

/// Layered payload decoding and encoding
///
/// [`LayeredDecoder`](payload::LayeredDecoder) strips layers until JSON
/// remains; [`PayloadBuilder`](payload::PayloadBuilder) adds them.
pub mod payload;

/// Version-check response parsing
pub mod versions;

pub use catalog::{
    AssetPathPolicy, CatalogEntry, CatalogError, DynamicContentCatalog, ProjectPathPolicy,
};
pub use payload::{DecodeError, EncodeError, LayerTag, LayeredDecoder, PayloadBuilder};
pub use versions::{AvailableVersions, VersionCandidate};
