//! Manifest parsing, field normalization, and package record validation.
//!
//! This crate turns one raw manifest document (`library.json`,
//! `library.properties`, `module.json`, `platform.json` or `package.json`) into
//! a canonical [`PackageRecord`]. Parsing goes through a per-format
//! [`ManifestParser`] that emits a normalized [`FieldMap`]; validation then
//! either collects field errors ([`PackageRecord::lenient`]) or fails on the
//! first mandatory violation ([`PackageRecord::strict`]).
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod error;
pub mod kind;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod validate;

pub use error::{FieldError, ManifestError};
pub use kind::ManifestKind;
pub use model::{Author, Example, Export, Keywords, PackageRecord, Repository};
pub use normalize::{normalize_fields, FieldMap, PLATFORM_ALIASES};
pub use parser::{parse_manifest, ManifestParser, ParseHints, ParseManifest};
pub use validate::{Validated, ValidationMode};

/// Parse and validate a document of the declared `kind` in one call.
///
/// Syntax errors and unknown kinds always fail. Field problems fail only in
/// [`ValidationMode::Strict`], and only for mandatory fields or the version.
pub fn load_manifest(
    contents: &str,
    kind: &str,
    hints: &ParseHints,
    mode: ValidationMode,
) -> Result<Validated, ManifestError> {
    let fields = parse_manifest(contents, kind, hints)?;
    Ok(PackageRecord::validate(&fields, mode)?)
}
