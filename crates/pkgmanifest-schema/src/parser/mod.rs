//! Per-format manifest parsers.
//!
//! Every parser turns raw document text into a normalized [`FieldMap`] using
//! canonical field names. [`ManifestParser`] selects the parser for a declared
//! [`ManifestKind`]; it never inspects the document to guess its format.

mod library_json;
mod library_properties;
mod module_json;
mod package_json;
mod platform_json;

pub use library_json::LibraryJsonParser;
pub use library_properties::LibraryPropertiesParser;
pub use module_json::ModuleJsonParser;
pub use package_json::PackageJsonParser;
pub use platform_json::PlatformJsonParser;

use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::FieldMap;
use serde_json::Value;
use tracing::debug;

/// Out-of-band information supplied by whoever fetched the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseHints {
    /// Where the document was downloaded from. Used by the properties parser
    /// to derive the repository and the export include path.
    pub remote_url: Option<String>,
}

impl ParseHints {
    pub fn with_remote_url(url: impl Into<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
        }
    }
}

/// Format-specific extraction into canonical fields.
pub trait ParseManifest {
    const KIND: ManifestKind;

    fn parse(&self, contents: &str, hints: &ParseHints) -> Result<FieldMap, ManifestError>;
}

/// The parser for one declared manifest kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestParser {
    LibraryJson(LibraryJsonParser),
    ModuleJson(ModuleJsonParser),
    LibraryProperties(LibraryPropertiesParser),
    PlatformJson(PlatformJsonParser),
    PackageJson(PackageJsonParser),
}

impl ManifestParser {
    pub fn for_kind(kind: ManifestKind) -> Self {
        match kind {
            ManifestKind::LibraryJson => Self::LibraryJson(LibraryJsonParser),
            ManifestKind::ModuleJson => Self::ModuleJson(ModuleJsonParser),
            ManifestKind::LibraryProperties => Self::LibraryProperties(LibraryPropertiesParser),
            ManifestKind::PlatformJson => Self::PlatformJson(PlatformJsonParser),
            ManifestKind::PackageJson => Self::PackageJson(PackageJsonParser),
        }
    }

    /// Select a parser from a declared kind name such as `library-json` or
    /// `library.properties`.
    pub fn from_declared(kind: &str) -> Result<Self, ManifestError> {
        Ok(Self::for_kind(kind.parse()?))
    }

    pub fn kind(&self) -> ManifestKind {
        match self {
            Self::LibraryJson(_) => LibraryJsonParser::KIND,
            Self::ModuleJson(_) => ModuleJsonParser::KIND,
            Self::LibraryProperties(_) => LibraryPropertiesParser::KIND,
            Self::PlatformJson(_) => PlatformJsonParser::KIND,
            Self::PackageJson(_) => PackageJsonParser::KIND,
        }
    }

    pub fn parse(&self, contents: &str, hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        debug!("parsing {} manifest ({} bytes)", self.kind(), contents.len());
        match self {
            Self::LibraryJson(p) => p.parse(contents, hints),
            Self::ModuleJson(p) => p.parse(contents, hints),
            Self::LibraryProperties(p) => p.parse(contents, hints),
            Self::PlatformJson(p) => p.parse(contents, hints),
            Self::PackageJson(p) => p.parse(contents, hints),
        }
    }
}

/// Parse `contents` as a manifest of the declared `kind`.
pub fn parse_manifest(
    contents: &str,
    kind: &str,
    hints: &ParseHints,
) -> Result<FieldMap, ManifestError> {
    ManifestParser::from_declared(kind)?.parse(contents, hints)
}

/// Decode a JSON document whose root must be an object.
pub(crate) fn parse_json_object(kind: ManifestKind, contents: &str) -> Result<FieldMap, ManifestError> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ManifestError::malformed(
            kind,
            format!("expected a JSON object at the top level, got {}", json_type(&other)),
        )),
        Err(e) => Err(ManifestError::malformed(kind, e)),
    }
}

/// Move `from` to `to` unless `to` is already set.
pub(crate) fn rename_field(fields: &mut FieldMap, from: &str, to: &str) {
    if let Some(value) = fields.remove(from) {
        if fields.get(to).is_none_or(Value::is_null) {
            debug!("renaming legacy field `{from}` to `{to}`");
            fields.insert(to.to_owned(), value);
        }
    }
}

pub(crate) fn string_list_value(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::String((*s).to_owned())).collect())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_parser_per_kind() {
        for kind in ManifestKind::ALL {
            assert_eq!(ManifestParser::for_kind(kind).kind(), kind);
            assert_eq!(
                ManifestParser::from_declared(kind.file_name()).unwrap().kind(),
                kind
            );
        }
    }

    #[test]
    fn factory_rejects_unknown_kind() {
        let err = parse_manifest("{}", "setup.py", &ParseHints::default()).unwrap_err();
        assert!(matches!(err, ManifestError::UnknownManifestKind(_)));
    }

    #[test]
    fn json_parsers_reject_non_objects() {
        for kind in ["library-json", "module-json", "platform-json", "package-json"] {
            let err = parse_manifest("[1, 2]", kind, &ParseHints::default()).unwrap_err();
            assert!(
                matches!(err, ManifestError::MalformedDocument { .. }),
                "{kind}: {err}"
            );
            let err = parse_manifest("{ \"name\": ", kind, &ParseHints::default()).unwrap_err();
            assert!(matches!(err, ManifestError::MalformedDocument { .. }));
        }
    }

    #[test]
    fn rename_keeps_existing_target() {
        let mut fields = parse_json_object(
            ManifestKind::PackageJson,
            r#"{"url": "http://old", "homepage": "http://new"}"#,
        )
        .unwrap();
        rename_field(&mut fields, "url", "homepage");
        assert_eq!(fields.get("homepage").unwrap(), "http://new");
        assert!(fields.get("url").is_none());
    }
}
