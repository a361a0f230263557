use super::{parse_json_object, rename_field, ParseHints, ParseManifest};
use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::{normalize_fields, FieldMap};

/// Tool / toolchain `package.json` records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageJsonParser;

impl ParseManifest for PackageJsonParser {
    const KIND: ManifestKind = ManifestKind::PackageJson;

    fn parse(&self, contents: &str, _hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        let mut fields = parse_json_object(Self::KIND, contents)?;
        rename_field(&mut fields, "url", "homepage");
        Ok(normalize_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(contents: &str) -> FieldMap {
        PackageJsonParser
            .parse(contents, &ParseHints::default())
            .unwrap()
    }

    #[test]
    fn url_becomes_homepage() {
        let fields = parse(
            r#"{
                "name": "tool-scons",
                "description": "SCons software construction tool",
                "url": "http://www.scons.org",
                "version": "3.30101.0"
            }"#,
        );
        assert_eq!(
            serde_json::Value::Object(fields),
            json!({
                "name": "tool-scons",
                "description": "SCons software construction tool",
                "homepage": "http://www.scons.org",
                "version": "3.30101.0"
            })
        );
    }

    #[test]
    fn wildcard_system_is_removed() {
        assert!(!parse(r#"{"system": "*"}"#).contains_key("system"));
        assert!(!parse(r#"{"system": ["*"]}"#).contains_key("system"));
    }

    #[test]
    fn system_string_is_wrapped() {
        assert_eq!(
            parse(r#"{"system": "darwin_x86_64"}"#)["system"],
            json!(["darwin_x86_64"])
        );
        assert_eq!(
            parse(r#"{"system": ["Linux_x86_64", " windows_amd64 "]}"#)["system"],
            json!(["linux_x86_64", "windows_amd64"])
        );
    }
}
