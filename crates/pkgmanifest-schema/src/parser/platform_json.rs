use super::{parse_json_object, rename_field, ParseHints, ParseManifest};
use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::{normalize_fields, FieldMap};
use serde_json::Value;

/// Development platform `platform.json` records.
///
/// `engines` and `packages` are carried through as written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformJsonParser;

impl ParseManifest for PlatformJsonParser {
    const KIND: ManifestKind = ManifestKind::PlatformJson;

    fn parse(&self, contents: &str, _hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        let mut fields = parse_json_object(Self::KIND, contents)?;
        rename_field(&mut fields, "url", "homepage");
        // {"arduino": {"package": ..., "script": ...}, ...} declares supported
        // frameworks by key.
        let framework_names = match fields.get("frameworks") {
            Some(Value::Object(frameworks)) => Some(
                frameworks
                    .keys()
                    .map(|name| Value::String(name.to_lowercase()))
                    .collect(),
            ),
            _ => None,
        };
        if let Some(names) = framework_names {
            fields.insert("frameworks".to_owned(), Value::Array(names));
        }
        Ok(normalize_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frameworks_object_collapses_to_names() {
        let fields = PlatformJsonParser
            .parse(
                r#"{
                    "name": "atmelavr",
                    "url": "http://www.atmel.com/avr",
                    "homepage": "http://platformio.org/platforms/atmelavr",
                    "frameworks": {
                        "Arduino": {"package": "framework-arduinoavr"},
                        "simba": {"package": "framework-simba"}
                    },
                    "engines": {"platformio": "<5"},
                    "packages": {"toolchain-atmelavr": {"type": "toolchain", "version": "~1.50400.0"}}
                }"#,
                &ParseHints::default(),
            )
            .unwrap();
        assert_eq!(fields["homepage"], "http://platformio.org/platforms/atmelavr");
        assert!(fields.get("url").is_none());
        let mut frameworks: Vec<&str> = fields["frameworks"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        frameworks.sort_unstable();
        assert_eq!(frameworks, ["arduino", "simba"]);
        assert_eq!(fields["engines"], json!({"platformio": "<5"}));
        assert_eq!(
            fields["packages"]["toolchain-atmelavr"]["version"],
            "~1.50400.0"
        );
    }
}
