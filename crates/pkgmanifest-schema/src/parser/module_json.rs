use super::{parse_json_object, string_list_value, ParseHints, ParseManifest};
use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::{authors_from_list, normalize_fields, FieldMap};
use serde_json::{Map, Value};
use tracing::debug;

const DEFAULT_EXCLUDE: &[&str] = &["tests", "test", "*.doxyfile", "*.pdf"];

/// Fields copied verbatim before normalization.
const PASSTHROUGH: &[&str] = &[
    "name",
    "version",
    "description",
    "keywords",
    "homepage",
    "repository",
    "license",
    "platforms",
    "frameworks",
    "export",
    "examples",
];

/// mbed / yotta `module.json` manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleJsonParser;

impl ParseManifest for ModuleJsonParser {
    const KIND: ManifestKind = ManifestKind::ModuleJson;

    fn parse(&self, contents: &str, _hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        let mut raw = parse_json_object(Self::KIND, contents)?;
        let mut fields = FieldMap::new();
        for key in PASSTHROUGH {
            if let Some(value) = raw.remove(*key).filter(|v| !v.is_null()) {
                fields.insert((*key).to_owned(), value);
            }
        }

        if !fields.contains_key("license") {
            if let Some(license) = raw.get("licenses").and_then(first_license) {
                fields.insert("license".to_owned(), Value::String(license));
            }
        }
        if let Some(authors) = raw.remove("author").or_else(|| raw.remove("authors")) {
            if let Some(authors) = parse_authors(authors) {
                fields.insert("authors".to_owned(), authors);
            }
        }

        fields
            .entry("platforms")
            .or_insert_with(|| string_list_value(&["*"]));
        fields
            .entry("frameworks")
            .or_insert_with(|| string_list_value(&["mbed"]));
        fields.entry("export").or_insert_with(|| {
            let mut export = Map::new();
            export.insert("exclude".to_owned(), string_list_value(DEFAULT_EXCLUDE));
            Value::Object(export)
        });

        Ok(normalize_fields(fields))
    }
}

/// `licenses: [{type, url}, ...]` collapses to the first entry's type.
fn first_license(licenses: &Value) -> Option<String> {
    let Value::Array(items) = licenses else {
        debug!("ignoring `licenses`: not a sequence");
        return None;
    };
    let license = match items.first()? {
        Value::Object(entry) => entry.get("type")?.as_str()?,
        Value::String(id) => id.as_str(),
        _ => return None,
    };
    Some(license.trim().to_owned()).filter(|l| !l.is_empty())
}

/// yotta writes authors as one `"Name <email>, Other <email>"` string.
fn parse_authors(raw: Value) -> Option<Value> {
    match raw {
        Value::String(list) => {
            let authors = authors_from_list(&list, false);
            (!authors.is_empty()).then_some(Value::Array(authors))
        }
        Value::Null => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YOTTA: &str = r#"
{
  "author": "Name Surname <name@surname.com>",
  "description": "This is Yotta library",
  "homepage": "https://yottabuild.org",
  "keywords": ["mbed", "Yotta"],
  "licenses": [
    {"type": "Apache-2.0", "url": "https://spdx.org/licenses/Apache-2.0"}
  ],
  "name": "YottaLibrary",
  "repository": {"type": "git", "url": "git@github.com:username/repo.git"},
  "version": "1.2.3"
}
"#;

    #[test]
    fn parses_yotta_module() {
        let fields = ModuleJsonParser.parse(YOTTA, &ParseHints::default()).unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({
                "name": "YottaLibrary",
                "description": "This is Yotta library",
                "homepage": "https://yottabuild.org",
                "keywords": ["mbed", "yotta"],
                "license": "Apache-2.0",
                "platforms": ["*"],
                "frameworks": ["mbed"],
                "export": {"exclude": ["tests", "test", "*.doxyfile", "*.pdf"]},
                "repository": {"type": "git", "url": "git@github.com:username/repo.git"},
                "authors": [
                    {"maintainer": false, "email": "name@surname.com", "name": "Name Surname"}
                ],
                "version": "1.2.3"
            })
        );
    }

    #[test]
    fn declared_targets_override_defaults() {
        let fields = ModuleJsonParser
            .parse(
                r#"{"name": "m", "platforms": "esp32", "frameworks": ["mbed", "arduino"]}"#,
                &ParseHints::default(),
            )
            .unwrap();
        assert_eq!(fields["platforms"], json!(["espressif32"]));
        assert_eq!(fields["frameworks"], json!(["mbed", "arduino"]));
    }

    #[test]
    fn several_authors_in_one_string() {
        let fields = ModuleJsonParser
            .parse(
                r#"{"author": "A <a@x.org>, B (b AT y.org), None"}"#,
                &ParseHints::default(),
            )
            .unwrap();
        assert_eq!(
            fields["authors"],
            json!([
                {"name": "A", "email": "a@x.org", "maintainer": false},
                {"name": "B", "email": "b@y.org", "maintainer": false}
            ])
        );
    }

    #[test]
    fn author_object_and_list_forms() {
        let fields = ModuleJsonParser
            .parse(
                r#"{"author": {"name": " Jane Doe ", "email": "jane AT y.org"}}"#,
                &ParseHints::default(),
            )
            .unwrap();
        assert_eq!(
            fields["authors"],
            json!([{"name": "Jane Doe", "email": "jane@y.org", "maintainer": false}])
        );

        let fields = ModuleJsonParser
            .parse(
                r#"{"author": [{"name": "A"}, "B <b at y.org>"]}"#,
                &ParseHints::default(),
            )
            .unwrap();
        assert_eq!(
            fields["authors"],
            json!([
                {"name": "A", "maintainer": false},
                {"name": "B", "email": "b@y.org", "maintainer": false}
            ])
        );
    }

    #[test]
    fn licenses_without_type_are_skipped() {
        assert_eq!(first_license(&json!([{"url": "x"}])), None);
        assert_eq!(first_license(&json!(["MIT"])), Some("MIT".to_owned()));
        assert_eq!(first_license(&json!("MIT")), None);
    }
}
