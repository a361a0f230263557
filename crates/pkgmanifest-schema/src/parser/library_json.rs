use super::{parse_json_object, ParseHints, ParseManifest};
use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::{normalize_fields, FieldMap};
use serde_json::{Map, Value};
use tracing::debug;

/// Native `library.json` manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryJsonParser;

impl ParseManifest for LibraryJsonParser {
    const KIND: ManifestKind = ManifestKind::LibraryJson;

    fn parse(&self, contents: &str, _hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        let mut fields = parse_json_object(Self::KIND, contents)?;
        fold_legacy_url(&mut fields);
        fold_export_rules(&mut fields);
        Ok(normalize_fields(fields))
    }
}

fn repository_url(fields: &FieldMap) -> Option<&str> {
    match fields.get("repository")? {
        Value::String(url) => Some(url.trim()),
        Value::Object(repo) => repo.get("url").and_then(Value::as_str).map(str::trim),
        _ => None,
    }
}

/// Old manifests used `url` for the project page. A URL that repeats the
/// repository is not a homepage.
fn fold_legacy_url(fields: &mut FieldMap) {
    let Some(url) = fields.remove("url") else {
        return;
    };
    let duplicates_repo = url
        .as_str()
        .is_some_and(|u| repository_url(fields) == Some(u.trim()));
    if duplicates_repo {
        debug!("dropping legacy `url` equal to the repository url");
        return;
    }
    if fields.get("homepage").is_none_or(Value::is_null) {
        fields.insert("homepage".to_owned(), url);
    }
}

/// Top-level `include`/`exclude` belong under `export`, without overriding
/// rules the export object already declares.
fn fold_export_rules(fields: &mut FieldMap) {
    for key in ["include", "exclude"] {
        let Some(rule) = fields.remove(key) else {
            continue;
        };
        let export = fields
            .entry("export")
            .or_insert_with(|| Value::Object(Map::new()));
        match export {
            Value::Object(export) => {
                export.entry(key).or_insert(rule);
            }
            _ => debug!("ignoring top-level `{key}`: `export` is not an object"),
        }
    }
}
