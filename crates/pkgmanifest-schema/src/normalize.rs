//! Field normalization shared by every manifest parser.
//!
//! Each function takes the raw JSON value of one canonical field and returns
//! its normalized form, or `None` when the field should be absent from the
//! resulting [`FieldMap`]. Values whose shape cannot be normalized are passed
//! through unchanged so that validation can report them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Normalized field mapping produced by the parsers and consumed by
/// [`PackageRecord`](crate::PackageRecord) validation.
pub type FieldMap = Map<String, Value>;

/// Sentinel for "every platform" / "every framework".
pub const WILDCARD: &str = "*";

/// Legacy architecture and platform names mapped to canonical platform ids.
pub const PLATFORM_ALIASES: &[(&str, &str)] = &[
    ("avr", "atmelavr"),
    ("sam", "atmelsam"),
    ("samd", "atmelsam"),
    ("esp8266", "espressif8266"),
    ("esp32", "espressif32"),
    ("arc32", "intel_arc32"),
    ("stm32", "ststm32"),
    ("espressif", "espressif8266"),
];

static OBFUSCATED_AT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[aA][tT]\s+").expect("valid e-mail pattern"));

static SSH_REMOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^/\s]\S*$").expect("valid remote pattern")
});

/// Map a platform token through [`PLATFORM_ALIASES`]; unknown tokens pass through.
pub fn resolve_platform(token: &str) -> &str {
    PLATFORM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map_or(token, |(_, canonical)| canonical)
}

/// `name AT domain.com` → `name@domain.com`.
pub fn deobfuscate_email(email: &str) -> String {
    OBFUSCATED_AT.replace_all(email.trim(), "@").into_owned()
}

/// Whether `url` is recognisably a git remote rather than a web page.
pub fn is_git_remote(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    url.trim_end_matches('/').ends_with(".git")
        || url.starts_with("git://")
        || url.starts_with("git+")
        || url.starts_with("https://github.com/")
        || url.starts_with("http://github.com/")
        || (!url.contains("://") && SSH_REMOTE.is_match(url))
}

/// Split a comma-separated string, or collect a sequence of strings, into
/// trimmed non-empty tokens. Returns `None` for any other shape.
pub fn split_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|s| s.trim().to_owned()))
            .filter(|t| t.as_ref().is_none_or(|t| !t.is_empty()))
            .collect(),
        _ => None,
    }
}

fn string_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Lower-case, trim, drop empties and deduplicate in first-seen order.
pub fn normalize_keywords(value: Value) -> Option<Value> {
    let Some(tokens) = split_list(&value) else {
        return Some(value);
    };
    let tokens: Vec<String> = tokens.into_iter().map(|t| t.to_lowercase()).collect();
    let tokens = dedup_preserving_order(tokens);
    (!tokens.is_empty()).then(|| string_array(tokens))
}

fn normalize_targets(value: Value, resolve: impl Fn(&str) -> &str) -> Option<Value> {
    let Some(tokens) = split_list(&value) else {
        return Some(value);
    };
    let tokens: Vec<String> = tokens
        .into_iter()
        .map(|t| resolve(&t.to_lowercase()).to_owned())
        .collect();
    if tokens.iter().any(|t| t == WILDCARD) {
        return Some(string_array(vec![WILDCARD.to_owned()]));
    }
    let tokens = dedup_preserving_order(tokens);
    (!tokens.is_empty()).then(|| string_array(tokens))
}

/// Platforms go through the alias table; any `*` collapses the list to `["*"]`.
pub fn normalize_platforms(value: Value) -> Option<Value> {
    normalize_targets(value, resolve_platform)
}

pub fn normalize_frameworks(value: Value) -> Option<Value> {
    normalize_targets(value, |t| t)
}

/// Split `"Name <email>"` or `"Name (email)"` into its parts.
///
/// Returns `None` for placeholders (`None`, URLs, blank strings).
pub fn parse_author_string(raw: &str) -> Option<(String, Option<String>)> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "None" || raw.contains("://") {
        return None;
    }
    let mut name = raw;
    let mut email = None;
    for (open, close) in [('<', '>'), ('(', ')')] {
        if let (Some(start), Some(end)) = (raw.find(open), raw.find(close)) {
            if start < end {
                name = &raw[..start];
                email = Some(raw[start + 1..end].trim());
                break;
            }
        }
    }
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let email = email.filter(|e| !e.is_empty()).map(deobfuscate_email);
    Some((name.to_owned(), email))
}

/// Build a canonical author object.
pub fn author_value(name: &str, email: Option<&str>, maintainer: bool) -> Value {
    let mut author = Map::new();
    author.insert("name".to_owned(), Value::String(name.to_owned()));
    if let Some(email) = email {
        author.insert("email".to_owned(), Value::String(email.to_owned()));
    }
    author.insert("maintainer".to_owned(), Value::Bool(maintainer));
    Value::Object(author)
}

/// Parse a comma-separated list of `"Name <email>"` entries.
pub fn authors_from_list(raw: &str, maintainer: bool) -> Vec<Value> {
    raw.split(',')
        .filter_map(parse_author_string)
        .map(|(name, email)| author_value(&name, email.as_deref(), maintainer))
        .collect()
}

fn normalize_author(value: Value) -> Option<Value> {
    match value {
        Value::String(raw) => {
            parse_author_string(&raw).map(|(name, email)| author_value(&name, email.as_deref(), false))
        }
        Value::Object(mut author) => {
            for key in ["name", "email", "url"] {
                if let Some(Value::String(s)) = author.get_mut(key) {
                    *s = s.trim().to_owned();
                }
            }
            if let Some(Value::String(email)) = author.get_mut("email") {
                *email = deobfuscate_email(email);
            }
            author
                .entry("maintainer")
                .or_insert(Value::Bool(false));
            Some(Value::Object(author))
        }
        other => Some(other),
    }
}

/// Accept one author (object or `"Name <email>"` string) or a sequence of them.
pub fn normalize_authors(value: Value) -> Option<Value> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return None,
        single => vec![single],
    };
    let authors: Vec<Value> = items.into_iter().filter_map(normalize_author).collect();
    (!authors.is_empty()).then_some(Value::Array(authors))
}

/// Wrap bare strings for `include`/`exclude`; absent or null rules stay absent.
pub fn normalize_export(value: Value) -> Option<Value> {
    let Value::Object(raw) = value else {
        return match value {
            Value::Null => None,
            other => Some(other),
        };
    };
    let mut export = Map::new();
    for (key, rule) in raw {
        let rule = match rule {
            Value::Null => continue,
            Value::String(s) => Value::Array(vec![Value::String(s.trim().to_owned())]),
            other => other,
        };
        export.insert(key, rule);
    }
    Some(Value::Object(export))
}

/// A bare git remote becomes `{type: "git", url}`; any other bare string is
/// not a repository. Objects get their `type` inferred when it is missing.
pub fn normalize_repository(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(url) => {
            let url = url.trim();
            is_git_remote(url).then(|| git_repository(url))
        }
        Value::Object(mut repo) => {
            if let Some(Value::String(url)) = repo.get_mut("url") {
                *url = url.trim().to_owned();
            }
            let is_git = repo
                .get("url")
                .and_then(Value::as_str)
                .is_some_and(is_git_remote);
            if is_git && repo.get("type").is_none_or(Value::is_null) {
                repo.insert("type".to_owned(), Value::String("git".to_owned()));
            }
            Some(Value::Object(repo))
        }
        other => Some(other),
    }
}

pub fn git_repository(url: &str) -> Value {
    let mut repo = Map::new();
    repo.insert("type".to_owned(), Value::String("git".to_owned()));
    repo.insert("url".to_owned(), Value::String(url.to_owned()));
    Value::Object(repo)
}

/// A lone `"*"` (or `["*"]`) means unrestricted and is represented by
/// absence. Any other list, including an empty one, is kept.
pub fn normalize_system(value: Value) -> Option<Value> {
    let Some(tokens) = split_list(&value) else {
        return Some(value);
    };
    let tokens: Vec<String> = tokens.into_iter().map(|t| t.to_lowercase()).collect();
    if matches!(tokens.as_slice(), [only] if only == WILDCARD) {
        return None;
    }
    Some(string_array(dedup_preserving_order(tokens)))
}

type FieldTransform = fn(Value) -> Option<Value>;

const FIELD_TRANSFORMS: &[(&str, FieldTransform)] = &[
    ("keywords", normalize_keywords),
    ("platforms", normalize_platforms),
    ("frameworks", normalize_frameworks),
    ("authors", normalize_authors),
    ("export", normalize_export),
    ("repository", normalize_repository),
    ("system", normalize_system),
];

/// Apply one field's transform in place, removing the key when the transform
/// yields nothing.
pub fn normalize_field(fields: &mut FieldMap, key: &str) {
    let Some((_, transform)) = FIELD_TRANSFORMS.iter().find(|(k, _)| *k == key) else {
        return;
    };
    if let Some(value) = fields.remove(key) {
        if let Some(normalized) = transform(value) {
            fields.insert(key.to_owned(), normalized);
        }
    }
}

/// Run every canonical field of `fields` through the pipeline.
///
/// Idempotent: normalizing an already-normalized map returns it unchanged.
pub fn normalize_fields(mut fields: FieldMap) -> FieldMap {
    for (key, _) in FIELD_TRANSFORMS {
        normalize_field(&mut fields, key);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keywords_from_comma_string() {
        assert_eq!(
            normalize_keywords(json!("kw1, KW2, kw3")),
            Some(json!(["kw1", "kw2", "kw3"]))
        );
    }

    #[test]
    fn keywords_deduplicate_in_first_seen_order() {
        assert_eq!(
            normalize_keywords(json!(["Audio", " sound", "AUDIO", "", "music"])),
            Some(json!(["audio", "sound", "music"]))
        );
        assert_eq!(normalize_keywords(json!(" , ")), None);
    }

    #[test]
    fn platform_aliases_resolve() {
        assert_eq!(resolve_platform("avr"), "atmelavr");
        assert_eq!(resolve_platform("esp32"), "espressif32");
        assert_eq!(resolve_platform("atmelavr"), "atmelavr");
        assert_eq!(
            normalize_platforms(json!("avr, esp8266, teensy")),
            Some(json!(["atmelavr", "espressif8266", "teensy"]))
        );
    }

    #[test]
    fn wildcard_is_never_expanded() {
        assert_eq!(normalize_platforms(json!("*")), Some(json!(["*"])));
        assert_eq!(normalize_platforms(json!(["avr", "*"])), Some(json!(["*"])));
        assert_eq!(normalize_frameworks(json!(["*"])), Some(json!(["*"])));
    }

    #[test]
    fn frameworks_wrap_and_lowercase() {
        assert_eq!(
            normalize_frameworks(json!("Arduino")),
            Some(json!(["arduino"]))
        );
    }

    #[test]
    fn author_string_forms() {
        assert_eq!(
            parse_author_string("Name Surname <name@surname.com>"),
            Some(("Name Surname".to_owned(), Some("name@surname.com".to_owned())))
        );
        assert_eq!(
            parse_author_string(" oliver (olikraus AT gmail.com) "),
            Some(("oliver".to_owned(), Some("olikraus@gmail.com".to_owned())))
        );
        assert_eq!(
            parse_author_string("Solo"),
            Some(("Solo".to_owned(), None))
        );
        assert_eq!(parse_author_string("None"), None);
        assert_eq!(parse_author_string("https://example.com"), None);
    }

    #[test]
    fn authors_accept_single_object() {
        let out = normalize_authors(json!({
            "name": " Benoit Blanchon ",
            "url": "https://blog.benoitblanchon.fr"
        }));
        assert_eq!(
            out,
            Some(json!([{
                "name": "Benoit Blanchon",
                "url": "https://blog.benoitblanchon.fr",
                "maintainer": false
            }]))
        );
    }

    #[test]
    fn authors_keep_explicit_maintainer_and_fix_email() {
        let out = normalize_authors(json!([
            {"name": "A", "email": "a AT b.org", "maintainer": true},
            "B <b@c.org>"
        ]))
        .unwrap();
        assert_eq!(out[0]["email"], "a@b.org");
        assert_eq!(out[0]["maintainer"], true);
        assert_eq!(out[1]["name"], "B");
        assert_eq!(out[1]["maintainer"], false);
    }

    #[test]
    fn export_keeps_absent_and_empty_distinct() {
        assert_eq!(
            normalize_export(json!({"exclude": "audio_samples"})),
            Some(json!({"exclude": ["audio_samples"]}))
        );
        assert_eq!(
            normalize_export(json!({"include": [], "exclude": null})),
            Some(json!({"include": []}))
        );
        assert_eq!(normalize_export(Value::Null), None);
    }

    #[test]
    fn repository_from_bare_string() {
        assert_eq!(
            normalize_repository(json!("git@github.com:username/repo.git")),
            Some(json!({"type": "git", "url": "git@github.com:username/repo.git"}))
        );
        assert_eq!(
            normalize_repository(json!("user@host.example:path/to/repo")),
            Some(json!({"type": "git", "url": "user@host.example:path/to/repo"}))
        );
        assert_eq!(normalize_repository(json!("http://example.com/lib")), None);
    }

    #[test]
    fn repository_object_infers_type() {
        assert_eq!(
            normalize_repository(json!({"url": "https://host/x.git", "branch": "dev"})),
            Some(json!({"url": "https://host/x.git", "branch": "dev", "type": "git"}))
        );
    }

    #[test]
    fn system_wildcard_means_absent() {
        assert_eq!(normalize_system(json!("*")), None);
        assert_eq!(normalize_system(json!(["*"])), None);
        assert_eq!(
            normalize_system(json!("Darwin_x86_64")),
            Some(json!(["darwin_x86_64"]))
        );
    }

    #[test]
    fn system_keeps_lists_that_are_not_the_lone_wildcard() {
        assert_eq!(normalize_system(json!([])), Some(json!([])));
        assert_eq!(
            normalize_system(json!(["linux_x86_64", "*"])),
            Some(json!(["linux_x86_64", "*"]))
        );
    }

    #[test]
    fn deobfuscates_emails() {
        assert_eq!(deobfuscate_email("info AT author.com"), "info@author.com");
        assert_eq!(deobfuscate_email("info at author.com"), "info@author.com");
        assert_eq!(deobfuscate_email("cat@attic.com"), "cat@attic.com");
    }

    #[test]
    fn normalize_fields_is_idempotent() {
        let raw = json!({
            "name": "Demo",
            "keywords": "JSON, rest,  Http, json",
            "platforms": "avr, espressif",
            "frameworks": "Arduino",
            "authors": {"name": "Someone", "email": "me AT x.org"},
            "export": {"include": "src", "exclude": []},
            "repository": "https://github.com/someone/demo.git",
            "system": ["Linux_x86_64"]
        });
        let Value::Object(raw) = raw else { unreachable!() };
        let once = normalize_fields(raw);
        let twice = normalize_fields(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once["keywords"], json!(["json", "rest", "http"]));
        assert_eq!(once["platforms"], json!(["atmelavr", "espressif8266"]));
        assert_eq!(once["export"], json!({"include": ["src"], "exclude": []}));
    }
}
