use super::{string_list_value, ParseHints, ParseManifest};
use crate::error::ManifestError;
use crate::kind::ManifestKind;
use crate::normalize::{
    author_value, git_repository, is_git_remote, normalize_field, normalize_fields,
    parse_author_string, FieldMap,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

const DEFAULT_EXCLUDE: &[&str] = &["extras", "docs", "tests", "test", "*.doxyfile", "*.pdf"];
const DEFAULT_CATEGORY: &str = "uncategorized";

/// Arduino `library.properties` manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryPropertiesParser;

impl ParseManifest for LibraryPropertiesParser {
    const KIND: ManifestKind = ManifestKind::LibraryProperties;

    fn parse(&self, contents: &str, hints: &ParseHints) -> Result<FieldMap, ManifestError> {
        let props = parse_properties(contents);
        let remote = hints.remote_url.as_deref().and_then(RemoteLayout::from_url);

        let mut fields = FieldMap::new();
        for key in ["name", "version"] {
            if let Some(value) = props.get(key) {
                fields.insert(key.to_owned(), Value::String(value.clone()));
            }
        }
        if let Some(description) = description(&props) {
            fields.insert("description".to_owned(), Value::String(description));
        }
        let category = props.get("category").map_or(DEFAULT_CATEGORY, String::as_str);
        fields.insert(
            "keywords".to_owned(),
            Value::Array(vec![Value::String(category.to_owned())]),
        );
        fields.insert("platforms".to_owned(), platforms(&props)?);
        fields.insert("frameworks".to_owned(), string_list_value(&["arduino"]));
        if let Some(authors) = authors(&props) {
            fields.insert("authors".to_owned(), authors);
        }

        let url = props.get("url").map(String::as_str);
        let repository = remote
            .as_ref()
            .map(|r| git_repository(&r.repository))
            .or_else(|| url.filter(|u| is_git_remote(u)).map(git_repository));
        if let Some(homepage) = url.filter(|u| !is_git_remote(u)) {
            fields.insert("homepage".to_owned(), Value::String(homepage.to_owned()));
        }
        if let Some(repository) = repository {
            fields.insert("repository".to_owned(), repository);
        }

        let mut export = Map::new();
        if let Some(include) = remote.and_then(|r| r.include) {
            export.insert("include".to_owned(), Value::String(include));
        }
        export.insert("exclude".to_owned(), string_list_value(DEFAULT_EXCLUDE));
        fields.insert("export".to_owned(), Value::Object(export));

        Ok(normalize_fields(fields))
    }
}

/// `key=value` lines. Blank lines, lines without `=` and `#` comments are
/// skipped; a trailing backslash joins the next line onto the value. Empty
/// values are dropped and later keys win. A leading byte-order mark is
/// ignored.
fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut data = BTreeMap::new();
    let mut logical = String::new();
    let mut lines = contents.lines().peekable();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#')) {
            continue;
        }
        if let Some(head) = line.strip_suffix('\\') {
            logical.push_str(head);
            if lines.peek().is_some() {
                continue;
            }
        } else {
            logical.push_str(line);
        }
        if let Some((key, value)) = logical.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                data.insert(key.to_owned(), value.to_owned());
            }
        }
        logical.clear();
    }
    data
}

/// `sentence` and `paragraph` joined as `"<sentence>. <paragraph>"`.
fn description(props: &BTreeMap<String, String>) -> Option<String> {
    let mut parts: Vec<String> = Vec::with_capacity(2);
    for key in ["sentence", "paragraph"] {
        if let Some(text) = props.get(key) {
            if !parts.contains(text) {
                parts.push(text.clone());
            }
        }
    }
    if parts.len() == 2 && !parts[0].ends_with('.') {
        parts[0].push('.');
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn platforms(props: &BTreeMap<String, String>) -> Result<Value, ManifestError> {
    let Some(architectures) = props.get("architectures") else {
        return Ok(string_list_value(&["*"]));
    };
    if let Some(target) = architectures
        .split(',')
        .map(str::trim)
        .find(|arch| arch.starts_with("particle-"))
    {
        return Err(ManifestError::UnsupportedPlatform(format!(
            "Particle targets are not supported ('{target}')"
        )));
    }
    let mut fields = FieldMap::new();
    fields.insert(
        "platforms".to_owned(),
        Value::String(architectures.clone()),
    );
    normalize_field(&mut fields, "platforms");
    Ok(fields
        .remove("platforms")
        .unwrap_or_else(|| string_list_value(&["*"])))
}

struct PropertiesAuthor {
    name: String,
    email: Option<String>,
    maintainer: bool,
}

/// `author` entries, with `maintainer` entries either flagging a matching
/// author or appended as maintainers of their own.
fn authors(props: &BTreeMap<String, String>) -> Option<Value> {
    let parse_list = |key: &str| -> Vec<(String, Option<String>)> {
        props
            .get(key)
            .map(|raw| raw.split(',').filter_map(parse_author_string).collect())
            .unwrap_or_default()
    };

    let mut authors: Vec<PropertiesAuthor> = parse_list("author")
        .into_iter()
        .map(|(name, email)| PropertiesAuthor {
            name,
            email,
            maintainer: false,
        })
        .collect();

    for (name, email) in parse_list("maintainer") {
        let mut found = false;
        for author in authors
            .iter_mut()
            .filter(|a| a.name.to_lowercase() == name.to_lowercase())
        {
            found = true;
            author.maintainer = true;
            if author.email.is_none() {
                author.email.clone_from(&email);
            }
        }
        if !found {
            debug!("adding maintainer '{name}' missing from author list");
            authors.push(PropertiesAuthor {
                name,
                email,
                maintainer: true,
            });
        }
    }

    (!authors.is_empty()).then(|| {
        Value::Array(
            authors
                .iter()
                .map(|a| author_value(&a.name, a.email.as_deref(), a.maintainer))
                .collect(),
        )
    })
}

/// Repository and package directory recovered from the URL a
/// `library.properties` file was downloaded from.
#[derive(Debug, PartialEq, Eq)]
struct RemoteLayout {
    repository: String,
    include: Option<String>,
}

impl RemoteLayout {
    fn from_url(remote: &str) -> Option<Self> {
        let parsed = Url::parse(remote).ok()?;
        let host = parsed.host_str()?;
        let mut tokens: Vec<&str> = parsed.path_segments()?.filter(|t| !t.is_empty()).collect();
        tokens.pop();

        let (repository, rest) = if host.contains("github") {
            if tokens.len() < 2 {
                return None;
            }
            let repository = format!(
                "{}://github.com/{}/{}",
                parsed.scheme(),
                tokens[0],
                tokens[1]
            );
            // github.com/<user>/<repo>/blob/<branch>/... vs
            // raw.githubusercontent.com/<user>/<repo>/<branch>/...
            let skip = if matches!(tokens.get(2), Some(&("blob" | "raw"))) && host == "github.com" {
                4
            } else {
                3
            };
            (repository, tokens.get(skip..).unwrap_or_default())
        } else {
            let raw = tokens.iter().position(|t| *t == "raw")?;
            let mut repo_path = &tokens[..raw];
            if let Some((&"-", head)) = repo_path.split_last() {
                repo_path = head;
            }
            let authority = match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            };
            let repository = format!(
                "{}://{authority}/{}",
                parsed.scheme(),
                repo_path.join("/")
            );
            (repository, tokens.get(raw + 2..).unwrap_or_default())
        };

        let include = (!rest.is_empty()).then(|| rest.join("/"));
        Some(Self {
            repository,
            include,
        })
    }
}
