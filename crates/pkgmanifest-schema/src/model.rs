//! Canonical package record produced by validation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Lower-cased, deduplicated keyword list.
///
/// Display order is the order keywords first appeared in the source; equality
/// ignores order.
#[derive(Debug, Clone, Default, Serialize, Eq)]
#[serde(transparent)]
pub struct Keywords(Vec<String>);

impl Keywords {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl PartialEq for Keywords {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|k| other.0.contains(k))
    }
}

impl Deref for Keywords {
    type Target = [String];
    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for Keywords {
    /// Collects while enforcing the keyword invariants.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut out: Vec<String> = Vec::new();
        for kw in iter {
            let kw = kw.trim().to_lowercase();
            if !kw.is_empty() && !out.contains(&kw) {
                out.push(kw);
            }
        }
        Self(out)
    }
}

impl<'de> Deserialize<'de> for Keywords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(|items| items.into_iter().collect())
    }
}

/// Source repository of a package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub maintainer: bool,
}

/// Publishing rules. `None` means "no rule"; `Some(vec![])` is an explicit
/// empty rule and is kept distinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Export {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub base: String,
    pub files: Vec<String>,
}

/// The validated, canonical description of one package.
///
/// Built by [`PackageRecord::lenient`] or [`PackageRecord::strict`] and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PackageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) repository: Option<Repository>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) keywords: Option<Keywords>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) platforms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) frameworks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) authors: Option<Vec<Author>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) export: Option<Export>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) examples: Option<BTreeMap<String, Example>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) system: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) engines: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) packages: Option<serde_json::Map<String, Value>>,
}

impl PackageRecord {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The version as a parsed SemVer value.
    pub fn semver(&self) -> Option<semver::Version> {
        self.version
            .as_deref()
            .and_then(|v| semver::Version::parse(v).ok())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn repository(&self) -> Option<&Repository> {
        self.repository.as_ref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn keywords(&self) -> Option<&Keywords> {
        self.keywords.as_ref()
    }

    pub fn platforms(&self) -> Option<&[String]> {
        self.platforms.as_deref()
    }

    pub fn frameworks(&self) -> Option<&[String]> {
        self.frameworks.as_deref()
    }

    pub fn authors(&self) -> Option<&[Author]> {
        self.authors.as_deref()
    }

    pub fn export(&self) -> Option<&Export> {
        self.export.as_ref()
    }

    pub fn examples(&self) -> Option<&BTreeMap<String, Example>> {
        self.examples.as_ref()
    }

    /// `None` means the package runs on any host system.
    pub fn system(&self) -> Option<&[String]> {
        self.system.as_deref()
    }

    pub fn engines(&self) -> Option<&BTreeMap<String, String>> {
        self.engines.as_ref()
    }

    /// Tool and toolchain declarations of a platform, exactly as written.
    pub fn packages(&self) -> Option<&serde_json::Map<String, Value>> {
        self.packages.as_ref()
    }

    /// Authors flagged as maintainers.
    pub fn maintainers(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter().flatten().filter(|a| a.maintainer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_compare_as_sets() {
        let a: Keywords = ["json", "rest"].map(str::to_owned).into_iter().collect();
        let b: Keywords = ["rest", "json"].map(str::to_owned).into_iter().collect();
        let c: Keywords = ["rest"].map(str::to_owned).into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_slice(), ["json", "rest"]);
    }

    #[test]
    fn keywords_collect_enforces_invariants() {
        let kws: Keywords = ["SD", " sd", "", "Card"]
            .map(str::to_owned)
            .into_iter()
            .collect();
        assert_eq!(kws.into_inner(), vec!["sd", "card"]);
    }

    #[test]
    fn keywords_deserialize_enforces_invariants() {
        let kws: Keywords = serde_json::from_value(serde_json::json!(["SD", "sd ", "", "Card"])).unwrap();
        assert_eq!(kws.as_slice(), ["sd", "card"]);
    }

    #[test]
    fn repository_serializes_type_key() {
        let repo = Repository {
            url: "https://github.com/a/b.git".to_owned(),
            kind: Some("git".to_owned()),
            branch: None,
        };
        let json = serde_json::to_value(&repo).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://github.com/a/b.git", "type": "git"})
        );
    }

    #[test]
    fn export_distinguishes_absent_from_empty() {
        let absent = Export::default();
        let empty = Export {
            include: Some(Vec::new()),
            exclude: None,
        };
        assert_ne!(absent, empty);
        assert_eq!(serde_json::to_string(&absent).unwrap(), "{}");
        assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"include":[]}"#);
    }
}
