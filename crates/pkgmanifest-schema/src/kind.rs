use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The manifest formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    LibraryJson,
    ModuleJson,
    LibraryProperties,
    PlatformJson,
    PackageJson,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 5] = [
        ManifestKind::LibraryJson,
        ManifestKind::ModuleJson,
        ManifestKind::LibraryProperties,
        ManifestKind::PlatformJson,
        ManifestKind::PackageJson,
    ];

    /// Order in which a package directory is probed for a manifest file.
    pub const DISCOVERY_ORDER: [ManifestKind; 5] = [
        ManifestKind::PlatformJson,
        ManifestKind::LibraryJson,
        ManifestKind::LibraryProperties,
        ManifestKind::ModuleJson,
        ManifestKind::PackageJson,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LibraryJson => "library-json",
            Self::ModuleJson => "module-json",
            Self::LibraryProperties => "library-properties",
            Self::PlatformJson => "platform-json",
            Self::PackageJson => "package-json",
        }
    }

    /// Conventional file name of a manifest of this kind.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::LibraryJson => "library.json",
            Self::ModuleJson => "module.json",
            Self::LibraryProperties => "library.properties",
            Self::PlatformJson => "platform.json",
            Self::PackageJson => "package.json",
        }
    }

    /// Guess the kind from a path or URL. Anything unrecognised is treated as
    /// `library.json`, the native format.
    pub fn from_uri(uri: &str) -> Self {
        if uri.ends_with(".properties") {
            Self::LibraryProperties
        } else if uri.ends_with("platform.json") {
            Self::PlatformJson
        } else if uri.ends_with("module.json") {
            Self::ModuleJson
        } else if uri.ends_with("package.json") {
            Self::PackageJson
        } else {
            Self::LibraryJson
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = ManifestError;

    /// Accepts either the dashed kind name or the manifest file name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == needle || k.file_name() == needle)
            .ok_or_else(|| ManifestError::UnknownManifestKind(s.to_owned()))
    }
}
