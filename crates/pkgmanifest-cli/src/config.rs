use pkgmanifest_schema::ValidationMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User defaults, overridden by command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Validate strictly by default, as if `--strict` were always given.
    pub strict: bool,
    /// Emit JSON instead of human-readable output.
    pub json: bool,
}

impl CliConfig {
    /// Load from `$PKGMANIFEST_CONFIG`, else `~/.config/pkgmanifest/config.toml`.
    /// A missing file yields the defaults.
    pub fn load_default() -> Result<Self, String> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        toml::from_str(&content).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PKGMANIFEST_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/pkgmanifest/config.toml"))
}
