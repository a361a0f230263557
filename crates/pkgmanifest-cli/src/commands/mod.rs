pub mod detect;
pub mod inspect;
pub mod kinds;

use pkgmanifest_schema::ManifestKind;
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_VALIDATION_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Resolve a user-supplied path to a manifest file and its kind.
///
/// Directories are probed in [`ManifestKind::DISCOVERY_ORDER`]. For files the
/// declared kind wins over the file-name heuristic.
pub fn locate_manifest(
    path: &Path,
    declared: Option<&str>,
) -> Result<(PathBuf, ManifestKind), String> {
    let declared = declared
        .map(str::parse::<ManifestKind>)
        .transpose()
        .map_err(|e| format!("manifest error: {e}"))?;

    if path.is_dir() {
        let candidates: Vec<ManifestKind> = match declared {
            Some(kind) => vec![kind],
            None => ManifestKind::DISCOVERY_ORDER.to_vec(),
        };
        return candidates
            .into_iter()
            .map(|kind| (path.join(kind.file_name()), kind))
            .find(|(candidate, _)| candidate.is_file())
            .ok_or_else(|| {
                format!(
                    "failed to read manifest: no manifest file found in {}",
                    path.display()
                )
            });
    }

    if !path.is_file() {
        return Err(format!(
            "failed to read manifest: {} does not exist",
            path.display()
        ));
    }
    let kind = declared.unwrap_or_else(|| ManifestKind::from_uri(&path.to_string_lossy()));
    Ok((path.to_path_buf(), kind))
}
