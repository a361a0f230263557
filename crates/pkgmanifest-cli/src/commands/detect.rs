use super::{json_pretty, locate_manifest, EXIT_SUCCESS};
use std::path::Path;

pub fn run(path: &Path, json: bool) -> Result<u8, String> {
    let (file, kind) = locate_manifest(path, None)?;
    if json {
        let report = serde_json::json!({
            "path": file.display().to_string(),
            "kind": kind,
        });
        println!("{}", json_pretty(&report)?);
    } else {
        println!("{kind}\t{}", file.display());
    }
    Ok(EXIT_SUCCESS)
}
