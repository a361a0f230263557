use super::{json_pretty, EXIT_SUCCESS};
use pkgmanifest_schema::ManifestKind;

pub fn run(json: bool) -> Result<u8, String> {
    if json {
        let kinds: Vec<_> = ManifestKind::ALL
            .iter()
            .map(|k| serde_json::json!({"kind": k, "file": k.file_name()}))
            .collect();
        println!("{}", json_pretty(&kinds)?);
    } else {
        for kind in ManifestKind::ALL {
            println!("{:<20}{}", kind.as_str(), kind.file_name());
        }
    }
    Ok(EXIT_SUCCESS)
}
