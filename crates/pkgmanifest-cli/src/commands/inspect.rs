use super::{json_pretty, locate_manifest, EXIT_SUCCESS, EXIT_VALIDATION_ERROR};
use console::Style;
use pkgmanifest_schema::{
    load_manifest, Keywords, ManifestError, ManifestKind, PackageRecord, ParseHints,
    ValidationMode,
};
use serde::Serialize;
use std::path::Path;

pub struct InspectOptions<'a> {
    pub kind: Option<&'a str>,
    pub remote_url: Option<&'a str>,
    pub mode: ValidationMode,
    pub deny_warnings: bool,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    path: String,
    kind: ManifestKind,
    mode: ValidationMode,
    record: &'a PackageRecord,
    errors: Vec<String>,
}

pub fn run(path: &Path, opts: &InspectOptions<'_>, json: bool) -> Result<u8, String> {
    let (path, kind) = locate_manifest(path, opts.kind)?;
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("failed to read manifest {}: {e}", path.display()))?;
    let hints = ParseHints {
        remote_url: opts.remote_url.map(str::to_owned),
    };

    let validated = load_manifest(&contents, kind.as_str(), &hints, opts.mode).map_err(|e| match e {
        ManifestError::Field(field) => format!("validation error: {}: {field}", path.display()),
        other => format!("manifest error: {}: {other}", path.display()),
    })?;

    let errors: Vec<String> = validated.errors().iter().map(ToString::to_string).collect();
    if !errors.is_empty() {
        tracing::warn!(
            "{} validated with {} field error(s)",
            path.display(),
            errors.len()
        );
    }

    if json {
        let report = InspectReport {
            path: path.display().to_string(),
            kind,
            mode: opts.mode,
            record: validated.record(),
            errors: errors.clone(),
        };
        println!("{}", json_pretty(&report)?);
    } else {
        println!("file:         {} ({kind})", path.display());
        print_record(validated.record());
        if !errors.is_empty() {
            let red = Style::new().red();
            println!("errors:");
            for err in &errors {
                println!("  {}", red.apply_to(err));
            }
        }
    }

    if opts.deny_warnings && !errors.is_empty() {
        return Ok(EXIT_VALIDATION_ERROR);
    }
    Ok(EXIT_SUCCESS)
}

fn print_record(record: &PackageRecord) {
    let none = || "(none)".to_owned();
    let list = |items: Option<&[String]>| items.map_or_else(none, |items| items.join(", "));

    println!("name:         {}", record.name().unwrap_or("(none)"));
    println!("version:      {}", record.version().unwrap_or("(none)"));
    if let Some(title) = record.title() {
        println!("title:        {title}");
    }
    println!("description:  {}", record.description().unwrap_or("(none)"));
    println!("homepage:     {}", record.homepage().unwrap_or("(none)"));
    println!(
        "repository:   {}",
        record.repository().map_or_else(none, |r| match &r.branch {
            Some(branch) => format!("{} ({branch})", r.url),
            None => r.url.clone(),
        })
    );
    println!("license:      {}", record.license().unwrap_or("(none)"));
    println!(
        "keywords:     {}",
        list(record.keywords().map(Keywords::as_slice))
    );
    println!("platforms:    {}", list(record.platforms()));
    println!("frameworks:   {}", list(record.frameworks()));
    if let Some(system) = record.system() {
        println!("system:       {}", system.join(", "));
    }
    match record.authors() {
        Some(authors) => {
            println!("authors:");
            for author in authors {
                let email = author
                    .email
                    .as_deref()
                    .map(|e| format!(" <{e}>"))
                    .unwrap_or_default();
                let role = if author.maintainer { " (maintainer)" } else { "" };
                println!("  {}{email}{role}", author.name);
            }
        }
        None => println!("authors:      (none)"),
    }
    if let Some(export) = record.export() {
        println!("export:");
        println!("  include:    {}", list(export.include.as_deref()));
        println!("  exclude:    {}", list(export.exclude.as_deref()));
    }
    if let Some(examples) = record.examples() {
        println!("examples:     {}", examples.len());
    }
}
