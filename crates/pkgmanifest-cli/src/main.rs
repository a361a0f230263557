mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::inspect::InspectOptions;
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_SUCCESS, EXIT_VALIDATION_ERROR};
use config::CliConfig;
use pkgmanifest_schema::ValidationMode;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pkgmanifest",
    version,
    about = "Parse and validate library, platform and package manifests"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a manifest and print the validated package record.
    Inspect {
        /// Manifest file, or a package directory to search for one.
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Declared manifest kind (e.g. "library-json" or "library.properties").
        #[arg(long)]
        kind: Option<String>,
        /// URL the manifest was downloaded from.
        #[arg(long)]
        remote_url: Option<String>,
        /// Fail on the first missing mandatory field or invalid version.
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Exit non-zero when any field error was collected.
        #[arg(long, default_value_t = false)]
        deny_warnings: bool,
    },
    /// Show which manifest file and kind would be used for a path.
    Detect {
        /// Manifest file or package directory.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List supported manifest kinds.
    Kinds,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PKGMANIFEST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = match CliConfig::load_default() {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let json_output = cli.json || config.json;

    let result = match cli.command {
        Commands::Inspect {
            path,
            kind,
            remote_url,
            strict,
            deny_warnings,
        } => {
            let mode = if strict {
                ValidationMode::Strict
            } else {
                config.mode()
            };
            commands::inspect::run(
                &path,
                &InspectOptions {
                    kind: kind.as_deref(),
                    remote_url: remote_url.as_deref(),
                    mode,
                    deny_warnings,
                },
                json_output,
            )
        }
        Commands::Detect { path } => commands::detect::run(&path, json_output),
        Commands::Kinds => commands::kinds::run(json_output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pkgmanifest", &mut std::io::stdout());
            Ok(EXIT_SUCCESS)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error:") || msg.starts_with("failed to read manifest") {
                EXIT_MANIFEST_ERROR
            } else if msg.starts_with("validation error:") {
                EXIT_VALIDATION_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
