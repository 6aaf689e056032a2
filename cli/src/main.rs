#![deny(missing_docs)]

//! # Clientgen CLI
//!
//! Command Line Interface for generating a typed, validated API client from an
//! OpenAPI document.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod generate;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Generate a typed, validated API client from an OpenAPI document"
)]
struct Cli {
    #[clap(flatten)]
    generate: generate::GenerateArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,clientgen_core=info,clientgen=info".to_string(),
            2 => "info,clientgen_core=debug,clientgen=debug".to_string(),
            _ => "debug,clientgen_core=trace,clientgen=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.generate.input.is_none() {
        eprintln!("error: the following required argument was not provided: --input <FILE_OR_URL>\n");
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::FAILURE;
    }

    match generate::execute(&cli.generate) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["clientgen", "-i", "openapi.yaml"]).unwrap();
        assert_eq!(cli.generate.input.as_deref(), Some("openapi.yaml"));
        assert_eq!(
            cli.generate.output,
            std::path::PathBuf::from(generate::DEFAULT_OUTPUT)
        );
        assert!(!cli.generate.strict);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "clientgen",
            "--input",
            "https://api.example.com/openapi.yaml",
            "-o",
            "out/client.ts",
            "--strict",
            "--formatter",
            "npx",
            "--formatter-arg",
            "prettier",
            "--formatter-arg",
            "--parser",
            "--formatter-arg",
            "typescript",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.generate.output, std::path::PathBuf::from("out/client.ts"));
        assert!(cli.generate.strict);
        assert_eq!(cli.generate.formatter.as_deref(), Some("npx"));
        assert_eq!(
            cli.generate.formatter_args,
            ["prettier", "--parser", "typescript"]
        );
        assert_eq!(cli.verbose, 2);
    }
}
