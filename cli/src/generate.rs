#![deny(missing_docs)]

//! # Generate Command
//!
//! Reads an OpenAPI document and writes the generated client module.

use std::fs;
use std::path::PathBuf;

use clientgen_core::oas::SpecSource;
use clientgen_core::render::Formatter;
use clientgen_core::{
    generate_source, AppError, AppResult, BuiltinFormatter, ExternalFormatter, GenerateOptions,
    TypeScriptZodTarget,
};
use tracing::info;

/// Where the client is written when `--output` is not given.
pub const DEFAULT_OUTPUT: &str = "src/generated/api-client.ts";

/// Arguments for client generation.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// OpenAPI document: a file path or an http(s):// URL.
    #[clap(short, long, env = "CLIENTGEN_INPUT", value_name = "FILE_OR_URL")]
    pub input: Option<String>,

    /// Output path for the generated module.
    #[clap(short, long, env = "CLIENTGEN_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Fail instead of falling back to `any` for unsupported schema shapes.
    #[clap(long)]
    pub strict: bool,

    /// External formatter program reading stdin and writing stdout (e.g. `npx`).
    #[clap(long, value_name = "PROGRAM")]
    pub formatter: Option<String>,

    /// Argument for the formatter program; repeat for each one.
    #[clap(
        long = "formatter-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "formatter"
    )]
    pub formatter_args: Vec<String>,
}

/// Executes client generation.
///
/// Nothing is written unless every step, formatting included, succeeds.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| AppError::Input("Missing required --input <FILE_OR_URL>".to_string()))?;

    // 1. Load Spec
    let text = SpecSource::parse(input).load()?;

    // 2. Generate + Render
    let options = GenerateOptions {
        strict: args.strict,
    };
    let mut code = generate_source(&text, &options, &TypeScriptZodTarget, &BuiltinFormatter)?;

    // 3. External Formatting
    if let Some(program) = &args.formatter {
        info!("Formatting with `{}` {:?}", program, args.formatter_args);
        code = ExternalFormatter::new(program.as_str(), args.formatter_args.clone())
            .format(&code)?;
    }

    // 4. Write File
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::General(format!("Failed to create output dir: {}", e)))?;
    }

    fs::write(&args.output, code)
        .map_err(|e| AppError::General(format!("Failed to write client file: {}", e)))?;

    println!("Generated client at {:?}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SPEC: &str = r##"
components:
  schemas:
    Widget:
      type: object
      required: [id]
      properties:
        id: { type: string }
paths:
  /widgets/{id}:
    get:
      responses:
        '200':
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Widget' }
"##;

    fn args(input: Option<String>, output: PathBuf) -> GenerateArgs {
        GenerateArgs {
            input,
            output,
            strict: false,
            formatter: None,
            formatter_args: Vec::new(),
        }
    }

    #[test]
    fn test_execute_writes_client() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, SPEC).unwrap();
        let output = dir.path().join("nested/generated/api-client.ts");

        execute(&args(Some(spec.to_string_lossy().to_string()), output.clone())).unwrap();

        let code = fs::read_to_string(&output).unwrap();
        assert!(code.contains("export const WidgetSchema = z.object({"));
        assert!(code.contains("byId: {"));
        assert!(code.ends_with("}\n"));
    }

    #[test]
    fn test_execute_missing_input() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("client.ts");

        let err = execute(&args(None, output.clone())).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));

        let missing = dir.path().join("missing.yaml");
        let err = execute(&args(Some(missing.to_string_lossy().to_string()), output.clone()))
            .unwrap_err();
        assert!(format!("{}", err).contains("OpenAPI file not found"));
        assert!(!output.exists());
    }

    #[test]
    fn test_execute_without_schemas_writes_nothing() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, "paths: {}\n").unwrap();
        let output = dir.path().join("client.ts");

        let err = execute(&args(Some(spec.to_string_lossy().to_string()), output.clone()))
            .unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_execute_strict_rejects_unknown_types() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, "components:\n  schemas:\n    Blob: { type: file }\n").unwrap();
        let output = dir.path().join("client.ts");

        let mut strict = args(Some(spec.to_string_lossy().to_string()), output.clone());
        strict.strict = true;
        assert!(matches!(execute(&strict), Err(AppError::Compile(_))));
        assert!(!output.exists());

        strict.strict = false;
        execute(&strict).unwrap();
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("export const BlobSchema = z.any();"));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_with_failing_formatter_writes_nothing() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, SPEC).unwrap();
        let output = dir.path().join("client.ts");

        let mut with_formatter = args(Some(spec.to_string_lossy().to_string()), output.clone());
        with_formatter.formatter = Some("false".to_string());
        assert!(execute(&with_formatter).is_err());
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_passes_formatter_args_whole() {
        let dir = tempdir().unwrap();
        let spec = dir.path().join("openapi.yaml");
        fs::write(&spec, SPEC).unwrap();
        let output = dir.path().join("client.ts");

        let mut with_formatter = args(Some(spec.to_string_lossy().to_string()), output.clone());
        with_formatter.formatter = Some("sh".to_string());
        with_formatter.formatter_args = vec![
            "-c".to_string(),
            "cat; printf '// %s\\n' \"$1\"".to_string(),
            "sh".to_string(),
            "my file.json".to_string(),
        ];
        execute(&with_formatter).unwrap();
        assert!(fs::read_to_string(&output)
            .unwrap()
            .ends_with("}\n// my file.json\n"));
    }
}
