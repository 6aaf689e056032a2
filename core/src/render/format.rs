#![deny(missing_docs)]

//! # Formatters
//!
//! Post-processing of rendered source before it is written to disk.

use crate::error::{AppError, AppResult};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Rewrites rendered source text.
pub trait Formatter {
    /// Returns the formatted text.
    fn format(&self, source: &str) -> AppResult<String>;
}

/// Whitespace normalisation: trailing spaces trimmed, runs of blank lines
/// collapsed to one, exactly one trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFormatter;

impl Formatter for BuiltinFormatter {
    fn format(&self, source: &str) -> AppResult<String> {
        let mut out = String::with_capacity(source.len());
        let mut previous_blank = true;
        for line in source.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if previous_blank {
                    continue;
                }
                previous_blank = true;
            } else {
                previous_blank = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        Ok(out)
    }
}

/// Runs an external command (e.g. `npx prettier --parser typescript`) that reads
/// source on stdin and writes the formatted source to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
}

impl ExternalFormatter {
    /// Creates a formatter from a program and its arguments.
    ///
    /// Arguments are passed to the program as given; no shell splitting or
    /// quoting is applied.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Formatter for ExternalFormatter {
    fn format(&self, source: &str) -> AppResult<String> {
        debug!("Running formatter: {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::General(format!("Failed to run formatter '{}': {}", self.program, e))
            })?;

        // stdin is fed from a thread while stdout is drained here.
        let stdin = child.stdin.take();
        let input = source.to_string();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| AppError::General("Formatter input thread panicked".to_string()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::General(format!(
                "Formatter '{}' failed: {}",
                self.program,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| AppError::General(format!("Formatter produced invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formatter() {
        let src = "\n\na = 1;   \n\n\n\nb = 2;\t\n\n\n";
        assert_eq!(BuiltinFormatter.format(src).unwrap(), "a = 1;\n\nb = 2;\n");
    }

    #[test]
    fn test_builtin_formatter_is_idempotent() {
        let once = BuiltinFormatter.format("x\n\n\ny  \n").unwrap();
        assert_eq!(BuiltinFormatter.format(&once).unwrap(), once);
    }

    #[cfg(unix)]
    #[test]
    fn test_external_formatter_pipes_through() {
        let f = ExternalFormatter::new("cat", Vec::new());
        assert_eq!(f.format("const a = 1;\n").unwrap(), "const a = 1;\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_formatter_keeps_arguments_whole() {
        let f = ExternalFormatter::new(
            "sh",
            vec![
                "-c".into(),
                "cat; printf '%s' \"$1\"".into(),
                "sh".into(),
                "my file.json".into(),
            ],
        );
        assert_eq!(f.format("x\n").unwrap(), "x\nmy file.json");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_formatter_failure() {
        let f = ExternalFormatter::new("false", Vec::new());
        assert!(f.format("x").is_err());
        let missing = ExternalFormatter::new("definitely-not-a-formatter-binary", Vec::new());
        assert!(missing.format("x").is_err());
    }
}
