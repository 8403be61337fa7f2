//! Implementation of the `buildfmt` command.

use std::io::Read;
use std::path::{Path, PathBuf};

use buildfile_cst::{format_file, parse_file_with_options, prettify_error, ParseOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FmtError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A parse failure, already rendered as a diagnostic.
    #[error("{0}")]
    Parse(String),
}

/// The aggregate result over all inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every file was already formatted (or has been rewritten).
    Clean,
    /// Check mode found files that would change.
    Changed,
}

/// Formats each file in place, or reports unformatted files in check
/// mode. The pseudo-path `-` reads stdin and writes the formatted output
/// to stdout.
pub fn run(files: &[PathBuf], check: bool, strict: bool) -> Result<Outcome, FmtError> {
    let options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::default()
    };

    let mut outcome = Outcome::Clean;
    for path in files {
        if path.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| FmtError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            let formatted = format_text(&text, "<stdin>", options)?;
            if check {
                if formatted != text {
                    println!("<stdin>");
                    outcome = Outcome::Changed;
                }
            } else {
                print!("{}", formatted);
            }
            continue;
        }

        let formatted = format_path(path, check, options)?;
        if formatted {
            outcome = Outcome::Changed;
        }
    }
    Ok(outcome)
}

/// Formats one file. Returns true if the file was not already formatted.
fn format_path(path: &Path, check: bool, options: ParseOptions) -> Result<bool, FmtError> {
    let io_err = |source| FmtError::Io {
        path: path.display().to_string(),
        source,
    };
    let text = std::fs::read_to_string(path).map_err(io_err)?;
    let label = path.display().to_string();
    let formatted = format_text(&text, &label, options)?;
    if formatted == text {
        return Ok(false);
    }
    if check {
        println!("{}", path.display());
    } else {
        std::fs::write(path, formatted).map_err(io_err)?;
    }
    Ok(true)
}

fn format_text(text: &str, label: &str, options: ParseOptions) -> Result<String, FmtError> {
    match parse_file_with_options(text, options) {
        Ok(file) => Ok(format_file(&file)),
        Err(err) => Err(FmtError::Parse(prettify_error(err, label))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_unformatted_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("BUILD");
        std::fs::write(&path, "cc_library(name = \"x\", srcs = [\"a.cc\", \"b.cc\"])\n")
            .expect("write");

        let outcome = run(&[path.clone()], false, false).expect("run");
        assert_eq!(outcome, Outcome::Changed);

        let formatted = std::fs::read_to_string(&path).expect("read");
        assert_eq!(
            formatted,
            "cc_library(\n    name = \"x\",\n    srcs = [\n        \"a.cc\",\n        \"b.cc\",\n    ],\n)\n"
        );

        // A second run is a no-op.
        let outcome = run(&[path], false, false).expect("run");
        assert_eq!(outcome, Outcome::Clean);
    }

    #[test]
    fn check_mode_does_not_rewrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("BUILD");
        let original = "f( 1 )\n";
        std::fs::write(&path, original).expect("write");

        let outcome = run(&[path.clone()], true, false).expect("run");
        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(std::fs::read_to_string(&path).expect("read"), original);
    }

    #[test]
    fn parse_error_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("BUILD");
        std::fs::write(&path, "f(1, ]\n").expect("write");

        let err = run(&[path], false, false).unwrap_err();
        assert!(matches!(err, FmtError::Parse(_)));
    }
}
