//! Invocation of the external Jasmin assembler.
//!
//! SIMPL-2021 compiles to Jasmin text, not JVM bytecode directly; turning
//! that listing into a `.class` file is delegated to `jasmin.jar`, run
//! with `java -jar`, exactly as `examples/original_source/src/simplc.c`'s
//! `main` calls `assemble(jasmin_path)` after `make_code_file()`. The
//! path to the jar comes from the `JASMIN_JAR` environment variable
//! (checked fatally before compilation starts, matching the original
//! compiler's practice of validating its environment up front) unless a
//! [`crate::config::CompilerConfig`] overrides it.

use std::path::Path;
use std::process::Command;

use crate::error::{CompileError, Result};

/// Resolve the path to `jasmin.jar`: an explicit override, falling back
/// to the `JASMIN_JAR` environment variable.
pub fn resolve_jasmin_jar(override_path: Option<&str>) -> Result<String> {
    if let Some(path) = override_path {
        return Ok(path.to_string());
    }
    std::env::var("JASMIN_JAR").map_err(|_| CompileError::JasminJarNotSet)
}

/// Assemble a `.j` Jasmin listing into a `.class` file in `output_dir`.
pub fn assemble(jasmin_jar: &str, listing_path: &Path, output_dir: &Path) -> Result<()> {
    let status = Command::new("java")
        .arg("-jar")
        .arg(jasmin_jar)
        .arg(listing_path)
        .arg("-d")
        .arg(output_dir)
        .status()
        .map_err(|e| CompileError::CannotOpenSourceFile {
            path: jasmin_jar.to_string(),
            reason: format!("could not run java: {e}"),
        })?;

    if !status.success() {
        return Err(CompileError::CannotOpenSourceFile {
            path: listing_path.display().to_string(),
            reason: "jasmin assembler reported an error".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_path_wins_over_environment() {
        let resolved = resolve_jasmin_jar(Some("/opt/jasmin.jar")).unwrap();
        assert_eq!(resolved, "/opt/jasmin.jar");
    }

    #[test]
    fn missing_env_and_override_is_an_error() {
        std::env::remove_var("JASMIN_JAR");
        let err = resolve_jasmin_jar(None).unwrap_err();
        assert!(matches!(err, CompileError::JasminJarNotSet));
    }
}
