//! Compiler configuration for extensibility.
//!
//! Grounded in `examples/navicore-cem3/compiler/src/config.rs`'s
//! `CompilerConfig` builder: a `Default`-able struct constructed either
//! programmatically or by loading a `toml` file, so driver code (the CLI,
//! or an embedder) can tweak compiler-wide knobs without a recompile.
//! SIMPL-2021 has nothing resembling the teacher's external-builtin
//! registry (there's no FFI surface to a host runtime), so the knobs
//! here are specific to this compiler: where the assembler lives, how
//! long an identifier may be, and whether intermediate files survive a
//! successful build.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{CompileError, Result};

/// Compiler-wide configuration, loadable from a `toml` file or built up
/// programmatically via the builder methods.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path to `jasmin.jar`. Overrides the `JASMIN_JAR` environment
    /// variable when set; still fatal if neither is available.
    pub jasmin_jar: Option<String>,

    /// Maximum identifier length in bytes, overriding the compiler's
    /// built-in default ([`crate::scanner::MAX_ID_LENGTH`]).
    pub max_identifier_length: Option<usize>,

    /// Keep the generated `.j` Jasmin listing next to the output class
    /// file after a successful assemble, instead of discarding it.
    pub keep_listing: bool,

    /// Directory the assembled `.class` file is written to. Defaults to
    /// the source file's own directory when unset.
    pub output_dir: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            jasmin_jar: None,
            max_identifier_length: None,
            keep_listing: false,
            output_dir: None,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a `toml` file. Missing keys fall back to
    /// [`CompilerConfig::default`]'s values via `#[serde(default)]`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CompileError::CannotOpenSourceFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| CompileError::CannotOpenSourceFile {
            path: path.display().to_string(),
            reason: format!("invalid configuration: {e}"),
        })
    }

    pub fn with_jasmin_jar(mut self, path: impl Into<String>) -> Self {
        self.jasmin_jar = Some(path.into());
        self
    }

    pub fn with_max_identifier_length(mut self, len: usize) -> Self {
        self.max_identifier_length = Some(len);
        self
    }

    pub fn with_keep_listing(mut self, keep: bool) -> Self {
        self.keep_listing = keep;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_overrides() {
        let config = CompilerConfig::default();
        assert!(config.jasmin_jar.is_none());
        assert!(!config.keep_listing);
    }

    #[test]
    fn builder_methods_set_fields() {
        let config = CompilerConfig::new()
            .with_jasmin_jar("/opt/jasmin.jar")
            .with_max_identifier_length(64)
            .with_keep_listing(true)
            .with_output_dir("/tmp/out");
        assert_eq!(config.jasmin_jar.as_deref(), Some("/opt/jasmin.jar"));
        assert_eq!(config.max_identifier_length, Some(64));
        assert!(config.keep_listing);
        assert_eq!(config.output_dir.as_deref(), Some("/tmp/out"));
    }

    #[test]
    fn loads_partial_toml_with_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simplc.toml");
        fs::write(&path, "keep_listing = true\n").unwrap();
        let config = CompilerConfig::from_file(&path).unwrap();
        assert!(config.keep_listing);
        assert!(config.jasmin_jar.is_none());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = CompilerConfig::from_file(Path::new("/nonexistent/simplc.toml")).unwrap_err();
        assert!(matches!(err, CompileError::CannotOpenSourceFile { .. }));
    }
}
