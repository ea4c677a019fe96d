//! SIMPL-2021 compiler library.
//!
//! Provides compilation from SIMPL-2021 source to Jasmin assembly, and
//! (when `jasmin.jar` is available) all the way to a JVM `.class` file.

pub mod assembler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod hash_table;
pub mod parser;
pub mod position;
pub mod scanner;
pub mod symtab;
pub mod token;
pub mod types;

pub use config::CompilerConfig;
pub use error::{CompileError, Result};
pub use parser::{compile_source, compile_source_with_max_id_length};

use std::fs;
use std::path::Path;

/// Compile a SIMPL-2021 source file all the way to a `.class` file,
/// invoking the external Jasmin assembler. `config` supplies the
/// assembler path, identifier-length override, and listing-retention
/// policy; pass [`CompilerConfig::default`] to use the environment and
/// built-in defaults.
///
/// `JASMIN_JAR` (or `config.jasmin_jar`) is resolved before the source
/// file is even opened, matching `examples/original_source/src/
/// simplc.c`'s `main`, which checks `getenv("JASMIN_JAR")` up front and
/// never starts compiling without it.
pub fn compile_file(source_path: &Path, config: &CompilerConfig) -> Result<()> {
    let jasmin_jar = assembler::resolve_jasmin_jar(config.jasmin_jar.as_deref())?;

    let source = fs::read_to_string(source_path).map_err(|e| CompileError::CannotOpenSourceFile {
        path: source_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let listing = match config.max_identifier_length {
        Some(max) => compile_source_with_max_id_length(&source, max)?,
        None => compile_source(&source)?,
    };

    let output_dir = match &config.output_dir {
        Some(dir) => Path::new(dir).to_path_buf(),
        None => source_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
    };
    let listing_path = output_dir.join(
        source_path.file_stem().map(|s| format!("{}.j", s.to_string_lossy())).unwrap_or_else(|| "out.j".to_string()),
    );
    fs::write(&listing_path, &listing).map_err(|e| CompileError::CannotOpenSourceFile {
        path: listing_path.display().to_string(),
        reason: e.to_string(),
    })?;

    assembler::assemble(&jasmin_jar, &listing_path, &output_dir)?;

    if !config.keep_listing {
        fs::remove_file(&listing_path).ok();
    }

    Ok(())
}

/// Compile a SIMPL-2021 source file to its Jasmin `.j` listing only,
/// without invoking the assembler. Used by tests and by callers that
/// want to inspect or hand off the intermediate text themselves.
pub fn compile_to_listing(source_path: &Path) -> Result<String> {
    let source = fs::read_to_string(source_path).map_err(|e| CompileError::CannotOpenSourceFile {
        path: source_path.display().to_string(),
        reason: e.to_string(),
    })?;
    compile_source(&source)
}
