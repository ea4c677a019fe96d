//! SIMPL-2021 compiler CLI.
//!
//! Command-line interface for compiling `.simpl` programs to JVM class
//! files via Jasmin.

use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;

use simplc::CompilerConfig;

#[derive(ClapParser)]
#[command(name = "simplc")]
#[command(about = "SIMPL-2021 compiler - compile .simpl programs to JVM class files", long_about = None)]
struct Cli {
    /// Input .simpl source file
    input: PathBuf,

    /// Directory to write the assembled .class file to (defaults to the
    /// source file's own directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the intermediate Jasmin .j listing after a successful build
    #[arg(long)]
    keep_listing: bool,

    /// Path to jasmin.jar (overrides the JASMIN_JAR environment variable)
    #[arg(long)]
    jasmin_jar: Option<PathBuf>,

    /// Load additional configuration from a toml file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match CompilerConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        None => CompilerConfig::new(),
    };
    if let Some(dir) = &cli.output {
        config.output_dir = Some(dir.display().to_string());
    }
    if let Some(jar) = &cli.jasmin_jar {
        config.jasmin_jar = Some(jar.display().to_string());
    }
    config.keep_listing = config.keep_listing || cli.keep_listing;

    match simplc::compile_file(&cli.input, &config) {
        Ok(()) => {
            println!("Compiled {}", cli.input.display());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
