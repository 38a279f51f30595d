//! vkhpp-gen — Vulkan XML registry → C++ header generator.
//!
//! Reads the registry (`vk.xml`), builds a cross-referenced model, validates
//! it, and emits a single header wrapping the C API in scoped enums, flag
//! sets, handle classes with member commands, structure wrappers and
//! overloads derived from vector/length analysis.
//!
//! # Quick start
//!
//! Generate a header next to the registry (suitable for build scripts):
//!
//! ```no_run
//! use std::path::Path;
//!
//! vkhpp_gen::run(Path::new("vk.xml"), None, None).unwrap();
//! ```
//!
//! Or get the header text without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let cfg = vkhpp_gen::config::Config::default();
//! let generated = vkhpp_gen::generate(Path::new("vk.xml"), &cfg).unwrap();
//! assert!(!generated.header.is_empty());
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod classify;
pub mod config;
pub mod emit;
pub mod extract;
pub mod model;
pub mod names;
pub mod select;
pub mod template;
pub mod validate;

pub use emit::EmitOutput;

/// What a completed run produced.
#[derive(Debug)]
pub struct GenerateReport {
    /// Where the header was written.
    pub output: PathBuf,
    /// Commands skipped because no overload shape matched. Callers may
    /// treat a non-zero count as CI-breaking.
    pub shape_misses: usize,
}

/// Run the full pipeline: load config, parse and validate the registry,
/// emit the header, write it, and run the formatter.
///
/// `registry_path` is the registry XML (`vk.xml`).
/// `config_path` optionally names a `vkhpp-gen.toml`; absent, compiled-in
/// defaults apply.
/// `output` optionally overrides the output file path from the config.
///
/// Returns the path the header was written to and the shape-miss counter.
pub fn run(
    registry_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<GenerateReport> {
    let cfg = match config_path {
        Some(path) => config::load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => config::Config::default(),
    };

    let generated = generate(registry_path, &cfg)?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => cfg.output.file.clone(),
    };
    std::fs::write(&output_path, &generated.header)
        .with_context(|| format!("writing output to {}", output_path.display()))?;

    info!(
        path = %output_path.display(),
        size = generated.header.len(),
        shape_misses = generated.shape_misses,
        "wrote header"
    );

    if cfg.format {
        format_file(&output_path);
    }

    Ok(GenerateReport {
        output: output_path,
        shape_misses: generated.shape_misses,
    })
}

/// Parse the registry file and return the generated header without writing
/// to disk.
pub fn generate(registry_path: &Path, cfg: &config::Config) -> Result<EmitOutput> {
    let xml = std::fs::read_to_string(registry_path)
        .with_context(|| format!("reading registry {}", registry_path.display()))?;
    generate_from_str(&xml, cfg)
}

/// Generate from registry XML already in memory.
pub fn generate_from_str(xml: &str, cfg: &config::Config) -> Result<EmitOutput> {
    let registry = extract::parse_registry(xml)?;
    validate::validate(&registry)?;
    emit::emit(&registry, cfg)
}

/// Rewrite the emitted header in place with `clang-format`. A missing or
/// failing formatter is non-fatal.
fn format_file(path: &Path) {
    match Command::new("clang-format").arg("-i").arg(path).status() {
        Ok(status) if status.success() => {
            info!(path = %path.display(), "formatted header");
        }
        Ok(status) => {
            warn!(path = %path.display(), %status, "clang-format reported failure");
        }
        Err(e) => {
            warn!(error = %e, "clang-format not available; leaving header unformatted");
        }
    }
}
