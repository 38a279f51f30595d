//! Configuration types for `vkhpp-gen.toml`.
//!
//! Every field has a default, so running without a config file produces the
//! stock `vulkan.hpp` layout. The config only affects text content (names,
//! guard macros, output path), never the generation algorithm.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub api: ApiConfig,
    /// Run `clang-format` on the written header. Absence of the binary is
    /// non-fatal.
    pub format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: OutputConfig::default(),
            api: ApiConfig::default(),
            format: true,
        }
    }
}

/// Output file settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output header path.
    pub file: PathBuf,
    /// C++ namespace wrapping every generated entity.
    pub namespace: String,
    /// Include-guard macro.
    pub header_macro: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            file: PathBuf::from("vulkan.hpp"),
            namespace: "VULKAN_HPP_NAMESPACE".to_string(),
            header_macro: "VULKAN_HPP".to_string(),
        }
    }
}

/// C API naming configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Type prefix (`VkBuffer`).
    pub type_prefix: String,
    /// Command prefix (`vkCreateBuffer`).
    pub command_prefix: String,
    /// Macro prefix (`VK_HEADER_VERSION`).
    pub macro_prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            type_prefix: "Vk".to_string(),
            command_prefix: "vk".to_string(),
            macro_prefix: "VK".to_string(),
        }
    }
}

/// Load and parse a `vkhpp-gen.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
