//! Configuration layering.
//!
//! The effective configuration is built from three sources, lowest precedence
//! first:
//!
//! 1. Built-in defaults ([`EffectiveConfig::default`])
//! 2. The YAML config file (`<repo_path>/VersionHelper.yml` or `--cfg-file`)
//! 3. Command-line flags
//!
//! A key set in a higher layer replaces the lower value entirely; lists such
//! as `touch` are replaced, never appended to.
//!
//! # Example config file
//!
//! ```yaml
//! symbol_prefix: MYPROJ_
//! c_file: src/version.h
//! c_template: BuildHelper/c.template
//! touch:
//!   - src/version.c
//! ```

use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use serde::Deserialize;

/// Config file looked up inside the repository when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "VersionHelper.yml";

/// A `touch` value: a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TouchSpec {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl TouchSpec {
    /// Whether this is a bare scalar that gets coerced into a list.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::One(_))
    }

    pub fn into_list(self) -> Vec<PathBuf> {
        match self {
            Self::One(path) => vec![path],
            Self::Many(paths) => paths,
        }
    }
}

/// One configuration source. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub repo_path: Option<PathBuf>,
    pub symbol_prefix: Option<String>,
    pub touch: Option<TouchSpec>,
    pub verbose: Option<u8>,
    pub quiet: Option<bool>,
    pub c_file: Option<PathBuf>,
    pub c_template: Option<PathBuf>,
    pub c_symbol_prefix: Option<String>,
    pub py_file: Option<PathBuf>,
    pub py_template: Option<PathBuf>,
    pub py_symbol_prefix: Option<String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    /// Path to the git repository.
    pub repo_path: PathBuf,
    /// Prefix for symbols in generated sources.
    pub symbol_prefix: String,
    /// Files whose modification time is updated, in order.
    pub touch: Vec<PathBuf>,
    pub verbose: u8,
    pub quiet: bool,
    /// C output file; no C output when unset.
    pub c_file: Option<PathBuf>,
    pub c_template: PathBuf,
    /// Overrides `symbol_prefix` for C output.
    pub c_symbol_prefix: Option<String>,
    /// Python output file; no Python output when unset.
    pub py_file: Option<PathBuf>,
    pub py_template: PathBuf,
    /// Overrides `symbol_prefix` for Python output.
    pub py_symbol_prefix: Option<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("./"),
            symbol_prefix: String::new(),
            touch: Vec::new(),
            verbose: 0,
            quiet: false,
            c_file: None,
            c_template: PathBuf::from("BuildHelper/c.template"),
            c_symbol_prefix: None,
            py_file: None,
            py_template: PathBuf::from("BuildHelper/python.template"),
            py_symbol_prefix: None,
        }
    }
}

impl EffectiveConfig {
    /// Apply `layer` on top of this configuration.
    pub fn overlay(self, layer: ConfigLayer) -> Self {
        Self {
            repo_path: layer.repo_path.unwrap_or(self.repo_path),
            symbol_prefix: layer.symbol_prefix.unwrap_or(self.symbol_prefix),
            touch: layer
                .touch
                .map(TouchSpec::into_list)
                .unwrap_or(self.touch),
            verbose: layer.verbose.unwrap_or(self.verbose),
            quiet: layer.quiet.unwrap_or(self.quiet),
            c_file: layer.c_file.or(self.c_file),
            c_template: layer.c_template.unwrap_or(self.c_template),
            c_symbol_prefix: layer.c_symbol_prefix.or(self.c_symbol_prefix),
            py_file: layer.py_file.or(self.py_file),
            py_template: layer.py_template.unwrap_or(self.py_template),
            py_symbol_prefix: layer.py_symbol_prefix.or(self.py_symbol_prefix),
        }
    }
}

/// Merge defaults, config file and command line, in increasing precedence.
pub fn merge(defaults: EffectiveConfig, file: ConfigLayer, cli: ConfigLayer) -> EffectiveConfig {
    defaults.overlay(file).overlay(cli)
}

/// Pick the config file to load.
///
/// An explicit path is always returned, so a missing file surfaces as an
/// error from [`load_config`]. Otherwise `<repo_path>/VersionHelper.yml` is
/// used only if it exists.
pub fn find_config_file(explicit: Option<&Path>, repo_path: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let default = repo_path.join(DEFAULT_CONFIG_FILE);
    default.is_file().then_some(default)
}

/// Read and parse a YAML config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, or
/// contains unknown keys.
pub fn load_config(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Parse YAML config text. An empty document is an empty layer.
pub fn parse_config(content: &str) -> Result<ConfigLayer> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_null() {
        return Ok(ConfigLayer::default());
    }
    Ok(serde_yaml::from_value(value)?)
}
