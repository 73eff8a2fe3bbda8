//! Derive the project version and apply the configured actions.
//!
//! # Workflow
//!
//! 1. **`--version`**: print the tool's own version and stop.
//! 2. **Configuration**: merge defaults, the YAML config file and the
//!    command-line flags.
//! 3. **Inspect**: read HEAD, branch, describe string and working tree status
//!    from the repository.
//! 4. **Derive**: compute the project version (tag, branch name, or
//!    `0.0.<time>` fallback).
//! 5. **Act**: render templates and touch files.
//!
//! A run that has no actions configured succeeds with a warning.
//!
//! # Example Output
//!
//! With `-vv`:
//!
//! ```text
//!      Running on ./
//! proj_version: "1.2.3-dirty"
//! proj_version_from: "tag"
//! branch: "main"
//! describe: "v1.2.3-dirty"
//! time: "Tue Nov 14 22:13:20 2023"
//!     Rendered C BuildHelper/c.template -> src/version.h
//!      Touched src/version.c
//! Had 2 effects
//! ```

pub mod args;


use anyhow::Result;
pub use args::RunArgs;
use cargo_plugin_utils::logger::Logger;

use crate::config::{
    self,
    ConfigLayer,
    EffectiveConfig,
    TouchSpec,
};
use crate::{
    actions,
    repo,
    version,
};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `--version` was given; nothing else was done.
    ShowedVersion,
    /// The configured actions ran.
    Completed { effects: usize },
}

/// Run `version-helper`.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly named config file cannot be read or parsed
/// - The default config file exists but cannot be parsed
/// - The repository cannot be inspected
/// - A template cannot be rendered or a file cannot be written
pub fn run(args: RunArgs) -> Result<Outcome> {
    if args.show_version {
        println!("version-helper {}", env!("CARGO_PKG_VERSION"));
        return Ok(Outcome::ShowedVersion);
    }

    let defaults = EffectiveConfig::default();
    let cli_layer = args.config_layer();

    // The config file can't move its own lookup location.
    let search_root = cli_layer
        .repo_path
        .clone()
        .unwrap_or_else(|| defaults.repo_path.clone());
    let file_layer = match config::find_config_file(args.cfg_file.as_deref(), &search_root) {
        Some(path) => config::load_config(&path)?,
        None => ConfigLayer::default(),
    };
    let touch_coerced = file_layer.touch.as_ref().is_some_and(TouchSpec::is_scalar);

    let config = config::merge(defaults, file_layer, cli_layer);

    let mut logger = Logger::new();
    if config.verbose >= 1 {
        if touch_coerced {
            logger.status("Converting", "touch option from a single path to a list");
        }
        logger.status("Running", &format!("on {}", config.repo_path.display()));
    }

    let snapshot = repo::inspect(&config.repo_path)?;
    let version = version::derive(&snapshot);

    if config.verbose >= 2 {
        logger.print_message(&format!("proj_version: \"{}\"", version.proj_version));
        logger.print_message(&format!(
            "proj_version_from: \"{}\"",
            version.proj_version_from
        ));
        logger.print_message(&format!("branch: \"{}\"", version.branch));
        logger.print_message(&format!("describe: \"{}\"", version.describe));
        logger.print_message(&format!("time: \"{}\"", version.time_str));
    }

    let effects = actions::run(&config, &version, &mut logger)?;

    if effects == 0 {
        logger.warning("Nothing", "was done; check your configuration");
    } else if !config.quiet {
        logger.print_message(&format!("Had {} effects", effects));
    }
    logger.finish();

    Ok(Outcome::Completed { effects })
}
