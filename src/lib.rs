#![doc = include_str!("../README.md")]

/// Configured side effects: template rendering and touching files.
pub mod actions;
/// Command implementations and argument types.
pub mod commands;
/// Layered configuration: defaults, config file, command line.
pub mod config;
/// Git repository inspection.
pub mod repo;
/// Placeholder substitution for templates.
pub mod template;
/// Project version derivation.
///
/// # Example: Using in `build.rs`
///
/// ```no_run
/// use std::path::Path;
///
/// use version_helper::{
///     repo,
///     version,
/// };
///
/// fn main() -> anyhow::Result<()> {
///     let snapshot = repo::inspect(Path::new("."))?;
///     let info = version::derive(&snapshot);
///     println!("cargo:rustc-env=PROJ_VERSION={}", info.proj_version);
///     println!("cargo:rerun-if-changed=.git/HEAD");
///     println!("cargo:rerun-if-changed=.git/refs");
///     Ok(())
/// }
/// ```
pub mod version;
