//! Command-line arguments for `version-helper`.
//!
//! Every configuration key has a flag. Flags that are not given leave the key
//! to the config file or the built-in default, see [`crate::config`].
//!
//! # Examples
//!
//! ```bash
//! # Use <repo>/VersionHelper.yml
//! version-helper --repo-path .
//!
//! # Render a C header and touch a source file, with progress output
//! version-helper -v --c-file src/version.h --touch src/version.c
//!
//! # Use a config file elsewhere
//! version-helper --cfg-file build/VersionHelper.yml
//! ```

use std::path::PathBuf;

use clap::{
    ArgAction,
    Parser,
};

use crate::config::{
    ConfigLayer,
    TouchSpec,
};

/// Arguments for the `version-helper` command.
#[derive(Parser, Debug, Default)]
#[command(
    name = "version-helper",
    about = "Maintain version definitions for a git-controlled project",
    after_help = "Config is loaded from <repo-path>/VersionHelper.yml or the file given by \
                  --cfg-file. Command-line flags override the file.",
    disable_version_flag = true
)]
pub struct RunArgs {
    /// Configuration file in YAML format.
    ///
    /// It is an error if this file does not exist. Without this flag,
    /// `<repo-path>/VersionHelper.yml` is used when present.
    #[arg(long, short = 'c', value_name = "VersionHelper.yml")]
    pub cfg_file: Option<PathBuf>,

    /// Don't print the effect summary.
    #[arg(long)]
    pub quiet: bool,

    /// Path to the git repository.
    #[arg(long, value_name = "repodir")]
    pub repo_path: Option<PathBuf>,

    /// Prefix for symbol names in generated source files.
    #[arg(long, value_name = "MYPROJ_")]
    pub symbol_prefix: Option<String>,

    /// File to touch (update mtime). May be repeated.
    #[arg(long, value_name = "version.c")]
    pub touch: Option<Vec<PathBuf>>,

    /// Increase verbosity. May be repeated.
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the version-helper version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    pub show_version: bool,

    /// C output file.
    #[arg(long, value_name = "version.h", help_heading = "C language")]
    pub c_file: Option<PathBuf>,

    /// C template.
    #[arg(long, value_name = "c.template", help_heading = "C language")]
    pub c_template: Option<PathBuf>,

    /// Symbol prefix for C output; defaults to --symbol-prefix.
    #[arg(long, value_name = "MYPROJ_", help_heading = "C language")]
    pub c_symbol_prefix: Option<String>,

    /// Python output file.
    #[arg(long, value_name = "__version__.py", help_heading = "Python language")]
    pub py_file: Option<PathBuf>,

    /// Python template.
    #[arg(long, value_name = "python.template", help_heading = "Python language")]
    pub py_template: Option<PathBuf>,

    /// Symbol prefix for Python output; defaults to --symbol-prefix.
    #[arg(long, value_name = "myproj_", help_heading = "Python language")]
    pub py_symbol_prefix: Option<String>,
}

impl RunArgs {
    /// The command-line configuration layer.
    ///
    /// `--verbose` and `--quiet` only count as set when given.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            repo_path: self.repo_path.clone(),
            symbol_prefix: self.symbol_prefix.clone(),
            touch: self.touch.clone().map(TouchSpec::Many),
            verbose: (self.verbose > 0).then_some(self.verbose),
            quiet: self.quiet.then_some(true),
            c_file: self.c_file.clone(),
            c_template: self.c_template.clone(),
            c_symbol_prefix: self.c_symbol_prefix.clone(),
            py_file: self.py_file.clone(),
            py_template: self.py_template.clone(),
            py_symbol_prefix: self.py_symbol_prefix.clone(),
        }
    }
}
