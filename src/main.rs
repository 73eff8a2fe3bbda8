//! Maintain version definitions for a git-controlled project.
//!
//! Derives the project version from the repository's tags, branch name and
//! working tree state, then renders it into generated sources and touches
//! files so the build system rebuilds what depends on them.

use anyhow::Result;
use clap::Parser;
use version_helper::commands::{
    self,
    RunArgs,
};

fn main() -> Result<()> {
    let args = RunArgs::parse();
    commands::run(args)?;
    Ok(())
}
