//! Configured side effects.
//!
//! The action list is fixed by the effective configuration: the C render (if
//! `c_file` is set), the Python render (if `py_file` is set), then one touch
//! per `touch` entry in configured order.

use std::fmt;
use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use cargo_plugin_utils::logger::Logger;
use filetime::FileTime;

use crate::config::EffectiveConfig;
use crate::template::{
    self,
    TemplateContext,
};
use crate::version::VersionInfo;

/// Output languages with a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Python,
}

impl Language {
    /// Prefix of this language's config keys and placeholders.
    pub fn key(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Python => "py",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::C => "C",
            Self::Python => "Python",
        })
    }
}

/// A single side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Render `template` into `output`, replacing it.
    RenderTemplate {
        language: Language,
        template: PathBuf,
        output: PathBuf,
        symbol_prefix: String,
    },
    /// Update the modification time of a file, creating it if needed.
    TouchFile(PathBuf),
}

/// Derive the ordered action list from the configuration.
pub fn plan(config: &EffectiveConfig) -> Vec<Action> {
    let renders = [
        (
            Language::C,
            &config.c_file,
            &config.c_template,
            &config.c_symbol_prefix,
        ),
        (
            Language::Python,
            &config.py_file,
            &config.py_template,
            &config.py_symbol_prefix,
        ),
    ];

    let mut actions: Vec<Action> = renders
        .into_iter()
        .filter_map(|(language, output, template, prefix)| {
            let output = output.as_ref()?;
            Some(Action::RenderTemplate {
                language,
                template: template.clone(),
                output: output.clone(),
                symbol_prefix: prefix
                    .clone()
                    .unwrap_or_else(|| config.symbol_prefix.clone()),
            })
        })
        .collect();

    actions.extend(config.touch.iter().cloned().map(Action::TouchFile));
    actions
}

/// Run every configured action and return the number of effects.
///
/// Returns `Ok(0)` without touching the filesystem when nothing is
/// configured. Per-effect lines go to `logger` at verbosity 1 and above.
///
/// # Errors
///
/// Returns an error if a template cannot be read or rendered, or an output or
/// touched file cannot be written. Actions before the failing one have
/// already taken effect.
pub fn run(config: &EffectiveConfig, version: &VersionInfo, logger: &mut Logger) -> Result<usize> {
    let actions = plan(config);
    let mut effects = 0;

    for action in &actions {
        match action {
            Action::RenderTemplate {
                language,
                template,
                output,
                symbol_prefix,
            } => {
                let context = template_context(config, version, *language, symbol_prefix);
                render_file(template, output, &context)?;
                if config.verbose >= 1 {
                    logger.status(
                        "Rendered",
                        &format!(
                            "{} {} -> {}",
                            language,
                            template.display(),
                            output.display()
                        ),
                    );
                }
            }
            Action::TouchFile(path) => {
                touch(path)?;
                if config.verbose >= 1 {
                    logger.status("Touched", &path.display().to_string());
                }
            }
        }
        effects += 1;
    }

    Ok(effects)
}

/// Values available to templates for one render.
pub fn template_context(
    config: &EffectiveConfig,
    version: &VersionInfo,
    language: Language,
    symbol_prefix: &str,
) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.insert("proj_version", version.proj_version.as_str());
    context.insert("proj_version_from", version.proj_version_from.to_string());
    context.insert("commit", version.commit_hash.as_str());
    context.insert("describe", version.describe.as_str());
    context.insert("branch", version.branch.as_str());
    context.insert("dirty", u8::from(version.dirty).to_string());
    context.insert("untracked", version.untracked_count.to_string());
    context.insert("time", version.timestamp.to_string());
    context.insert("time_str", version.time_str.as_str());
    context.insert("build_host", version.build_host.as_str());
    context.insert_cased("symbol_prefix", &config.symbol_prefix);
    context.insert_cased(&format!("{}_symbol_prefix", language.key()), symbol_prefix);
    context
}

fn render_file(template: &Path, output: &Path, context: &TemplateContext) -> Result<()> {
    let source = fs::read_to_string(template)
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let rendered = template::render(&source, context)
        .with_context(|| format!("Failed to render template {}", template.display()))?;
    fs::write(output, rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Set the modification time of `path` to now, creating it if missing.
///
/// Existing paths are never opened, so directories and read-only files can be
/// touched too.
fn touch(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    }
    filetime::set_file_mtime(path, FileTime::now())
        .with_context(|| format!("Failed to update modification time of {}", path.display()))?;
    Ok(())
}
