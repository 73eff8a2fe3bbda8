//! Placeholder substitution for generated source files.
//!
//! Placeholders are written `{name}` or `{self.name}`. Literal braces are
//! written `{{` and `}}`, so a C template looks like:
//!
//! ```text
//! #define {c_symbol_prefix_upper}VERSION "{proj_version}"
//! static const struct {{ const char *commit; }} {symbol_prefix_lower}info = {{ "{commit}" }};
//! ```

use std::collections::BTreeMap;

use anyhow::{
    Context,
    Result,
};
use regex::{
    Captures,
    Regex,
};

/// `{{`, `}}`, a `{name}` / `{self.name}` placeholder, or any other `{...}`
/// (empty, positional or misspelt), which is rejected.
const PLACEHOLDER_PATTERN: &str =
    r"\{\{|\}\}|\{(?:self\.)?([A-Za-z_][A-Za-z0-9_]*)\}|\{[^{}\n]*\}";

/// Named values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Insert `name`, `name_lower` and `name_upper`.
    pub fn insert_cased(&mut self, name: &str, value: &str) {
        self.insert(name, value);
        self.insert(format!("{}_lower", name), value.to_lowercase());
        self.insert(format!("{}_upper", name), value.to_uppercase());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Substitute every placeholder in `template`.
///
/// # Errors
///
/// Returns an error naming the first placeholder with no value in `context`,
/// including malformed ones such as `{}` or `{0}`. A lone unpaired brace is
/// copied through.
pub fn render(template: &str, context: &TemplateContext) -> Result<String> {
    let re = Regex::new(PLACEHOLDER_PATTERN).context("Invalid placeholder pattern")?;
    let mut unknown = None;

    let rendered = re.replace_all(template, |caps: &Captures| {
        let whole = &caps[0];
        if whole == "{{" || whole == "}}" {
            return whole[..1].to_string();
        }
        match caps.get(1).and_then(|name| context.get(name.as_str())) {
            Some(value) => value.to_string(),
            None => {
                unknown.get_or_insert_with(|| whole.to_string());
                String::new()
            }
        }
    });

    if let Some(placeholder) = unknown {
        anyhow::bail!("Unknown template placeholder: {}", placeholder);
    }

    Ok(rendered.into_owned())
}
