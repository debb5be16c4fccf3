//! Configuration template rendering.
//!
//! Templates are plain text with `${key}` placeholders, addressed by
//! name within a fixed resource namespace and rendered against a flat
//! string map. Rendering is strict: a missing template or an
//! unresolved placeholder fails the build.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::application::ports::ResourceLister;
use crate::domain::PackageError;

/// Resource namespace the configuration templates live under.
pub const TEMPLATE_NAMESPACE: &str = "templates";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)\}").unwrap_or_else(|e| panic!("placeholder regex: {e}"))
});

/// Render the named template against the given parameters.
///
/// # Errors
///
/// Returns [`PackageError::TemplateRender`] if the template is missing,
/// not valid UTF-8, or references a parameter not in `params`.
pub fn render(
    lister: &impl ResourceLister,
    template_name: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, PackageError> {
    let resource = format!("{TEMPLATE_NAMESPACE}/{template_name}");
    let bytes = lister
        .get(&resource)
        .map_err(|_| PackageError::TemplateRender {
            name: template_name.to_string(),
            reason: "template not found".to_string(),
        })?;
    let text = std::str::from_utf8(&bytes).map_err(|_| PackageError::TemplateRender {
        name: template_name.to_string(),
        reason: "template is not valid UTF-8".to_string(),
    })?;
    substitute(text, params).map_err(|key| PackageError::TemplateRender {
        name: template_name.to_string(),
        reason: format!("no value for placeholder '{key}'"),
    })
}

/// Replace every `${key}` in `text`, erroring with the first unknown key.
fn substitute(text: &str, params: &BTreeMap<String, String>) -> Result<String, String> {
    let mut rendered = String::with_capacity(text.len());
    let mut last_end = 0;
    for captures in PLACEHOLDER.captures_iter(text) {
        let matched = captures.get(0).ok_or_else(|| "placeholder".to_string())?;
        let key = &captures[1];
        let value = params.get(key).ok_or_else(|| key.to_string())?;
        rendered.push_str(&text[last_end..matched.start()]);
        rendered.push_str(value);
        last_end = matched.end();
    }
    rendered.push_str(&text[last_end..]);
    Ok(rendered)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
