//! Page rendering with minijinja.
//!
//! Templates live under `templates/pages/` (overridable through `TEMPLATE_DIR`)
//! and are loaded once into a process-wide environment.

use axum::response::Html;
use minijinja::{AutoEscape, Environment, Value};
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the project root
const DEFAULT_TEMPLATE_DIR: &str = "templates/pages";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Load every `.jinja` file under `dir`. Later calls are no-ops.
pub fn init_templates(dir: &str) -> usize {
    TEMPLATE_ENV
        .get_or_init(|| build_environment(Path::new(dir)))
        .templates()
        .count()
}

fn build_environment(dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_filter("mask", mask_filter);

    let mut sources = Vec::new();
    if let Err(e) = collect_sources(dir, dir, &mut sources) {
        tracing::warn!("Could not read templates from {}: {}", dir.display(), e);
    }

    for (name, source) in sources {
        // The environment lives for the whole process, so do its sources
        let name: &'static str = Box::leak(name.into_boxed_str());
        let source: &'static str = Box::leak(source.into_boxed_str());
        match env.add_template(name, source) {
            Ok(()) => tracing::debug!("Loaded template: {}", name),
            Err(e) => tracing::warn!("Skipping template {}: {}", name, e),
        }
    }

    env
}

/// Gather `(name, source)` for every `.jinja` file below `root`, named by
/// their `/`-separated path relative to `root`.
fn collect_sources(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, String)>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources(root, &path, out)?;
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push((name, std::fs::read_to_string(&path)?));
    }
    Ok(())
}

/// `{{ value|mask }}` keeps the first 8 and last 4 characters
fn mask_filter(value: String) -> String {
    crate::features::api_keys::models::mask_key(&value)
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| build_environment(Path::new(DEFAULT_TEMPLATE_DIR)))
}

/// Render a page template with a serializable context.
pub fn render_page<S: Serialize>(template_name: &str, ctx: S) -> Result<Html<String>, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(Value::from_serialize(&ctx))
        .map(Html)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
