//! Server-side page templates.

pub mod engine;

pub use engine::{init_templates, render_page, TemplateError};
