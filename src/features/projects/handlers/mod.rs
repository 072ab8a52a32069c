mod project_handler;

pub use project_handler::{create_project, delete_project, projects_page, update_project};
