use serde::{Deserialize, Serialize};

use crate::features::projects::models::Project;
use crate::shared::types::{ActionState, PageUser};

/// Create/update form post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// `Active` marks the project active; anything else is inactive
    #[serde(default)]
    pub status: String,
}

impl ProjectForm {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: usize,
    pub active: usize,
}

impl ProjectStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            total: projects.len(),
            active: projects.iter().filter(|p| p.is_active).count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectsPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub projects: Vec<Project>,
    pub stats: ProjectStats,
    pub error: Option<String>,
    pub action: Option<ActionState>,
}
