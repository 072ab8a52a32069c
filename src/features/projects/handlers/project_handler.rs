use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::projects::dtos::{ProjectForm, ProjectStats, ProjectsPage};
use crate::features::projects::services::ProjectService;
use crate::shared::templates::render_page;
use crate::shared::types::{ActionState, PageUser};

async fn render(
    service: &ProjectService,
    session: &SessionPayload,
    action: Option<ActionState>,
) -> Result<Html<String>> {
    let (projects, error) = match service.list(session).await {
        Ok(projects) => (projects, None),
        Err(e) => (Vec::new(), Some(e.user_message())),
    };

    let page = ProjectsPage {
        user: PageUser::from(session),
        active_nav: "project-management",
        stats: ProjectStats::from_projects(&projects),
        projects,
        error,
        action,
    };
    Ok(render_page("projects.jinja", page)?)
}

fn action_state(outcome: Result<String>) -> ActionState {
    match outcome {
        Ok(message) => ActionState::ok(message),
        Err(e) => ActionState::failed(e.user_message()),
    }
}

pub async fn projects_page(
    State(service): State<Arc<ProjectService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    render(&service, &session, None).await
}

pub async fn create_project(
    State(service): State<Arc<ProjectService>>,
    session: SessionPayload,
    Form(form): Form<ProjectForm>,
) -> Result<Html<String>> {
    let action = action_state(service.create(&session, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn update_project(
    State(service): State<Arc<ProjectService>>,
    session: SessionPayload,
    Path(project_id): Path<String>,
    Form(form): Form<ProjectForm>,
) -> Result<Html<String>> {
    let action = action_state(service.update(&session, &project_id, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn delete_project(
    State(service): State<Arc<ProjectService>>,
    session: SessionPayload,
    Path(project_id): Path<String>,
) -> Result<Html<String>> {
    let action = action_state(service.delete(&session, &project_id).await);
    render(&service, &session, Some(action)).await
}
