use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::cost_centers::dtos::{CostCenterForm, CostCenterStats, CostCentersPage};
use crate::features::cost_centers::services::CostCenterService;
use crate::shared::templates::render_page;
use crate::shared::types::{ActionState, PageUser};

async fn render(
    service: &CostCenterService,
    session: &SessionPayload,
    action: Option<ActionState>,
) -> Result<Html<String>> {
    let (cost_centers, error) = match service.list(session).await {
        Ok(centers) => (centers, None),
        Err(e) => (Vec::new(), Some(e.user_message())),
    };

    let page = CostCentersPage {
        user: PageUser::from(session),
        active_nav: "cost-center",
        stats: CostCenterStats::from_centers(&cost_centers),
        cost_centers,
        error,
        action,
    };
    Ok(render_page("cost_centers.jinja", page)?)
}

fn action_state(outcome: Result<String>) -> ActionState {
    match outcome {
        Ok(message) => ActionState::ok(message),
        Err(e) => ActionState::failed(e.user_message()),
    }
}

pub async fn cost_centers_page(
    State(service): State<Arc<CostCenterService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    render(&service, &session, None).await
}

pub async fn create_cost_center(
    State(service): State<Arc<CostCenterService>>,
    session: SessionPayload,
    Form(form): Form<CostCenterForm>,
) -> Result<Html<String>> {
    let action = action_state(service.create(&session, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn update_cost_center(
    State(service): State<Arc<CostCenterService>>,
    session: SessionPayload,
    Path(cost_center_id): Path<String>,
    Form(form): Form<CostCenterForm>,
) -> Result<Html<String>> {
    let action = action_state(service.update(&session, &cost_center_id, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn delete_cost_center(
    State(service): State<Arc<CostCenterService>>,
    session: SessionPayload,
    Path(cost_center_id): Path<String>,
) -> Result<Html<String>> {
    let action = action_state(service.delete(&session, &cost_center_id).await);
    render(&service, &session, Some(action)).await
}
