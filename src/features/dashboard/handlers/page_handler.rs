use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::dashboard::dtos::DashboardPage;
use crate::features::dashboard::services::DashboardService;
use crate::shared::templates::render_page;
use crate::shared::types::PageUser;

pub async fn dashboard_page(
    State(service): State<Arc<DashboardService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    let (stats, cost_center_chart) = service.overview(&session).await;

    let page = DashboardPage {
        user: PageUser::from(&session),
        active_nav: "dashboard",
        stats,
        cost_center_chart,
    };
    Ok(render_page("dashboard.jinja", page)?)
}
