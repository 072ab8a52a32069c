use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use chrono::Local;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::api_keys::dtos::{
    ApiKeyForm, ApiKeyStats, ApiKeyView, ApiKeysPage, ToggleKeyForm,
};
use crate::features::api_keys::services::ApiKeyService;
use crate::features::auth::session::SessionPayload;
use crate::shared::templates::render_page;
use crate::shared::types::{ActionState, PageUser};

async fn render(
    service: &ApiKeyService,
    session: &SessionPayload,
    action: Option<ActionState>,
) -> Result<Html<String>> {
    let (keys, error) = match service.list(session).await {
        Ok(keys) => (keys, None),
        Err(e) => (Vec::new(), Some(e.user_message())),
    };

    let page = ApiKeysPage {
        user: PageUser::from(session),
        active_nav: "api-keys",
        stats: ApiKeyStats::from_keys(&keys, Local::now().date_naive()),
        api_keys: keys.into_iter().map(ApiKeyView::from).collect(),
        error,
        action,
    };
    Ok(render_page("api_keys.jinja", page)?)
}

fn action_state(outcome: Result<String>) -> ActionState {
    match outcome {
        Ok(message) => ActionState::ok(message),
        Err(e) => ActionState::failed(e.user_message()),
    }
}

pub async fn api_keys_page(
    State(service): State<Arc<ApiKeyService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    render(&service, &session, None).await
}

pub async fn create_api_key(
    State(service): State<Arc<ApiKeyService>>,
    session: SessionPayload,
    Form(form): Form<ApiKeyForm>,
) -> Result<Html<String>> {
    let action = action_state(service.create(&session, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn toggle_api_key(
    State(service): State<Arc<ApiKeyService>>,
    session: SessionPayload,
    Path(key_id): Path<String>,
    Form(form): Form<ToggleKeyForm>,
) -> Result<Html<String>> {
    let action = action_state(service.toggle(&session, &key_id, form.is_revoked).await);
    render(&service, &session, Some(action)).await
}

pub async fn delete_api_key(
    State(service): State<Arc<ApiKeyService>>,
    session: SessionPayload,
    Path(key_id): Path<String>,
) -> Result<Html<String>> {
    let action = action_state(service.delete(&session, &key_id).await);
    render(&service, &session, Some(action)).await
}
