use axum::{
    extract::{Path, State},
    response::Html,
    Form,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::expense_types::dtos::{
    DeleteExpenseTypeForm, ExpenseTypeForm, ExpenseTypeStats, ExpenseTypesPage,
};
use crate::features::expense_types::services::ExpenseTypeService;
use crate::shared::templates::render_page;
use crate::shared::types::{ActionState, PageUser};

async fn render(
    service: &ExpenseTypeService,
    session: &SessionPayload,
    action: Option<ActionState>,
) -> Result<Html<String>> {
    let (expense_types, cost_centers, error) = match service.cost_centers().list(session).await {
        Ok(centers) => (service.list_for(session, &centers).await, centers, None),
        Err(e) => {
            tracing::error!("Failed to load expense types: {}", e);
            (
                Vec::new(),
                Vec::new(),
                Some("Failed to retrieve expense types".to_string()),
            )
        }
    };

    let page = ExpenseTypesPage {
        user: PageUser::from(session),
        active_nav: "expense-type",
        stats: ExpenseTypeStats::from_types(&expense_types),
        expense_types,
        cost_centers,
        error,
        action,
    };
    Ok(render_page("expense_types.jinja", page)?)
}

fn action_state(outcome: Result<String>) -> ActionState {
    match outcome {
        Ok(message) => ActionState::ok(message),
        Err(e) => ActionState::failed(e.user_message()),
    }
}

pub async fn expense_types_page(
    State(service): State<Arc<ExpenseTypeService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    render(&service, &session, None).await
}

pub async fn create_expense_type(
    State(service): State<Arc<ExpenseTypeService>>,
    session: SessionPayload,
    Form(form): Form<ExpenseTypeForm>,
) -> Result<Html<String>> {
    let action = action_state(service.create(&session, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn update_expense_type(
    State(service): State<Arc<ExpenseTypeService>>,
    session: SessionPayload,
    Path(expense_type_id): Path<String>,
    Form(form): Form<ExpenseTypeForm>,
) -> Result<Html<String>> {
    let action = action_state(service.update(&session, &expense_type_id, &form).await);
    render(&service, &session, Some(action)).await
}

pub async fn delete_expense_type(
    State(service): State<Arc<ExpenseTypeService>>,
    session: SessionPayload,
    Path(expense_type_id): Path<String>,
    Form(form): Form<DeleteExpenseTypeForm>,
) -> Result<Html<String>> {
    let action = action_state(
        service
            .delete(&session, &form.cost_center_id, &expense_type_id)
            .await,
    );
    render(&service, &session, Some(action)).await
}
