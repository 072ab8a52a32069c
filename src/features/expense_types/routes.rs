use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::expense_types::handlers;
use crate::features::expense_types::services::ExpenseTypeService;

pub fn routes(service: Arc<ExpenseTypeService>) -> Router {
    Router::new()
        .route(
            "/expense-type",
            get(handlers::expense_types_page).post(handlers::create_expense_type),
        )
        .route("/expense-type/{id}", post(handlers::update_expense_type))
        .route(
            "/expense-type/{id}/delete",
            post(handlers::delete_expense_type),
        )
        .route("/api/expense-types/stats", get(handlers::expense_type_stats))
        .with_state(service)
}
