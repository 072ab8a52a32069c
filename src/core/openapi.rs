use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::api_keys::{dtos as api_keys_dtos, handlers as api_keys_handlers};
use crate::features::auth;
use crate::features::dashboard::handlers as dashboard_handlers;
use crate::features::expense_types::{
    dtos as expense_types_dtos, handlers as expense_types_handlers,
};
use crate::features::invoices::{
    dtos as invoices_dtos, handlers as invoices_handlers, models as invoices_models,
};
use crate::shared::constants::SESSION_COOKIE;
use crate::shared::types::{ActionState, ApiResponse, ChartDatum, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::get_session,
        auth::handlers::request_otp,
        auth::handlers::validate_otp,
        // Invoices
        invoices_handlers::process_invoice,
        invoices_handlers::check_status,
        invoices_handlers::get_invoice,
        invoices_handlers::invoice_stats,
        // Expense types
        expense_types_handlers::expense_type_stats,
        // API keys
        api_keys_handlers::api_key_stats,
        // Dashboard
        dashboard_handlers::cost_center_chart,
    ),
    components(
        schemas(
            // Shared
            Meta,
            ActionState,
            ChartDatum,
            ApiResponse<Vec<ChartDatum>>,
            // Auth
            auth::dtos::OtpType,
            auth::dtos::RequestOtpDto,
            auth::dtos::ValidateOtpDto,
            auth::dtos::SessionInfoDto,
            ApiResponse<auth::dtos::SessionInfoDto>,
            // Invoices
            invoices_models::Invoice,
            invoices_models::InvoiceItem,
            invoices_models::FileMetadata,
            invoices_dtos::ProcessOutcome,
            invoices_dtos::ProcessingStatusReport,
            invoices_dtos::InvoiceStats,
            ApiResponse<invoices_models::Invoice>,
            ApiResponse<invoices_dtos::ProcessOutcome>,
            ApiResponse<invoices_dtos::ProcessingStatusReport>,
            ApiResponse<invoices_dtos::InvoiceStats>,
            // Expense types
            expense_types_dtos::ExpenseTypeStats,
            ApiResponse<expense_types_dtos::ExpenseTypeStats>,
            // API keys
            api_keys_dtos::ApiKeyStats,
            ApiResponse<api_keys_dtos::ApiKeyStats>,
        )
    ),
    tags(
        (name = "auth", description = "Session details and one-time codes"),
        (name = "invoices", description = "Invoice processing, status polling and statistics"),
        (name = "expense-types", description = "Expense type statistics"),
        (name = "api-keys", description = "API key statistics"),
        (name = "Dashboard", description = "Dashboard chart data"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Invoice Dashboard API",
        version = "0.1.0",
        description = "JSON endpoints behind the invoice dashboard pages",
    )
)]
pub struct ApiDoc;

/// Declares the signed session cookie as the API's security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_json_endpoints() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/session",
            "/api/invoices/files/{file_id}/process",
            "/api/invoices/{invoice_id}",
            "/api/api-keys/stats",
            "/api/dashboard/cost-center-chart",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
