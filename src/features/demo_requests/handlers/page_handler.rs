use axum::{extract::State, response::Html, Form};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::Result;
use crate::features::demo_requests::dtos::{field_messages, DemoRequestForm, LandingPage};
use crate::features::demo_requests::services::DemoRequestService;
use crate::shared::templates::render_page;
use crate::shared::types::ActionState;

pub async fn landing_page() -> Result<Html<String>> {
    Ok(render_page("landing.jinja", LandingPage::default())?)
}

pub async fn submit_demo_request(
    State(service): State<Arc<DemoRequestService>>,
    Form(form): Form<DemoRequestForm>,
) -> Result<Html<String>> {
    let page = match service.submit(&form).await {
        Ok(message) => LandingPage {
            action: Some(ActionState::ok(message)),
            ..Default::default()
        },
        Err(e) => LandingPage {
            action: Some(ActionState::failed(e.user_message())),
            errors: form
                .validate()
                .err()
                .map(|errors| field_messages(&errors))
                .unwrap_or_default(),
            form: Some(form),
        },
    };
    Ok(render_page("landing.jinja", page)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{backend_client, backend_config};
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_invalid_submission_rerenders_with_message() {
        let url = "http://127.0.0.1:9";
        let service = Arc::new(DemoRequestService::new(
            backend_client(url),
            &backend_config(url),
        ));
        let app = Router::new()
            .route("/", get(landing_page).post(submit_demo_request))
            .with_state(service);
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/")
            .form(&[("fullName", "Ana"), ("email", "bad"), ("mobileNumber", "1")])
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Please check all required fields and try again."));
        assert!(html.contains("Invalid email format."));
    }
}
