use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::core::error::AppError;
use crate::features::auth::session::SessionPayload;

/// JSON body that must deserialize and pass its `validator` rules
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(validation_message(&errors)))?;

        Ok(Self(value))
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON.".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with Content-Type: application/json.".to_string()
        }
        _ => "Could not read the request body.".to_string(),
    };
    AppError::BadRequest(message)
}

/// Field messages joined in field order; fields without one fall back to the rule code.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Session decoded by the session middleware
impl<S> FromRequestParts<S> for SessionPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionPayload>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, Validate)]
    struct CodeBody {
        #[validate(length(min = 1, message = "Identifier is required"))]
        identifier: String,
        #[validate(length(min = 4))]
        code: String,
    }

    async fn echo(ValidJson(body): ValidJson<CodeBody>) -> String {
        body.identifier
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/code", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let response = server()
            .post("/code")
            .json(&json!({"identifier": "a@b.c", "code": "1234"}))
            .await;
        response.assert_status_ok();
        response.assert_text("a@b.c");
    }

    #[tokio::test]
    async fn test_rule_failures_become_validation_errors() {
        let response = server()
            .post("/code")
            .json(&json!({"identifier": "", "code": "12"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            json!("code is invalid (length); Identifier is required")
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request() {
        let response = server()
            .post("/code")
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], json!("Request body is not valid JSON."));
    }

    #[tokio::test]
    async fn test_plain_text_body_is_a_bad_request() {
        let response = server().post("/code").text("identifier=a").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            json!("Expected a request with Content-Type: application/json.")
        );
    }
}
