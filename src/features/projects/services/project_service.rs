use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::session::SessionPayload;
use crate::features::projects::dtos::ProjectForm;
use crate::features::projects::models::Project;
use crate::modules::backend::{decode_list, BackendClient};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    project_name: &'a str,
    application_url: &'a str,
    is_active: bool,
}

impl<'a> ProjectBody<'a> {
    fn from_form(id: Option<&'a str>, form: &'a ProjectForm) -> Self {
        Self {
            id,
            project_name: form.name.trim(),
            application_url: form.url.trim(),
            is_active: form.is_active(),
        }
    }
}

fn collection_path(client_id: &str) -> String {
    format!("/api/v1/clients/{}/projects", urlencoding::encode(client_id))
}

fn item_path(client_id: &str, id: &str) -> String {
    format!("{}/{}", collection_path(client_id), urlencoding::encode(id))
}

pub struct ProjectService {
    backend: Arc<BackendClient>,
}

impl ProjectService {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, session: &SessionPayload) -> Result<Vec<Project>> {
        let path = format!("{}?query.ShowAll=true", collection_path(&session.client_id));
        let body = self
            .backend
            .get(&path, &session.auth(), None, "fetch projects")
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to retrieve projects.".to_string())
            })?;
        Ok(decode_list(body))
    }

    pub async fn create(&self, session: &SessionPayload, form: &ProjectForm) -> Result<String> {
        self.backend
            .send_json(
                Method::POST,
                &collection_path(&session.client_id),
                &session.auth(),
                &ProjectBody::from_form(None, form),
                None,
                "create project",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to create project.".to_string())
            })?;
        Ok("Project created successfully.".to_string())
    }

    pub async fn update(
        &self,
        session: &SessionPayload,
        project_id: &str,
        form: &ProjectForm,
    ) -> Result<String> {
        self.backend
            .send_json(
                Method::PUT,
                &item_path(&session.client_id, project_id),
                &session.auth(),
                &ProjectBody::from_form(Some(project_id), form),
                None,
                "update project",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to update project.".to_string())
            })?;
        Ok("Project updated successfully.".to_string())
    }

    pub async fn delete(&self, session: &SessionPayload, project_id: &str) -> Result<String> {
        self.backend
            .delete(
                &item_path(&session.client_id, project_id),
                &session.auth(),
                None,
                "delete project",
            )
            .await
            .map_err(|e| {
                tracing::error!("{}", e);
                AppError::ExternalServiceError("Failed to delete project.".to_string())
            })?;
        Ok("Project deleted successfully.".to_string())
    }
}
