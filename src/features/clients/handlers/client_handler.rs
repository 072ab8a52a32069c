use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
};

use crate::core::error::Result;
use crate::features::auth::session::SessionPayload;
use crate::features::clients::dtos::{ClientDetailPage, ClientStats, ClientsPage};
use crate::features::clients::services::ClientService;
use crate::shared::templates::render_page;
use crate::shared::types::PageUser;

pub async fn clients_page(
    State(service): State<Arc<ClientService>>,
    session: SessionPayload,
) -> Result<Html<String>> {
    let (clients, error) = match service.list(&session.auth()).await {
        Ok(clients) => (clients, None),
        Err(e) => {
            tracing::error!("Failed to load clients: {}", e);
            (Vec::new(), Some(e.user_message()))
        }
    };

    let page = ClientsPage {
        user: PageUser::from(&session),
        active_nav: "clients",
        stats: ClientStats::from_clients(&clients),
        clients,
        error,
    };
    Ok(render_page("clients.jinja", page)?)
}

pub async fn client_detail_page(
    State(service): State<Arc<ClientService>>,
    session: SessionPayload,
    Path(client_id): Path<String>,
) -> Result<Html<String>> {
    let auth = session.auth();
    let (client, users) = tokio::join!(
        service.get(&auth, &client_id),
        service.users(&auth, &client_id)
    );

    let mut error = None;
    let client = client
        .map_err(|e| {
            tracing::error!("Failed to load client {}: {}", client_id, e);
            error = Some(e.user_message());
        })
        .ok();
    let users = users.unwrap_or_else(|e| {
        tracing::warn!("Failed to load users of client {}: {}", client_id, e);
        Vec::new()
    });

    let page = ClientDetailPage {
        user: PageUser::from(&session),
        active_nav: "clients",
        client_id,
        client,
        users,
        error,
    };
    Ok(render_page("client_detail.jinja", page)?)
}
