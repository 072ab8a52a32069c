use serde::Serialize;
use utoipa::ToSchema;

use crate::features::clients::models::{Client, ClientUser};
use crate::shared::types::PageUser;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl ClientStats {
    pub fn from_clients(clients: &[Client]) -> Self {
        let active = clients.iter().filter(|c| c.is_active).count();
        Self {
            total: clients.len(),
            active,
            inactive: clients.len() - active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientsPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub clients: Vec<Client>,
    pub stats: ClientStats,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientDetailPage {
    pub user: PageUser,
    pub active_nav: &'static str,
    pub client_id: String,
    pub client: Option<Client>,
    pub users: Vec<ClientUser>,
    pub error: Option<String>,
}
