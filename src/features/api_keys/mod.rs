//! API keys of the signed-in client.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api-keys` | List page with masked keys |
//! | POST | `/api-keys` | Create (form field `name` becomes the key) |
//! | POST | `/api-keys/{id}/toggle` | Revoke or re-activate |
//! | POST | `/api-keys/{id}/delete` | Delete |
//! | GET | `/api/api-keys/stats` | Total, active, revoked, created today |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ApiKeyService;
