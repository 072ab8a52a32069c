//! Backend clients (tenants) and their users.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/clients` | Client list page with active/inactive counts |
//! | GET | `/clients/{client_id}` | Client detail page with its users |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ClientService;
