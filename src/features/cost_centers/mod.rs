//! Cost centers of the signed-in client.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/cost-center` | List page |
//! | POST | `/cost-center` | Create |
//! | POST | `/cost-center/{id}` | Update name and status |
//! | POST | `/cost-center/{id}/delete` | Delete |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::CostCenterService;
