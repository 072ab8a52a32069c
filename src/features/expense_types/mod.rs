//! Expense types, listed across all cost centers of the client.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/expense-type` | List page |
//! | POST | `/expense-type` | Create under a cost center |
//! | POST | `/expense-type/{id}` | Update |
//! | POST | `/expense-type/{id}/delete` | Delete (form carries `costCenterId`) |
//! | GET | `/api/expense-types/stats` | Total, active and cost centers in use |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ExpenseTypeService;
