pub mod api_keys;
pub mod auth;
pub mod clients;
pub mod cost_centers;
pub mod dashboard;
pub mod demo_requests;
pub mod expense_types;
pub mod invoices;
pub mod projects;
