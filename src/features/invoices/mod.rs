//! Invoice uploads, AI processing and invoice reads.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/invoices` | Invoice list with upload form |
//! | POST | `/invoices` | Upload an invoice file (multipart) |
//! | POST | `/api/invoices/files/{file_id}/process` | Trigger AI extraction |
//! | GET | `/api/invoices/files/{file_id}/status` | Poll processing status |
//! | GET | `/api/invoices/stats` | Counts by processing status |
//! | GET | `/api/invoices/{invoice_id}` | Invoice details |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::InvoiceService;
