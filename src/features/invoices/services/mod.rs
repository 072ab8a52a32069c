mod invoice_service;

pub use invoice_service::{process_failure_message, InvoiceService};
