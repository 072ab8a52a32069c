pub mod invoice_handler;
pub mod page_handler;

pub use invoice_handler::{
    __path_check_status, __path_get_invoice, __path_invoice_stats, __path_process_invoice,
    check_status, get_invoice, invoice_stats, process_invoice,
};
pub use page_handler::{invoices_page, upload_invoice};
