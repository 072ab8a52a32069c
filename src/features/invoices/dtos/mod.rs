mod invoice_dto;

pub use invoice_dto::{
    InvoiceStats, InvoiceUploadForm, InvoicesPage, ProcessOutcome, ProcessingStatusReport,
    UploadOutcome, UploadedFile,
};
