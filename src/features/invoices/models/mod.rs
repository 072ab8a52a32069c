mod file_metadata;
mod invoice;

pub use file_metadata::{FileMetadata, ProcessingStatus};
pub use invoice::{Invoice, InvoiceItem};
