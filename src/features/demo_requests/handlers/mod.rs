mod page_handler;

pub use page_handler::{landing_page, submit_demo_request};
