mod client_handler;

pub use client_handler::{client_detail_page, clients_page};
