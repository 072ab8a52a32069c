pub mod api_key_handler;
pub mod page_handler;

pub use api_key_handler::{__path_api_key_stats, api_key_stats};
pub use page_handler::{api_keys_page, create_api_key, delete_api_key, toggle_api_key};
