mod api_key;

pub use api_key::{mask_key, ApiKey};
