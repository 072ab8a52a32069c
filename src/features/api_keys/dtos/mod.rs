mod api_key_dto;

pub use api_key_dto::{ApiKeyForm, ApiKeyStats, ApiKeyView, ApiKeysPage, ToggleKeyForm};
