pub mod auth_handler;
pub mod page_handler;

pub use auth_handler::{
    __path_get_session, __path_request_otp, __path_validate_otp, get_session, request_otp,
    validate_otp,
};
pub use page_handler::{
    confirm_account_page, login_page, login_submit, logout, reset_password_page, signup_page,
    signup_submit,
};
