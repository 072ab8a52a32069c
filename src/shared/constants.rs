/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "session_data";

/// Name of the short-lived cookie carrying sign-up details until first login
pub const SIGNUP_COOKIE: &str = "temp_user_signup";

/// How long sign-up details stay usable for display-name resolution
pub const SIGNUP_COOKIE_MAX_AGE_SECS: i64 = 10 * 60;

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum invoice file size (10MB)
pub const MAX_INVOICE_FILE_SIZE: usize = 10 * 1024 * 1024;

/// MIME types accepted for invoice uploads
pub const ALLOWED_INVOICE_MIME_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/png", "image/jpg"];

/// Instruction sent with a manual "Process now" request
pub const EXTRACTION_INSTRUCTION: &str = "Extract all invoice data including company name, invoice number, date, items, totals, tax information, and payment details";

// =============================================================================
// ROUTES
// =============================================================================

/// Pages reachable without a session
pub const PUBLIC_PAGES: &[&str] = &[
    "/",
    "/login",
    "/create-account",
    "/reset-password",
    "/confirm-account",
];

/// Landing page for authenticated users
pub const HOME_PAGE: &str = "/dashboard";

/// Login page
pub const LOGIN_PAGE: &str = "/login";
