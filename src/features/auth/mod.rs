//! Login, sign-up, OTP confirmation and the signed session cookie.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET/POST | `/login` | Login page and form |
//! | GET/POST | `/create-account` | Sign-up page and form |
//! | GET | `/reset-password` | Reset password page |
//! | GET | `/confirm-account` | OTP confirmation page |
//! | POST | `/logout` | Clear session cookies |
//! | GET | `/api/auth/session` | Current session details |
//! | POST | `/api/auth/otp/request` | Send a verification code |
//! | POST | `/api/auth/otp/validate` | Check a verification code |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod session;

pub use clients::AccountClient;
pub use services::AuthService;
pub use session::SessionCodec;
