mod auth_dto;

pub use auth_dto::{
    AuthPage, LoginForm, LoginQuery, OtpType, RequestOtpDto, SessionInfoDto, SignupForm,
    ValidateOtpDto,
};
