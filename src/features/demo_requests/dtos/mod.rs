mod demo_request_dto;

pub use demo_request_dto::{field_messages, DemoRequestForm, DemoSubmission, LandingPage};
