mod demo_request_service;

pub use demo_request_service::DemoRequestService;
