mod cost_center_service;

pub use cost_center_service::CostCenterService;
