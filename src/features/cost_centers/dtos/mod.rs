mod cost_center_dto;

pub use cost_center_dto::{CostCenterForm, CostCenterStats, CostCentersPage};
