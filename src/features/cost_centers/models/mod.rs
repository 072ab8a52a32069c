mod cost_center;

pub use cost_center::CostCenter;
