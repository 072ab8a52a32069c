pub mod dashboard_handler;
pub mod page_handler;

pub use dashboard_handler::{__path_cost_center_chart, cost_center_chart};
pub use page_handler::dashboard_page;
