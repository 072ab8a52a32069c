mod cost_center_handler;

pub use cost_center_handler::{
    cost_centers_page, create_cost_center, delete_cost_center, update_cost_center,
};
