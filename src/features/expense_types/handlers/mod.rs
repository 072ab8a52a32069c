pub mod expense_type_handler;
pub mod page_handler;

pub use expense_type_handler::{__path_expense_type_stats, expense_type_stats};
pub use page_handler::{
    create_expense_type, delete_expense_type, expense_types_page, update_expense_type,
};
