mod expense_type_service;

pub use expense_type_service::ExpenseTypeService;
