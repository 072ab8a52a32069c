mod expense_type_dto;

pub use expense_type_dto::{
    DeleteExpenseTypeForm, ExpenseTypeForm, ExpenseTypeStats, ExpenseTypesPage,
};
