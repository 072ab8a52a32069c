mod client_dto;

pub use client_dto::{ClientDetailPage, ClientStats, ClientsPage};
