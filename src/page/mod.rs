pub mod context;
pub mod page;
