pub mod limit;
pub mod tasks;
