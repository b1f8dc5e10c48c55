pub mod analytics;
pub mod analyze;
pub mod config;
pub mod dispatch;
pub mod forensic;
pub mod import;
pub mod rank;
pub mod score;
pub mod shared;
