pub mod display;
pub mod models;

pub use models::*;
