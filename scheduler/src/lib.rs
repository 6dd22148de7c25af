pub mod error;
pub mod runner;
pub mod store;

pub use error::SchedulerError;
pub use runner::{ReportSender, TickRunner};
pub use store::ReportStore;
