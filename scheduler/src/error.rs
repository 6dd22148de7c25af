use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SchedulerError {
    #[error("tick interval must be greater than zero")]
    ZeroInterval,
}
