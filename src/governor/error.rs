use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GovernorError {
    #[error("call governor is shut down")]
    Closed,

    #[error("queued call panicked")]
    Panicked,
}
