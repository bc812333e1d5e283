use super::process::ProcessId;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid input: the process list is empty")]
    EmptyProcessList,

    #[error("invalid input: process id {0} appears more than once")]
    DuplicateId(ProcessId),

    #[error("invalid input: process id {0} is not positive")]
    InvalidId(ProcessId),

    #[error("invalid input: process {id} has burst time {value}")]
    InvalidBurst { id: ProcessId, value: f64 },

    #[error("invalid input: process {id} has arrival time {value}")]
    InvalidArrival { id: ProcessId, value: f64 },

    #[error("invalid input: time quantum must be positive, got {0}")]
    InvalidQuantum(f64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid input: no process ids left to assign")]
    IdsExhausted,

    #[error("no process with id {0}")]
    UnknownProcess(ProcessId),

    /// Broken engine invariant. Never caused by user input.
    #[error("engine invariant violated: {0}")]
    PreconditionViolation(&'static str),

    #[error("no process completed, nothing to average")]
    NoCompletedProcesses,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed process list: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    /// True for the errors reported before a run is attempted.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyProcessList
                | Self::DuplicateId(_)
                | Self::InvalidId(_)
                | Self::InvalidBurst { .. }
                | Self::InvalidArrival { .. }
                | Self::InvalidQuantum(_)
                | Self::InvalidInput(_)
                | Self::IdsExhausted
        )
    }
}
