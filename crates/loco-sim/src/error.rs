use loco_control::ControlError;
use loco_core::LocoId;
use loco_layout::LayoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("controller error: {0}")]
    Control(#[from] ControlError),

    #[error("could not spawn controller thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("controller thread for {0} panicked")]
    Panicked(LocoId),
}

pub type SimResult<T> = Result<T, SimError>;

/// Errors from writing the event log.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;
