use loco_core::{BlockId, CoreError, LocoId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("route for {0} has no blocks")]
    EmptyRoute(LocoId),

    #[error("route for {loco} traverses {block} more than once per lap")]
    RepeatedBlock { loco: LocoId, block: BlockId },

    #[error("a layout needs exactly two trains, got {0}")]
    TrainCount(usize),

    #[error("{0} is assigned to more than one route")]
    DuplicateLoco(LocoId),

    #[error("routes must start with the same block to share a station: {first} vs {second}")]
    StationMismatch { first: BlockId, second: BlockId },

    #[error("route parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Value(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
