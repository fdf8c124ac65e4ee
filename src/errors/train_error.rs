//! Errors raised by the training session.

use thiserror::Error;

use super::GraphError;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Dataset has no samples")]
    EmptyDataset,

    #[error("Sample index {0} is out of range")]
    SampleOutOfRange(usize),

    #[error("A continuous training run currently owns the model")]
    RunInProgress,

    #[error("Execution model is unavailable after a failed run")]
    ModelUnavailable,

    #[error("Training worker panicked")]
    WorkerPanicked,
}
