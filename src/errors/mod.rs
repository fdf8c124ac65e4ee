//! Error types surfaced by graph construction, compilation and training.

pub mod graph_error;
pub mod train_error;

pub use graph_error::GraphError;
pub use train_error::TrainError;
