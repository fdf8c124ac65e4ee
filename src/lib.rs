pub mod errors;
pub mod activation;
pub mod graph;
pub mod compile;
pub mod engine;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use errors::{GraphError, TrainError};
pub use activation::ActivationKind;
pub use graph::{Graph, Labels, NetworkDescription, NeuronId, WeightId};
pub use compile::{compile, ExecutionModel};
pub use loss::LossType;
pub use optim::Sgd;
pub use train::{Dataset, Hyperparams, Phase, ProgressRecord, Sample, SessionState, TrainingSession};
