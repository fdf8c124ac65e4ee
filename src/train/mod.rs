pub mod dataset;
pub mod train_config;
pub mod progress;
pub mod sampler;
pub mod loop_fn;
pub mod session;

pub use dataset::{Dataset, Sample};
pub use train_config::{Hyperparams, TrainConfig};
pub use progress::{IndexLabels, ParamState, Phase, ProgressRecord};
pub use sampler::SampleQueue;
pub use loop_fn::{train_loop, train_sample, TrainOutcome};
pub use session::{SessionState, TrainingSession};
