pub mod handle;
pub mod graph;
pub mod description;

pub use handle::{NeuronId, WeightId};
pub use graph::{Graph, Neuron, Weight};
pub use description::{BuiltNetwork, ConnectionSpec, Labels, NetworkDescription, NodeSpec, Role};
