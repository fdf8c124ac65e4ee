use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::activation::ActivationKind;
use crate::errors::GraphError;
use crate::graph::graph::Graph;
use crate::graph::handle::{NeuronId, WeightId};

/// Role a node plays in the network as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Input,
    Output,
    Hidden,
    Bias,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub activation: ActivationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Initial weight; drawn uniformly from [-1, 1] when absent.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Node and connection lists supplied by whatever edits the network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub nodes: Vec<NodeSpec>,
    pub connections: Vec<ConnectionSpec>,
}

/// Maps graph handles back to the caller's node and connection ids.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    neurons: HashMap<NeuronId, String>,
    weights: HashMap<WeightId, String>,
}

impl Labels {
    /// Labels every neuron and weight of `graph` by its handle's display name.
    pub fn from_graph(graph: &Graph) -> Labels {
        Labels {
            neurons: graph.neuron_ids().into_iter().map(|id| (id, id.to_string())).collect(),
            weights: graph.weight_ids().into_iter().map(|id| (id, id.to_string())).collect(),
        }
    }

    pub fn neuron(&self, id: NeuronId) -> String {
        self.neurons.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }

    pub fn weight(&self, id: WeightId) -> String {
        self.weights.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// A graph built from a [`NetworkDescription`] plus the labels that map its
/// handles back to the description's ids.
#[derive(Debug, Clone)]
pub struct BuiltNetwork {
    pub graph: Graph,
    pub labels: Labels,
    node_ids: HashMap<String, NeuronId>,
}

impl BuiltNetwork {
    pub fn neuron_id(&self, node: &str) -> Option<NeuronId> {
        self.node_ids.get(node).copied()
    }
}

impl NetworkDescription {
    /// Builds and validates a graph. Inputs, outputs and biases keep the
    /// order in which they appear in `nodes`.
    pub fn build(&self) -> Result<BuiltNetwork, GraphError> {
        self.build_with(Graph::new())
    }

    /// Same as [`build`](Self::build) with a seeded generator for default weights.
    pub fn build_seeded(&self, seed: u64) -> Result<BuiltNetwork, GraphError> {
        self.build_with(Graph::with_seed(seed))
    }

    fn build_with(&self, mut graph: Graph) -> Result<BuiltNetwork, GraphError> {
        let mut labels = Labels::default();
        let mut node_ids: HashMap<String, NeuronId> = HashMap::new();
        let (mut inputs, mut outputs, mut biases) = (Vec::new(), Vec::new(), Vec::new());

        for node in &self.nodes {
            if node_ids.contains_key(&node.id) {
                return Err(GraphError::DuplicateId(node.id.clone()));
            }
            let id = graph.add_neuron(node.activation);
            node_ids.insert(node.id.clone(), id);
            labels.neurons.insert(id, node.id.clone());
            match node.role {
                Role::Input => inputs.push(id),
                Role::Output => outputs.push(id),
                Role::Bias => biases.push(id),
                Role::Hidden => {}
            }
        }

        let mut seen_connections: HashSet<&str> = HashSet::new();
        for conn in &self.connections {
            if !seen_connections.insert(conn.id.as_str()) {
                return Err(GraphError::DuplicateId(conn.id.clone()));
            }
            let source = *node_ids.get(&conn.source).ok_or_else(|| GraphError::UnknownNode(conn.source.clone()))?;
            let target = *node_ids.get(&conn.target).ok_or_else(|| GraphError::UnknownNode(conn.target.clone()))?;
            let id = graph.connect(source, target, conn.weight)?;
            labels.weights.insert(id, conn.id.clone());
        }

        graph.set_inputs(inputs)?;
        graph.set_outputs(outputs)?;
        graph.set_biases(biases)?;
        graph.validate()?;

        Ok(BuiltNetwork { graph, labels, node_ids })
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<NetworkDescription> {
        serde_json::from_str(json)
    }

    /// Deserializes a description from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkDescription> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
