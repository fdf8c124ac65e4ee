use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::ActivationKind;
use crate::compile::ExecutionModel;
use crate::errors::GraphError;
use crate::graph::handle::{Arena, NeuronId, WeightId};

/// A computation node. Its adjacency lists hold edge handles only; the graph
/// owns the edges themselves.
#[derive(Debug, Clone)]
pub struct Neuron {
    pub activation: ActivationKind,
    pub value: f64,
    pub gradient: f64,
    incoming: Vec<WeightId>,
    outgoing: Vec<WeightId>,
}

impl Neuron {
    fn new(activation: ActivationKind) -> Neuron {
        Neuron { activation, value: 0.0, gradient: 0.0, incoming: Vec::new(), outgoing: Vec::new() }
    }

    pub fn incoming(&self) -> &[WeightId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[WeightId] {
        &self.outgoing
    }
}

/// A directed weighted connection. `source` and `target` are non-owning handles.
#[derive(Debug, Clone)]
pub struct Weight {
    pub value: f64,
    pub gradient: f64,
    source: NeuronId,
    target: NeuronId,
}

impl Weight {
    pub fn source(&self) -> NeuronId {
        self.source
    }

    pub fn target(&self) -> NeuronId {
        self.target
    }
}

/// Edit-time neuron/weight graph.
///
/// Input, output and bias sets are role bookkeeping; they have no effect on
/// the structure itself. Mutations never touch an already compiled
/// [`ExecutionModel`]: recompile after changing topology.
#[derive(Debug, Clone)]
pub struct Graph {
    neurons: Arena<NeuronId, Neuron>,
    weights: Arena<WeightId, Weight>,
    inputs: Vec<NeuronId>,
    outputs: Vec<NeuronId>,
    biases: Vec<NeuronId>,
    rng: StdRng,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::with_rng(StdRng::from_entropy())
    }

    /// Graph whose default weights are drawn from a seeded generator.
    pub fn with_seed(seed: u64) -> Graph {
        Graph::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Graph {
        Graph {
            neurons: Arena::new(),
            weights: Arena::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            biases: Vec::new(),
            rng,
        }
    }

    pub fn add_neuron(&mut self, activation: ActivationKind) -> NeuronId {
        self.neurons.insert(Neuron::new(activation))
    }

    /// Removes a neuron together with every edge touching it and its role
    /// memberships.
    pub fn remove_neuron(&mut self, id: NeuronId) -> Result<(), GraphError> {
        let neuron = self.neurons.get(id).ok_or(GraphError::UnknownNeuron(id))?;
        let edges: Vec<WeightId> = neuron.incoming.iter().chain(neuron.outgoing.iter()).copied().collect();
        for edge in edges {
            // A self-loop shows up in both lists; the second removal is a no-op.
            let _ = self.disconnect(edge);
        }
        self.neurons.remove(id);
        self.inputs.retain(|n| *n != id);
        self.outputs.retain(|n| *n != id);
        self.biases.retain(|n| *n != id);
        Ok(())
    }

    /// Adds an edge `from -> to`. Without an explicit weight the value is drawn
    /// uniformly from [-1, 1].
    pub fn connect(&mut self, from: NeuronId, to: NeuronId, weight: Option<f64>) -> Result<WeightId, GraphError> {
        for id in [from, to] {
            if !self.neurons.contains(id) {
                return Err(GraphError::UnknownNeuron(id));
            }
        }
        let value = match weight {
            Some(w) => w,
            None => self.rng.gen_range(-1.0..=1.0),
        };
        let edge = self.weights.insert(Weight { value, gradient: 0.0, source: from, target: to });
        if let Some(source) = self.neurons.get_mut(from) {
            source.outgoing.push(edge);
        }
        if let Some(target) = self.neurons.get_mut(to) {
            target.incoming.push(edge);
        }
        Ok(edge)
    }

    pub fn disconnect(&mut self, id: WeightId) -> Result<(), GraphError> {
        let edge = self.weights.remove(id).ok_or(GraphError::UnknownWeight(id))?;
        if let Some(source) = self.neurons.get_mut(edge.source) {
            source.outgoing.retain(|w| *w != id);
        }
        if let Some(target) = self.neurons.get_mut(edge.target) {
            target.incoming.retain(|w| *w != id);
        }
        Ok(())
    }

    pub fn set_inputs(&mut self, ids: Vec<NeuronId>) -> Result<(), GraphError> {
        self.check_known(&ids)?;
        self.inputs = ids;
        Ok(())
    }

    pub fn set_outputs(&mut self, ids: Vec<NeuronId>) -> Result<(), GraphError> {
        self.check_known(&ids)?;
        self.outputs = ids;
        Ok(())
    }

    /// Marks bias neurons; their value is pinned to 1.0.
    pub fn set_biases(&mut self, ids: Vec<NeuronId>) -> Result<(), GraphError> {
        self.check_known(&ids)?;
        for id in &ids {
            if let Some(neuron) = self.neurons.get_mut(*id) {
                neuron.value = 1.0;
            }
        }
        self.biases = ids;
        Ok(())
    }

    fn check_known(&self, ids: &[NeuronId]) -> Result<(), GraphError> {
        match ids.iter().find(|id| !self.neurons.contains(**id)) {
            Some(id) => Err(GraphError::UnknownNeuron(*id)),
            None => Ok(()),
        }
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id)
    }

    pub fn weight(&self, id: WeightId) -> Option<&Weight> {
        self.weights.get(id)
    }

    pub fn set_weight(&mut self, id: WeightId, value: f64) -> Result<(), GraphError> {
        let edge = self.weights.get_mut(id).ok_or(GraphError::UnknownWeight(id))?;
        edge.value = value;
        Ok(())
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.handles()
    }

    pub fn weight_ids(&self) -> Vec<WeightId> {
        self.weights.handles()
    }

    pub fn neurons(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> {
        self.neurons.iter()
    }

    pub fn weights(&self) -> impl Iterator<Item = (WeightId, &Weight)> {
        self.weights.iter()
    }

    pub fn inputs(&self) -> &[NeuronId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NeuronId] {
        &self.outputs
    }

    pub fn biases(&self) -> &[NeuronId] {
        &self.biases
    }

    /// Checks, in order: input/output sets are non-empty, the graph is
    /// acyclic, and every non-input neuron is reachable from inputs ∪ biases.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.inputs.is_empty() || self.outputs.is_empty() {
            return Err(GraphError::InputOutputNotSet);
        }
        self.topological_order()?;
        self.check_connectivity()
    }

    /// Kahn's algorithm over incoming-edge counts. Any order satisfying the
    /// dependency constraint is acceptable; ties resolve in arena order.
    pub fn topological_order(&self) -> Result<Vec<NeuronId>, GraphError> {
        let ids = self.neurons.handles();
        let position: HashMap<NeuronId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut in_degree: Vec<usize> = self.neurons.iter().map(|(_, n)| n.incoming.len()).collect();
        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(ids.len());
        while let Some(i) = queue.pop_front() {
            order.push(ids[i]);
            let Some(neuron) = self.neurons.get(ids[i]) else { continue };
            for edge in &neuron.outgoing {
                let Some(target) = self.weights.get(*edge).and_then(|w| position.get(&w.target)) else {
                    continue;
                };
                in_degree[*target] = in_degree[*target].saturating_sub(1);
                if in_degree[*target] == 0 {
                    queue.push_back(*target);
                }
            }
        }

        if order.len() < ids.len() {
            return Err(GraphError::CycleDetected);
        }
        Ok(order)
    }

    fn check_connectivity(&self) -> Result<(), GraphError> {
        let mut visited: HashSet<NeuronId> = HashSet::new();
        let mut queue: VecDeque<NeuronId> = VecDeque::new();
        for id in self.inputs.iter().chain(self.biases.iter()) {
            if visited.insert(*id) {
                queue.push_back(*id);
            }
        }

        while let Some(id) = queue.pop_front() {
            let Some(neuron) = self.neurons.get(id) else { continue };
            for edge in &neuron.outgoing {
                if let Some(w) = self.weights.get(*edge) {
                    if visited.insert(w.target) {
                        queue.push_back(w.target);
                    }
                }
            }
        }

        match self.neurons.iter().find(|(id, _)| !visited.contains(id) && !self.inputs.contains(id)) {
            Some((neuron, _)) => Err(GraphError::DisconnectedGraph { neuron }),
            None => Ok(()),
        }
    }

    /// Copies trained values and gradients from a compiled model back onto the
    /// graph. Handles that no longer resolve are skipped.
    pub fn absorb(&mut self, model: &ExecutionModel) {
        for (i, id) in model.neuron_ids.iter().enumerate() {
            if let Some(neuron) = self.neurons.get_mut(*id) {
                neuron.value = model.values[i];
                neuron.gradient = model.gradients[i];
            }
        }
        for (i, id) in model.weight_ids.iter().enumerate() {
            if let Some(edge) = self.weights.get_mut(*id) {
                edge.value = model.weights[i];
                edge.gradient = model.weight_gradients[i];
            }
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Graph, NeuronId, NeuronId, WeightId) {
        let mut graph = Graph::with_seed(7);
        let a = graph.add_neuron(ActivationKind::Linear);
        let b = graph.add_neuron(ActivationKind::Linear);
        let w = graph.connect(a, b, Some(2.0)).unwrap();
        graph.set_inputs(vec![a]).unwrap();
        graph.set_outputs(vec![b]).unwrap();
        (graph, a, b, w)
    }

    #[test]
    fn connect_updates_both_adjacency_lists() {
        let (graph, a, b, w) = chain();
        assert_eq!(graph.neuron(a).unwrap().outgoing(), &[w]);
        assert_eq!(graph.neuron(b).unwrap().incoming(), &[w]);
        assert_eq!(graph.weight(w).unwrap().source(), a);
        assert_eq!(graph.weight(w).unwrap().target(), b);
    }

    #[test]
    fn default_weight_lies_in_unit_interval() {
        let mut graph = Graph::with_seed(42);
        let a = graph.add_neuron(ActivationKind::Linear);
        let b = graph.add_neuron(ActivationKind::Linear);
        for _ in 0..50 {
            let w = graph.connect(a, b, None).unwrap();
            let v = graph.weight(w).unwrap().value;
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn connect_rejects_removed_neuron() {
        let (mut graph, a, b, w) = chain();
        graph.remove_neuron(b).unwrap();
        assert!(graph.weight(w).is_none());
        assert!(graph.neuron(a).unwrap().outgoing().is_empty());
        assert!(graph.outputs().is_empty());
        assert_eq!(graph.connect(a, b, None), Err(GraphError::UnknownNeuron(b)));
    }

    #[test]
    fn disconnect_removes_edge_from_endpoints() {
        let (mut graph, a, b, w) = chain();
        graph.disconnect(w).unwrap();
        assert!(graph.neuron(a).unwrap().outgoing().is_empty());
        assert!(graph.neuron(b).unwrap().incoming().is_empty());
        assert_eq!(graph.disconnect(w), Err(GraphError::UnknownWeight(w)));
    }

    #[test]
    fn validate_checks_io_before_cycles() {
        let mut graph = Graph::with_seed(1);
        let a = graph.add_neuron(ActivationKind::Linear);
        graph.connect(a, a, Some(1.0)).unwrap();
        assert_eq!(graph.validate(), Err(GraphError::InputOutputNotSet));
        graph.set_inputs(vec![a]).unwrap();
        graph.set_outputs(vec![a]).unwrap();
        assert_eq!(graph.validate(), Err(GraphError::CycleDetected));
    }

    #[test]
    fn bias_only_output_is_connected() {
        let mut graph = Graph::with_seed(3);
        let input = graph.add_neuron(ActivationKind::Linear);
        let bias = graph.add_neuron(ActivationKind::Linear);
        let out = graph.add_neuron(ActivationKind::Sigmoid);
        graph.connect(bias, out, Some(0.5)).unwrap();
        graph.set_inputs(vec![input]).unwrap();
        graph.set_outputs(vec![out]).unwrap();
        graph.set_biases(vec![bias]).unwrap();
        assert_eq!(graph.neuron(bias).unwrap().value, 1.0);
        assert_eq!(graph.validate(), Ok(()));
    }
}
