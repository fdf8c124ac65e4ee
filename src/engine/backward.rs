use crate::compile::ExecutionModel;

impl ExecutionModel {
    /// Backward pass from the loss gradient at each output (positional).
    ///
    /// Must follow a `predict` call: activation derivatives are taken from the
    /// stored forward outputs. Neuron gradients are per pass; weight gradients
    /// accumulate across calls until [`zero_gradients`](Self::zero_gradients).
    pub fn backward(&mut self, target_gradients: &[f64]) {
        self.gradients.iter_mut().for_each(|g| *g = 0.0);
        for (&slot, &g) in self.outputs.iter().zip(target_gradients.iter()) {
            self.gradients[slot] += g;
        }

        for &n in self.order.iter().rev() {
            if self.incoming[n].is_empty() {
                continue;
            }
            let local = self.activations[n].derivative_from_output(self.values[n]) * self.gradients[n];
            for &e in &self.incoming[n] {
                let source = self.edge_sources[e];
                self.weight_gradients[e] += local * self.values[source];
                self.gradients[source] += local * self.weights[e];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::activation::ActivationKind;
    use crate::compile::compile;
    use crate::graph::Graph;

    #[test]
    fn chain_rule_through_linear_chain() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let h = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        let w1 = graph.connect(x, h, Some(2.0)).unwrap();
        let w2 = graph.connect(h, y, Some(3.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        model.predict(&[1.5]);
        model.backward(&[1.0]);

        // y = 3 * (2 * x): dy/dw2 = h = 3.0, dy/dw1 = 3 * x = 4.5
        assert_eq!(model.weight_gradients[model.weight_index(w2).unwrap()], 3.0);
        assert_eq!(model.weight_gradients[model.weight_index(w1).unwrap()], 4.5);
        assert_eq!(model.gradients[model.neuron_index(x).unwrap()], 6.0);
    }

    #[test]
    fn weight_gradients_accumulate_until_cleared() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(x, y, Some(1.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        model.predict(&[2.0]);
        model.backward(&[1.0]);
        model.predict(&[3.0]);
        model.backward(&[1.0]);
        assert_eq!(model.weight_gradients, vec![5.0]);

        model.zero_gradients();
        assert_eq!(model.weight_gradients, vec![0.0]);
    }

    #[test]
    fn diamond_dag_sums_both_paths() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let a = graph.add_neuron(ActivationKind::Linear);
        let b = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(x, a, Some(2.0)).unwrap();
        graph.connect(x, b, Some(5.0)).unwrap();
        graph.connect(a, y, Some(1.0)).unwrap();
        graph.connect(b, y, Some(1.0)).unwrap();
        // Skip connection straight to the output.
        graph.connect(x, y, Some(1.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        assert_eq!(model.predict(&[1.0]), vec![8.0]);
        model.backward(&[1.0]);
        assert_eq!(model.gradients[model.neuron_index(x).unwrap()], 8.0);
    }

    #[test]
    fn dead_relu_blocks_gradient() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::ReLU);
        graph.connect(x, y, Some(1.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        model.predict(&[-2.0]);
        model.backward(&[1.0]);
        assert_eq!(model.weight_gradients, vec![0.0]);
    }
}
