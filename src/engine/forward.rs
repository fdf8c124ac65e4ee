use crate::compile::ExecutionModel;
use crate::loss::LossType;
use crate::train::dataset::Sample;

impl ExecutionModel {
    /// Forward pass.
    ///
    /// `input` is written positionally into the input slots: extra values are
    /// ignored and a short input leaves the remaining slots at their previous
    /// values. Neurons without incoming edges (inputs, biases) are never
    /// recomputed.
    pub fn predict(&mut self, input: &[f64]) -> Vec<f64> {
        for (&slot, &x) in self.inputs.iter().zip(input.iter()) {
            self.values[slot] = x;
        }

        for &n in &self.order {
            let incoming = &self.incoming[n];
            if incoming.is_empty() {
                continue;
            }
            let sum: f64 = incoming
                .iter()
                .map(|&e| self.values[self.edge_sources[e]] * self.weights[e])
                .sum();
            self.values[n] = self.activations[n].function(sum);
        }

        self.output_values()
    }

    /// Current output values, in output order, without recomputing.
    pub fn output_values(&self) -> Vec<f64> {
        self.outputs.iter().map(|&o| self.values[o]).collect()
    }

    /// Mean loss over `samples` in eval mode; gradients are not touched.
    pub fn evaluate(&mut self, samples: &[Sample], loss: LossType) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let total: f64 = samples
            .iter()
            .map(|s| {
                let output = self.predict(&s.input);
                loss.compute(&output, &s.target)
            })
            .sum();
        total / samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use crate::activation::ActivationKind;
    use crate::compile::compile;
    use crate::graph::Graph;
    use crate::loss::LossType;
    use crate::train::dataset::Sample;

    #[test]
    fn short_input_keeps_stale_values() {
        let mut graph = Graph::with_seed(1);
        let a = graph.add_neuron(ActivationKind::Linear);
        let b = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(a, y, Some(1.0)).unwrap();
        graph.connect(b, y, Some(1.0)).unwrap();
        graph.set_inputs(vec![a, b]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        assert_eq!(model.predict(&[1.0, 2.0, 99.0]), vec![3.0]);
        // `b` still holds 2.0 from the previous call.
        assert_eq!(model.predict(&[5.0]), vec![7.0]);
    }

    #[test]
    fn bias_feeds_weighted_constant() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let bias = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(x, y, Some(1.0)).unwrap();
        graph.connect(bias, y, Some(-0.5)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        graph.set_biases(vec![bias]).unwrap();
        let mut model = compile(&graph).unwrap();

        assert_eq!(model.predict(&[2.0]), vec![1.5]);
    }

    #[test]
    fn evaluate_averages_loss_without_touching_gradients() {
        let mut graph = Graph::with_seed(1);
        let x = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(x, y, Some(2.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        let mut model = compile(&graph).unwrap();

        // predictions 2 and 4 against targets 1 and 4: squared errors 1 and 0
        let samples = vec![Sample::new(vec![1.0], vec![1.0]), Sample::new(vec![2.0], vec![4.0])];
        assert_eq!(model.evaluate(&samples, LossType::Mse), 0.5);
        assert_eq!(model.evaluate(&[], LossType::Mse), 0.0);
        assert!(model.weight_gradients.iter().all(|g| *g == 0.0));
        assert_eq!(model.weights, vec![2.0]);
    }
}
