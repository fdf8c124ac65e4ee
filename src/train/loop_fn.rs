use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::compile::ExecutionModel;
use crate::optim::Sgd;
use crate::train::dataset::Sample;
use crate::train::progress::{IndexLabels, Phase, ProgressRecord};
use crate::train::sampler::seeded_rng;
use crate::train::train_config::{Hyperparams, TrainConfig};

/// Summary of one epoch-mode run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrainOutcome {
    pub epochs_completed: usize,
    /// Mean loss of the first completed epoch.
    pub first_loss: Option<f64>,
    /// Mean loss of the last completed epoch.
    pub last_loss: Option<f64>,
    /// True when the stop flag or a dropped receiver ended the run early.
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// One per-sample update: forward, loss, backward, SGD step.
///
/// Returns the sample's loss. Gradients are left in place so the caller can
/// snapshot them; clear them with `zero_gradients` before the next sample.
pub fn train_sample(model: &mut ExecutionModel, sample: &Sample, optimizer: &Sgd, hp: &Hyperparams) -> f64 {
    let output = model.predict(&sample.input);
    let loss = hp.loss.compute(&output, &sample.target);
    let grad = hp.loss.gradient(&output, &sample.target);
    model.backward(&grad);
    optimizer.apply(model, hp.batch_size);
    loss
}

/// Trains `model` for `config.hyperparams.epochs` epochs over `samples`.
///
/// # Early termination
/// The stop flag is sampled once before the first epoch and then right after
/// each epoch completes, so the epoch that observed it can still be reported.
/// A set flag stops the loop before the next epoch begins; updates already
/// applied stand.
/// A dropped `progress_tx` receiver also ends the run.
///
/// # Progress
/// A record is sent every `report_interval()` epochs, for the final epoch,
/// and for the last epoch completed before a cancellation.
pub fn train_loop(
    model: &mut ExecutionModel,
    samples: &[Sample],
    labels: &IndexLabels,
    config: &TrainConfig,
) -> TrainOutcome {
    let hp = &config.hyperparams;
    let optimizer = hp.optimizer();
    let interval = hp.report_interval();
    let mut rng = seeded_rng(hp.seed);
    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut outcome = TrainOutcome::default();

    if samples.is_empty() {
        return outcome;
    }

    let run_start = Instant::now();
    let mut stop_requested = is_stopped(config);

    for epoch in 1..=hp.epochs {
        if stop_requested {
            outcome.cancelled = true;
            info!(epoch = outcome.epochs_completed, "training cancelled");
            break;
        }

        if hp.shuffle {
            order.shuffle(&mut rng);
        }

        // ── One full pass; gradients of the final sample survive for the snapshot.
        let mut total_loss = 0.0;
        for (i, &idx) in order.iter().enumerate() {
            total_loss += train_sample(model, &samples[idx], &optimizer, hp);
            if i + 1 < order.len() {
                model.zero_gradients();
            }
        }
        let train_loss = total_loss / samples.len() as f64;

        outcome.epochs_completed = epoch;
        outcome.first_loss.get_or_insert(train_loss);
        outcome.last_loss = Some(train_loss);

        stop_requested = is_stopped(config);
        let report = epoch % interval == 0 || epoch == hp.epochs || stop_requested;

        if report {
            info!(epoch, total = hp.epochs, loss = train_loss, "epoch complete");
            if let Some(ref tx) = config.progress_tx {
                let stats = ProgressRecord {
                    epoch,
                    total_epochs: Some(hp.epochs),
                    loss: train_loss,
                    elapsed_ms: run_start.elapsed().as_millis() as u64,
                    ..ProgressRecord::capture(model, labels, Phase::Backward)
                };
                // If the receiver has been dropped, stop training.
                if tx.send(stats).is_err() {
                    debug!("progress receiver dropped; stopping");
                    model.zero_gradients();
                    outcome.cancelled = epoch < hp.epochs;
                    break;
                }
            }
        }

        model.zero_gradients();
    }

    outcome
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn is_stopped(config: &TrainConfig) -> bool {
    config.stop_flag.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    use super::*;
    use crate::activation::ActivationKind;
    use crate::compile::compile;
    use crate::graph::{Graph, Labels};

    fn linear_fit() -> (ExecutionModel, IndexLabels, Vec<Sample>) {
        let mut graph = Graph::with_seed(21);
        let x = graph.add_neuron(ActivationKind::Linear);
        let bias = graph.add_neuron(ActivationKind::Linear);
        let y = graph.add_neuron(ActivationKind::Linear);
        graph.connect(x, y, Some(0.0)).unwrap();
        graph.connect(bias, y, Some(0.0)).unwrap();
        graph.set_inputs(vec![x]).unwrap();
        graph.set_outputs(vec![y]).unwrap();
        graph.set_biases(vec![bias]).unwrap();
        let model = compile(&graph).unwrap();
        let labels = IndexLabels::new(&model, &Labels::from_graph(&graph));
        let samples = (0..5)
            .map(|i| {
                let x = i as f64 / 4.0;
                Sample::new(vec![x], vec![2.0 * x + 1.0])
            })
            .collect();
        (model, labels, samples)
    }

    #[test]
    fn train_sample_moves_weights_against_gradient() {
        let (mut model, _, samples) = linear_fit();
        let hp = Hyperparams { learning_rate: 0.5, ..Hyperparams::default() };
        // x = 0.25, target 1.5, prediction 0 -> dL/dy = -3
        let loss = train_sample(&mut model, &samples[1], &hp.optimizer(), &hp);
        assert_eq!(loss, 2.25);
        assert!(model.weights.iter().all(|w| *w > 0.0));
    }

    #[test]
    fn reports_are_rate_limited_but_final_epoch_is_sent() {
        let (mut model, labels, samples) = linear_fit();
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(Hyperparams {
            epochs: 250,
            learning_rate: 0.05,
            max_reports: 20,
            ..Hyperparams::default()
        });
        config.progress_tx = Some(tx);

        let outcome = train_loop(&mut model, &samples, &labels, &config);
        drop(config);
        let records: Vec<ProgressRecord> = rx.iter().collect();

        assert_eq!(outcome.epochs_completed, 250);
        assert!(!outcome.cancelled);
        assert!(records.len() <= 21);
        assert_eq!(records.last().map(|r| r.epoch), Some(250));
        assert!(outcome.last_loss.unwrap() < outcome.first_loss.unwrap());
        assert!(model.weight_gradients.iter().all(|g| *g == 0.0));
    }

    #[test]
    fn preset_stop_flag_runs_no_epochs() {
        let (mut model, labels, samples) = linear_fit();
        let before = model.weights.clone();
        let mut config = TrainConfig::new(Hyperparams { epochs: 10, ..Hyperparams::default() });
        config.stop_flag = Some(Arc::new(AtomicBool::new(true)));

        let outcome = train_loop(&mut model, &samples, &labels, &config);
        assert!(outcome.cancelled);
        assert_eq!(outcome.epochs_completed, 0);
        assert_eq!(model.weights, before);
    }
}
