use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::loss::LossType;
use crate::optim::Sgd;
use crate::train::progress::ProgressRecord;

/// Training hyperparameters. Every field has a default so partial JSON
/// objects deserialize cleanly.
///
/// `batch_size` only scales the step size: updates are still applied after
/// every sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub loss: LossType,
    pub shuffle: bool,
    pub max_grad_norm: Option<f64>,
    /// Upper bound on progress records emitted over a full epoch-mode run.
    pub max_reports: usize,
    pub seed: Option<u64>,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            epochs: 500,
            learning_rate: 0.1,
            batch_size: 1,
            loss: LossType::Mse,
            shuffle: false,
            max_grad_norm: None,
            max_reports: 100,
            seed: None,
        }
    }
}

impl Hyperparams {
    pub fn optimizer(&self) -> Sgd {
        Sgd { learning_rate: self.learning_rate, max_grad_norm: self.max_grad_norm }
    }

    /// Epoch stride between progress reports.
    pub fn report_interval(&self) -> usize {
        let reports = self.max_reports.max(1);
        self.epochs.div_ceil(reports).max(1)
    }
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `hyperparams` — what to train and how
/// - `progress_tx` — optional channel sender; rate-limited `ProgressRecord`s
///                   are sent here.  If the receiver is dropped the loop
///                   terminates early.
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the loop stops before starting the next epoch.
#[derive(Debug, Clone, Default)]
pub struct TrainConfig {
    pub hyperparams: Hyperparams,
    pub progress_tx: Option<mpsc::Sender<ProgressRecord>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no progress channel and no stop flag.
    pub fn new(hyperparams: Hyperparams) -> Self {
        TrainConfig { hyperparams, progress_tx: None, stop_flag: None }
    }
}
