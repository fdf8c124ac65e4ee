use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::compile::{compile, ExecutionModel};
use crate::errors::TrainError;
use crate::graph::{Graph, Labels};
use crate::train::dataset::Dataset;
use crate::train::loop_fn::{train_loop, train_sample, TrainOutcome};
use crate::train::progress::{IndexLabels, Phase, ProgressRecord};
use crate::train::sampler::SampleQueue;
use crate::train::train_config::{Hyperparams, TrainConfig};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Lifecycle of the continuous run owned by a [`TrainingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No continuous run has been started.
    Idle,
    /// A background worker owns the model.
    Running,
    /// Cancel requested; the worker stops at the next epoch boundary.
    Cancelling,
    /// The last continuous run finished every epoch.
    Completed,
    /// The last continuous run was cancelled.
    Cancelled,
}

struct Worker {
    handle: JoinHandle<(ExecutionModel, TrainOutcome)>,
    stop_flag: Arc<AtomicBool>,
    progress_rx: mpsc::Receiver<ProgressRecord>,
}

/// Single owner of one compiled model, trained either continuously on a
/// background thread or one sample at a time from the caller's thread.
///
/// The two modes are mutually exclusive: `start` moves the model into the
/// worker and it only comes back once the worker has been joined by `poll`
/// or `wait`. Progress callbacks run inside those calls, on the caller's
/// thread.
pub struct TrainingSession {
    model: Option<ExecutionModel>,
    labels: Arc<IndexLabels>,
    dataset: Arc<Dataset>,
    hyperparams: Hyperparams,
    state: SessionState,
    worker: Option<Worker>,
    queue: SampleQueue,
    epoch: usize,
    steps: usize,
    last_outcome: Option<TrainOutcome>,
}

impl TrainingSession {
    /// Compiles `graph` and checks `dataset` against its input/output counts.
    pub fn new(graph: &Graph, labels: &Labels, dataset: Dataset, hyperparams: Hyperparams) -> Result<Self, TrainError> {
        let model = compile(graph)?;
        Self::from_model(model, labels, dataset, hyperparams)
    }

    pub fn from_model(
        model: ExecutionModel,
        labels: &Labels,
        dataset: Dataset,
        hyperparams: Hyperparams,
    ) -> Result<Self, TrainError> {
        if dataset.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        dataset.check_dimensions(&model)?;

        let labels = Arc::new(IndexLabels::new(&model, labels));
        let queue = SampleQueue::new(dataset.len(), hyperparams.shuffle, hyperparams.seed);
        Ok(TrainingSession {
            model: Some(model),
            labels,
            dataset: Arc::new(dataset),
            hyperparams,
            state: SessionState::Idle,
            worker: None,
            queue,
            epoch: 0,
            steps: 0,
            last_outcome: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn hyperparams(&self) -> &Hyperparams {
        &self.hyperparams
    }

    /// Step-mode passes completed so far.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Step-mode updates applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn last_outcome(&self) -> Option<TrainOutcome> {
        self.last_outcome
    }

    /// The model, unless a continuous run currently owns it.
    pub fn model(&self) -> Option<&ExecutionModel> {
        self.model.as_ref()
    }

    // -----------------------------------------------------------------------
    // Continuous runs
    // -----------------------------------------------------------------------

    /// Starts a continuous epoch-mode run on a background thread.
    ///
    /// Returns `Ok(false)` without doing anything if a run is already active.
    pub fn start(&mut self) -> Result<bool, TrainError> {
        if self.worker.is_some() {
            debug!("training run already active; start ignored");
            return Ok(false);
        }
        let mut model = self.model.take().ok_or(TrainError::ModelUnavailable)?;

        let (tx, rx) = mpsc::channel::<ProgressRecord>();
        let stop_flag = Arc::new(AtomicBool::new(false));

        let mut config = TrainConfig::new(self.hyperparams.clone());
        config.progress_tx = Some(tx);
        config.stop_flag = Some(stop_flag.clone());

        let labels = Arc::clone(&self.labels);
        let dataset = Arc::clone(&self.dataset);

        // Spawn background training thread.
        let handle = thread::spawn(move || {
            let outcome = train_loop(&mut model, &dataset.samples, &labels, &config);
            (model, outcome)
        });

        self.worker = Some(Worker { handle, stop_flag, progress_rx: rx });
        self.state = SessionState::Running;
        info!(epochs = self.hyperparams.epochs, samples = self.dataset.len(), "training run started");
        Ok(true)
    }

    /// Requests cooperative cancellation of the active run. The current epoch
    /// completes; nothing is rolled back.
    pub fn cancel(&mut self) {
        if let Some(worker) = &self.worker {
            worker.stop_flag.store(true, Ordering::Relaxed);
            self.state = SessionState::Cancelling;
        }
    }

    /// Delivers pending progress to `on_progress` and, if the worker has
    /// finished, takes the model back.
    pub fn poll<F: FnMut(&ProgressRecord)>(&mut self, mut on_progress: F) -> Result<SessionState, TrainError> {
        let Some(worker) = &self.worker else {
            return Ok(self.state);
        };
        while let Ok(record) = worker.progress_rx.try_recv() {
            on_progress(&record);
        }
        if worker.handle.is_finished() {
            self.finish(&mut on_progress)?;
        }
        Ok(self.state)
    }

    /// Blocks until the active run ends, delivering progress as it arrives.
    pub fn wait<F: FnMut(&ProgressRecord)>(&mut self, mut on_progress: F) -> Result<Option<TrainOutcome>, TrainError> {
        if let Some(worker) = &self.worker {
            // Ends once the worker drops its sender.
            for record in worker.progress_rx.iter() {
                on_progress(&record);
            }
            self.finish(&mut on_progress)?;
        }
        Ok(self.last_outcome)
    }

    fn finish<F: FnMut(&ProgressRecord)>(&mut self, on_progress: &mut F) -> Result<(), TrainError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let joined = worker.handle.join();
        for record in worker.progress_rx.try_iter() {
            on_progress(&record);
        }

        match joined {
            Ok((model, outcome)) => {
                self.state = if outcome.cancelled { SessionState::Cancelled } else { SessionState::Completed };
                info!(
                    epochs = outcome.epochs_completed,
                    loss = ?outcome.last_loss,
                    cancelled = outcome.cancelled,
                    "training run finished"
                );
                self.model = Some(model);
                self.last_outcome = Some(outcome);
                Ok(())
            }
            Err(_) => {
                error!("training worker panicked; model lost");
                self.state = SessionState::Idle;
                Err(TrainError::WorkerPanicked)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Step mode
    // -----------------------------------------------------------------------

    /// Applies one per-sample update from the cycling sample queue and
    /// returns its progress record.
    pub fn step(&mut self) -> Result<ProgressRecord, TrainError> {
        if self.worker.is_some() {
            return Err(TrainError::RunInProgress);
        }
        let model = self.model.as_mut().ok_or(TrainError::ModelUnavailable)?;
        let (idx, exhausted) = self.queue.next_index().ok_or(TrainError::EmptyDataset)?;

        let t_start = Instant::now();
        let optimizer = self.hyperparams.optimizer();
        let loss = train_sample(model, &self.dataset.samples[idx], &optimizer, &self.hyperparams);
        self.steps += 1;

        let record = ProgressRecord {
            epoch: self.epoch + 1,
            step: Some(self.steps),
            loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
            ..ProgressRecord::capture(model, &self.labels, Phase::Backward)
        };
        model.zero_gradients();

        if exhausted {
            self.epoch += 1;
        }
        Ok(record)
    }

    /// Forward pass over dataset sample `index` without updating anything.
    pub fn preview(&mut self, index: usize) -> Result<ProgressRecord, TrainError> {
        if self.worker.is_some() {
            return Err(TrainError::RunInProgress);
        }
        let model = self.model.as_mut().ok_or(TrainError::ModelUnavailable)?;
        let sample = self.dataset.samples.get(index).ok_or(TrainError::SampleOutOfRange(index))?;

        let output = model.predict(&sample.input);
        Ok(ProgressRecord {
            epoch: self.epoch + 1,
            step: Some(self.steps),
            loss: self.hyperparams.loss.compute(&output, &sample.target),
            ..ProgressRecord::capture(model, &self.labels, Phase::Forward)
        })
    }

    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>, TrainError> {
        if self.worker.is_some() {
            return Err(TrainError::RunInProgress);
        }
        let model = self.model.as_mut().ok_or(TrainError::ModelUnavailable)?;
        Ok(model.predict(input))
    }

    /// Consumes the session, cancelling and joining any active run first.
    pub fn into_model(mut self) -> Result<ExecutionModel, TrainError> {
        if self.worker.is_some() {
            self.cancel();
            self.wait(|_| {})?;
        }
        self.model.take().ok_or(TrainError::ModelUnavailable)
    }
}

impl Drop for TrainingSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop_flag.store(true, Ordering::Relaxed);
            let _ = worker.handle.join();
        }
    }
}
