//! Command-line front end: loads a JSON run description (network, samples,
//! hyperparameters), trains it and prints progress and final predictions.
//!
//! Run with:
//!   cargo run --release -- train demos/xor.json

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use neurograph::{Dataset, Hyperparams, LossType, NetworkDescription, ProgressRecord, Sample, SessionState, TrainingSession};
use neurograph::graph::BuiltNetwork;

#[derive(Parser, Debug)]
#[command(name = "neurograph", version, about = "Train small feedforward networks described as JSON graphs.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and validate the network without training it
    Validate {
        /// Run description (JSON)
        run: PathBuf,
    },
    /// Train the network on the run's samples
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Run description (JSON)
    run: PathBuf,

    /// Overrides `hyperparams.epochs`
    #[arg(long)]
    epochs: Option<usize>,

    /// Overrides `hyperparams.learning_rate`
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Overrides `hyperparams.batch_size` (scales the step size only)
    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long, value_enum)]
    loss: Option<LossArg>,

    /// Shuffle sample order each pass
    #[arg(long)]
    shuffle: bool,

    /// Seed for default weights and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Train one sample at a time for this many steps instead of full epochs
    #[arg(long)]
    steps: Option<usize>,

    /// Print progress records as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LossArg {
    Mse,
    Bce,
}

impl From<LossArg> for LossType {
    fn from(arg: LossArg) -> LossType {
        match arg {
            LossArg::Mse => LossType::Mse,
            LossArg::Bce => LossType::BinaryCrossEntropy,
        }
    }
}

/// On-disk shape of a run description.
#[derive(Debug, Deserialize)]
struct RunFile {
    network: NetworkDescription,
    samples: Vec<Sample>,
    #[serde(default)]
    hyperparams: Hyperparams,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neurograph=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Commands::Validate { run } => validate(&run),
        Commands::Train(args) => train(args),
    }
}

fn load_run(path: &Path) -> Result<RunFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn build(run: &RunFile, seed: Option<u64>) -> Result<BuiltNetwork> {
    let built = match seed {
        Some(s) => run.network.build_seeded(s),
        None => run.network.build(),
    };
    built.context("invalid network")
}

fn validate(path: &Path) -> Result<()> {
    let run = load_run(path)?;
    let built = build(&run, run.hyperparams.seed)?;
    let model = neurograph::compile(&built.graph).context("compiling network")?;
    Dataset::new(run.samples).check_dimensions(&model).context("checking samples")?;
    println!(
        "ok: {} neurons, {} connections, {} inputs, {} outputs",
        model.neuron_count(),
        model.weight_count(),
        model.input_count(),
        model.output_count()
    );
    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let run = load_run(&args.run)?;

    let mut hp = run.hyperparams.clone();
    if let Some(e) = args.epochs { hp.epochs = e; }
    if let Some(lr) = args.learning_rate { hp.learning_rate = lr; }
    if let Some(b) = args.batch_size { hp.batch_size = b; }
    if let Some(l) = args.loss { hp.loss = l.into(); }
    if args.shuffle { hp.shuffle = true; }
    if args.seed.is_some() { hp.seed = args.seed; }

    let built = build(&run, hp.seed)?;
    let dataset = Dataset::new(run.samples.clone());
    let mut session = TrainingSession::new(&built.graph, &built.labels, dataset, hp)?;

    let json = args.json;
    let report = move |record: &ProgressRecord| print_record(record, json);

    match args.steps {
        Some(steps) => {
            for _ in 0..steps {
                let record = session.step()?;
                report(&record);
            }
        }
        None => {
            session.start()?;
            loop {
                let state = session.poll(report)?;
                if !matches!(state, SessionState::Running | SessionState::Cancelling) {
                    break;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
        }
    }

    for sample in &run.samples {
        let output = session.predict(&sample.input)?;
        println!("{:?} -> {:.4?} (target {:?})", sample.input, output, sample.target);
    }
    Ok(())
}

fn print_record(record: &ProgressRecord, json: bool) {
    if json {
        match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "could not serialize progress record"),
        }
        return;
    }
    match record.step {
        Some(step) => println!("step {step} (epoch {}): loss = {:.6}", record.epoch, record.loss),
        None => println!("epoch {}: loss = {:.6}", record.epoch, record.loss),
    }
}
