use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mnist_mlp::config::{NetworkConfig, TrainingConfig};
use mnist_mlp::csv_data::MnistCsv;
use mnist_mlp::network::Network;
use mnist_mlp::training;

#[derive(Parser, Debug)]
#[command(name = "mnist-mlp")]
#[command(about = "Full-batch MLP training on MNIST-style CSV data")]
struct Args {
    /// Training CSV (`-` for stdin, `.gz` for gzip)
    #[arg(long, default_value = "-")]
    train: String,

    /// Test CSV; with both set to `-` the test records follow the training records on stdin
    #[arg(long, default_value = "-")]
    test: String,

    /// Number of training records
    #[arg(long, default_value_t = 60_000)]
    samples: usize,

    /// Number of test records
    #[arg(long, default_value_t = 10_000)]
    test_samples: usize,

    #[arg(long, default_value_t = 100)]
    epochs: usize,

    #[arg(long, default_value_t = 0.2)]
    learning_rate: f32,

    /// Layer widths, input first and class count last
    #[arg(long, value_delimiter = ',', default_value = "784,16,10")]
    layers: Vec<usize>,

    /// Weight initialisation seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print metrics every N epochs
    #[arg(long, default_value_t = 1)]
    info_interval: usize,

    /// Worker threads for matrix operations (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Stop after training
    #[arg(long)]
    skip_test: bool,
}

impl Args {
    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            network: NetworkConfig::new(self.learning_rate, self.samples, self.layers.clone())
                .with_seed(self.seed),
            epochs: self.epochs,
            info_interval: self.info_interval,
            test_samples: self.test_samples,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker pool")?;
    }

    let config = args.training_config();
    config.validate()?;
    let features = config.network.input_size();
    let classes = config.network.output_size();

    let load_start = Instant::now();
    let mut train = Network::new(&config.network)?;
    let mut train_reader = MnistCsv::open(&args.train)
        .with_context(|| format!("failed to open training data {}", args.train))?;
    let train_set = MnistCsv::from_reader(&mut train_reader, config.network.samples, features, classes)
        .with_context(|| format!("failed to read training data from {}", args.train))?;
    train.set_batch(train_set.inputs, train_set.targets);
    info!(samples = config.network.samples, elapsed = ?load_start.elapsed(), "training data ready");

    println!("Epoch,Average Cost,Accuracy");
    let train_start = Instant::now();
    training::train(&mut train, &config, |metrics| {
        println!("{},{},{}", metrics.epoch, metrics.average_cost, metrics.accuracy);
    });
    println!();
    info!(epochs = config.epochs, elapsed = ?train_start.elapsed(), "training finished");

    if args.skip_test {
        return Ok(());
    }

    let test_config = config.test_network_config();
    let mut test = Network::new(&test_config)?;
    let loaded = if args.test == "-" && args.train == "-" {
        MnistCsv::from_reader(&mut train_reader, test_config.samples, features, classes)
    } else {
        MnistCsv::load(&args.test, test_config.samples, features, classes)
    };
    let test_set = loaded.with_context(|| format!("failed to read test data from {}", args.test))?;
    test.set_batch(test_set.inputs, test_set.targets);

    let evaluation = training::evaluate(&mut test, train.parameters());
    println!("mnist_test Results:");
    println!("Average Cost: {} | Accuracy: {}", evaluation.average_cost, evaluation.accuracy);

    Ok(())
}
