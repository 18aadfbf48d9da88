//! Run configuration. Both structs are plain values built once by the
//! driver and never changed while a [`Network`](crate::Network) lives.

use crate::error::{Error, Result};

pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub learning_rate: f32,
    /// Number of samples (columns) held by every batch matrix.
    pub samples: usize,
    /// `[L0, L1, ..., Lk]`: input width first, class count last.
    pub layer_sizes: Vec<usize>,
    /// Seed for weight initialisation.
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            learning_rate: 0.2,
            samples: 60_000,
            layer_sizes: vec![784, 16, 10],
            seed: DEFAULT_SEED,
        }
    }
}

impl NetworkConfig {
    pub fn new(learning_rate: f32, samples: usize, layer_sizes: Vec<usize>) -> Self {
        NetworkConfig {
            learning_rate,
            samples,
            layer_sizes,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(Error::Config(format!(
                "need at least an input and an output layer, got {:?}",
                self.layer_sizes
            )));
        }
        if let Some(layer) = self.layer_sizes.iter().position(|&width| width == 0) {
            return Err(Error::Config(format!("layer {} has zero width", layer)));
        }
        if self.samples == 0 {
            return Err(Error::Config("sample count must be > 0".to_owned()));
        }
        if !self.learning_rate.is_finite() {
            return Err(Error::Config(format!(
                "learning rate must be finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub network: NetworkConfig,
    pub epochs: usize,
    /// Report metrics every `info_interval` epochs.
    pub info_interval: usize,
    pub test_samples: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            network: NetworkConfig::default(),
            epochs: 100,
            info_interval: 1,
            test_samples: 10_000,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        if self.info_interval == 0 {
            return Err(Error::Config("info interval must be > 0".to_owned()));
        }
        Ok(())
    }

    /// Same architecture and seed as the training network, sized for the test set.
    pub fn test_network_config(&self) -> NetworkConfig {
        self.network.clone().with_samples(self.test_samples)
    }
}
