use tracing::{debug, info};

use crate::config::TrainingConfig;
use crate::network::{Network, Parameters};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    /// 1-based epoch number.
    pub epoch: usize,
    pub average_cost: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub average_cost: f32,
    pub accuracy: f32,
}

/// Runs `config.epochs` full-batch steps on `network`, calling `on_report`
/// every `config.info_interval` epochs. Returns the metrics of every epoch.
pub fn train<F>(network: &mut Network, config: &TrainingConfig, mut on_report: F) -> Vec<EpochMetrics>
where
    F: FnMut(&EpochMetrics),
{
    assert!(config.info_interval > 0, "info interval must be > 0");

    let mut history = Vec::with_capacity(config.epochs);
    for epoch in 1..=config.epochs {
        let (average_cost, accuracy) = network.step();
        let metrics = EpochMetrics { epoch, average_cost, accuracy };
        debug!(epoch, average_cost, accuracy, "epoch finished");

        if epoch % config.info_interval == 0 {
            on_report(&metrics);
        }
        history.push(metrics);
    }
    history
}

/// Scores trained `parameters` on the dataset loaded into `test`. The test
/// network's own parameters are replaced and never updated.
pub fn evaluate(test: &mut Network, parameters: &Parameters) -> Evaluation {
    test.load_parameters(parameters);
    test.forward_propagate();
    let average_cost = test.calculate_cost();
    let accuracy = test.calculate_accuracy();

    info!(samples = test.samples(), average_cost, accuracy, "evaluation finished");
    Evaluation { average_cost, accuracy }
}
