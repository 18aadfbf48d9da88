use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64;
use tracing::{debug, info};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::matrix::Matrix;

/// Learned parameters, indexed by layer number. Index 0 (the input layer)
/// holds an empty placeholder in both vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// `weights[i]` is `L(i) x L(i-1)`.
    pub weights: Vec<Matrix>,
    /// `biases[i]` has length `L(i)`.
    pub biases: Vec<Vec<f32>>,
}

/// Full-batch multilayer perceptron: affine -> leaky ReLU for hidden layers,
/// affine -> column softmax for the output layer.
///
/// All per-layer matrices are `L(i) x N` with one column per sample; `N` is
/// fixed at construction. Vectors are indexed by layer number, so slot 0 of
/// the pre-activation and delta vectors is an empty placeholder.
#[derive(Debug, Clone)]
pub struct Network {
    learning_rate: f32,
    samples: usize,
    layer_sizes: Vec<usize>,
    activations: Vec<Matrix>,
    pre_activations: Vec<Matrix>,
    deltas: Vec<Matrix>,
    parameters: Parameters,
    target: Matrix,
    costs: Matrix,
}

impl Network {

    pub fn new(config: &NetworkConfig) -> Result<Self> {
        config.validate()?;

        let samples = config.samples;
        let layer_sizes = config.layer_sizes.clone();
        let output_size = config.output_size();

        let mut activations = vec![Matrix::zeros(layer_sizes[0], samples)];
        let mut pre_activations = vec![Matrix::default()];
        let mut deltas = vec![Matrix::default()];
        for &width in &layer_sizes[1..] {
            activations.push(Matrix::zeros(width, samples));
            pre_activations.push(Matrix::zeros(width, samples));
            deltas.push(Matrix::zeros(width, samples));
        }

        let mut network = Network {
            learning_rate: config.learning_rate,
            samples,
            layer_sizes,
            activations,
            pre_activations,
            deltas,
            parameters: Parameters { weights: Vec::new(), biases: Vec::new() },
            target: Matrix::zeros(output_size, samples),
            costs: Matrix::zeros(output_size, samples),
        };
        network.initialize_random_weights_and_biases(config.seed);

        info!(layers = ?network.layer_sizes, samples, learning_rate = config.learning_rate,
            seed = config.seed, "network initialised");
        Ok(network)
    }

    /// He initialisation: weights drawn from N(0, 1) scaled by `sqrt(2 / fan_in)`,
    /// layer by layer and row-major within a layer from one seeded generator.
    /// Biases start at zero.
    pub fn initialize_random_weights_and_biases(&mut self, seed: u64) {
        let mut rng = Pcg64::seed_from_u64(seed);

        let mut weights = vec![Matrix::default()];
        let mut biases = vec![Vec::new()];

        for pair in self.layer_sizes.windows(2) {
            let (fan_in, width) = (pair[0], pair[1]);
            let scale = (2.0 / fan_in as f32).sqrt();
            let data = (0..width * fan_in)
                .map(|_| {
                    let z: f32 = StandardNormal.sample(&mut rng);
                    z * scale
                })
                .collect::<Vec<f32>>();

            weights.push(Matrix::new(data, width, fan_in));
            biases.push(vec![0.0; width]);
        }

        self.parameters = Parameters { weights, biases };
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Index of the output layer (`k`).
    pub fn depth(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn input(&self) -> &Matrix {
        &self.activations[0]
    }

    pub fn input_mut(&mut self) -> &mut Matrix {
        &mut self.activations[0]
    }

    pub fn target(&self) -> &Matrix {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut Matrix {
        &mut self.target
    }

    pub fn output(&self) -> &Matrix {
        &self.activations[self.depth()]
    }

    pub fn activation(&self, layer: usize) -> &Matrix {
        &self.activations[layer]
    }

    pub fn pre_activation(&self, layer: usize) -> &Matrix {
        &self.pre_activations[layer]
    }

    pub fn delta(&self, layer: usize) -> &Matrix {
        &self.deltas[layer]
    }

    pub fn weights(&self, layer: usize) -> &Matrix {
        &self.parameters.weights[layer]
    }

    pub fn biases(&self, layer: usize) -> &[f32] {
        &self.parameters.biases[layer]
    }

    /// Squared error per output unit and sample from the last `calculate_cost`.
    pub fn costs(&self) -> &Matrix {
        &self.costs
    }

    /// Installs a loaded dataset: inputs `L0 x N`, one-hot targets `Lk x N`.
    pub fn set_batch(&mut self, inputs: Matrix, targets: Matrix) {
        assert_eq!(inputs.dims(), self.activations[0].dims(),
            "Input batch shape {:?} doesn't match network input {:?}",
            inputs.dims(), self.activations[0].dims());
        assert_eq!(targets.dims(), self.target.dims(),
            "Target batch shape {:?} doesn't match network output {:?}",
            targets.dims(), self.target.dims());

        self.activations[0] = inputs;
        self.target = targets;
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Copies parameters learned by another network with the same layer sizes.
    pub fn load_parameters(&mut self, parameters: &Parameters) {
        assert_eq!(parameters.weights.len(), self.parameters.weights.len(),
            "Parameter layer count mismatch");
        for (i, (theirs, ours)) in parameters.weights.iter().zip(&self.parameters.weights).enumerate() {
            assert_eq!(theirs.dims(), ours.dims(), "Weight shape mismatch at layer {}", i);
        }
        for (i, (theirs, ours)) in parameters.biases.iter().zip(&self.parameters.biases).enumerate() {
            assert_eq!(theirs.len(), ours.len(), "Bias length mismatch at layer {}", i);
        }

        self.parameters = parameters.clone();
    }

    /// `Z[i] = W[i] · A[i-1]`, leaky ReLU on hidden layers and column softmax
    /// on the output layer. Biases are not added here; they are only updated
    /// by `descend_gradient`.
    pub fn forward_propagate(&mut self) {
        let last = self.depth();
        for i in 1..last {
            self.pre_activations[i] = self.parameters.weights[i].multiply(&self.activations[i - 1]);
            self.activations[i] = self.pre_activations[i].leaky_relu();
        }
        self.pre_activations[last] = self.parameters.weights[last].multiply(&self.activations[last - 1]);
        self.activations[last] = self.pre_activations[last].softmax();
    }

    /// Sets the output delta to `T - A[k]` and returns the batch mean of the
    /// per-sample mean squared error.
    pub fn calculate_cost(&mut self) -> f32 {
        let last = self.depth();
        self.deltas[last] = self.target.subtract(&self.activations[last]);
        self.costs = self.deltas[last].square();

        let output_size = self.layer_sizes[last] as f32;
        let mut sum_of_costs = 0.0;
        for c in 0..self.costs.cols() {
            let sample_cost = (0..self.costs.rows()).fold(0.0, |acc, r| acc + self.costs.at(r, c));
            sum_of_costs += sample_cost / output_size;
        }
        sum_of_costs / self.samples as f32
    }

    /// Fraction of samples whose highest output matches the one-hot target.
    /// Ties go to the lowest row.
    pub fn calculate_accuracy(&self) -> f32 {
        let output = self.output();
        let mut correct = 0;

        for c in 0..self.samples {
            let mut label = None;
            let mut predicted = None;
            let mut max_val = -1.0;
            for r in 0..output.rows() {
                if self.target.at(r, c) > 0.5 {
                    label = Some(r);
                }
                if output.at(r, c) > max_val {
                    max_val = output.at(r, c);
                    predicted = Some(r);
                }
            }
            if predicted == label {
                correct += 1;
            }
        }
        correct as f32 / self.samples as f32
    }

    /// Backpropagates the output delta set by `calculate_cost` down to layer 1:
    /// `D[i] = (W[i+1]^T · D[i+1]) * f'(Z[i])`.
    pub fn calculate_deltas(&mut self) {
        let last = self.depth();
        for i in (1..last).rev() {
            self.deltas[i] = self.parameters.weights[i + 1]
                .transpose_multiply(&self.deltas[i + 1])
                .leaky_relu_derivative(&self.pre_activations[i]);
        }
    }

    /// Applies one full-batch update. Deltas are `target - prediction`, so the
    /// step is added to the weights. Biases get `learning_rate * sum(D[i]) / N`.
    pub fn descend_gradient(&mut self) {
        let n = self.samples as f32;
        for i in (1..=self.depth()).rev() {
            let d_weights = self.deltas[i]
                .multiply_transpose(&self.activations[i - 1])
                .scalar_multiply(self.learning_rate / n);
            self.parameters.weights[i] = self.parameters.weights[i].add(&d_weights);

            let d_biases = self.deltas[i].collapse();
            for (bias, grad) in self.parameters.biases[i].iter_mut().zip(d_biases) {
                let grad = grad / n;
                *bias += self.learning_rate * grad;
            }
        }
    }

    /// One training epoch. Returns the cost and accuracy measured on the
    /// forward pass, before the parameters are updated.
    pub fn step(&mut self) -> (f32, f32) {
        self.forward_propagate();
        let cost = self.calculate_cost();
        let accuracy = self.calculate_accuracy();
        self.calculate_deltas();
        self.descend_gradient();

        debug!(cost, accuracy, "training step");
        (cost, accuracy)
    }
}
