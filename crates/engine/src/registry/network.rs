//! Feed-forward networks backing registry models
//!
//! Architecture tags only change layer composition and capacity; every
//! network accepts the same fixed-width feature vector and exposes the same
//! train/predict calling convention. Regression heads use linear activation
//! with squared-error loss, classification heads use softmax with
//! categorical cross-entropy.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Architecture, TaskKind};

/// Sequence length the `lstm`/`cnn` tags fold the feature vector into.
/// Inputs are zero-padded to a multiple of this before the dense stack.
pub const SEQUENCE_STEPS: usize = 4;

const SOFTMAX_EPS: f32 = 1e-9;

/// Per-layer activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Softmax,
}

/// One fully connected layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DenseLayer {
    weights: Array2<f32>,
    biases: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn new(inputs: usize, outputs: usize, activation: Activation, rng: &mut StdRng) -> Self {
        // He-style init keeps relu stacks from collapsing at depth.
        let scale = (2.0 / inputs as f32).sqrt();
        let weights = Array2::from_shape_fn((outputs, inputs), |_| {
            (rng.gen::<f32>() * 2.0 - 1.0) * scale
        });
        let biases = Array1::zeros(outputs);
        Self {
            weights,
            biases,
            activation,
        }
    }

    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let z = self.weights.dot(input) + &self.biases;
        apply_activation(z, self.activation)
    }
}

fn apply_activation(z: Array1<f32>, activation: Activation) -> Array1<f32> {
    match activation {
        Activation::Linear => z,
        Activation::Relu => z.mapv(|v| v.max(0.0)),
        Activation::Softmax => {
            let max = z.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let exp = z.mapv(|v| (v - max).exp());
            let sum = exp.sum().max(SOFTMAX_EPS);
            exp / sum
        }
    }
}

/// Derivative with respect to pre-activation, expressed through the
/// activation output (valid for linear and relu; softmax is folded into the
/// cross-entropy delta and never differentiated here).
fn activation_grad(output: &Array1<f32>, activation: Activation) -> Array1<f32> {
    match activation {
        Activation::Linear | Activation::Softmax => Array1::ones(output.len()),
        Activation::Relu => output.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
    }
}

/// Per-feature z-score scaling fitted on the training rows. Raw domain
/// features span several orders of magnitude (hours vs ratios); training
/// on them unscaled destabilizes gradient descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Standardizer {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl Standardizer {
    fn fit(rows: &[Vec<f32>], width: usize) -> Self {
        let n = rows.len().max(1) as f32;
        let mut means = vec![0.0_f32; width];
        for row in rows {
            for (m, &v) in means.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in means.iter_mut() {
            *m /= n;
        }

        let mut stds = vec![0.0_f32; width];
        for row in rows {
            for ((s, m), &v) in stds.iter_mut().zip(means.iter()).zip(row.iter()) {
                let d = v - m;
                *s += d * d;
            }
        }
        for s in stds.iter_mut() {
            *s = (*s / n).sqrt();
            // Constant features scale to zero deviation, not to infinity.
            if *s < 1e-6 {
                *s = 1.0;
            }
        }

        Self { means, stds }
    }

    fn apply(&self, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// Trainable feed-forward network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForward {
    layers: Vec<DenseLayer>,
    task: TaskKind,
    input_width: usize,
    /// Width after sequence padding; equals `input_width` for dense tags.
    padded_width: usize,
    /// Fitted during training; identity until then.
    scaler: Option<Standardizer>,
}

impl FeedForward {
    /// Build a network for the given architecture tag.
    pub fn new(
        architecture: Architecture,
        task: TaskKind,
        input_width: usize,
        output_width: usize,
        rng: &mut StdRng,
    ) -> Self {
        let padded_width = match architecture {
            Architecture::Lstm | Architecture::Cnn => pad_to_steps(input_width),
            _ => input_width,
        };
        let hidden = architecture.hidden_plan();

        let output_activation = match task {
            TaskKind::Classification => Activation::Softmax,
            _ => Activation::Linear,
        };

        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut width = padded_width;
        for &h in &hidden {
            layers.push(DenseLayer::new(width, h, Activation::Relu, rng));
            width = h;
        }
        layers.push(DenseLayer::new(width, output_width, output_activation, rng));

        Self {
            layers,
            task,
            input_width,
            padded_width,
            scaler: None,
        }
    }

    /// Fits the per-feature standardizer on the training rows. Called once
    /// per training run, before the first epoch.
    pub fn fit_scaler(&mut self, rows: &[Vec<f32>]) {
        self.scaler = Some(Standardizer::fit(rows, self.input_width));
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn output_width(&self) -> usize {
        self.layers
            .last()
            .map(|l| l.biases.len())
            .unwrap_or_default()
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    fn pad_input(&self, input: &[f32]) -> Array1<f32> {
        let scaled = match &self.scaler {
            Some(scaler) => scaler.apply(input),
            None => input.to_vec(),
        };
        let mut padded = Array1::zeros(self.padded_width);
        for (i, &v) in scaled.iter().enumerate() {
            padded[i] = v;
        }
        padded
    }

    /// Run inference on one feature vector. The caller guarantees the width
    /// matches `input_width`.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut activation = self.pad_input(input);
        for layer in &self.layers {
            activation = layer.forward(&activation);
        }
        activation.to_vec()
    }

    /// Loss for one example under the task's loss function.
    pub fn loss(&self, output: &[f32], target: &[f32]) -> f32 {
        match self.task {
            TaskKind::Classification => {
                // Categorical cross-entropy.
                -target
                    .iter()
                    .zip(output.iter())
                    .map(|(t, p)| t * (p.max(SOFTMAX_EPS)).ln())
                    .sum::<f32>()
            }
            _ => {
                // Mean squared error.
                let n = output.len().max(1) as f32;
                output
                    .iter()
                    .zip(target.iter())
                    .map(|(o, t)| (o - t) * (o - t))
                    .sum::<f32>()
                    / n
            }
        }
    }

    /// Mean loss over a set of rows.
    pub fn mean_loss(&self, rows: &[Vec<f32>], targets: &[Vec<f32>]) -> f32 {
        if rows.is_empty() {
            return 0.0;
        }
        let total: f32 = rows
            .iter()
            .zip(targets.iter())
            .map(|(row, target)| self.loss(&self.forward(row), target))
            .sum();
        total / rows.len() as f32
    }

    /// One gradient-descent step over a mini-batch. Gradients are averaged
    /// across the batch before the update.
    pub fn train_batch(&mut self, rows: &[Vec<f32>], targets: &[Vec<f32>], learning_rate: f32) {
        if rows.is_empty() {
            return;
        }

        let mut weight_grads: Vec<Array2<f32>> = self
            .layers
            .iter()
            .map(|l| Array2::zeros(l.weights.raw_dim()))
            .collect();
        let mut bias_grads: Vec<Array1<f32>> = self
            .layers
            .iter()
            .map(|l| Array1::zeros(l.biases.len()))
            .collect();

        for (row, target) in rows.iter().zip(targets.iter()) {
            // Forward pass, caching every activation.
            let mut activations = Vec::with_capacity(self.layers.len() + 1);
            activations.push(self.pad_input(row));
            for layer in &self.layers {
                let next = layer.forward(activations.last().unwrap());
                activations.push(next);
            }

            // Output delta. Both softmax+cross-entropy and linear+MSE reduce
            // to (output - target) at the final pre-activation.
            let output = activations.last().unwrap();
            let target = Array1::from_vec(target.clone());
            let mut delta = output - &target;

            for (idx, layer) in self.layers.iter().enumerate().rev() {
                let prev = &activations[idx];
                let delta_col = delta.clone().insert_axis(Axis(1));
                let prev_row = prev.clone().insert_axis(Axis(0));
                weight_grads[idx] = &weight_grads[idx] + &delta_col.dot(&prev_row);
                bias_grads[idx] = &bias_grads[idx] + &delta;

                if idx > 0 {
                    let upstream = layer.weights.t().dot(&delta);
                    let grad = activation_grad(prev, self.layers[idx - 1].activation);
                    delta = upstream * grad;
                }
            }
        }

        let step = learning_rate / rows.len() as f32;
        for (idx, layer) in self.layers.iter_mut().enumerate() {
            layer.weights = &layer.weights - &(&weight_grads[idx] * step);
            layer.biases = &layer.biases - &(&bias_grads[idx] * step);
        }
    }
}

fn pad_to_steps(width: usize) -> usize {
    width.div_ceil(SEQUENCE_STEPS) * SEQUENCE_STEPS
}
