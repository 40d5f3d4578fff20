//! 单隐层神经网络
//!
//! 输入和数值目标都先线性缩放到 [-1, 1]。隐层使用 sigmoid 激活；回归时输出层是线性的，分类时输出层对三个标签做 softmax。
//! 两种输出层的梯度都是「输出减目标」。每个周期在整张表上取平均梯度，用带动量的梯度下降更新权重。
//! 初始权重由给定的种子生成，所以同一张表总是训练出同一个网络。

use super::{Classifier, ClassifyingTrainSet, Regressor, TrainSet, MIN_TRAINING_ROWS};
use crate::comparators::Dominance;
use crate::Error;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const INITIAL_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden: 4,
            learning_rate: 0.5,
            momentum: 0.3,
            epochs: 100,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    Regression,
    Classification,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
}

impl Span {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Span {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |span, v| Span {
                min: span.min.min(v),
                max: span.max.max(v),
            },
        )
    }

    fn normalize(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width > 0.0 {
            2.0 * (value - self.min) / width - 1.0
        } else {
            0.0
        }
    }

    fn denormalize(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width > 0.0 {
            (value + 1.0) / 2.0 * width + self.min
        } else {
            self.min
        }
    }
}

#[derive(Debug, Clone)]
struct Layer {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl Layer {
    fn random(outputs: usize, inputs: usize, rng: &mut StdRng) -> Self {
        let weights = Array2::from_shape_fn((outputs, inputs), |_| {
            rng.random_range(-INITIAL_WEIGHT..INITIAL_WEIGHT)
        });
        let bias = Array1::from_shape_fn(outputs, |_| {
            rng.random_range(-INITIAL_WEIGHT..INITIAL_WEIGHT)
        });
        Self { weights, bias }
    }

    fn zeros_like(other: &Layer) -> Self {
        Self {
            weights: Array2::zeros(other.weights.raw_dim()),
            bias: Array1::zeros(other.bias.raw_dim()),
        }
    }

    fn accumulate(&mut self, delta: &Array1<f64>, input: ArrayView1<f64>) {
        for (i, d) in delta.iter().enumerate() {
            self.weights.row_mut(i).scaled_add(*d, &input);
        }
        self.bias += delta;
    }

    /// 动量更新：v ← μv − η·g，w ← w + v
    fn step(&mut self, velocity: &mut Layer, gradient: &Layer, rate: f64, momentum: f64) {
        velocity.weights.mapv_inplace(|v| v * momentum);
        velocity.weights.scaled_add(-rate, &gradient.weights);
        velocity.bias.mapv_inplace(|v| v * momentum);
        velocity.bias.scaled_add(-rate, &gradient.bias);
        self.weights += &velocity.weights;
        self.bias += &velocity.bias;
    }
}

#[derive(Debug, Clone)]
struct Trained {
    hidden: Layer,
    output: Layer,
    inputs: Vec<Span>,
    target: Span,
}

#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    config: NetworkConfig,
    head: Head,
    trained: Option<Trained>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(z: Array1<f64>) -> Array1<f64> {
    let max = z.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp = z.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

impl NeuralNetwork {
    /// 一个数值输出的回归网络
    pub fn regressor(config: NetworkConfig) -> Self {
        Self {
            config,
            head: Head::Regression,
            trained: None,
        }
    }

    /// 三个输出的分类网络，输出顺序同 [`Dominance::LABELS`]
    pub fn classifier(config: NetworkConfig) -> Self {
        Self {
            config,
            head: Head::Classification,
            trained: None,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    fn forward(&self, trained: &Trained, input: ArrayView1<f64>) -> (Array1<f64>, Array1<f64>) {
        let hidden = (trained.hidden.weights.dot(&input) + &trained.hidden.bias).mapv(sigmoid);
        let z = trained.output.weights.dot(&hidden) + &trained.output.bias;
        let output = match self.head {
            Head::Regression => z,
            Head::Classification => softmax(z),
        };
        (hidden, output)
    }

    fn normalized_input(&self, trained: &Trained, features: &[f64]) -> Result<Array1<f64>, Error> {
        if features.len() != trained.inputs.len() {
            return Err(Error::DimensionMismatch {
                expected: trained.inputs.len(),
                found: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(&trained.inputs)
            .map(|(v, span)| span.normalize(*v))
            .collect())
    }

    fn train(&mut self, features: &[Vec<f64>], targets: Array2<f64>, target: Span) -> Result<(), Error> {
        let rows = features.len();
        if rows < MIN_TRAINING_ROWS {
            return Err(Error::NotTrained {
                rows,
                required: MIN_TRAINING_ROWS,
            });
        }
        if self.config.hidden == 0 {
            return Err(Error::InvalidConfig("神经网络的隐层至少需要一个单元".to_string()));
        }
        let width = features[0].len();
        let spans: Vec<Span> = (0..width)
            .map(|j| Span::of(features.iter().map(|row| row[j])))
            .collect();
        let inputs = Array2::from_shape_fn((rows, width), |(i, j)| spans[j].normalize(features[i][j]));
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let hidden = Layer::random(self.config.hidden, width, &mut rng);
        let output = Layer::random(targets.ncols(), self.config.hidden, &mut rng);
        let mut trained = Trained {
            hidden,
            output,
            inputs: spans,
            target,
        };
        let mut hidden_velocity = Layer::zeros_like(&trained.hidden);
        let mut output_velocity = Layer::zeros_like(&trained.output);
        let rate = self.config.learning_rate / rows as f64;
        for _ in 0..self.config.epochs {
            let mut hidden_gradient = Layer::zeros_like(&trained.hidden);
            let mut output_gradient = Layer::zeros_like(&trained.output);
            for (input, expected) in inputs.rows().into_iter().zip(targets.rows()) {
                let (hidden, output) = self.forward(&trained, input);
                let delta = &output - &expected;
                let hidden_delta =
                    trained.output.weights.t().dot(&delta) * hidden.mapv(|h| h * (1.0 - h));
                output_gradient.accumulate(&delta, hidden.view());
                hidden_gradient.accumulate(&hidden_delta, input);
            }
            let momentum = self.config.momentum;
            trained
                .output
                .step(&mut output_velocity, &output_gradient, rate, momentum);
            trained
                .hidden
                .step(&mut hidden_velocity, &hidden_gradient, rate, momentum);
        }
        self.trained = Some(trained);
        Ok(())
    }

    fn untrained() -> Error {
        Error::NotTrained {
            rows: 0,
            required: MIN_TRAINING_ROWS,
        }
    }
}

impl Regressor for NeuralNetwork {
    fn fit(&mut self, train_set: &TrainSet) -> Result<(), Error> {
        let target = Span::of(train_set.targets().iter().copied());
        let targets = Array2::from_shape_fn((train_set.len(), 1), |(i, _)| {
            target.normalize(train_set.targets()[i])
        });
        self.train(train_set.features(), targets, target)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, Error> {
        let trained = self.trained.as_ref().ok_or_else(Self::untrained)?;
        let input = self.normalized_input(trained, features)?;
        let (_, output) = self.forward(trained, input.view());
        Ok(trained.target.denormalize(output[0]))
    }
}

impl Classifier for NeuralNetwork {
    fn fit(&mut self, train_set: &ClassifyingTrainSet) -> Result<(), Error> {
        let labels = train_set.labels();
        let targets = Array2::from_shape_fn((labels.len(), Dominance::LABELS.len()), |(i, k)| {
            if labels[i].label_index() == k {
                1.0
            } else {
                0.0
            }
        });
        let unit = Span { min: -1.0, max: 1.0 };
        self.train(train_set.features(), targets, unit)
    }

    fn distribution(&self, features: &[f64]) -> Result<[f64; 3], Error> {
        let trained = self.trained.as_ref().ok_or_else(Self::untrained)?;
        let input = self.normalized_input(trained, features)?;
        let (_, output) = self.forward(trained, input.view());
        Ok([output[0], output[1], output[2]])
    }
}
