//! State scoring for search guidance
//!
//! The value network was trained on sorted, zero-padded vectors of the
//! remaining numbers; [`extract_features`] reproduces that encoding exactly.
//! Higher score = more promising state (kept in the beam).

use crate::equation::solvable;
use crate::ir::NumberMultiset;
use safetensors::{Dtype, SafeTensors};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Width of the network input
pub const FEATURE_WIDTH: usize = 4;

/// Errors raised while loading scorer weights
#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("failed to read weights {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid safetensors blob: {0}")]
    SafeTensors(#[from] safetensors::SafeTensorError),

    #[error("missing tensor {0}")]
    MissingTensor(String),

    #[error("tensor {name} has dtype {dtype}, expected F32")]
    UnsupportedDtype { name: String, dtype: String },

    #[error("shape mismatch in {layer}: {reason}")]
    ShapeMismatch { layer: String, reason: String },

    #[error("no layers found")]
    Empty,
}

/// Result type for scorer operations
pub type ScorerResult<T> = Result<T, ScorerError>;

/// Encode remaining numbers as the network input
///
/// Ascending sort, zero padding at the end. Values past [`FEATURE_WIDTH`]
/// (largest first to go) are dropped.
pub fn extract_features(numbers: &NumberMultiset) -> [f32; FEATURE_WIDTH] {
    let mut features = [0.0f32; FEATURE_WIDTH];
    for (slot, value) in features.iter_mut().zip(numbers.sorted()) {
        *slot = value as f32;
    }
    features
}

/// Batch evaluator of remaining-number multisets
pub trait Scorer {
    /// One score per input, same order
    fn score_batch(&self, states: &[&NumberMultiset]) -> Vec<f32>;
}

impl<F> Scorer for F
where
    F: Fn(&NumberMultiset) -> f32,
{
    fn score_batch(&self, states: &[&NumberMultiset]) -> Vec<f32> {
        states.iter().map(|s| self(s)).collect()
    }
}

/// Weightless baseline: 1.0 when 24 is still reachable, 0.0 otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl Scorer for HeuristicScorer {
    fn score_batch(&self, states: &[&NumberMultiset]) -> Vec<f32> {
        states
            .iter()
            .map(|s| if solvable(s) { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Fully connected layer, row-major `[outputs, inputs]` weights
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    name: String,
    weight: Vec<f32>,
    bias: Vec<f32>,
    inputs: usize,
    outputs: usize,
}

impl DenseLayer {
    pub fn new(
        name: impl Into<String>,
        weight: Vec<f32>,
        bias: Vec<f32>,
        inputs: usize,
        outputs: usize,
    ) -> ScorerResult<Self> {
        let name = name.into();
        if weight.len() != inputs * outputs {
            return Err(ScorerError::ShapeMismatch {
                layer: name,
                reason: format!("{} weights for {}x{}", weight.len(), outputs, inputs),
            });
        }
        if bias.len() != outputs {
            return Err(ScorerError::ShapeMismatch {
                layer: name,
                reason: format!("{} biases for {} outputs", bias.len(), outputs),
            });
        }
        Ok(Self {
            name,
            weight,
            bias,
            inputs,
            outputs,
        })
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        (0..self.outputs)
            .map(|o| {
                let row = &self.weight[o * self.inputs..(o + 1) * self.inputs];
                self.bias[o] + row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>()
            })
            .collect()
    }
}

/// The pretrained value network: dense layers with ReLU in between
///
/// Read-only once loaded.
#[derive(Debug, Clone)]
pub struct MlpScorer {
    layers: Vec<DenseLayer>,
}

impl MlpScorer {
    /// Build from layers, checking that the shapes chain from
    /// [`FEATURE_WIDTH`] inputs to a single output
    pub fn new(layers: Vec<DenseLayer>) -> ScorerResult<Self> {
        let Some(last) = layers.last() else {
            return Err(ScorerError::Empty);
        };

        let mut expected = FEATURE_WIDTH;
        for layer in &layers {
            if layer.inputs != expected {
                return Err(ScorerError::ShapeMismatch {
                    layer: layer.name.clone(),
                    reason: format!("expects {} inputs, previous layer gives {}", layer.inputs, expected),
                });
            }
            expected = layer.outputs;
        }

        if last.outputs != 1 {
            return Err(ScorerError::ShapeMismatch {
                layer: last.name.clone(),
                reason: format!("final layer has {} outputs, expected 1", last.outputs),
            });
        }

        Ok(Self { layers })
    }

    /// Load from a safetensors file
    pub fn load<P: AsRef<Path>>(path: P) -> ScorerResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ScorerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Load from an in-memory safetensors blob
    ///
    /// Every `<layer>.weight` needs a matching `<layer>.bias`; layers run in
    /// order of the numbers in their names (`fc1`, `fc2`, ... or `net.0`, `net.2`, ...).
    pub fn from_bytes(bytes: &[u8]) -> ScorerResult<Self> {
        let tensors = SafeTensors::deserialize(bytes)?;

        let mut prefixes: Vec<String> = tensors
            .names()
            .into_iter()
            .filter_map(|name| name.strip_suffix(".weight").map(str::to_string))
            .collect();
        prefixes.sort_by(|a, b| layer_key(a).cmp(&layer_key(b)).then_with(|| a.cmp(b)));

        let mut layers = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            let weight_name = format!("{}.weight", prefix);
            let bias_name = format!("{}.bias", prefix);

            let (weight, weight_shape) = read_f32(&tensors, &weight_name)?;
            let (bias, _) = read_f32(&tensors, &bias_name)?;

            let [outputs, inputs] = weight_shape[..] else {
                return Err(ScorerError::ShapeMismatch {
                    layer: prefix,
                    reason: format!("weight has rank {}, expected 2", weight_shape.len()),
                });
            };

            layers.push(DenseLayer::new(prefix, weight, bias, inputs, outputs)?);
        }

        Self::new(layers)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Score one feature vector
    pub fn forward(&self, features: &[f32; FEATURE_WIDTH]) -> f32 {
        let mut activation = features.to_vec();
        let last = self.layers.len() - 1;
        for (idx, layer) in self.layers.iter().enumerate() {
            activation = layer.forward(&activation);
            if idx < last {
                activation.iter_mut().for_each(|v| *v = v.max(0.0));
            }
        }
        activation[0]
    }
}

impl Scorer for MlpScorer {
    fn score_batch(&self, states: &[&NumberMultiset]) -> Vec<f32> {
        states
            .iter()
            .map(|s| self.forward(&extract_features(s)))
            .collect()
    }
}

/// Numeric parts of a layer name, for natural ordering
fn layer_key(prefix: &str) -> Vec<u64> {
    prefix
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

fn read_f32(tensors: &SafeTensors<'_>, name: &str) -> ScorerResult<(Vec<f32>, Vec<usize>)> {
    let view = tensors
        .tensor(name)
        .map_err(|_| ScorerError::MissingTensor(name.to_string()))?;

    if view.dtype() != Dtype::F32 {
        return Err(ScorerError::UnsupportedDtype {
            name: name.to_string(),
            dtype: format!("{:?}", view.dtype()),
        });
    }

    let values = view
        .data()
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((values, view.shape().to_vec()))
}

/// Value network when weights are given, heuristic baseline otherwise
pub fn load_scorer(weights: Option<&Path>) -> ScorerResult<Box<dyn Scorer>> {
    match weights {
        Some(path) => {
            let scorer = MlpScorer::load(path)?;
            log::info!("Loaded value network ({} layers) from {}", scorer.num_layers(), path.display());
            Ok(Box::new(scorer))
        }
        None => {
            log::info!("No scorer weights configured, using solvability heuristic");
            Ok(Box::new(HeuristicScorer))
        }
    }
}
