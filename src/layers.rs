//! Dense layers and sequential stages.
//!
//! Batches are row-major: one sample per row, one feature per column. A
//! [`Dense`] layer maps a `(n, in)` batch to `(n, out)` as
//! `activation(x · Wᵀ + b)`, and a [`Stage`] chains layers in order.
//!
//! Layers derive `serde` so weights produced by an external trainer can be
//! handed over as JSON.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};

/// Element-wise activation applied after the affine map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Identity.
    #[default]
    Linear,
    /// `max(x, 0)`; `NaN` passes through.
    Relu,
    /// `1 / (1 + e^-x)`, bounded to `(0, 1)`.
    Sigmoid,
}

impl Activation {
    /// Apply the activation to a single value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            // f64::max would swallow NaN
            Self::Relu => {
                if x.is_nan() {
                    x
                } else {
                    x.max(0.0)
                }
            }
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// Fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DenseRaw")]
pub struct Dense {
    /// Weights shaped `(out, in)`.
    weights: DMatrix<f64>,
    /// Bias of length `out`.
    bias: DVector<f64>,
    activation: Activation,
}

impl Dense {
    /// Create a layer from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the bias length differs
    /// from the weight row count or either dimension is zero.
    pub fn new(weights: DMatrix<f64>, bias: DVector<f64>, activation: Activation) -> Result<Self> {
        if weights.nrows() == 0 || weights.ncols() == 0 {
            return Err(DetectorError::invalid_config("dense layer has a zero dimension"));
        }
        if bias.len() != weights.nrows() {
            return Err(DetectorError::invalid_config(format!(
                "bias length {} does not match {} output units",
                bias.len(),
                weights.nrows()
            )));
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    /// Glorot-uniform weights with zero bias.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if either width is zero.
    pub fn xavier<R: Rng>(
        input: usize,
        output: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self> {
        if input == 0 || output == 0 {
            return Err(DetectorError::invalid_config(format!(
                "dense layer {input} -> {output} has a zero dimension"
            )));
        }
        let limit = (6.0 / (input + output) as f64).sqrt();
        Ok(Self {
            weights: DMatrix::from_fn(output, input, |_, _| rng.gen_range(-limit..=limit)),
            bias: DVector::zeros(output),
            activation,
        })
    }

    /// Number of input features.
    #[must_use]
    pub fn input_width(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of output units.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Forward a row-major batch. The caller guarantees the width matches.
    #[must_use]
    pub fn forward(&self, batch: &DMatrix<f64>) -> DMatrix<f64> {
        debug_assert_eq!(batch.ncols(), self.input_width());
        let mut out = batch * self.weights.transpose();
        for (mut col, &b) in out.column_iter_mut().zip(self.bias.iter()) {
            col.add_scalar_mut(b);
        }
        let activation = self.activation;
        out.apply(|x| *x = activation.apply(*x));
        out
    }
}

/// Ordered chain of dense layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StageRaw")]
pub struct Stage {
    layers: Vec<Dense>,
}

/// Unchecked wire form of [`Dense`]; deserialization goes through [`Dense::new`].
#[derive(Deserialize)]
struct DenseRaw {
    weights: DMatrix<f64>,
    bias: DVector<f64>,
    activation: Activation,
}

impl TryFrom<DenseRaw> for Dense {
    type Error = DetectorError;

    fn try_from(raw: DenseRaw) -> Result<Self> {
        Self::new(raw.weights, raw.bias, raw.activation)
    }
}

/// Unchecked wire form of [`Stage`]; deserialization goes through [`Stage::new`].
#[derive(Deserialize)]
struct StageRaw {
    layers: Vec<Dense>,
}

impl TryFrom<StageRaw> for Stage {
    type Error = DetectorError;

    fn try_from(raw: StageRaw) -> Result<Self> {
        Self::new(raw.layers)
    }
}

impl Stage {
    /// Chain layers, checking that adjacent widths agree.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if `layers` is empty or a
    /// layer's input width differs from the previous layer's output width.
    pub fn new(layers: Vec<Dense>) -> Result<Self> {
        if layers.is_empty() {
            return Err(DetectorError::invalid_config("stage needs at least one layer"));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_width() != pair[1].input_width() {
                return Err(DetectorError::invalid_config(format!(
                    "layer {} outputs {} units but layer {} expects {}",
                    i,
                    pair[0].output_width(),
                    i + 1,
                    pair[1].input_width()
                )));
            }
        }
        Ok(Self { layers })
    }

    /// Build a stage of Xavier-initialised layers.
    ///
    /// `widths[i]` and `activations[i]` describe layer `i`; the first layer
    /// reads `input` features.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] on empty or mismatched layer descriptions.
    pub fn xavier<R: Rng>(
        input: usize,
        widths: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Result<Self> {
        if widths.len() != activations.len() {
            return Err(DetectorError::invalid_config(format!(
                "{} widths for {} activations",
                widths.len(),
                activations.len()
            )));
        }
        let mut layers = Vec::with_capacity(widths.len());
        let mut fan_in = input;
        for (&width, &activation) in widths.iter().zip(activations) {
            layers.push(Dense::xavier(fan_in, width, activation, rng)?);
            fan_in = width;
        }
        Self::new(layers)
    }

    #[must_use]
    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.layers[0].input_width()
    }

    #[must_use]
    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].output_width()
    }

    /// Forward a row-major batch through every layer.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::FeatureWidthMismatch`] if the batch width
    /// differs from the first layer's input width.
    pub fn forward(&self, batch: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if batch.ncols() != self.input_width() {
            return Err(DetectorError::feature_width_mismatch(
                self.input_width(),
                batch.ncols(),
            ));
        }
        let mut x = self.layers[0].forward(batch);
        for layer in &self.layers[1..] {
            x = layer.forward(&x);
        }
        Ok(x)
    }
}
