//! Encoder half of the autoencoder.
//!
//! The encoder squeezes each feature vector through progressively narrower
//! ReLU layers (32 → 16 → 8 by default) down to the latent code.

use nalgebra::DMatrix;
use rand::Rng;

use crate::config::DetectorConfig;
use crate::error::{DetectorError, Result};
use crate::layers::{Activation, Stage};

/// Dimensionality-reducing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoder {
    stage: Stage,
}

impl Encoder {
    /// Xavier-initialised encoder with the widths of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new<R: Rng>(config: &DetectorConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let activations = vec![Activation::Relu; config.encoder_widths.len()];
        let stage = Stage::xavier(config.input_width, &config.encoder_widths, &activations, rng)?;
        Ok(Self { stage })
    }

    /// Wrap an existing stage.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the stage widens its input,
    /// which would make it no encoder at all.
    pub fn from_stage(stage: Stage) -> Result<Self> {
        if stage.output_width() > stage.input_width() {
            return Err(DetectorError::invalid_config(format!(
                "encoder widens {} features to {}",
                stage.input_width(),
                stage.output_width()
            )));
        }
        Ok(Self { stage })
    }

    /// Map a `(n, input_width)` batch to its `(n, latent_width)` codes.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::FeatureWidthMismatch`] on a wrong batch width.
    pub fn forward(&self, batch: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.stage.forward(batch)
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.stage.input_width()
    }

    /// Width of the latent code.
    #[must_use]
    pub fn output_width(&self) -> usize {
        self.stage.output_width()
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}
