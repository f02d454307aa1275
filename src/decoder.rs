//! Decoder half of the autoencoder.
//!
//! The decoder expands a latent code back to the original feature width
//! through ReLU hidden layers (16 → 32 by default) and a final sigmoid layer,
//! so every reconstructed feature lies in `(0, 1)`. Inputs are expected to be
//! min-max scaled to the same range before they reach the model.

use nalgebra::DMatrix;
use rand::Rng;

use crate::config::DetectorConfig;
use crate::error::{DetectorError, Result};
use crate::layers::{Activation, Stage};

/// Dimensionality-expanding stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder {
    stage: Stage,
}

impl Decoder {
    /// Xavier-initialised decoder mirroring `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new<R: Rng>(config: &DetectorConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let mut widths = config.decoder_hidden_widths.clone();
        widths.push(config.input_width);
        let mut activations = vec![Activation::Relu; config.decoder_hidden_widths.len()];
        activations.push(Activation::Sigmoid);

        let stage = Stage::xavier(config.latent_width(), &widths, &activations, rng)?;
        Ok(Self { stage })
    }

    /// Wrap an existing stage.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the stage narrows its input.
    pub fn from_stage(stage: Stage) -> Result<Self> {
        if stage.output_width() < stage.input_width() {
            return Err(DetectorError::invalid_config(format!(
                "decoder narrows {} features to {}",
                stage.input_width(),
                stage.output_width()
            )));
        }
        Ok(Self { stage })
    }

    /// Map `(n, latent_width)` codes to `(n, output_width)` reconstructions.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::FeatureWidthMismatch`] on a wrong code width.
    pub fn forward(&self, codes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.stage.forward(codes)
    }

    /// Width of the latent code it reads.
    #[must_use]
    pub fn input_width(&self) -> usize {
        self.stage.input_width()
    }

    #[must_use]
    pub fn output_width(&self) -> usize {
        self.stage.output_width()
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_widths() {
        let decoder =
            Decoder::new(&DetectorConfig::default(), &mut StdRng::seed_from_u64(0)).unwrap();
        let layers = decoder.stage().layers();
        let widths: Vec<usize> = layers.iter().map(|l| l.output_width()).collect();
        assert_eq!(decoder.input_width(), 8);
        assert_eq!(widths, vec![16, 32, 140]);
        assert_eq!(layers[2].activation(), Activation::Sigmoid);
    }

    #[test]
    fn test_output_is_bounded() {
        let decoder =
            Decoder::new(&DetectorConfig::default(), &mut StdRng::seed_from_u64(9)).unwrap();
        let out = decoder
            .forward(&DMatrix::from_fn(4, 8, |i, j| (i * j) as f64 - 5.0))
            .unwrap();
        assert_eq!(out.shape(), (4, 140));
        assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_rejects_narrowing_stage() {
        let mut rng = StdRng::seed_from_u64(0);
        let stage = Stage::xavier(4, &[2], &[Activation::Sigmoid], &mut rng).unwrap();
        assert!(Decoder::from_stage(stage).is_err());
    }
}
