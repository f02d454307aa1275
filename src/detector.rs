//! Autoencoder anomaly detector.
//!
//! The detector reconstructs each feature vector through an [`Encoder`] and a
//! [`Decoder`]. Samples the model reconstructs well resemble the normal data
//! its weights were fitted on; a large reconstruction error flags an anomaly.
//!
//! # Polarity
//!
//! [`anomaly_predict`] returns `true` for samples whose error is *below* the
//! threshold, i.e. `true` means "normal".
//!
//! # Example
//!
//! ```
//! use buoy_anomaly::{anomaly_predict, AnomalyDetector, DetectorConfig};
//! use nalgebra::DMatrix;
//!
//! let config = DetectorConfig::buoy(4);
//! let model = AnomalyDetector::new(&config, 42)?;
//!
//! let batch = DMatrix::from_element(3, 4, 0.5);
//! let normal = anomaly_predict(&model, &batch, config.threshold)?;
//! assert_eq!(normal.len(), 3);
//! # Ok::<(), buoy_anomaly::DetectorError>(())
//! ```

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{DetectorError, Result};

/// A model that maps a batch of feature vectors to same-shaped reconstructions.
pub trait Reconstruct {
    /// Reconstruct a row-major `(n, width)` batch.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the batch width is not theirs.
    fn reconstruct(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>>;
}

/// Encoder/decoder pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyDetector {
    encoder: Encoder,
    decoder: Decoder,
}

impl AnomalyDetector {
    /// Build a detector with seeded Xavier initialisation.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: &DetectorConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let encoder = Encoder::new(config, &mut rng)?;
        let decoder = Decoder::new(config, &mut rng)?;
        debug!(
            input_width = config.input_width,
            latent_width = config.latent_width(),
            seed,
            "initialised anomaly detector"
        );
        Ok(Self { encoder, decoder })
    }

    /// Assemble a detector from fitted stages.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the decoder does not read
    /// the encoder's latent width or does not restore its input width.
    pub fn from_stages(encoder: Encoder, decoder: Decoder) -> Result<Self> {
        if decoder.input_width() != encoder.output_width() {
            return Err(DetectorError::invalid_config(format!(
                "decoder reads {} latent units, encoder produces {}",
                decoder.input_width(),
                encoder.output_width()
            )));
        }
        if decoder.output_width() != encoder.input_width() {
            return Err(DetectorError::invalid_config(format!(
                "decoder restores {} features, encoder reads {}",
                decoder.output_width(),
                encoder.input_width()
            )));
        }
        Ok(Self { encoder, decoder })
    }

    /// Encode then decode a batch.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::FeatureWidthMismatch`] on a wrong batch width.
    pub fn call(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let encoded = self.encoder.forward(data)?;
        self.decoder.forward(&encoded)
    }

    /// Latent codes of a batch.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::FeatureWidthMismatch`] on a wrong batch width.
    pub fn encode(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.encoder.forward(data)
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.encoder.input_width()
    }

    #[must_use]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}

impl Reconstruct for AnomalyDetector {
    fn reconstruct(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.call(data)
    }
}

/// Per-sample mean absolute error between `data` and its reconstruction.
///
/// # Errors
///
/// Propagates the model's error, or returns
/// [`DetectorError::InvalidInput`] if the reconstruction shape differs from
/// the input shape.
pub fn reconstruction_errors<M: Reconstruct + ?Sized>(
    model: &M,
    data: &DMatrix<f64>,
) -> Result<DVector<f64>> {
    let reconstructions = model.reconstruct(data)?;
    if reconstructions.shape() != data.shape() {
        return Err(DetectorError::invalid_input(format!(
            "reconstruction shape {:?} differs from input shape {:?}",
            reconstructions.shape(),
            data.shape()
        )));
    }

    let width = data.ncols() as f64;
    Ok(DVector::from_iterator(
        data.nrows(),
        data.row_iter()
            .zip(reconstructions.row_iter())
            .map(|(x, r)| x.iter().zip(r.iter()).map(|(a, b)| (a - b).abs()).sum::<f64>() / width),
    ))
}

/// Classify each sample by reconstruction error.
///
/// # Returns
///
/// One boolean per row of `data`: `true` when the sample's mean absolute
/// reconstruction error is strictly below `threshold` (the sample looks
/// normal). `NaN` errors compare false.
///
/// # Errors
///
/// Propagates errors from [`reconstruction_errors`].
pub fn anomaly_predict<M: Reconstruct + ?Sized>(
    model: &M,
    data: &DMatrix<f64>,
    threshold: f64,
) -> Result<Vec<bool>> {
    let errors = reconstruction_errors(model, data)?;
    let normal: Vec<bool> = errors.iter().map(|&e| e < threshold).collect();
    debug!(
        samples = normal.len(),
        normal = normal.iter().filter(|&&n| n).count(),
        threshold,
        "classified samples"
    );
    Ok(normal)
}

/// Threshold one standard deviation above the mean of a reference error
/// distribution, typically the errors on known-normal training data.
///
/// # Errors
///
/// Returns [`DetectorError::EmptyInput`] when `errors` is empty.
pub fn suggest_threshold(errors: &DVector<f64>) -> Result<f64> {
    if errors.is_empty() {
        return Err(DetectorError::empty_input(
            "threshold needs at least one reference error",
        ));
    }
    // Population std, matching numpy's default
    let mean = errors.mean();
    let var = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / errors.len() as f64;
    Ok(mean + var.sqrt())
}
