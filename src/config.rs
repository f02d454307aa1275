//! Configuration for pooling and the autoencoder detector.
//!
//! [`DetectorConfig`] centralizes the layer widths and the anomaly threshold,
//! with presets for the common feature layouts. [`PoolingOptions`] carries the
//! knobs of [`pool_data_variables`](crate::pooling::pool_data_variables).
//!
//! # Example
//!
//! ```
//! use buoy_anomaly::{DetectorConfig, PoolingOptions};
//!
//! let config = DetectorConfig::default();
//! assert_eq!(config.input_width, 140);
//!
//! let buoy = DetectorConfig::buoy(6).with_threshold(0.1);
//! assert!(buoy.validate().is_ok());
//!
//! let options = PoolingOptions::default().verbose();
//! assert_eq!(options.trajectory_column, "KVS_ID");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};

/// Default name of the trailing trajectory-index column.
pub const TRAJECTORY_COLUMN: &str = "KVS_ID";

/// Default feature width of the detector.
pub const DEFAULT_INPUT_WIDTH: usize = 140;

/// Configuration for the autoencoder anomaly detector.
///
/// # Layer Layout
///
/// - `encoder_widths`: output widths of the encoder layers, progressively smaller.
/// - `decoder_hidden_widths`: output widths of the hidden decoder layers. The
///   final decoder layer always maps back to `input_width` with a sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Width of each input feature vector.
    pub input_width: usize,

    /// Output widths of the encoder's ReLU layers.
    pub encoder_widths: Vec<usize>,

    /// Output widths of the decoder's hidden ReLU layers.
    pub decoder_hidden_widths: Vec<usize>,

    /// Reconstruction error below which a sample counts as normal.
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_WIDTH,
            encoder_widths: vec![32, 16, 8],
            decoder_hidden_widths: vec![16, 32],
            threshold: 0.05,
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any width is zero, the encoder is empty, or the
    /// threshold is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.input_width == 0 {
            return Err(DetectorError::invalid_config("input_width must be positive"));
        }
        if self.encoder_widths.is_empty() {
            return Err(DetectorError::invalid_config(
                "encoder_widths must name at least one layer",
            ));
        }
        if self
            .encoder_widths
            .iter()
            .chain(self.decoder_hidden_widths.iter())
            .any(|&w| w == 0)
        {
            return Err(DetectorError::invalid_config("layer widths must be positive"));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(DetectorError::invalid_config(
                "threshold must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Width of the latent code produced by the encoder.
    #[must_use]
    pub fn latent_width(&self) -> usize {
        self.encoder_widths
            .last()
            .copied()
            .unwrap_or(self.input_width)
    }

    /// Preset matching the 140-sample heartbeat benchmark the architecture
    /// was first tuned on.
    #[must_use]
    pub fn ecg() -> Self {
        Self::default()
    }

    /// Preset for pooled buoy tables with `n_features` sensor columns.
    ///
    /// Narrow tables get a correspondingly narrow bottleneck so the encoder
    /// still reduces dimensionality at every layer.
    #[must_use]
    pub fn buoy(n_features: usize) -> Self {
        let n = n_features.max(1);
        let first = (n * 3 / 4).max(1);
        let second = (n / 2).max(1);
        let latent = (n / 4).max(1);
        Self {
            input_width: n,
            encoder_widths: vec![first, second, latent],
            decoder_hidden_widths: vec![second, first],
            ..Self::default()
        }
    }

    /// Set the input feature width.
    #[must_use]
    pub fn with_input_width(mut self, width: usize) -> Self {
        self.input_width = width;
        self
    }

    /// Set the anomaly threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Options for [`pool_data_variables`](crate::pooling::pool_data_variables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolingOptions {
    /// Emit per-trajectory progress events at `info` level.
    pub verbose: bool,

    /// Name of the trailing trajectory-index column.
    pub trajectory_column: String,
}

impl Default for PoolingOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            trajectory_column: TRAJECTORY_COLUMN.to_string(),
        }
    }
}

impl PoolingOptions {
    /// Enable verbose progress output.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Rename the trailing trajectory-index column.
    #[must_use]
    pub fn with_trajectory_column(mut self, name: impl Into<String>) -> Self {
        self.trajectory_column = name.into();
        self
    }
}
