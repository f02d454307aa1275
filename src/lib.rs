//! Buoy Anomaly Library
//!
//! Anomaly detection over drifting-buoy trajectory data.
//!
//! The crate has two halves:
//!
//! - **Pooling**: flattens a trajectory-indexed dataset (`(trajectory, time)`
//!   arrays sharing one time coordinate) into a row-per-observation table,
//!   keeping the source trajectory of every row in a trailing `KVS_ID` column.
//! - **Detection**: an encoder/decoder autoencoder whose per-sample mean
//!   absolute reconstruction error is compared against a threshold, plus
//!   accuracy/precision/recall reporting against ground truth.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::BTreeSet;
//! use buoy_anomaly::{
//!     anomaly_predict, pool_data_variables, AnomalyDetector, DetectorConfig, PoolingOptions,
//!     TrajectoryDataset,
//! };
//! use nalgebra::DMatrix;
//!
//! let time = DMatrix::from_row_slice(2, 3, &[0.0, 1.0, f64::NAN, 0.0, 1.0, 2.0]);
//! let ds = TrajectoryDataset::from_time(time)
//!     .with_variable("temp", DMatrix::from_element(2, 3, 0.4))?
//!     .with_variable("sal", DMatrix::from_element(2, 3, 0.6))?;
//!
//! let table = pool_data_variables(&ds, &["temp", "sal"], &BTreeSet::new(), &PoolingOptions::default())?;
//! assert_eq!(table.n_rows(), 5);
//!
//! let config = DetectorConfig::buoy(2);
//! let model = AnomalyDetector::new(&config, 7)?;
//! let normal = anomaly_predict(&model, &table.features(), config.threshold)?;
//! assert_eq!(normal.len(), 5);
//! # Ok::<(), buoy_anomaly::DetectorError>(())
//! ```
//!
//! # Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber.
//! Verbose pooling reports per-trajectory progress at `info` level.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod dataset;
pub mod decoder;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod layers;
pub mod pooling;
pub mod stats;
pub mod table;

// Re-exports for convenient access
pub use config::{DetectorConfig, PoolingOptions, DEFAULT_INPUT_WIDTH, TRAJECTORY_COLUMN};
pub use dataset::{TrajectoryDataset, TIME_VARIABLE};
pub use decoder::Decoder;
pub use detector::{
    anomaly_predict, reconstruction_errors, suggest_threshold, AnomalyDetector, Reconstruct,
};
pub use encoder::Encoder;
pub use error::{DetectorError, Result};
pub use layers::{Activation, Dense, Stage};
pub use pooling::{pool_data_array, pool_data_variable, pool_data_variables};
pub use stats::{print_stats, ClassificationStats};
pub use table::PooledTable;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
