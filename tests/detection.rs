//! End-to-end detection tests: pooled features through the autoencoder and
//! the stats report.

use std::collections::BTreeSet;

use approx::assert_relative_eq;
use buoy_anomaly::{
    anomaly_predict, pool_data_variables, print_stats, reconstruction_errors, suggest_threshold,
    AnomalyDetector, ClassificationStats, DetectorConfig, DetectorError, PoolingOptions,
    Reconstruct, Result, TrajectoryDataset,
};
use nalgebra::DMatrix;

/// Reconstructs every sample as the per-feature mean of a reference batch,
/// the simplest "fitted on normal data" model.
struct MeanModel {
    means: Vec<f64>,
}

impl MeanModel {
    fn fit(normal: &DMatrix<f64>) -> Self {
        let means = normal.column_iter().map(|c| c.mean()).collect();
        Self { means }
    }
}

impl Reconstruct for MeanModel {
    fn reconstruct(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if data.ncols() != self.means.len() {
            return Err(DetectorError::feature_width_mismatch(
                self.means.len(),
                data.ncols(),
            ));
        }
        Ok(DMatrix::from_fn(data.nrows(), data.ncols(), |_, j| {
            self.means[j]
        }))
    }
}

/// Four buoys with scaled temp/salinity; buoy 3 drifts into a warm eddy.
fn fleet() -> TrajectoryDataset {
    let n_times = 24;
    let time = DMatrix::from_fn(4, n_times, |t, s| {
        if t == 1 && s % 5 == 0 {
            f64::NAN
        } else {
            s as f64
        }
    });
    let temp = DMatrix::from_fn(4, n_times, |t, s| {
        let wiggle = ((s as f64) * 0.7).sin() * 0.02;
        if t == 3 && s >= 12 {
            0.9 + wiggle
        } else {
            0.3 + wiggle
        }
    });
    let sal = DMatrix::from_fn(4, n_times, |_, s| 0.5 + ((s as f64) * 0.3).cos() * 0.02);

    TrajectoryDataset::from_time(time)
        .with_variable("temp", temp)
        .unwrap()
        .with_variable("sal", sal)
        .unwrap()
}

#[test]
fn test_normal_buoys_separate_eddy() {
    let ds = fleet();
    let options = PoolingOptions::default();

    let train = pool_data_variables(&ds, &["temp", "sal"], &BTreeSet::from([3]), &options).unwrap();
    let model = MeanModel::fit(&train.features());
    let train_errors = reconstruction_errors(&model, &train.features()).unwrap();

    // Margin above the worst training error keeps every normal row normal
    let threshold = train_errors.max() * 1.5;
    assert!(suggest_threshold(&train_errors).unwrap() <= threshold);

    let test = pool_data_variables(&ds, &["temp", "sal"], &BTreeSet::new(), &options).unwrap();
    let normal = anomaly_predict(&model, &test.features(), threshold).unwrap();
    assert_eq!(normal.len(), test.n_rows());

    // Ground truth: the second half of buoy 3 is anomalous
    let temp = test.column("temp").unwrap();
    let labels: Vec<bool> = (0..test.n_rows()).map(|row| temp[row] < 0.6).collect();

    let stats = print_stats(&normal, &labels).unwrap();
    assert_relative_eq!(stats.recall, 1.0);
    assert_relative_eq!(stats.precision, 1.0);
}

#[test]
fn test_autoencoder_over_pooled_features() {
    let ds = fleet();
    let table = pool_data_variables(
        &ds,
        &["temp", "sal"],
        &BTreeSet::new(),
        &PoolingOptions::default(),
    )
    .unwrap();

    let config = DetectorConfig::buoy(2);
    let model = AnomalyDetector::new(&config, 2024).unwrap();
    let features = table.features();

    let recon = model.call(&features).unwrap();
    assert_eq!(recon.shape(), features.shape());
    assert!(recon.iter().all(|&v| v > 0.0 && v < 1.0));

    // Sigmoid outputs and inputs both lie in [0, 1]
    let errors = reconstruction_errors(&model, &features).unwrap();
    assert!(errors.iter().all(|&e| (0.0..=1.0).contains(&e)));

    // Every sample is normal once the threshold clears the worst error
    let normal = anomaly_predict(&model, &features, errors.max() + 1e-9).unwrap();
    assert!(normal.iter().all(|&n| n));
}

#[test]
fn test_default_model_width() {
    let model = AnomalyDetector::new(&DetectorConfig::ecg(), 1).unwrap();
    assert_eq!(model.input_width(), 140);

    let batch = DMatrix::from_fn(10, 140, |i, j| ((i + j) % 7) as f64 / 7.0);
    let normal = anomaly_predict(&model, &batch, 0.5).unwrap();
    assert_eq!(normal.len(), 10);

    let err = anomaly_predict(&model, &DMatrix::zeros(10, 2), 0.5).unwrap_err();
    assert!(matches!(err, DetectorError::FeatureWidthMismatch { expected: 140, actual: 2 }));
}

#[test]
fn test_identical_predictions_score_perfectly() {
    let labels = vec![true, true, false, true, false, false];
    let stats = ClassificationStats::compute(&labels, &labels).unwrap();
    assert_eq!(
        stats,
        ClassificationStats {
            accuracy: 1.0,
            precision: 1.0,
            recall: 1.0,
        }
    );
    assert_eq!(
        stats.to_string(),
        "Accuracy = 1.0\nPrecision = 1.0\nRecall = 1.0"
    );
}
