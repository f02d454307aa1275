//! Pooling of trajectory-indexed data into row-per-observation tables.
//!
//! Pooling drops the `(trajectory, time)` structure of a
//! [`TrajectoryDataset`] and stacks every valid observation of every kept
//! trajectory into one table, trajectory-major and time-minor.
//!
//! # Masking
//!
//! A sample is valid when the time coordinate is present at that slot.
//! Every requested variable is masked with the time coordinate only, so a
//! variable `NaN` at a slot where time is present is carried into the table
//! as-is.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use buoy_anomaly::{pool_data_variables, PoolingOptions, TrajectoryDataset};
//! use nalgebra::DMatrix;
//!
//! let time = DMatrix::from_row_slice(2, 3, &[0.0, f64::NAN, 2.0, 0.0, 1.0, f64::NAN]);
//! let temp = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! let ds = TrajectoryDataset::from_time(time).with_variable("temp", temp)?;
//!
//! let table = pool_data_variables(&ds, &["temp"], &BTreeSet::new(), &PoolingOptions::default())?;
//! assert_eq!(table.column("temp")?.as_slice(), &[1.0, 3.0, 4.0, 5.0]);
//! assert_eq!(table.trajectory_ids(), vec![0, 0, 1, 1]);
//! # Ok::<(), buoy_anomaly::DetectorError>(())
//! ```

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::config::PoolingOptions;
use crate::dataset::TrajectoryDataset;
use crate::error::{DetectorError, Result};
use crate::table::PooledTable;

/// Pool the requested variables of a dataset into one table.
///
/// # Arguments
///
/// * `ds` - Source dataset
/// * `variables` - Variables to pool, in output column order
/// * `exclude` - Trajectory indices (not buoy IDs) to skip entirely
/// * `options` - Verbosity and index column name
///
/// # Returns
///
/// A [`PooledTable`] with one row per valid sample of each non-excluded
/// trajectory and columns `variables + [options.trajectory_column]`.
///
/// # Errors
///
/// Returns [`DetectorError::InvalidInput`] if a requested variable is named
/// like `options.trajectory_column`, or [`DetectorError::UnknownVariable`] if
/// a requested variable is missing from `ds`.
pub fn pool_data_variables<S: AsRef<str>>(
    ds: &TrajectoryDataset,
    variables: &[S],
    exclude: &BTreeSet<usize>,
    options: &PoolingOptions,
) -> Result<PooledTable> {
    // Column lookup by name must stay unambiguous
    if let Some(clash) = variables
        .iter()
        .find(|name| name.as_ref() == options.trajectory_column)
    {
        return Err(DetectorError::invalid_input(format!(
            "variable '{}' collides with the trajectory index column",
            clash.as_ref()
        )));
    }

    let sources = variables
        .iter()
        .map(|name| ds.variable(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let n_traj = ds.n_trajectories();
    let kept: Vec<usize> = (0..n_traj).filter(|t| !exclude.contains(t)).collect();

    // First pass: size the buffer
    let total: usize = kept.iter().map(|&t| ds.valid_count(t)).sum();
    let index_col = sources.len();
    let mut data = DMatrix::from_element(total, index_col + 1, f64::NAN);

    // Second pass: fill contiguous row blocks per trajectory
    let time = ds.time();
    let mut row = 0;
    for traj in 0..n_traj {
        if exclude.contains(&traj) {
            if options.verbose {
                info!(trajectory = traj, "skipping excluded trajectory");
            }
            continue;
        }

        let slots: Vec<usize> = time
            .row(traj)
            .iter()
            .enumerate()
            .filter_map(|(slot, t)| (!t.is_nan()).then_some(slot))
            .collect();

        if options.verbose {
            info!(
                trajectory = traj,
                samples = slots.len(),
                start_row = row,
                "pooling trajectory"
            );
        }

        for (col, source) in sources.iter().enumerate() {
            for (offset, &slot) in slots.iter().enumerate() {
                data[(row + offset, col)] = source[(traj, slot)];
            }
        }
        for offset in 0..slots.len() {
            data[(row + offset, index_col)] = traj as f64;
        }
        row += slots.len();
    }

    debug!(
        trajectories = n_traj,
        excluded = n_traj - kept.len(),
        rows = total,
        variables = sources.len(),
        "pooled dataset"
    );

    let columns = variables
        .iter()
        .map(|v| v.as_ref().to_string())
        .chain(std::iter::once(options.trajectory_column.clone()))
        .collect();
    PooledTable::new(columns, data)
}

/// Flatten one `(trajectory, time)` array into a sequence of its non-`NaN`
/// values, trajectory-major and time-minor.
///
/// Each value is masked by its own `NaN`s, so pooling several arrays this way
/// gives no row alignment between them.
#[must_use]
pub fn pool_data_array(values: &DMatrix<f64>) -> Vec<f64> {
    values
        .row_iter()
        .flat_map(|traj| {
            traj.iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Single-variable form of pooling: [`pool_data_array`] applied to one named
/// variable of `ds`.
///
/// # Errors
///
/// Returns [`DetectorError::UnknownVariable`](crate::DetectorError::UnknownVariable)
/// if `name` is missing from `ds`.
pub fn pool_data_variable(ds: &TrajectoryDataset, name: &str) -> Result<Vec<f64>> {
    Ok(pool_data_array(ds.variable(name)?))
}
