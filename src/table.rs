//! Pooled tabular output.

use nalgebra::{DMatrix, DVectorView};

use crate::error::{DetectorError, Result};

/// Row-per-observation table produced by pooling.
///
/// The last column holds the source trajectory index of each row, stored
/// as `f64` alongside the data.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledTable {
    columns: Vec<String>,
    data: DMatrix<f64>,
}

impl PooledTable {
    /// Wrap a buffer whose last column is the trajectory index.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidInput`] if the column count disagrees
    /// with the buffer or no index column is present.
    pub fn new(columns: Vec<String>, data: DMatrix<f64>) -> Result<Self> {
        if columns.is_empty() {
            return Err(DetectorError::invalid_input(
                "pooled table needs a trajectory index column",
            ));
        }
        if columns.len() != data.ncols() {
            return Err(DetectorError::invalid_input(format!(
                "{} column names for {} columns",
                columns.len(),
                data.ncols()
            )));
        }
        Ok(Self { columns, data })
    }

    /// Number of pooled observations.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Column names, trajectory index last.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the trajectory index column.
    #[must_use]
    pub fn trajectory_column(&self) -> &str {
        &self.columns[self.columns.len() - 1]
    }

    /// One column by name.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::UnknownVariable`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<DVectorView<'_, f64>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DetectorError::unknown_variable(name))?;
        Ok(self.data.column(idx))
    }

    /// Source trajectory index of every row.
    #[must_use]
    pub fn trajectory_ids(&self) -> Vec<usize> {
        self.data
            .column(self.data.ncols() - 1)
            .iter()
            .map(|&id| id as usize)
            .collect()
    }

    /// Row indices that were pooled from trajectory `traj`, in time order.
    #[must_use]
    pub fn rows_for_trajectory(&self, traj: usize) -> Vec<usize> {
        self.trajectory_ids()
            .into_iter()
            .enumerate()
            .filter_map(|(row, id)| (id == traj).then_some(row))
            .collect()
    }

    /// Data columns without the trajectory index, ready as model input.
    #[must_use]
    pub fn features(&self) -> DMatrix<f64> {
        self.data.columns(0, self.data.ncols() - 1).into_owned()
    }

    /// The full buffer, trajectory index included.
    #[must_use]
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}
