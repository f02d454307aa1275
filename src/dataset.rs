//! Trajectory-indexed dataset.
//!
//! A [`TrajectoryDataset`] holds named `(trajectory, time)` arrays, one of which
//! is the time coordinate. Missing observations in the time coordinate are
//! stored as `NaN` and define which samples of a trajectory are valid.

use nalgebra::DMatrix;

use crate::error::{DetectorError, Result};

/// Default name of the time coordinate variable.
pub const TIME_VARIABLE: &str = "time";

/// A collection of `(trajectory, time)` variables sharing one time coordinate.
///
/// All variables are assumed to share the time coordinate's missing-value
/// mask. Shapes are checked on insertion; missing-value positions are not.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryDataset {
    time_name: String,
    /// Insertion-ordered `(name, values)` pairs; index 0 is the time coordinate.
    variables: Vec<(String, DMatrix<f64>)>,
}

impl TrajectoryDataset {
    /// Create a dataset from its time coordinate.
    ///
    /// `time` is shaped `(trajectory, time)`; `NaN` marks a missing timestamp.
    #[must_use]
    pub fn new(time_name: impl Into<String>, time: DMatrix<f64>) -> Self {
        let time_name = time_name.into();
        Self {
            variables: vec![(time_name.clone(), time)],
            time_name,
        }
    }

    /// Create a dataset whose time coordinate is named [`TIME_VARIABLE`].
    #[must_use]
    pub fn from_time(time: DMatrix<f64>) -> Self {
        Self::new(TIME_VARIABLE, time)
    }

    /// Builder form of [`insert_variable`](Self::insert_variable).
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::ShapeMismatch`] if `values` is not shaped
    /// like the time coordinate.
    pub fn with_variable(mut self, name: impl Into<String>, values: DMatrix<f64>) -> Result<Self> {
        self.insert_variable(name, values)?;
        Ok(self)
    }

    /// Insert or replace a variable.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::ShapeMismatch`] if `values` is not shaped
    /// like the time coordinate.
    pub fn insert_variable(&mut self, name: impl Into<String>, values: DMatrix<f64>) -> Result<()> {
        let name = name.into();
        let expected = self.time().shape();
        if values.shape() != expected {
            return Err(DetectorError::shape_mismatch(name, expected, values.shape()));
        }

        if let Some(slot) = self.variables.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = values;
        } else {
            self.variables.push((name, values));
        }
        Ok(())
    }

    /// Look up a variable by name. The time coordinate is a variable too.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::UnknownVariable`] if no variable has that name.
    pub fn variable(&self, name: &str) -> Result<&DMatrix<f64>> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| DetectorError::unknown_variable(name))
    }

    /// Whether a variable with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|(n, _)| n == name)
    }

    /// The time coordinate.
    #[must_use]
    pub fn time(&self) -> &DMatrix<f64> {
        &self.variables[0].1
    }

    /// Name of the time coordinate.
    #[must_use]
    pub fn time_name(&self) -> &str {
        &self.time_name
    }

    /// Variable names in insertion order, time coordinate first.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_str())
    }

    /// Number of trajectories.
    #[must_use]
    pub fn n_trajectories(&self) -> usize {
        self.time().nrows()
    }

    /// Number of time slots per trajectory.
    #[must_use]
    pub fn n_times(&self) -> usize {
        self.time().ncols()
    }

    /// Per-time-slot validity of one trajectory: `true` where time is present.
    ///
    /// Out-of-range trajectories yield an empty mask.
    #[must_use]
    pub fn valid_mask(&self, traj: usize) -> Vec<bool> {
        if traj >= self.n_trajectories() {
            return Vec::new();
        }
        self.time().row(traj).iter().map(|t| !t.is_nan()).collect()
    }

    /// Number of valid time samples of one trajectory.
    #[must_use]
    pub fn valid_count(&self, traj: usize) -> usize {
        if traj >= self.n_trajectories() {
            return 0;
        }
        self.time().row(traj).iter().filter(|t| !t.is_nan()).count()
    }
}
