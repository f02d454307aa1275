//! Pooling tests over synthetic buoy fleets.
//!
//! Fleets are generated with reproducible gaps in the time coordinate so the
//! row bookkeeping can be checked against an independent count.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use buoy_anomaly::{
    pool_data_array, pool_data_variables, PoolingOptions, PooledTable, TrajectoryDataset,
};
use nalgebra::DMatrix;

// =============================================================================
// FLEET GENERATORS
// =============================================================================

/// Pseudo-random gap decision for slot `(traj, slot)` (reproducible).
fn is_gap(seed: u64, traj: usize, slot: usize, gap_percent: u64) -> bool {
    let mut hasher = DefaultHasher::new();
    (seed, traj, slot).hash(&mut hasher);
    hasher.finish() % 100 < gap_percent
}

/// Generate a fleet of `n_traj` buoys with `n_times` slots each.
///
/// Variables encode their source position so pooled values can be traced:
/// `temp = traj * 1000 + slot`, `sal = -(traj * 1000 + slot)`.
fn generate_fleet(n_traj: usize, n_times: usize, gap_percent: u64, seed: u64) -> TrajectoryDataset {
    let time = DMatrix::from_fn(n_traj, n_times, |t, s| {
        if is_gap(seed, t, s, gap_percent) {
            f64::NAN
        } else {
            s as f64 * 3600.0
        }
    });
    let temp = DMatrix::from_fn(n_traj, n_times, |t, s| (t * 1000 + s) as f64);
    let sal = -temp.clone();

    TrajectoryDataset::from_time(time)
        .with_variable("temp", temp)
        .expect("temp shape")
        .with_variable("sal", sal)
        .expect("sal shape")
}

fn pool(ds: &TrajectoryDataset, exclude: &BTreeSet<usize>) -> PooledTable {
    pool_data_variables(ds, &["temp", "sal"], exclude, &PoolingOptions::default())
        .expect("pooling should succeed")
}

// =============================================================================
// ROW BOOKKEEPING
// =============================================================================

#[test]
fn test_row_count_matches_valid_samples() {
    for seed in 0..5 {
        let ds = generate_fleet(12, 30, 25, seed);
        let exclude = BTreeSet::from([1, 4, 9]);
        let table = pool(&ds, &exclude);

        let expected: usize = (0..12)
            .filter(|t| !exclude.contains(t))
            .map(|t| ds.valid_count(t))
            .sum();
        assert_eq!(table.n_rows(), expected, "seed {seed}");
    }
}

#[test]
fn test_excluded_trajectories_absent() {
    let ds = generate_fleet(8, 20, 10, 42);
    let exclude = BTreeSet::from([0, 3, 7]);
    let table = pool(&ds, &exclude);

    for id in table.trajectory_ids() {
        assert!(!exclude.contains(&id), "excluded trajectory {id} leaked");
    }
    for &traj in &exclude {
        assert!(table.rows_for_trajectory(traj).is_empty());
    }
}

#[test]
fn test_index_column_matches_source() {
    let ds = generate_fleet(6, 25, 30, 7);
    let table = pool(&ds, &BTreeSet::new());

    let temp = table.column("temp").unwrap();
    let sal = table.column("sal").unwrap();
    for (row, id) in table.trajectory_ids().into_iter().enumerate() {
        let traj_from_value = (temp[row] / 1000.0).floor() as usize;
        assert_eq!(traj_from_value, id, "row {row}");
        // Variables stay row-aligned
        assert_eq!(sal[row], -temp[row]);
    }
}

#[test]
fn test_trajectory_then_time_order() {
    let ds = generate_fleet(5, 40, 20, 3);
    let table = pool(&ds, &BTreeSet::new());

    let temp = table.column("temp").unwrap();
    for pair in temp.as_slice().windows(2) {
        assert!(pair[0] < pair[1], "rows out of order: {} then {}", pair[0], pair[1]);
    }

    // Only slots where time is present appear
    for (row, id) in table.trajectory_ids().into_iter().enumerate() {
        let slot = temp[row] as usize - id * 1000;
        assert!(ds.valid_mask(id)[slot]);
    }
}

#[test]
fn test_rows_for_trajectory_are_contiguous() {
    let ds = generate_fleet(4, 15, 20, 11);
    let table = pool(&ds, &BTreeSet::new());

    let mut next = 0;
    for traj in 0..4 {
        let rows = table.rows_for_trajectory(traj);
        assert_eq!(rows.len(), ds.valid_count(traj));
        assert_eq!(rows, (next..next + rows.len()).collect::<Vec<_>>());
        next += rows.len();
    }
}

// =============================================================================
// EDGE CASES
// =============================================================================

#[test]
fn test_all_gaps_fleet_is_empty() {
    let ds = generate_fleet(3, 10, 100, 0);
    let table = pool(&ds, &BTreeSet::new());
    assert_eq!(table.n_rows(), 0);
    assert_eq!(table.columns(), &["temp", "sal", "KVS_ID"]);
    assert_eq!(table.features().shape(), (0, 2));
}

#[test]
fn test_excluding_everything_is_empty() {
    let ds = generate_fleet(3, 10, 0, 0);
    let table = pool(&ds, &BTreeSet::from([0, 1, 2]));
    assert_eq!(table.n_rows(), 0);
}

#[test]
fn test_concrete_two_buoy_scenario() {
    let time = DMatrix::from_row_slice(2, 3, &[0.0, f64::NAN, 2.0, 0.0, 1.0, f64::NAN]);
    let temp = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let ds = TrajectoryDataset::from_time(time)
        .with_variable("temp", temp)
        .unwrap();

    let table =
        pool_data_variables(&ds, &["temp"], &BTreeSet::new(), &PoolingOptions::default()).unwrap();

    assert_eq!(table.columns(), &["temp", "KVS_ID"]);
    assert_eq!(table.column("temp").unwrap().as_slice(), &[1.0, 3.0, 4.0, 5.0]);
    assert_eq!(table.column("KVS_ID").unwrap().as_slice(), &[0.0, 0.0, 1.0, 1.0]);
}

// =============================================================================
// VERBOSITY AND LEGACY FLATTENING
// =============================================================================

#[test]
fn test_verbose_does_not_change_output() {
    let ds = generate_fleet(6, 20, 15, 5);
    let exclude = BTreeSet::from([2]);

    let quiet = pool(&ds, &exclude);

    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let loud = tracing::subscriber::with_default(subscriber, || {
        pool_data_variables(
            &ds,
            &["temp", "sal"],
            &exclude,
            &PoolingOptions::default().verbose(),
        )
        .unwrap()
    });

    assert_eq!(quiet, loud);
}

#[test]
fn test_pool_data_array_matches_table_when_masks_agree() {
    // With no variable NaNs of its own, masking temp by time equals
    // flattening a copy of temp that carries the time gaps.
    let ds = generate_fleet(5, 12, 30, 9);
    let table = pool(&ds, &BTreeSet::new());

    let time = ds.time();
    let temp = ds.variable("temp").unwrap();
    let gapped = temp.zip_map(time, |v, t| if t.is_nan() { f64::NAN } else { v });

    assert_eq!(
        pool_data_array(&gapped),
        table.column("temp").unwrap().as_slice()
    );
}
