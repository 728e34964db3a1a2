//! Black-box tests against the public `Dataset` API, exercising the full
//! create → write → close → reopen lifecycle the way a host application
//! would, rather than poking at internals the way the `#[cfg(test)]` modules
//! beside each source file do.

use bag::store::memory::MemoryStore;
use bag::types::LayerKind;
use bag::{Dataset, MetadataModel, OpenMode, TrackingItem};

fn metadata(rows: u32, cols: u32) -> MetadataModel {
    let mut m = MetadataModel::default();
    m.file_identifier = Some("lifecycle-1".to_string());
    m.spatial.rows = rows;
    m.spatial.cols = cols;
    m.spatial.row_resolution = 1.0;
    m.spatial.column_resolution = 1.0;
    m.spatial.ur_corner_x = (cols - 1) as f64;
    m.spatial.ur_corner_y = (rows - 1) as f64;
    m.identification.west = -81.5;
    m.identification.east = -80.5;
    m.identification.south = 24.0;
    m.identification.north = 25.0;
    m
}

fn elevation_value(row: u32, col: u32) -> f32 {
    ((col * row) % 100) as f32 + (col as f32) / 100.0
}

/// Seed scenario 1: a 100x100 grid, chunk 100, compression 1; row 42 reads
/// back exactly `(42*c mod 100) + c/100` for c in 0..100.
#[test]
fn seed_scenario_one_elevation_row_round_trips() {
    let store = MemoryStore::create();
    let mut dataset = Dataset::create_with_store(store, metadata(100, 100), 100, 1).unwrap();

    let mut buffer = Vec::with_capacity(100 * 100 * 4);
    for row in 0..100u32 {
        for col in 0..100u32 {
            buffer.extend_from_slice(&elevation_value(row, col).to_le_bytes());
        }
    }
    dataset.write_layer(LayerKind::Elevation, 0, 0, 99, 99, &buffer).unwrap();

    let row_bytes = dataset.read_layer(LayerKind::Elevation, 42, 0, 42, 99).unwrap();
    let row: Vec<f32> = row_bytes.chunks_exact(4).map(|b| f32::from_le_bytes(b.try_into().unwrap())).collect();
    for col in 0..100u32 {
        assert!((row[col as usize] - elevation_value(42, col)).abs() < 1e-6);
    }
}

/// Seed scenario 2: same file, Uncertainty layer's descriptor max matches the
/// analytically expected maximum once every cell has been written.
#[test]
fn seed_scenario_two_uncertainty_descriptor_max_matches_expected() {
    let store = MemoryStore::create();
    let mut dataset = Dataset::create_with_store(store, metadata(100, 100), 100, 1).unwrap();

    let mut buffer = Vec::with_capacity(100 * 100 * 4);
    for row in 0..100u32 {
        for col in 0..100u32 {
            let value = ((col * row) % 100) as f32 / 1000.0;
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }
    dataset.write_layer(LayerKind::Uncertainty, 0, 0, 99, 99, &buffer).unwrap();

    let max = dataset.get_layer(LayerKind::Uncertainty).unwrap().descriptor().max_value.unwrap();
    assert!((max - 0.099).abs() < 1e-6);
}

/// Seed scenario 3: a 3x3 SurfaceCorrections layer with correctorCount 2
/// round-trips its packed records and its vertical-datums attribute.
#[test]
fn seed_scenario_three_surface_corrections_round_trips() {
    use bag::layer::Topography;

    let store = MemoryStore::create();
    let mut dataset = Dataset::create_with_store(store, metadata(4, 4), 4, 1).unwrap();
    dataset
        .create_surface_corrections_layer(
            2,
            Topography::Gridded,
            vec!["Test".to_string(), "Unknown".to_string()],
            (3, 3),
            Some(3),
            Some(1),
        )
        .unwrap();

    let mut buffer = Vec::new();
    for r in 0..3u32 {
        for c in 0..3u32 {
            let z0 = -(r as f64 + 0.3333) * (c as f64 + 1.0);
            let z1 = (r as f64 + 0.55) * (c as f64 + 1.0);
            let x = (r as f64 + 10.3333) * (c as f64 + 1.0);
            let y = (r as f64 + 180.3333) * (c as f64 + 1.0);
            buffer.extend_from_slice(&(z0 as f32).to_le_bytes());
            buffer.extend_from_slice(&(z1 as f32).to_le_bytes());
            buffer.extend_from_slice(&x.to_le_bytes());
            buffer.extend_from_slice(&y.to_le_bytes());
        }
    }
    dataset.write_layer(LayerKind::SurfaceCorrections, 0, 0, 2, 2, &buffer).unwrap();

    let store = dataset.into_store().unwrap();
    let reopened = Dataset::open_with_store(MemoryStore::open(store), OpenMode::ReadOnly).unwrap();
    let back = reopened.read_layer(LayerKind::SurfaceCorrections, 0, 0, 2, 2).unwrap();
    assert_eq!(back, buffer);

    match reopened.get_layer(LayerKind::SurfaceCorrections).unwrap() {
        bag::Layer::SurfaceCorrections(layer) => {
            assert_eq!(layer.corrector_count(), 2);
            assert_eq!(layer.vertical_datums(), &["Test".to_string(), "Unknown".to_string()]);
        }
        _ => panic!("expected a SurfaceCorrections layer"),
    }
}

/// Seed scenario 5: append 5 tracking items, close, reopen, verify size and
/// contents survive a real close/reopen cycle (not just an in-process flush).
#[test]
fn seed_scenario_five_tracking_list_survives_close_and_reopen() {
    let store = MemoryStore::create();
    let mut dataset = Dataset::create_with_store(store, metadata(10, 10), 10, 1).unwrap();

    let items: Vec<TrackingItem> = (0..5)
        .map(|i| TrackingItem { row: i, col: i + 1, depth: i as f32 * 1.5, uncertainty: 0.1, track_code: 3, list_series: -1 })
        .collect();
    dataset.tracking_list_mut().unwrap().push_all(items.clone());

    let store = dataset.into_store().unwrap();
    let reopened = Dataset::open_with_store(MemoryStore::open(store), OpenMode::ReadOnly).unwrap();
    assert_eq!(reopened.tracking_list().size(), 5);
    assert_eq!(reopened.tracking_list().iterate().cloned().collect::<Vec<_>>(), items);
}

/// Seed scenario 6: an out-of-range read on a fresh dataset fails and leaves
/// the backing store's declared dims untouched.
#[test]
fn seed_scenario_six_out_of_range_read_fails_without_mutating() {
    let store = MemoryStore::create();
    let dataset = Dataset::create_with_store(store, metadata(10, 10), 10, 1).unwrap();
    let before = dataset.descriptor().dims;
    assert!(dataset.read_layer(LayerKind::Elevation, 0, 0, 10, 0).is_err());
    assert_eq!(dataset.descriptor().dims, before);
}

/// A reopened read-only dataset rejects writes and tracking-list mutation.
#[test]
fn reopened_read_only_dataset_rejects_mutation() {
    let store = MemoryStore::create();
    let dataset = Dataset::create_with_store(store, metadata(4, 4), 4, 1).unwrap();
    let store = dataset.into_store().unwrap();
    let mut reopened = Dataset::open_with_store(MemoryStore::open(store), OpenMode::ReadOnly).unwrap();

    assert!(reopened.write_layer(LayerKind::Elevation, 0, 0, 0, 0, &0f32.to_le_bytes()).is_err());
    assert!(reopened.create_layer(LayerKind::AverageElevation, None, None).is_err());
    assert!(reopened.tracking_list_mut().is_err());
}
