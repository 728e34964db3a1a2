//! Dataset-wide derived facts: grid shape, spacing, origin, the projected and
//! geographic covers, the format version, the horizontal/vertical WKT, and the
//! registry of `LayerDescriptor`s keyed by kind. Everything here is derived
//! from `MetadataModel` plus the layers actually present; `Descriptor` owns no
//! state a caller can set independently of those.

use std::collections::BTreeMap;

use crate::error::{BagMetadataError, BagResult};
use crate::layer::LayerDescriptor;
use crate::metadata::MetadataModel;
use crate::types::LayerKind;

/// Numeric tolerance for the corner/spacing cross-check (§3).
const SPACING_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub version: String,
    pub horizontal_reference_system_wkt: Option<String>,
    pub vertical_reference_system_wkt: Option<String>,
    pub dims: (u32, u32),
    pub grid_spacing: (f64, f64),
    pub origin: (f64, f64),
    pub projected_cover: (f64, f64, f64, f64),
    pub geographic_cover: (f64, f64, f64, f64),
    pub layers: BTreeMap<LayerKind, LayerDescriptor>,
}

impl Descriptor {
    /// Builds the dataset-wide descriptor from the metadata model and the
    /// layer registry already opened/created for this dataset, checking the
    /// cross-layer invariants §3 names. `version` is the root `Bag Version`
    /// attribute string.
    pub fn new(
        version: String,
        metadata: &MetadataModel,
        layers: &BTreeMap<LayerKind, LayerDescriptor>,
    ) -> BagResult<Descriptor> {
        let sp = &metadata.spatial;
        let dims = (sp.rows, sp.cols);
        let grid_spacing = (sp.row_resolution, sp.column_resolution);
        let origin = (sp.ll_corner_x, sp.ll_corner_y);
        let projected_cover = (sp.ll_corner_x, sp.ll_corner_y, sp.ur_corner_x, sp.ur_corner_y);
        let geographic_cover =
            (metadata.identification.west, metadata.identification.east, metadata.identification.south, metadata.identification.north);

        for (kind, layer) in layers {
            if layer.dims != dims && !matches!(kind, LayerKind::SurfaceCorrections) {
                return Err(crate::error::BagFormatError::InconsistentDimensions {
                    layer: *kind,
                    expected: dims,
                    actual: layer.dims,
                }
                .into());
            }
        }

        if dims.1 > 0 {
            let expected_width = (dims.1 - 1) as f64 * grid_spacing.1;
            let actual_width = sp.ur_corner_x - sp.ll_corner_x;
            if (expected_width - actual_width).abs() > SPACING_TOLERANCE.max(actual_width.abs() * 1e-9) {
                return Err(BagMetadataError::InconsistentBoundingBox {
                    west: sp.ll_corner_x,
                    east: sp.ur_corner_x,
                    south: sp.ll_corner_y,
                    north: sp.ur_corner_y,
                }
                .into());
            }
        }
        if dims.0 > 0 {
            let expected_height = (dims.0 - 1) as f64 * grid_spacing.0;
            let actual_height = sp.ur_corner_y - sp.ll_corner_y;
            if (expected_height - actual_height).abs() > SPACING_TOLERANCE.max(actual_height.abs() * 1e-9) {
                return Err(BagMetadataError::InconsistentBoundingBox {
                    west: sp.ll_corner_x,
                    east: sp.ur_corner_x,
                    south: sp.ll_corner_y,
                    north: sp.ur_corner_y,
                }
                .into());
            }
        }

        Ok(Descriptor {
            version,
            horizontal_reference_system_wkt: metadata.horizontal_reference_system.definition.clone(),
            vertical_reference_system_wkt: metadata.vertical_reference_system.definition.clone(),
            dims,
            grid_spacing,
            origin,
            projected_cover,
            geographic_cover,
            layers: layers.clone(),
        })
    }

    /// Alias of `grid_spacing`, matching `bagGetCellDims` on the original facade.
    pub fn cell_dims(&self) -> (f64, f64) {
        self.grid_spacing
    }

    /// `(west, east, south, north)`, matching `bagGetGeoCover`.
    pub fn geographic_cover(&self) -> (f64, f64, f64, f64) {
        self.geographic_cover
    }

    /// `(llx, lly, urx, ury)`, matching `bagGetProjectedCover`.
    pub fn projected_cover(&self) -> (f64, f64, f64, f64) {
        self.projected_cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;

    fn base_metadata(rows: u32, cols: u32) -> MetadataModel {
        let mut m = MetadataModel::default();
        m.spatial.rows = rows;
        m.spatial.cols = cols;
        m.spatial.row_resolution = 1.0;
        m.spatial.column_resolution = 1.0;
        m.spatial.ll_corner_x = 0.0;
        m.spatial.ll_corner_y = 0.0;
        m.spatial.ur_corner_x = (cols - 1) as f64;
        m.spatial.ur_corner_y = (rows - 1) as f64;
        m
    }

    #[test]
    fn builds_descriptor_when_spacing_matches_corners() {
        let metadata = base_metadata(10, 10);
        let layers = BTreeMap::new();
        let descriptor = Descriptor::new("1.6.3".to_string(), &metadata, &layers).unwrap();
        assert_eq!(descriptor.dims, (10, 10));
        assert_eq!(descriptor.cell_dims(), (1.0, 1.0));
    }

    #[test]
    fn rejects_spacing_inconsistent_with_corners() {
        let mut metadata = base_metadata(10, 10);
        metadata.spatial.ur_corner_x = 500.0;
        let layers = BTreeMap::new();
        assert!(Descriptor::new("1.6.3".to_string(), &metadata, &layers).is_err());
    }

    #[test]
    fn rejects_layer_dims_mismatched_with_dataset_dims() {
        let metadata = base_metadata(10, 10);
        let mut layers = BTreeMap::new();
        layers.insert(
            LayerKind::Elevation,
            LayerDescriptor::new(LayerKind::Elevation, ElementType::Float32, (5, 5), 10, 1),
        );
        assert!(Descriptor::new("1.6.3".to_string(), &metadata, &layers).is_err());
    }
}
