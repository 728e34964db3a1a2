//! Closed enumerations of layer kinds and element data types, plus the fixed
//! tables mapping each kind to its canonical type, byte size, and on-disk path.

use crate::error::{BagError, BagFormatError};

/// A field of a `Compound` or `VerticalDatumCorrectionRecord` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Float32,
    Float64,
    UInt32,
    UInt8,
    Int16,
}

impl PrimitiveType {
    pub fn byte_size(self) -> usize {
        match self {
            PrimitiveType::Float32 => 4,
            PrimitiveType::Float64 => 8,
            PrimitiveType::UInt32 => 4,
            PrimitiveType::UInt8 => 1,
            PrimitiveType::Int16 => 2,
        }
    }

    /// Inverse of the `{:?}` `Debug` spelling used in the persisted field table
    /// (`CompoundLayer::write_attributes`/`Dataset`'s layer-registry rebuild on open).
    pub fn parse(s: &str) -> Option<PrimitiveType> {
        match s {
            "Float32" => Some(PrimitiveType::Float32),
            "Float64" => Some(PrimitiveType::Float64),
            "UInt32" => Some(PrimitiveType::UInt32),
            "UInt8" => Some(PrimitiveType::UInt8),
            "Int16" => Some(PrimitiveType::Int16),
            _ => None,
        }
    }
}

/// The closed set of element types a Layer's storage can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Float32,
    UInt32,
    /// A user-declared record, field name paired with its primitive type. Packed, no padding.
    Compound(Vec<(String, PrimitiveType)>),
    /// `z` has `corrector_count` Float32 offsets; `x`,`y` are Float64.
    VerticalDatumCorrectionRecord { corrector_count: u32 },
}

impl ElementType {
    /// Deterministic byte size of one element. Compound sizes are the sum of field
    /// sizes; records are packed, no alignment padding beyond the record boundary.
    pub fn byte_size(&self) -> usize {
        match self {
            ElementType::Float32 => 4,
            ElementType::UInt32 => 4,
            ElementType::Compound(fields) => fields.iter().map(|(_, t)| t.byte_size()).sum(),
            ElementType::VerticalDatumCorrectionRecord { corrector_count } => {
                (*corrector_count as usize) * PrimitiveType::Float32.byte_size()
                    + 2 * PrimitiveType::Float64.byte_size()
            }
        }
    }

    /// Per-kind no-data sentinel, consulted only by the min/max-update path on write.
    /// Readers must never strip this value from returned buffers.
    pub fn no_data_sentinel(&self) -> Option<NoDataValue> {
        match self {
            ElementType::Float32 => Some(NoDataValue::Float32(1.0e6)),
            ElementType::UInt32 => Some(NoDataValue::UInt32(u32::MAX)),
            ElementType::Compound(_) | ElementType::VerticalDatumCorrectionRecord { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoDataValue {
    Float32(f32),
    UInt32(u32),
}

/// The closed set of layer kinds a BAG file may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Elevation,
    Uncertainty,
    HypothesisStrength,
    NumHypotheses,
    ShoalElevation,
    StdDev,
    NumSoundings,
    AverageElevation,
    NominalElevation,
    SurfaceCorrections,
    Compound,
    InterleavedLegacy,
}

impl LayerKind {
    /// All kinds the TypeCatalog knows about, in a stable order.
    pub const ALL: [LayerKind; 12] = [
        LayerKind::Elevation,
        LayerKind::Uncertainty,
        LayerKind::HypothesisStrength,
        LayerKind::NumHypotheses,
        LayerKind::ShoalElevation,
        LayerKind::StdDev,
        LayerKind::NumSoundings,
        LayerKind::AverageElevation,
        LayerKind::NominalElevation,
        LayerKind::SurfaceCorrections,
        LayerKind::Compound,
        LayerKind::InterleavedLegacy,
    ];

    /// The element type a `SimpleLayer` of this kind stores. `Compound` and
    /// `SurfaceCorrections` do not have a single canonical type; callers construct
    /// their `ElementType` explicitly (field list, corrector count) instead.
    pub fn canonical_element_type(self) -> Result<ElementType, BagError> {
        use LayerKind::*;
        match self {
            Elevation | Uncertainty | HypothesisStrength | ShoalElevation | StdDev
            | AverageElevation | NominalElevation => Ok(ElementType::Float32),
            NumHypotheses | NumSoundings => Ok(ElementType::UInt32),
            SurfaceCorrections | Compound | InterleavedLegacy => {
                Err(BagError::FormatError(BagFormatError::UnknownLayerPath(format!(
                    "{:?} has no single canonical element type",
                    self
                ))))
            }
        }
    }

    /// Fixed internal HDF5 path for this kind. `HypothesisStrength` and `NumHypotheses`
    /// share the `/BAG_root/node` parent group but use distinct dataset names inside it,
    /// so they never collide.
    pub fn internal_path(self) -> &'static str {
        use LayerKind::*;
        match self {
            Elevation => "/BAG_root/elevation",
            Uncertainty => "/BAG_root/uncertainty",
            HypothesisStrength => "/BAG_root/node/hypothesis_strength",
            NumHypotheses => "/BAG_root/node/num_hypotheses",
            ShoalElevation => "/BAG_root/elevation_solution/shoal_elevation",
            StdDev => "/BAG_root/elevation_solution/std_dev",
            NumSoundings => "/BAG_root/elevation_solution/num_soundings",
            AverageElevation => "/BAG_root/average",
            NominalElevation => "/BAG_root/nominal_elevation",
            SurfaceCorrections => "/BAG_root/vertical_datum_corrections",
            Compound => "/BAG_root/compound",
            InterleavedLegacy => "/BAG_root/node",
        }
    }

    /// Recovers a LayerKind from a persisted internal path. Used when rebuilding the
    /// layer registry on open. Returns `None` for paths that are group parents rather
    /// than concrete datasets (`node`, `elevation_solution`) — those are resolved by
    /// the interleaved-legacy detection logic instead, which inspects the dataset's
    /// compound member names.
    pub fn from_internal_path(path: &str) -> Option<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .find(|k| k.internal_path() == path && !matches!(k, LayerKind::InterleavedLegacy))
    }

    /// Whether a kind may be constructed via `Dataset::create_layer`. The legacy
    /// interleaved layers only ever arise on open of an old file.
    pub fn is_creatable(self) -> bool {
        !matches!(self, LayerKind::InterleavedLegacy)
    }

    /// Human label, used as the LayerDescriptor's `name` field.
    pub fn label(self) -> &'static str {
        use LayerKind::*;
        match self {
            Elevation => "Elevation",
            Uncertainty => "Uncertainty",
            HypothesisStrength => "Hypothesis Strength",
            NumHypotheses => "Num Hypotheses",
            ShoalElevation => "Shoal Elevation",
            StdDev => "Standard Deviation",
            NumSoundings => "Num Soundings",
            AverageElevation => "Average Elevation",
            NominalElevation => "Nominal Elevation",
            SurfaceCorrections => "Surface Corrections",
            Compound => "Compound",
            InterleavedLegacy => "Interleaved Legacy",
        }
    }
}
