use std::error::Error;
use std::fmt;
use std::io;

use crate::types::LayerKind;

/// BAG error kinds.
#[derive(Debug)]
pub enum BagError {
    /// The file or in-memory buffer is not a well-formed BAG.
    FormatError(BagFormatError),

    /// Metadata XML is missing, malformed, or fails a mandatory-item check.
    MetadataError(BagMetadataError),

    /// A legacy parameter block or WKT string could not be translated.
    ProjectionError(ProjectionError),

    /// The backing store (HDF5 or its test double) reported a failure.
    StoreError(StoreError),

    /// The caller used the API in a way the current state does not allow.
    UsageError(UsageError),

    /// The root `Bag Version` attribute does not match a version this crate understands.
    VersionMismatch(String),
}

/// The on-disk structure is inconsistent with what the core expects.
///
/// The list of variants may grow to incorporate future checks. Matching against this
/// exhaustively is not covered by interface stability guarantees.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BagFormatError {
    MissingRequiredDataset(&'static str),
    InconsistentDimensions { layer: LayerKind, expected: (u32, u32), actual: (u32, u32) },
    TrackingListLengthExceedsExtent { length: u32, extent: u32 },
    UnknownLayerPath(String),
    InterleavedFieldNotPresent(&'static str),
    InvalidCorrectorCount(u32),
}

impl fmt::Display for BagFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BagFormatError::*;
        match self {
            MissingRequiredDataset(path) => write!(f, "required dataset `{}` is missing", path),
            InconsistentDimensions { layer, expected, actual } => write!(
                f,
                "layer {:?} has dimensions {:?}, expected {:?}",
                layer, actual, expected
            ),
            TrackingListLengthExceedsExtent { length, extent } => write!(
                f,
                "tracking list length attribute ({}) exceeds dataset extent ({})",
                length, extent
            ),
            UnknownLayerPath(path) => write!(f, "internal path `{}` does not map to a known layer kind", path),
            InterleavedFieldNotPresent(field) => {
                write!(f, "interleaved legacy record has no `{}` field", field)
            }
            InvalidCorrectorCount(n) => write!(f, "corrector count {} is out of range 1..=10", n),
        }
    }
}

/// XML metadata could not be imported, exported, or mutated as requested.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BagMetadataError {
    SchemaFileMissing(String),
    MissingMandatoryItem(String),
    InconsistentBoundingBox { west: f64, east: f64, south: f64, north: f64 },
    UnparseableNumber(String),
    NodeNotFound(String),
    UnrecognizedSchemaVersion,
    ListCountMismatch { field: &'static str, declared: u32, actual: usize },
}

impl fmt::Display for BagMetadataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BagMetadataError::*;
        match self {
            SchemaFileMissing(path) => write!(f, "XSD schema file not found at `{}`", path),
            MissingMandatoryItem(name) => write!(f, "mandatory element `{}` was not found", name),
            InconsistentBoundingBox { west, east, south, north } => write!(
                f,
                "bounding box is inconsistent: west={} east={} south={} north={}",
                west, east, south, north
            ),
            UnparseableNumber(text) => write!(f, "could not parse `{}` as a number", text),
            NodeNotFound(xpath) => write!(f, "no node matched `{}`", xpath),
            UnrecognizedSchemaVersion => write!(f, "root element names neither the smXML nor the gmi/gmd schema"),
            ListCountMismatch { field, declared, actual } => write!(
                f,
                "field `{}` declares count {} but has {} entries",
                field, declared, actual
            ),
        }
    }
}

/// A legacy coordinate-system parameter block or a WKT string was invalid.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProjectionError {
    InvalidDatum(String),
    InvalidProjection(String),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ProjectionError::*;
        match self {
            InvalidDatum(name) => write!(f, "unrecognized datum `{}`", name),
            InvalidProjection(name) => write!(f, "unrecognized or malformed projection `{}`", name),
        }
    }
}

/// A failure reported by the concrete `BackingStore` implementation.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Backend(msg) => write!(f, "backing store error: {}", msg),
        }
    }
}

/// The caller asked for an operation the current dataset/layer state does not support.
#[derive(Debug, Clone, PartialEq)]
pub enum UsageError {
    InvalidRange { row_start: u32, col_start: u32, row_end: u32, col_end: u32, rows: u32, cols: u32 },
    ReadOnlyLayer(LayerKind),
    ReadOnlyDataset,
    DuplicateLayer(LayerKind),
    LayerNotFound(LayerKind),
    InvalidKind(LayerKind),
    DatasetNotFound,
    DatasetLost,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use UsageError::*;
        match self {
            InvalidRange { row_start, col_start, row_end, col_end, rows, cols } => write!(
                f,
                "range ({},{})..=({},{}) is invalid for a {}x{} grid",
                row_start, col_start, row_end, col_end, rows, cols
            ),
            ReadOnlyLayer(kind) => write!(f, "layer {:?} is read-only (interleaved legacy layer)", kind),
            ReadOnlyDataset => write!(f, "dataset is open read-only"),
            DuplicateLayer(kind) => write!(f, "layer {:?} already exists", kind),
            LayerNotFound(kind) => write!(f, "layer {:?} is not present", kind),
            InvalidKind(kind) => write!(f, "layer kind {:?} cannot be created directly", kind),
            DatasetNotFound => write!(f, "the dataset backing this handle is no longer available"),
            DatasetLost => write!(f, "backing store handle unexpectedly missing"),
        }
    }
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BagError::FormatError(e) => write!(f, "format error: {}", e),
            BagError::MetadataError(e) => write!(f, "metadata error: {}", e),
            BagError::ProjectionError(e) => write!(f, "projection error: {}", e),
            BagError::StoreError(e) => write!(f, "{}", e),
            BagError::UsageError(e) => write!(f, "usage error: {}", e),
            BagError::VersionMismatch(v) => write!(f, "unrecognized BAG version `{}`", v),
        }
    }
}

impl Error for BagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BagError::StoreError(StoreError::Io(e)) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BagError {
    fn from(err: io::Error) -> BagError {
        BagError::StoreError(StoreError::Io(err))
    }
}

impl From<BagFormatError> for BagError {
    fn from(err: BagFormatError) -> BagError {
        BagError::FormatError(err)
    }
}

impl From<BagMetadataError> for BagError {
    fn from(err: BagMetadataError) -> BagError {
        BagError::MetadataError(err)
    }
}

impl From<ProjectionError> for BagError {
    fn from(err: ProjectionError) -> BagError {
        BagError::ProjectionError(err)
    }
}

impl From<StoreError> for BagError {
    fn from(err: StoreError) -> BagError {
        BagError::StoreError(err)
    }
}

impl From<UsageError> for BagError {
    fn from(err: UsageError) -> BagError {
        BagError::UsageError(err)
    }
}

impl From<std::num::ParseFloatError> for BagError {
    fn from(err: std::num::ParseFloatError) -> BagError {
        BagError::MetadataError(BagMetadataError::UnparseableNumber(err.to_string()))
    }
}

/// Result of a BAG read, write, or metadata operation.
pub type BagResult<T> = Result<T, BagError>;
