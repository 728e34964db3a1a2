//! Reading and writing of Bathymetric Attributed Grids (BAG)
//!
//! BAG is a gridded bathymetric surface format that pairs elevation with
//! per-cell uncertainty, optional auxiliary layers (hypothesis strength,
//! sounding density, vertical-datum correctors), a manual-override tracking
//! list, and an embedded ISO-19115/19139 XML metadata record. This crate
//! models the format's data as plain Rust types and treats the underlying
//! HDF5 container as an opaque chunked, typed, attributed array store behind
//! the [`BackingStore`](store::BackingStore) trait.
//!
//! # Related Links
//! * <https://www.opennavsurf.org/docs/BAG_Format_Specification.pdf> - The BAG format specification

pub mod descriptor;
pub mod error;
pub mod layer;
pub mod metadata;
pub mod store;
pub mod tracking_list;
pub mod types;
pub mod wkt;

mod dataset;

pub use dataset::{Dataset, OpenMode, BAG_VERSION};
pub use descriptor::Descriptor;
pub use error::{
    BagError, BagFormatError, BagMetadataError, BagResult, ProjectionError, StoreError, UsageError,
};
pub use layer::{Layer, LayerDescriptor, LayerOps};
pub use metadata::MetadataModel;
pub use store::memory::MemoryStore;
pub use store::BackingStore;
pub use tracking_list::{TrackingItem, TrackingList};
pub use types::{ElementType, LayerKind, NoDataValue, PrimitiveType};

#[cfg(feature = "hdf5-backend")]
pub use store::hdf5_backend::Hdf5Store;
