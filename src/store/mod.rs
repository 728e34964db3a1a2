//! The `BackingStore` contract: the only coupling between the core and an
//! HDF5-like chunked, attributed, hierarchical container.
//!
//! `createFile`/`openFile` are modeled as inherent constructors on each concrete
//! store rather than trait methods, since a trait object cannot return `Self`;
//! everything the core does with an already-open handle is the `BackingStore`
//! trait below, so `Dataset` and `Layer` are generic over it (or hold a
//! `Box<dyn BackingStore>`) and never know which backend they are talking to.

pub mod memory;
#[cfg(feature = "hdf5-backend")]
pub mod hdf5_backend;

use crate::error::BagResult;
use crate::types::ElementType;

/// A typed value read from or written to an HDF5-style attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    U32(u32),
    F32(f32),
    Str(String),
}

impl AttributeValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttributeValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AttributeValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Dims in grid cells: `(rows, cols)` for a 2-D dataset, `(len, 1)` for a 1-D one.
pub type Dims = (u64, u64);

#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub element_type: ElementType,
    pub dims: Dims,
}

/// Operations available on an already-open file handle. A hyperslab is always
/// contiguous: `origin` is the first cell, `extent` the cell count along each axis.
pub trait BackingStore {
    fn close(&mut self) -> BagResult<()>;

    fn create_dataset(
        &mut self,
        path: &str,
        element_type: &ElementType,
        dims: Dims,
        chunk: Dims,
        compression_level: u8,
    ) -> BagResult<()>;

    fn open_dataset(&self, path: &str) -> BagResult<DatasetInfo>;

    fn read_slab(&self, path: &str, origin: Dims, extent: Dims) -> BagResult<Vec<u8>>;

    fn write_slab(&mut self, path: &str, origin: Dims, extent: Dims, buffer: &[u8]) -> BagResult<()>;

    fn extend(&mut self, path: &str, new_dims: Dims) -> BagResult<()>;

    fn read_attribute(&self, target: &str, name: &str) -> BagResult<AttributeValue>;

    fn write_attribute(&mut self, target: &str, name: &str, value: AttributeValue) -> BagResult<()>;

    fn exists(&self, path: &str) -> bool;
}
