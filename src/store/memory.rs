//! An in-memory `BackingStore` backed by `BTreeMap`s rather than libhdf5, used
//! by the test suite so layer, tracking-list, and dataset logic can be
//! exercised without linking against HDF5. It satisfies the full trait, the
//! same way the teacher's own decoder tests drive in-memory byte cursors
//! instead of real TIFF files.

use std::collections::BTreeMap;

use crate::error::{BagResult, StoreError, UsageError};
use crate::types::ElementType;

use super::{AttributeValue, BackingStore, DatasetInfo, Dims};

struct StoredDataset {
    element_type: ElementType,
    dims: Dims,
    bytes: Vec<u8>,
}

/// A virtual BAG file living entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, StoredDataset>,
    attributes: BTreeMap<(String, String), AttributeValue>,
}

impl MemoryStore {
    /// Equivalent of `createFile`: a fresh, empty virtual container.
    pub fn create() -> MemoryStore {
        MemoryStore::default()
    }

    /// Equivalent of `openFile`. `MemoryStore` has no on-disk counterpart, so
    /// "opening" one just means handing back the same in-memory instance; callers
    /// that need open/reopen semantics in tests keep the `MemoryStore` value around.
    pub fn open(existing: MemoryStore) -> MemoryStore {
        existing
    }
}

fn row_major_range(dims: Dims, elem_size: usize, origin: Dims, extent: Dims) -> BagResult<(usize, usize)> {
    if origin.0 + extent.0 > dims.0 || origin.1 + extent.1 > dims.1 {
        return Err(UsageError::InvalidRange {
            row_start: origin.0 as u32,
            col_start: origin.1 as u32,
            row_end: (origin.0 + extent.0).saturating_sub(1) as u32,
            col_end: (origin.1 + extent.1).saturating_sub(1) as u32,
            rows: dims.0 as u32,
            cols: dims.1 as u32,
        }
        .into());
    }
    let start = (origin.0 as usize) * dims.1 as usize * elem_size;
    let len = (extent.0 as usize) * (extent.1 as usize) * elem_size;
    Ok((start, len))
}

impl BackingStore for MemoryStore {
    fn close(&mut self) -> BagResult<()> {
        Ok(())
    }

    fn create_dataset(
        &mut self,
        path: &str,
        element_type: &ElementType,
        dims: Dims,
        _chunk: Dims,
        _compression_level: u8,
    ) -> BagResult<()> {
        let size = (dims.0 as usize) * (dims.1 as usize) * element_type.byte_size();
        self.datasets.insert(
            path.to_string(),
            StoredDataset { element_type: element_type.clone(), dims, bytes: vec![0u8; size] },
        );
        Ok(())
    }

    fn open_dataset(&self, path: &str) -> BagResult<DatasetInfo> {
        let ds = self
            .datasets
            .get(path)
            .ok_or_else(|| StoreError::Backend(format!("no dataset at `{}`", path)))?;
        Ok(DatasetInfo { element_type: ds.element_type.clone(), dims: ds.dims })
    }

    fn read_slab(&self, path: &str, origin: Dims, extent: Dims) -> BagResult<Vec<u8>> {
        let ds = self
            .datasets
            .get(path)
            .ok_or_else(|| StoreError::Backend(format!("no dataset at `{}`", path)))?;
        let elem_size = ds.element_type.byte_size();
        // Row-major sub-rectangle copy: one contiguous memcpy per row.
        let mut out = Vec::with_capacity((extent.0 as usize) * (extent.1 as usize) * elem_size);
        for r in 0..extent.0 {
            let row_start = ((origin.0 + r) as usize) * ds.dims.1 as usize * elem_size
                + (origin.1 as usize) * elem_size;
            let row_len = (extent.1 as usize) * elem_size;
            if origin.0 + r >= ds.dims.0 || origin.1 + extent.1 > ds.dims.1 {
                return Err(UsageError::InvalidRange {
                    row_start: origin.0 as u32,
                    col_start: origin.1 as u32,
                    row_end: (origin.0 + extent.0).saturating_sub(1) as u32,
                    col_end: (origin.1 + extent.1).saturating_sub(1) as u32,
                    rows: ds.dims.0 as u32,
                    cols: ds.dims.1 as u32,
                }
                .into());
            }
            out.extend_from_slice(&ds.bytes[row_start..row_start + row_len]);
        }
        Ok(out)
    }

    fn write_slab(&mut self, path: &str, origin: Dims, extent: Dims, buffer: &[u8]) -> BagResult<()> {
        let needed_rows = origin.0 + extent.0;
        let current_dims = self
            .datasets
            .get(path)
            .ok_or_else(|| StoreError::Backend(format!("no dataset at `{}`", path)))?
            .dims;
        if needed_rows > current_dims.0 {
            self.extend(path, (needed_rows, current_dims.1))?;
        }
        let ds = self
            .datasets
            .get_mut(path)
            .ok_or_else(|| StoreError::Backend(format!("no dataset at `{}`", path)))?;
        let elem_size = ds.element_type.byte_size();
        let (start, len) = row_major_range(ds.dims, elem_size, origin, extent)?;
        if buffer.len() != len {
            return Err(StoreError::Backend(format!(
                "write_slab buffer length {} does not match expected {}",
                buffer.len(),
                len
            ))
            .into());
        }
        if extent.1 == ds.dims.1 {
            ds.bytes[start..start + len].copy_from_slice(buffer);
        } else {
            for r in 0..extent.0 {
                let row_start = ((origin.0 + r) as usize) * ds.dims.1 as usize * elem_size
                    + (origin.1 as usize) * elem_size;
                let row_len = (extent.1 as usize) * elem_size;
                let src_start = (r as usize) * row_len;
                ds.bytes[row_start..row_start + row_len].copy_from_slice(&buffer[src_start..src_start + row_len]);
            }
        }
        Ok(())
    }

    fn extend(&mut self, path: &str, new_dims: Dims) -> BagResult<()> {
        let ds = self
            .datasets
            .get_mut(path)
            .ok_or_else(|| StoreError::Backend(format!("no dataset at `{}`", path)))?;
        let elem_size = ds.element_type.byte_size();
        let new_size = (new_dims.0 as usize) * (new_dims.1 as usize) * elem_size;
        ds.bytes.resize(new_size, 0u8);
        ds.dims = new_dims;
        Ok(())
    }

    fn read_attribute(&self, target: &str, name: &str) -> BagResult<AttributeValue> {
        self.attributes
            .get(&(target.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::Backend(format!("no attribute `{}` on `{}`", name, target)).into())
    }

    fn write_attribute(&mut self, target: &str, name: &str, value: AttributeValue) -> BagResult<()> {
        self.attributes.insert((target.to_string(), name.to_string()), value);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.datasets.contains_key(path)
    }
}
