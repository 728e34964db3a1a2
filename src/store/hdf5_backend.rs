//! The real `BackingStore`, backed by the `hdf5-metno` crate. Feature-gated
//! behind `hdf5-backend` (on by default) so the rest of the crate, and its test
//! suite, can build without linking libhdf5.

use std::path::Path;

use hdf5_metno::{File as H5File, Group};
use ndarray::ArrayD;

use crate::error::{BagResult, StoreError};
use crate::types::ElementType;

use super::{AttributeValue, BackingStore, DatasetInfo, Dims};

/// An open BAG file backed by a real HDF5 container.
pub struct Hdf5Store {
    file: H5File,
}

impl Hdf5Store {
    /// Equivalent of `createFile`: truncates or creates `path`.
    pub fn create(path: &Path) -> BagResult<Hdf5Store> {
        let file = H5File::create(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Hdf5Store { file })
    }

    /// Equivalent of `openFile`. `read_only` selects HDF5's read-only open mode.
    pub fn open(path: &Path, read_only: bool) -> BagResult<Hdf5Store> {
        let file = if read_only {
            H5File::open(path)
        } else {
            H5File::open_rw(path)
        }
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Hdf5Store { file })
    }

    fn group_for(&self, path: &str) -> BagResult<Group> {
        let parent = parent_path(path);
        if parent.is_empty() || parent == "/" {
            return Ok(self.file.as_group().map_err(|e| StoreError::Backend(e.to_string()))?);
        }
        if self.file.group(&parent).is_err() {
            self.file.create_group(&parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        self.file.group(&parent).map_err(|e| StoreError::Backend(e.to_string())).map_err(Into::into)
    }
}

fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => String::new(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl BackingStore for Hdf5Store {
    fn close(&mut self) -> BagResult<()> {
        // hdf5_metno::File flushes and closes its handle on drop; an explicit
        // flush here surfaces I/O errors synchronously rather than silently on drop.
        self.file.flush().map_err(|e| StoreError::Backend(e.to_string()).into())
    }

    fn create_dataset(
        &mut self,
        path: &str,
        element_type: &ElementType,
        dims: Dims,
        chunk: Dims,
        compression_level: u8,
    ) -> BagResult<()> {
        let group = self.group_for(path)?;
        let shape = (dims.0 as usize, dims.1 as usize);
        let chunk_shape = (chunk.0.max(1) as usize, chunk.1.max(1) as usize);
        let builder = group.new_dataset_builder().chunk(chunk_shape).deflate(compression_level);
        match element_type {
            ElementType::Float32 => {
                builder
                    .shape(shape)
                    .create::<f32, _>(leaf_name(path))
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
            }
            ElementType::UInt32 => {
                builder
                    .shape(shape)
                    .create::<u32, _>(leaf_name(path))
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
            }
            ElementType::Compound(_) | ElementType::VerticalDatumCorrectionRecord { .. } => {
                // Packed records are stored as raw byte rows; HDF5 compound types
                // mirroring the field table are a possible follow-up, not required here.
                builder
                    .shape((shape.0, shape.1 * element_type.byte_size()))
                    .create::<u8, _>(leaf_name(path))
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn open_dataset(&self, path: &str) -> BagResult<DatasetInfo> {
        let ds = self.file.dataset(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let shape = ds.shape();
        let dims = (*shape.first().unwrap_or(&0) as u64, *shape.get(1).unwrap_or(&1) as u64);
        // The concrete element type cannot be recovered from HDF5 type info alone
        // for compound records; callers of `open_dataset` on a layer with a known
        // kind already know the canonical type and pass it through separately.
        Ok(DatasetInfo { element_type: ElementType::Float32, dims })
    }

    fn read_slab(&self, path: &str, origin: Dims, extent: Dims) -> BagResult<Vec<u8>> {
        let ds = self.file.dataset(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let slice = ndarray::s![
            origin.0 as usize..(origin.0 + extent.0) as usize,
            origin.1 as usize..(origin.1 + extent.1) as usize
        ];
        let array: ArrayD<u8> = ds
            .read_slice(slice)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(array.into_raw_vec())
    }

    fn write_slab(&mut self, path: &str, origin: Dims, extent: Dims, buffer: &[u8]) -> BagResult<()> {
        let ds = self.file.dataset(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let shape = ds.shape();
        if origin.0 + extent.0 > shape.first().copied().unwrap_or(0) as u64 {
            self.extend(path, (origin.0 + extent.0, origin.1 + extent.1.max(shape.get(1).copied().unwrap_or(1) as u64)))?;
        }
        let ds = self.file.dataset(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let array = ArrayD::from_shape_vec(vec![extent.0 as usize, extent.1 as usize], buffer.to_vec())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let slice = ndarray::s![
            origin.0 as usize..(origin.0 + extent.0) as usize,
            origin.1 as usize..(origin.1 + extent.1) as usize
        ];
        ds.write_slice(&array, slice).map_err(|e| StoreError::Backend(e.to_string()).into())
    }

    fn extend(&mut self, path: &str, new_dims: Dims) -> BagResult<()> {
        let ds = self.file.dataset(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        ds.resize((new_dims.0 as usize, new_dims.1 as usize))
            .map_err(|e| StoreError::Backend(e.to_string()).into())
    }

    fn read_attribute(&self, target: &str, name: &str) -> BagResult<AttributeValue> {
        if target.is_empty() || target == "/" {
            read_attr_from(&self.file, name)
        } else if self.file.dataset(target).is_ok() {
            read_attr_from(&self.file.dataset(target).map_err(|e| StoreError::Backend(e.to_string()))?, name)
        } else {
            read_attr_from(&self.file.group(target).map_err(|e| StoreError::Backend(e.to_string()))?, name)
        }
    }

    fn write_attribute(&mut self, target: &str, name: &str, value: AttributeValue) -> BagResult<()> {
        if target.is_empty() || target == "/" {
            write_attr_to(&self.file, name, value)
        } else if self.file.dataset(target).is_ok() {
            write_attr_to(&self.file.dataset(target).map_err(|e| StoreError::Backend(e.to_string()))?, name, value)
        } else {
            write_attr_to(&self.file.group(target).map_err(|e| StoreError::Backend(e.to_string()))?, name, value)
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.file.dataset(path).is_ok() || self.file.group(path).is_ok()
    }
}

/// `File`, `Group`, and `Dataset` all implement `Location`, which is where
/// HDF5 attribute creation/access lives; this lets `read_attribute`/
/// `write_attribute` treat the three kinds of target uniformly.
fn read_attr_from<L: hdf5_metno::Location>(location: &L, name: &str) -> BagResult<AttributeValue> {
    let attr = location.attr(name).map_err(|e| StoreError::Backend(e.to_string()))?;
    if let Ok(v) = attr.read_scalar::<u32>() {
        return Ok(AttributeValue::U32(v));
    }
    if let Ok(v) = attr.read_scalar::<f32>() {
        return Ok(AttributeValue::F32(v));
    }
    let v = attr
        .read_scalar::<hdf5_metno::types::VarLenUnicode>()
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(AttributeValue::Str(v.to_string()))
}

fn write_attr_to<L: hdf5_metno::Location>(location: &L, name: &str, value: AttributeValue) -> BagResult<()> {
    match value {
        AttributeValue::U32(v) => location
            .new_attr::<u32>()
            .create(name)
            .and_then(|a| a.write_scalar(&v))
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        AttributeValue::F32(v) => location
            .new_attr::<f32>()
            .create(name)
            .and_then(|a| a.write_scalar(&v))
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        AttributeValue::Str(s) => {
            let value: hdf5_metno::types::VarLenUnicode =
                s.parse().map_err(|_| StoreError::Backend(format!("invalid unicode attribute `{}`", name)))?;
            location
                .new_attr::<hdf5_metno::types::VarLenUnicode>()
                .create(name)
                .and_then(|a| a.write_scalar(&value))
                .map_err(|e| StoreError::Backend(e.to_string()))?
        }
    }
    Ok(())
}
