//! A read-only view over one field of a packed legacy record, for files that
//! pre-date per-layer datasets. The `NODE` group packs `HypothesisStrength` and
//! `NumHypotheses`; the `ELEVATION_SOLUTION` group packs `ShoalElevation`,
//! `StdDev`, and `NumSoundings`. A virtual layer's read projects its field out
//! of every record in the addressed rectangle; writes are always rejected.

use crate::error::{BagResult, UsageError};
use crate::store::BackingStore;
use crate::types::PrimitiveType;

use super::{validate_range, LayerDescriptor, LayerOps};

pub struct InterleavedLegacyLayer {
    descriptor: LayerDescriptor,
    /// Path of the packed record dataset this virtual layer projects from.
    parent_path: String,
    /// Byte offset and primitive type of this layer's field within one packed record.
    field_offset: usize,
    field_type: PrimitiveType,
    record_size: usize,
}

impl InterleavedLegacyLayer {
    pub fn new(
        descriptor: LayerDescriptor,
        parent_path: String,
        field_offset: usize,
        field_type: PrimitiveType,
        record_size: usize,
    ) -> Self {
        InterleavedLegacyLayer { descriptor, parent_path, field_offset, field_type, record_size }
    }
}

impl LayerOps for InterleavedLegacyLayer {
    fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut LayerDescriptor {
        &mut self.descriptor
    }

    fn read(&self, store: &dyn BackingStore, row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> BagResult<Vec<u8>> {
        validate_range(self.descriptor.dims, row_start, col_start, row_end, col_end)?;
        let extent = (row_end - row_start + 1, col_end - col_start + 1);
        let packed = store.read_slab(
            &self.parent_path,
            (row_start as u64, col_start as u64),
            (extent.0 as u64, extent.1 as u64),
        )?;
        let field_size = self.field_type.byte_size();
        let cells = (extent.0 as usize) * (extent.1 as usize);
        let mut out = Vec::with_capacity(cells * field_size);
        for cell in 0..cells {
            let record_start = cell * self.record_size + self.field_offset;
            out.extend_from_slice(&packed[record_start..record_start + field_size]);
        }
        Ok(out)
    }

    fn write(
        &mut self,
        _store: &mut dyn BackingStore,
        _row_start: u32,
        _col_start: u32,
        _row_end: u32,
        _col_end: u32,
        _buffer: &[u8],
    ) -> BagResult<()> {
        Err(UsageError::ReadOnlyLayer(self.descriptor.kind).into())
    }

    fn write_attributes(&self, _store: &mut dyn BackingStore) -> BagResult<()> {
        Err(UsageError::ReadOnlyLayer(self.descriptor.kind).into())
    }
}
