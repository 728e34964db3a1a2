//! A scalar layer: one `Float32` or `UInt32` per cell, stored as a plain 2-D
//! chunked dataset at the kind's fixed internal path.

use crate::error::BagResult;
use crate::store::BackingStore;

use super::{update_min_max, validate_range, LayerDescriptor, LayerOps};

pub struct SimpleLayer {
    descriptor: LayerDescriptor,
}

impl SimpleLayer {
    pub fn new(descriptor: LayerDescriptor) -> Self {
        SimpleLayer { descriptor }
    }
}

impl LayerOps for SimpleLayer {
    fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut LayerDescriptor {
        &mut self.descriptor
    }

    fn read(&self, store: &dyn BackingStore, row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> BagResult<Vec<u8>> {
        validate_range(self.descriptor.dims, row_start, col_start, row_end, col_end)?;
        let extent = (row_end - row_start + 1, col_end - col_start + 1);
        store.read_slab(
            &self.descriptor.internal_path,
            (row_start as u64, col_start as u64),
            (extent.0 as u64, extent.1 as u64),
        )
    }

    fn write(
        &mut self,
        store: &mut dyn BackingStore,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
        buffer: &[u8],
    ) -> BagResult<()> {
        validate_range(self.descriptor.dims, row_start, col_start, row_end, col_end)?;
        let extent = (row_end - row_start + 1, col_end - col_start + 1);
        store.write_slab(
            &self.descriptor.internal_path,
            (row_start as u64, col_start as u64),
            (extent.0 as u64, extent.1 as u64),
            buffer,
        )?;
        update_min_max(&mut self.descriptor, buffer);
        Ok(())
    }

    fn write_attributes(&self, store: &mut dyn BackingStore) -> BagResult<()> {
        super::write_common_attributes(&self.descriptor, store)
    }
}
