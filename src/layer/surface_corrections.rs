//! A vertical-datum correction surface: each cell holds `correctorCount` z
//! offsets (1..10) plus the (x,y) sample location, on a grid that may be
//! coarser than the main elevation/uncertainty grid.

use crate::error::{BagResult, BagFormatError};
use crate::store::{AttributeValue, BackingStore};

use super::{validate_range, write_common_attributes, LayerDescriptor, LayerOps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topography {
    Gridded,
    IrregularlySpaced,
}

pub struct SurfaceCorrectionsLayer {
    descriptor: LayerDescriptor,
    corrector_count: u32,
    topography: Topography,
    vertical_datums: Vec<String>,
}

impl SurfaceCorrectionsLayer {
    pub fn new(
        descriptor: LayerDescriptor,
        corrector_count: u32,
        topography: Topography,
        vertical_datums: Vec<String>,
    ) -> BagResult<Self> {
        if corrector_count == 0 || corrector_count > 10 {
            return Err(BagFormatError::InvalidCorrectorCount(corrector_count).into());
        }
        Ok(SurfaceCorrectionsLayer { descriptor, corrector_count, topography, vertical_datums })
    }

    pub fn corrector_count(&self) -> u32 {
        self.corrector_count
    }

    pub fn topography(&self) -> Topography {
        self.topography
    }

    pub fn vertical_datums(&self) -> &[String] {
        &self.vertical_datums
    }
}

impl LayerOps for SurfaceCorrectionsLayer {
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
        )
    }

    fn write_attributes(&self, store: &mut dyn BackingStore) -> BagResult<()> {
        write_common_attributes(&self.descriptor, store)?;
        store.write_attribute(
            &self.descriptor.internal_path,
            "verticaldatums",
            AttributeValue::Str(self.vertical_datums.join(";")),
        )?;
        store.write_attribute(
            &self.descriptor.internal_path,
            "topography",
            AttributeValue::U32(match self.topography {
                Topography::Gridded => 0,
                Topography::IrregularlySpaced => 1,
            }),
        )?;
        // Not part of the fixed §6 file layout, but needed to recover `corrector_count`
        // on open: the backing store's element-type introspection can't report it back
        // (see Hdf5Store::open_dataset), so the core persists it itself.
        store.write_attribute(&self.descriptor.internal_path, "corrector_count", AttributeValue::U32(self.corrector_count))
    }
}

/// Splits a `verticalDatums` attribute on `;` or `,`, trimming whitespace and
/// dropping empty entries. Accepts either separator per §3.
pub fn parse_vertical_datums(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Topography {
    pub fn from_u32(v: u32) -> Topography {
        match v {
            1 => Topography::IrregularlySpaced,
            _ => Topography::Gridded,
        }
    }
}
