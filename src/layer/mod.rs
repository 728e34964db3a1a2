//! The layer family: a tagged variant standing in for the source's polymorphic
//! hierarchy of virtual `readProxy`/`writeProxy`/`writeAttributesProxy` methods
//! (see SPEC_FULL.md §9). Each variant implements the same `LayerOps` capability
//! trait; `Layer::read`/`write`/`write_attributes` dispatch to it.
//!
//! Layers never hold a borrow of their owning `Dataset`. Instead every I/O
//! method takes the `BackingStore` explicitly, the "explicit handle per
//! operation" fallback the design notes call for in a borrow-checked host.

pub mod compound;
pub mod interleaved;
pub mod simple;
pub mod surface_corrections;

use crate::error::{BagResult, UsageError};
use crate::store::BackingStore;
use crate::types::{ElementType, LayerKind};

pub use compound::CompoundLayer;
pub use interleaved::InterleavedLegacyLayer;
pub use simple::SimpleLayer;
pub use surface_corrections::{SurfaceCorrectionsLayer, Topography};

/// Shared, per-layer state every variant carries.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub kind: LayerKind,
    pub element_type: ElementType,
    pub element_size: usize,
    pub internal_path: String,
    pub chunk_size: u32,
    pub compression_level: u8,
    pub dims: (u32, u32),
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub name: String,
}

impl LayerDescriptor {
    pub fn new(kind: LayerKind, element_type: ElementType, dims: (u32, u32), chunk_size: u32, compression_level: u8) -> Self {
        let element_size = element_type.byte_size();
        LayerDescriptor {
            kind,
            element_type,
            element_size,
            internal_path: kind.internal_path().to_string(),
            chunk_size: chunk_size.max(1),
            compression_level: compression_level.min(9),
            dims,
            min_value: None,
            max_value: None,
            name: kind.label().to_string(),
        }
    }
}

/// Preconditions shared by every layer's `read`/`write`: `InvalidRange` on the
/// first violated bound, matching §4.5 exactly.
pub(crate) fn validate_range(dims: (u32, u32), row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> BagResult<()> {
    if row_start > row_end
        || col_start > col_end
        || row_end >= dims.0
        || col_end >= dims.1
    {
        return Err(UsageError::InvalidRange {
            row_start,
            col_start,
            row_end,
            col_end,
            rows: dims.0,
            cols: dims.1,
        }
        .into());
    }
    Ok(())
}

/// Updates `descriptor.min_value`/`max_value` from freshly written bytes,
/// skipping the kind's no-data sentinel (§9 decision).
pub(crate) fn update_min_max(descriptor: &mut LayerDescriptor, buffer: &[u8]) {
    match &descriptor.element_type {
        ElementType::Float32 => {
            let sentinel = 1.0e6_f32;
            for chunk in buffer.chunks_exact(4) {
                let v = f32::from_le_bytes(chunk.try_into().unwrap());
                if v == sentinel {
                    continue;
                }
                descriptor.min_value = Some(descriptor.min_value.map_or(v as f64, |m| m.min(v as f64)));
                descriptor.max_value = Some(descriptor.max_value.map_or(v as f64, |m| m.max(v as f64)));
            }
        }
        ElementType::UInt32 => {
            for chunk in buffer.chunks_exact(4) {
                let v = u32::from_le_bytes(chunk.try_into().unwrap());
                if v == u32::MAX {
                    continue;
                }
                descriptor.min_value = Some(descriptor.min_value.map_or(v as f64, |m| m.min(v as f64)));
                descriptor.max_value = Some(descriptor.max_value.map_or(v as f64, |m| m.max(v as f64)));
            }
        }
        ElementType::Compound(_) | ElementType::VerticalDatumCorrectionRecord { .. } => {}
    }
}

/// Flushes the descriptor-level attributes every variant shares: min, max,
/// chunk size, compression level. Variant-specific attributes (compound field
/// table, `verticaldatums`) are written by the variant's own `write_attributes`.
pub(crate) fn write_common_attributes(descriptor: &LayerDescriptor, store: &mut dyn BackingStore) -> BagResult<()> {
    use crate::store::AttributeValue;
    if let Some(min) = descriptor.min_value {
        store.write_attribute(&descriptor.internal_path, "min", AttributeValue::F32(min as f32))?;
    }
    if let Some(max) = descriptor.max_value {
        store.write_attribute(&descriptor.internal_path, "max", AttributeValue::F32(max as f32))?;
    }
    store.write_attribute(&descriptor.internal_path, "chunk size", AttributeValue::U32(descriptor.chunk_size))?;
    store.write_attribute(
        &descriptor.internal_path,
        "compression level",
        AttributeValue::U32(descriptor.compression_level as u32),
    )?;
    Ok(())
}

/// Capability interface every layer variant implements.
pub trait LayerOps {
    fn descriptor(&self) -> &LayerDescriptor;
    fn descriptor_mut(&mut self) -> &mut LayerDescriptor;

    fn read(
        &self,
        store: &dyn BackingStore,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
    ) -> BagResult<Vec<u8>>;

    fn write(
        &mut self,
        store: &mut dyn BackingStore,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
        buffer: &[u8],
    ) -> BagResult<()>;

    fn write_attributes(&self, store: &mut dyn BackingStore) -> BagResult<()>;
}

/// A layer of any of the four storage shapes the format supports.
pub enum Layer {
    Simple(SimpleLayer),
    Compound(CompoundLayer),
    InterleavedLegacy(InterleavedLegacyLayer),
    SurfaceCorrections(SurfaceCorrectionsLayer),
}

impl Layer {
    pub fn descriptor(&self) -> &LayerDescriptor {
        match self {
            Layer::Simple(l) => l.descriptor(),
            Layer::Compound(l) => l.descriptor(),
            Layer::InterleavedLegacy(l) => l.descriptor(),
            Layer::SurfaceCorrections(l) => l.descriptor(),
        }
    }

    pub fn descriptor_mut(&mut self) -> &mut LayerDescriptor {
        match self {
            Layer::Simple(l) => l.descriptor_mut(),
            Layer::Compound(l) => l.descriptor_mut(),
            Layer::InterleavedLegacy(l) => l.descriptor_mut(),
            Layer::SurfaceCorrections(l) => l.descriptor_mut(),
        }
    }

    pub fn read(
        &self,
        store: &dyn BackingStore,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
    ) -> BagResult<Vec<u8>> {
        match self {
            Layer::Simple(l) => l.read(store, row_start, col_start, row_end, col_end),
            Layer::Compound(l) => l.read(store, row_start, col_start, row_end, col_end),
            Layer::InterleavedLegacy(l) => l.read(store, row_start, col_start, row_end, col_end),
            Layer::SurfaceCorrections(l) => l.read(store, row_start, col_start, row_end, col_end),
        }
    }

    pub fn write(
        &mut self,
        store: &mut dyn BackingStore,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
        buffer: &[u8],
    ) -> BagResult<()> {
        match self {
            Layer::Simple(l) => l.write(store, row_start, col_start, row_end, col_end, buffer),
            Layer::Compound(l) => l.write(store, row_start, col_start, row_end, col_end, buffer),
            Layer::InterleavedLegacy(l) => l.write(store, row_start, col_start, row_end, col_end, buffer),
            Layer::SurfaceCorrections(l) => l.write(store, row_start, col_start, row_end, col_end, buffer),
        }
    }

    pub fn write_attributes(&self, store: &mut dyn BackingStore) -> BagResult<()> {
        match self {
            Layer::Simple(l) => l.write_attributes(store),
            Layer::Compound(l) => l.write_attributes(store),
            Layer::InterleavedLegacy(l) => l.write_attributes(store),
            Layer::SurfaceCorrections(l) => l.write_attributes(store),
        }
    }
}
