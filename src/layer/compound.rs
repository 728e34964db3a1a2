//! A layer of user-declared, record-typed cells. The buffer layout is field
//! order with no inter-field padding; the field table is persisted alongside
//! the main dataset so a later open can reconstruct `ElementType::Compound`.

use crate::error::BagResult;
use crate::store::{AttributeValue, BackingStore};
use crate::types::PrimitiveType;

use super::{validate_range, write_common_attributes, LayerDescriptor, LayerOps};

pub struct CompoundLayer {
    descriptor: LayerDescriptor,
    fields: Vec<(String, PrimitiveType)>,
}

impl CompoundLayer {
    pub fn new(descriptor: LayerDescriptor, fields: Vec<(String, PrimitiveType)>) -> Self {
        CompoundLayer { descriptor, fields }
    }

    pub fn fields(&self) -> &[(String, PrimitiveType)] {
        &self.fields
    }

    fn field_table_path(&self) -> String {
        field_table_path(&self.descriptor.internal_path)
    }
}

/// Path of the auxiliary dataset a `CompoundLayer`'s field table is persisted
/// under, alongside its main dataset. Shared with `Dataset`'s open-time layer
/// registry rebuild, which reads this attribute back via the same path.
pub fn field_table_path(internal_path: &str) -> String {
    format!("{}_fields", internal_path)
}

/// Inverse of `write_attributes`' `"name:Type;name2:Type2"` field table encoding.
pub fn parse_field_table(raw: &str) -> Vec<(String, PrimitiveType)> {
    raw.split(';')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (name, ty) = entry.split_once(':')?;
            Some((name.to_string(), PrimitiveType::parse(ty)?))
        })
        .collect()
}

impl LayerOps for CompoundLayer {
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
        // Compound records have no single no-data sentinel (§9); min/max tracking
        // does not apply to them.
    }

    fn write_attributes(&self, store: &mut dyn BackingStore) -> BagResult<()> {
        write_common_attributes(&self.descriptor, store)?;
        let joined = self
            .fields
            .iter()
            .map(|(name, ty)| format!("{}:{:?}", name, ty))
            .collect::<Vec<_>>()
            .join(";");
        store.write_attribute(&self.field_table_path(), "fields", AttributeValue::Str(joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_table_round_trips_through_its_text_encoding() {
        let fields = vec![
            ("amplitude".to_string(), PrimitiveType::Float32),
            ("count".to_string(), PrimitiveType::UInt32),
            ("flag".to_string(), PrimitiveType::UInt8),
        ];
        let joined = fields.iter().map(|(n, t)| format!("{}:{:?}", n, t)).collect::<Vec<_>>().join(";");
        assert_eq!(parse_field_table(&joined), fields);
    }
}
