//! The tracking list: a growable, persistently stored sequence of per-node
//! manual-override records. Storage is a 1-D chunked dataset of packed
//! `TrackingItem` records with unlimited extent, plus a `Tracking List Length`
//! attribute tracking the logical count independent of the physical allocation
//! HDF5 may have already grown the dataset to.

use crate::error::{BagResult, StoreError};
use crate::store::{AttributeValue, BackingStore, Dims};

/// Fixed internal path of the tracking list dataset (§6).
pub const INTERNAL_PATH: &str = "/BAG_root/tracking_list";
const LENGTH_ATTRIBUTE: &str = "Tracking List Length";
/// `row:u32, col:u32, depth:f32, uncertainty:f32, track_code:u8, list_series:i16`, packed.
const RECORD_SIZE: usize = 4 + 4 + 4 + 4 + 1 + 2;

fn record_element_type() -> crate::types::ElementType {
    use crate::types::{ElementType, PrimitiveType};
    ElementType::Compound(vec![
        ("row".to_string(), PrimitiveType::UInt32),
        ("col".to_string(), PrimitiveType::UInt32),
        ("depth".to_string(), PrimitiveType::Float32),
        ("uncertainty".to_string(), PrimitiveType::Float32),
        ("track_code".to_string(), PrimitiveType::UInt8),
        ("list_series".to_string(), PrimitiveType::Int16),
    ])
}

/// One manual-override record: the cell it applies to, the corrected depth and
/// uncertainty, a caller-defined track code, and the list series it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingItem {
    pub row: u32,
    pub col: u32,
    pub depth: f32,
    pub uncertainty: f32,
    pub track_code: u8,
    pub list_series: i16,
}

impl TrackingItem {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.row.to_le_bytes());
        out.extend_from_slice(&self.col.to_le_bytes());
        out.extend_from_slice(&self.depth.to_le_bytes());
        out.extend_from_slice(&self.uncertainty.to_le_bytes());
        out.push(self.track_code);
        out.extend_from_slice(&self.list_series.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> TrackingItem {
        TrackingItem {
            row: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            col: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            depth: f32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            uncertainty: f32::from_le_bytes(bytes[12..16].try_into().unwrap()),
            track_code: bytes[16],
            list_series: i16::from_le_bytes(bytes[17..19].try_into().unwrap()),
        }
    }
}

/// The in-memory vector plus the bookkeeping needed to flush it to the backing
/// store as a single hyperslab. Not thread-safe; serialization is the caller's
/// responsibility, same as every other part of a `Dataset`.
pub struct TrackingList {
    items: Vec<TrackingItem>,
    chunk_size: u32,
}

impl TrackingList {
    /// Creates the backing dataset (unlimited extent, `chunk_size` records per
    /// chunk) and its `length` attribute, and returns an empty list bound to it.
    pub fn create(store: &mut dyn BackingStore, chunk_size: u32) -> BagResult<TrackingList> {
        let chunk = chunk_size.max(1);
        store.create_dataset(INTERNAL_PATH, &record_element_type(), (0, 1), (chunk as u64, 1), 0)?;
        store.write_attribute(INTERNAL_PATH, LENGTH_ATTRIBUTE, AttributeValue::U32(0))?;
        Ok(TrackingList { items: Vec::new(), chunk_size: chunk })
    }

    /// Reads `length` then that many records back into memory. A missing
    /// length attribute is treated as zero (soft recovery, logged).
    pub fn open(store: &dyn BackingStore, chunk_size: u32) -> BagResult<TrackingList> {
        let length = match store.read_attribute(INTERNAL_PATH, LENGTH_ATTRIBUTE) {
            Ok(v) => v.as_u32().unwrap_or(0),
            Err(_) => {
                log::warn!("tracking list length attribute missing; assuming 0");
                0
            }
        };
        let items = if length == 0 {
            Vec::new()
        } else {
            let bytes = store.read_slab(INTERNAL_PATH, (0, 0), (length as u64, 1))?;
            decode_all(&bytes, length as usize)?
        };
        Ok(TrackingList { items, chunk_size: chunk_size.max(1) })
    }

    pub fn push(&mut self, item: TrackingItem) {
        self.items.push(item);
    }

    pub fn push_all<I: IntoIterator<Item = TrackingItem>>(&mut self, items: I) {
        self.items.extend(items);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn at(&self, index: usize) -> Option<&TrackingItem> {
        self.items.get(index)
    }

    pub fn iterate(&self) -> impl Iterator<Item = &TrackingItem> {
        self.items.iter()
    }

    /// Items whose `row` matches, in insertion order.
    pub fn by_row(&self, row: u32) -> impl Iterator<Item = &TrackingItem> {
        self.items.iter().filter(move |i| i.row == row)
    }

    /// Items whose `track_code` matches, in insertion order.
    pub fn by_code(&self, track_code: u8) -> impl Iterator<Item = &TrackingItem> {
        self.items.iter().filter(move |i| i.track_code == track_code)
    }

    /// Items whose `list_series` matches, in insertion order.
    pub fn by_series(&self, list_series: i16) -> impl Iterator<Item = &TrackingItem> {
        self.items.iter().filter(move |i| i.list_series == list_series)
    }

    /// Atomic per call: updates `length`, extends the dataset to `length`, then
    /// writes the whole in-memory vector as a single hyperslab. An empty list
    /// writes `length = 0` and leaves the dataset at its creation extent.
    pub fn write(&self, store: &mut dyn BackingStore) -> BagResult<()> {
        store.write_attribute(INTERNAL_PATH, LENGTH_ATTRIBUTE, AttributeValue::U32(self.items.len() as u32))?;
        if self.items.is_empty() {
            return Ok(());
        }
        let dims: Dims = (self.items.len() as u64, 1);
        store.extend(INTERNAL_PATH, dims)?;
        let mut bytes = Vec::with_capacity(self.items.len() * RECORD_SIZE);
        for item in &self.items {
            item.encode(&mut bytes);
        }
        store.write_slab(INTERNAL_PATH, (0, 0), dims, &bytes)
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }
}

fn decode_all(bytes: &[u8], length: usize) -> BagResult<Vec<TrackingItem>> {
    let expected = length * RECORD_SIZE;
    if bytes.len() < expected {
        return Err(StoreError::Backend(format!(
            "tracking list expected {} bytes for {} records, got {}",
            expected,
            length,
            bytes.len()
        ))
        .into());
    }
    Ok(bytes.chunks_exact(RECORD_SIZE).take(length).map(TrackingItem::decode).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn sample(row: u32) -> TrackingItem {
        TrackingItem { row, col: row + 1, depth: row as f32 * 1.5, uncertainty: 0.1, track_code: 3, list_series: -1 }
    }

    #[test]
    fn create_open_write_round_trips_items_in_insertion_order() {
        let mut store = MemoryStore::create();
        let mut list = TrackingList::create(&mut store, 10).unwrap();
        list.push_all((0..5).map(sample));
        list.write(&mut store).unwrap();

        let reopened = TrackingList::open(&store, 10).unwrap();
        assert_eq!(reopened.size(), 5);
        assert_eq!(reopened.iterate().cloned().collect::<Vec<_>>(), (0..5).map(sample).collect::<Vec<_>>());
    }

    #[test]
    fn empty_write_leaves_length_zero_and_dataset_unextended() {
        let mut store = MemoryStore::create();
        let list = TrackingList::create(&mut store, 10).unwrap();
        list.write(&mut store).unwrap();
        assert_eq!(store.read_attribute(INTERNAL_PATH, LENGTH_ATTRIBUTE).unwrap().as_u32(), Some(0));
        assert_eq!(store.open_dataset(INTERNAL_PATH).unwrap().dims, (0, 1));
    }

    #[test]
    fn by_row_by_code_by_series_filter_in_memory() {
        let mut list = TrackingList::create(&mut MemoryStore::create(), 10).unwrap();
        list.push(TrackingItem { row: 1, col: 1, depth: 1.0, uncertainty: 0.1, track_code: 1, list_series: 0 });
        list.push(TrackingItem { row: 1, col: 2, depth: 2.0, uncertainty: 0.1, track_code: 2, list_series: 1 });
        list.push(TrackingItem { row: 2, col: 1, depth: 3.0, uncertainty: 0.1, track_code: 1, list_series: 1 });

        assert_eq!(list.by_row(1).count(), 2);
        assert_eq!(list.by_code(1).count(), 2);
        assert_eq!(list.by_series(1).count(), 2);
    }

    #[test]
    fn clear_empties_the_in_memory_vector() {
        let mut list = TrackingList::create(&mut MemoryStore::create(), 10).unwrap();
        list.push(sample(0));
        list.clear();
        assert_eq!(list.size(), 0);
    }
}
