extern crate bag;
extern crate criterion;

use bag::store::memory::MemoryStore;
use bag::store::BackingStore;
use bag::types::{ElementType, LayerKind};

use criterion::{black_box, measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput};

/// Writes then reads back a square `Elevation` layer of `side` cells, chunked
/// at `chunk`, over the in-memory store — the same read/write path a real
/// `Hdf5Store` takes, minus the HDF5 library itself.
fn write_then_read(side: u32, chunk: u32) {
    let mut store = MemoryStore::create();
    let path = LayerKind::Elevation.internal_path();
    store
        .create_dataset(path, &ElementType::Float32, (side as u64, side as u64), (chunk as u64, chunk as u64), 1)
        .unwrap();

    let mut buffer = Vec::with_capacity(side as usize * side as usize * 4);
    for r in 0..side {
        for c in 0..side {
            let value = ((c * r) % 100) as f32 + (c as f32) / 100.0;
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }
    store.write_slab(path, (0, 0), (side as u64, side as u64), black_box(&buffer)).unwrap();
    let read_back = store.read_slab(path, (0, 0), (side as u64, side as u64)).unwrap();
    black_box(read_back);
}

fn main() {
    struct BenchDef {
        side: u32,
        chunk: u32,
        id: &'static str,
        sample_size: usize,
    }

    fn run_bench_def<M: Measurement>(group: &mut BenchmarkGroup<M>, def: BenchDef) {
        let bytes = (def.side as u64) * (def.side as u64) * 4;
        group.sample_size(def.sample_size).throughput(Throughput::Bytes(bytes)).bench_with_input(
            BenchmarkId::new(def.id, bytes),
            &(def.side, def.chunk),
            |b, &(side, chunk)| b.iter(|| write_then_read(side, chunk)),
        );
    }

    let mut c = Criterion::default().configure_from_args();
    let mut group = c.benchmark_group("bag-layer-io");

    run_bench_def(&mut group, BenchDef { side: 100, chunk: 100, id: "elevation-100x100-chunk100", sample_size: 100 });
    run_bench_def(&mut group, BenchDef { side: 500, chunk: 100, id: "elevation-500x500-chunk100", sample_size: 30 });
    run_bench_def(&mut group, BenchDef { side: 500, chunk: 50, id: "elevation-500x500-chunk50", sample_size: 30 });
    run_bench_def(&mut group, BenchDef { side: 1000, chunk: 200, id: "elevation-1000x1000-chunk200", sample_size: 10 });
}
