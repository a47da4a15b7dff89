//! Delta matching throughput.
//!
//! ```bash
//! cargo bench -p matching --bench matcher_benchmark
//! cargo bench -p matching --bench matcher_benchmark -- "stream"
//! ```

use std::hint::black_box;
use std::num::NonZeroU32;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use checksums::RollingDigest;
use matching::{BlockIndex, Delta, ListenerError, Matcher, StreamMatcher};
use signature::{ChecksumSpec, SignatureAlgorithm, SignatureGenerator};

// ============================================================================
// Test Data Utilities
// ============================================================================

/// Deterministic, weakly periodic content.
fn make_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 7) % 251) as u8).collect()
}

/// Copy of `data` with a short edit every `stride` bytes.
fn make_modified(data: &[u8], stride: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    for pos in (stride / 2..out.len()).step_by(stride) {
        out[pos] ^= 0xff;
    }
    out
}

fn build_index(data: &[u8], block: u32, algorithm: SignatureAlgorithm) -> BlockIndex {
    let generator = SignatureGenerator::new(
        NonZeroU32::new(block).expect("non-zero block"),
        ChecksumSpec::new(algorithm),
    );
    BlockIndex::build(&generator.generate(data, 0).expect("signature"))
}

// ============================================================================
// Index Lookup
// ============================================================================

fn bench_index_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_lookup");
    let data = make_test_data(1024 * 1024);
    let index = build_index(&data, 1024, SignatureAlgorithm::Md4);

    let windows: Vec<_> = data
        .chunks_exact(1024)
        .map(|chunk| (RollingDigest::from_bytes(chunk), chunk))
        .collect();

    group.throughput(Throughput::Elements(windows.len() as u64));
    group.bench_function("aligned_hits_1MB", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for (digest, chunk) in &windows {
                if index.find_match(*digest, chunk, &[], None).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        });
    });
    group.finish();
}

// ============================================================================
// Whole-buffer and Streaming Matching
// ============================================================================

fn bench_matchers(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher");
    group.sample_size(20);

    for size in [256 * 1024, 4 * 1024 * 1024] {
        let basis = make_test_data(size);
        let target = make_modified(&basis, 64 * 1024);
        group.throughput(Throughput::Bytes(size as u64));

        for algorithm in [SignatureAlgorithm::Md4, SignatureAlgorithm::Xxh64 { seed: 0 }] {
            let index = build_index(&basis, 2048, algorithm);
            group.bench_with_input(
                BenchmarkId::new(format!("buffer_{}", algorithm.name()), size),
                &target,
                |b, target| {
                    b.iter(|| black_box(Matcher::new(&index).match_target(black_box(target))));
                },
            );
        }

        let index = build_index(&basis, 2048, SignatureAlgorithm::Md4);
        group.bench_with_input(BenchmarkId::new("stream_md4", size), &target, |b, target| {
            b.iter(|| {
                let mut matcher = StreamMatcher::new(&index).expect("matcher");
                matcher.add_listener(|delta: &Delta| -> Result<(), ListenerError> {
                    black_box(delta);
                    Ok(())
                });
                for chunk in target.chunks(64 * 1024) {
                    matcher.update(chunk).expect("update");
                }
                black_box(matcher.finalize().expect("finalize"))
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = matcher_benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(5))
        .warm_up_time(std::time::Duration::from_secs(1));
    targets = bench_index_lookup, bench_matchers
);

criterion_main!(matcher_benches);
