//! Integration tests for signature generation over files and buffers.

use std::fs::File;
use std::io::Write;
use std::num::NonZeroU32;

use proptest::prelude::*;
use signature::wire::{read_signature, write_signature};
use signature::{ChecksumSpec, SignatureAlgorithm, SignatureGenerator, SignatureOptions};

fn generator(block: u32) -> SignatureGenerator {
    SignatureGenerator::new(
        NonZeroU32::new(block).expect("non-zero"),
        ChecksumSpec::new(SignatureAlgorithm::Md5),
    )
}

#[test]
fn file_signature_matches_buffer_signature() {
    let data: Vec<u8> = (0..50_000u32).map(|i| (i.wrapping_mul(31) >> 3) as u8).collect();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&data).expect("write basis");
    file.flush().expect("flush");

    let generator = SignatureOptions::new()
        .generator(data.len() as u64)
        .expect("generator");
    let from_file = generator
        .generate_reader(File::open(file.path()).expect("open basis"))
        .expect("file signature");
    let from_buffer = generator.generate(&data, 0).expect("buffer signature");
    assert_eq!(from_file, from_buffer);
}

#[test]
fn signature_survives_a_trip_through_a_file() {
    let data = b"the quick brown fox jumps over the lazy dog".repeat(40);
    let original = generator(100).generate(&data, 0).expect("signature");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("basis.sig");
    write_signature(File::create(&path).expect("create"), &original).expect("write");
    let decoded = read_signature(File::open(&path).expect("open")).expect("read");
    assert_eq!(decoded, original);
}

proptest! {
    #[test]
    fn blocks_partition_the_basis(
        data in prop::collection::vec(any::<u8>(), 0..4_096),
        block in 1u32..300,
    ) {
        let signature = generator(block).generate(&data, 0).expect("signature");
        let blocks = signature.blocks();

        let total: u64 = blocks.iter().map(|b| u64::from(b.len())).sum();
        prop_assert_eq!(total, data.len() as u64);
        prop_assert_eq!(blocks.len(), data.len().div_ceil(block as usize));

        for (index, pair) in blocks.iter().enumerate() {
            prop_assert_eq!(pair.seq() as usize, index);
            prop_assert_eq!(pair.offset(), index as u64 * u64::from(block));
            if index + 1 < blocks.len() {
                prop_assert_eq!(pair.len(), block);
            }
        }
    }

    #[test]
    fn generation_is_idempotent(data in prop::collection::vec(any::<u8>(), 0..2_048)) {
        let generator = generator(64);
        let first = generator.generate(&data, 0).expect("signature");
        let second = generator.generate(&data, 0).expect("signature");
        prop_assert_eq!(first, second);
    }
}
