//! Exit statuses of the `rdelta` binary, following rsync's errcode.h:
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! |  0   | success                                   |
//! |  1   | syntax, usage or configuration error      |
//! | 11   | error in file I/O                         |
//! | 12   | malformed signature or delta stream       |

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn rdelta() -> Command {
    Command::cargo_bin("rdelta").expect("rdelta binary")
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn no_command_is_a_syntax_error() {
    rdelta()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing command"));
}

#[test]
fn unknown_checksum_is_a_syntax_error() {
    rdelta()
        .args(["signature", "--checksum=blake3", "a", "b"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("blake3"));
}

#[test]
fn block_size_out_of_range_is_a_syntax_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    fs::write(&basis, b"data").expect("basis");
    rdelta()
        .args(["signature", "--block-size=0", arg(&basis), "-"])
        .assert()
        .code(1);
    rdelta()
        .args(["signature", "--block-size=200000", arg(&basis), "-"])
        .assert()
        .code(1);
}

#[test]
fn patch_without_output_or_inplace_is_a_syntax_error() {
    rdelta().args(["patch", "basis", "delta"]).assert().code(1);
}

#[test]
fn missing_basis_is_a_file_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let absent = dir.path().join("absent");
    rdelta()
        .args(["signature", arg(&absent), "-"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("absent"));
}

#[test]
fn garbage_signature_is_a_stream_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sig = dir.path().join("sig");
    let target = dir.path().join("target");
    fs::write(&sig, b"not a signature at all").expect("sig");
    fs::write(&target, b"target").expect("target");
    rdelta()
        .args(["delta", arg(&sig), arg(&target), "-"])
        .assert()
        .code(12);
}

#[test]
fn truncated_delta_is_a_stream_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    let delta = dir.path().join("delta");
    fs::write(&basis, b"basis").expect("basis");
    fs::write(&delta, b"RDDL\x01\x02\x00").expect("delta");
    rdelta()
        .args(["patch", arg(&basis), arg(&delta), "-"])
        .assert()
        .code(12);
}

#[test]
fn delta_reading_past_the_basis_is_a_stream_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    let delta = dir.path().join("delta");
    fs::write(&basis, b"tiny").expect("basis");

    let mut bytes = b"RDDL\x01".to_vec();
    bytes.push(1);
    bytes.extend_from_slice(&100u64.to_be_bytes());
    bytes.extend_from_slice(&0u64.to_be_bytes());
    bytes.extend_from_slice(&8u32.to_be_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&8u64.to_be_bytes());
    fs::write(&delta, &bytes).expect("delta");

    rdelta()
        .args(["patch", arg(&basis), arg(&delta), "-"])
        .assert()
        .code(12)
        .stdout(predicate::str::is_empty());
}
