use std::num::NonZeroUsize;

use proptest::prelude::*;

use super::*;

fn data_and_window() -> impl Strategy<Value = (Vec<u8>, usize)> {
    prop::collection::vec(any::<u8>(), 1..512).prop_flat_map(|data| {
        let len = data.len();
        (Just(data), 1..=len)
    })
}

fn window(capacity: usize) -> RollingWindow {
    RollingWindow::new(NonZeroUsize::new(capacity).expect("non-zero capacity"))
        .expect("window fits in 32 bits")
}

#[test]
fn empty_checksum_is_zero() {
    let checksum = RollingChecksum::new();
    assert_eq!(checksum.value(), 0);
    assert!(checksum.digest().is_empty());
}

#[test]
fn zero_bytes_still_produce_nonzero_sum() {
    let mut checksum = RollingChecksum::new();
    checksum.update(&[0u8; 100]);
    let digest = checksum.digest();
    assert_eq!(u32::from(digest.sum1()), 100 * CHAR_OFFSET);
    assert_ne!(checksum.value(), 0);
}

#[test]
fn value_packs_low_and_high_halves() {
    let mut checksum = RollingChecksum::new();
    checksum.update(b"abc");
    let digest = checksum.digest();
    let expected_a = (u32::from(b'a') + u32::from(b'b') + u32::from(b'c')) + 3 * CHAR_OFFSET;
    let expected_b = 3 * (u32::from(b'a') + CHAR_OFFSET)
        + 2 * (u32::from(b'b') + CHAR_OFFSET)
        + (u32::from(b'c') + CHAR_OFFSET);
    assert_eq!(u32::from(digest.sum1()), expected_a & 0xffff);
    assert_eq!(u32::from(digest.sum2()), expected_b & 0xffff);
    assert_eq!(checksum.value(), (expected_a & 0xffff) | ((expected_b & 0xffff) << 16));
}

#[test]
fn roll_on_empty_window_is_rejected() {
    let mut checksum = RollingChecksum::new();
    assert_eq!(checksum.roll(1, 2), Err(RollingError::EmptyWindow));
    assert_eq!(checksum.trim(1), Err(RollingError::EmptyWindow));
}

#[test]
fn roll_rejects_window_beyond_u32() {
    let mut checksum = RollingChecksum::new();
    checksum.force_state(1, 1, u32::MAX as usize + 1);
    assert!(matches!(
        checksum.roll(0, 0),
        Err(RollingError::WindowTooLarge { .. })
    ));
}

#[test]
fn checksum_equality_ignores_length() {
    let mut short = RollingChecksum::new();
    let mut long = RollingChecksum::new();
    short.force_state(5, 9, 10);
    long.force_state(5, 9, 20);
    assert_eq!(short, long);

    long.force_state(5, 8, 10);
    assert_ne!(short, long);
}

#[test]
fn digest_equality_ignores_length() {
    let a = RollingDigest::new(5, 9, 10);
    let b = RollingDigest::new(5, 9, 20);
    assert_eq!(a, b);
    assert_ne!(a, RollingDigest::new(5, 8, 10));
    assert_eq!(RollingDigest::from_value(a.value(), 0), a);
}

#[test]
fn window_check_rejects_oversized_span() {
    let mut win = window(4);
    let err = win.check(b"abcdefgh", 0, 5).expect_err("too large");
    assert_eq!(err, RollingError::WindowTooLarge { len: 5, limit: 4 });
}

#[test]
fn window_push_rolls_once_full() {
    let mut win = window(3);
    for &byte in b"abc" {
        assert_eq!(win.push(byte).expect("push"), None);
    }
    assert!(win.is_full());
    assert_eq!(win.push(b'd').expect("push"), Some(b'a'));
    assert_eq!(win.to_vec(), b"bcd");
    assert_eq!(win.digest(), RollingDigest::from_bytes(b"bcd"));
}

#[test]
fn window_trim_drains_front() {
    let mut win = window(4);
    win.check(b"wxyz", 0, 4).expect("check");
    assert_eq!(win.trim().expect("trim"), Some(b'w'));
    assert_eq!(win.digest(), RollingDigest::from_bytes(b"xyz"));
    assert_eq!(win.trim().expect("trim"), Some(b'x'));
    assert_eq!(win.trim().expect("trim"), Some(b'y'));
    assert_eq!(win.trim().expect("trim"), Some(b'z'));
    assert!(win.is_empty());
    assert_eq!(win.trim().expect("trim"), None);
    assert_eq!(win.value(), 0);
}

#[test]
fn window_roll_requires_content() {
    let mut win = window(2);
    assert_eq!(win.roll(b'a'), Err(RollingError::EmptyWindow));
}

proptest! {
    #[test]
    fn roll_matches_fresh_check((data, len) in data_and_window()) {
        let mut rolling = RollingChecksum::new();
        rolling.update_from_block(&data[..len]);

        for start in 1..=data.len() - len {
            rolling
                .roll(data[start - 1], data[start + len - 1])
                .expect("rolling update must succeed");

            let mut fresh = RollingChecksum::new();
            fresh.update_from_block(&data[start..start + len]);
            prop_assert_eq!(rolling.value(), fresh.value());
            prop_assert_eq!(rolling.len(), len);
        }
    }

    #[test]
    fn trim_matches_fresh_check(data in prop::collection::vec(any::<u8>(), 1..256)) {
        let mut rolling = RollingChecksum::new();
        rolling.update(&data);

        for start in 1..data.len() {
            rolling.trim(data[start - 1]).expect("trim must succeed");
            let fresh = RollingDigest::from_bytes(&data[start..]);
            prop_assert_eq!(rolling.digest(), fresh);
            prop_assert_eq!(rolling.len(), data.len() - start);
        }
    }

    #[test]
    fn chunked_update_matches_single_pass(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16),
    ) {
        let mut incremental = RollingChecksum::new();
        let mut concatenated = Vec::new();
        for chunk in &chunks {
            incremental.update(chunk);
            concatenated.extend_from_slice(chunk);
        }
        prop_assert_eq!(incremental.digest(), RollingDigest::from_bytes(&concatenated));
        prop_assert_eq!(incremental.len(), concatenated.len());
    }

    #[test]
    fn window_roll_matches_fresh_check((data, len) in data_and_window()) {
        let mut win = window(len);
        win.check(&data, 0, len).expect("check");

        for start in 1..=data.len() - len {
            let outgoing = win.roll(data[start + len - 1]).expect("roll");
            prop_assert_eq!(outgoing, data[start - 1]);

            let mut fresh = window(len);
            fresh.check(&data, start, len).expect("check");
            prop_assert_eq!(win.digest(), fresh.digest());
            prop_assert_eq!(win.to_vec(), data[start..start + len].to_vec());
        }
    }
}
