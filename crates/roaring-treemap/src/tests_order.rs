use std::cmp::Ordering;

use crate::*;

#[test]
fn test_pack_roundtrip() {
    for value in [0u64, 1, u32::MAX as u64, 1 << 32, u64::MAX, 0x1234_5678_9abc_def0] {
        assert_eq!(pack(high(value), low(value)), value);
    }

    assert_eq!(high(0x1234_5678_9abc_def0), 0x1234_5678);
    assert_eq!(low(0x1234_5678_9abc_def0), 0x9abc_def0);
    assert_eq!(high(-1i64 as u64), u32::MAX);
    assert_eq!(pack(u32::MAX, u32::MAX), -1i64 as u64);
}

#[test]
fn test_signed_compare() {
    let order = KeyOrder::Signed;
    assert_eq!(order.compare(0, 1), Ordering::Less);
    assert_eq!(order.compare(u32::MAX, 0), Ordering::Less); // -1 < 0
    assert_eq!(order.compare(0x8000_0000, 0x7fff_ffff), Ordering::Less);
    assert_eq!(order.compare(5, 5), Ordering::Equal);
}

#[test]
fn test_unsigned_compare() {
    let order = KeyOrder::Unsigned;
    assert_eq!(order.compare(0, 1), Ordering::Less);
    assert_eq!(order.compare(u32::MAX, 0), Ordering::Greater);
    assert_eq!(order.compare(0x8000_0000, 0x7fff_ffff), Ordering::Greater);
}

#[test]
fn test_highest_lowest() {
    assert_eq!(KeyOrder::Signed.highest(), i32::MAX as u32);
    assert_eq!(KeyOrder::Signed.lowest(), i32::MIN as u32);
    assert_eq!(KeyOrder::Unsigned.highest(), u32::MAX);
    assert_eq!(KeyOrder::Unsigned.lowest(), 0);

    for order in [KeyOrder::Signed, KeyOrder::Unsigned] {
        for high in [0u32, 1, 0x7fff_ffff, 0x8000_0000, u32::MAX] {
            assert_ne!(order.compare(high, order.highest()), Ordering::Greater);
            assert_ne!(order.compare(high, order.lowest()), Ordering::Less);
        }
    }
}

#[test]
fn test_successor() {
    assert_eq!(KeyOrder::Signed.successor(u32::MAX), Some(0)); // -1 -> 0
    assert_eq!(KeyOrder::Signed.successor(0x7fff_ffff), None);
    assert_eq!(KeyOrder::Signed.successor(0x8000_0000), Some(0x8000_0001));

    assert_eq!(KeyOrder::Unsigned.successor(0x7fff_ffff), Some(0x8000_0000));
    assert_eq!(KeyOrder::Unsigned.successor(u32::MAX), None);
}

#[test]
fn test_compare_values() {
    let neg = -5i64 as u64;
    assert_eq!(KeyOrder::Signed.compare_values(neg, 3), Ordering::Less);
    assert_eq!(KeyOrder::Unsigned.compare_values(neg, 3), Ordering::Greater);

    // Agrees with comparing (high, low) pairs.
    let values = [0u64, 1, u32::MAX as u64, 1 << 32, neg, u64::MAX, i64::MIN as u64];
    for order in [KeyOrder::Signed, KeyOrder::Unsigned] {
        for &a in &values {
            for &b in &values {
                let pairwise = order
                    .compare(high(a), high(b))
                    .then(low(a).cmp(&low(b)));
                assert_eq!(order.compare_values(a, b), pairwise, "{order:?} {a:#x} {b:#x}");
            }
        }
    }
}

#[test]
fn test_search() {
    let signed = [u32::MAX - 1, u32::MAX, 0, 7]; // -2, -1, 0, 7
    assert_eq!(KeyOrder::Signed.search(&signed, 0), Ok(2));
    assert_eq!(KeyOrder::Signed.search(&signed, 3), Err(3));
    assert_eq!(KeyOrder::Signed.search(&signed, 0x8000_0000), Err(0));

    let unsigned = [0, 7, u32::MAX - 1, u32::MAX];
    assert_eq!(KeyOrder::Unsigned.search(&unsigned, u32::MAX), Ok(3));
    assert_eq!(KeyOrder::Unsigned.search(&unsigned, 0x8000_0000), Err(2));
}

#[test]
fn test_signed_flag() {
    assert_eq!(KeyOrder::from_signed_flag(true), KeyOrder::Signed);
    assert_eq!(KeyOrder::from_signed_flag(false), KeyOrder::Unsigned);
    assert!(KeyOrder::default().is_signed());
    assert!(!KeyOrder::Unsigned.is_signed());
}
