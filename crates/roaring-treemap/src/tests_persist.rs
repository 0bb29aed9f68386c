use roaring::RoaringBitmap;

use crate::map::ContainerMap;
use crate::*;

fn read(buf: &[u8]) -> Result<Bitmap64> {
    Bitmap64::read_from(buf)
}

fn roundtrip(bitmap: &Bitmap64) -> Bitmap64 {
    let mut buf = Vec::new();
    bitmap.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), bitmap.serialized_size());
    read(&buf).unwrap()
}

#[test]
fn test_roundtrip_signed() {
    let bitmap = Bitmap64::from_values(&[5, 3, 100, -9i64 as u64, 1 << 50, (1 << 50) | 7]);
    let restored = roundtrip(&bitmap);

    assert_eq!(restored.order(), KeyOrder::Signed);
    assert_eq!(restored, bitmap);
    assert_eq!(restored.cardinality(), bitmap.cardinality());
    for j in 0..bitmap.cardinality() {
        assert_eq!(restored.select(j).unwrap(), bitmap.select(j).unwrap());
    }
    assert_eq!(restored.rank(100), bitmap.rank(100));
}

#[test]
fn test_roundtrip_unsigned() {
    let mut bitmap = Bitmap64::with_order(KeyOrder::Unsigned);
    bitmap.add_many(&[u64::MAX, 0, 1 << 63, 42]);

    let restored = roundtrip(&bitmap);
    assert_eq!(restored.order(), KeyOrder::Unsigned);
    assert_eq!(restored.select(0).unwrap(), 0);
    assert_eq!(restored.select(3).unwrap(), u64::MAX);
    assert_eq!(restored.rank(u64::MAX), 3);
}

#[test]
fn test_roundtrip_empty() {
    let restored = roundtrip(&Bitmap64::new());
    assert!(restored.is_empty());
    assert_eq!(restored.cardinality(), 0);
}

#[test]
fn test_loaded_cache_starts_cold() {
    let bitmap = Bitmap64::from_values(&[1, 1 << 32, 2 << 32]);
    assert_eq!(bitmap.cardinality(), 3);
    assert!(bitmap.cache().is_fully_valid());

    let restored = roundtrip(&bitmap);
    assert!(!restored.cache().is_fully_valid());
    assert_eq!(restored.cache().valid_len(), 0);

    assert_eq!(restored.rank(1 << 32), 1);
    assert_eq!(restored.cache().valid_len(), 2);
}

#[test]
fn test_restored_bitmap_accepts_inserts() {
    let bitmap = Bitmap64::from_values(&[10, 20]);
    let mut restored = roundtrip(&bitmap);

    assert!(restored.add(15));
    assert!(!restored.add(20));
    assert_eq!(restored.iter().collect::<Vec<_>>(), vec![10, 15, 20]);
}

#[test]
fn test_layout() {
    let mut bitmap = Bitmap64::with_order(KeyOrder::Unsigned);
    bitmap.add((7 << 32) | 1);

    let mut buf = Vec::new();
    bitmap.write_to(&mut buf).unwrap();

    assert_eq!(buf[0], 0);
    assert_eq!(&buf[1..9], &1u64.to_le_bytes());
    assert_eq!(&buf[9..13], &7u32.to_le_bytes());

    let container = RoaringBitmap::deserialize_from(&buf[13..]).unwrap();
    assert_eq!(container.iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_invalid_flag() {
    let mut buf = Vec::new();
    Bitmap64::new().write_to(&mut buf).unwrap();
    buf[0] = 7;

    assert!(matches!(read(&buf), Err(Error::InvalidOrderFlag(7))));
}

#[test]
fn test_truncated_input() {
    let mut buf = Vec::new();
    Bitmap64::from_values(&[1, 2, 3]).write_to(&mut buf).unwrap();
    buf.truncate(buf.len() - 1);

    assert!(matches!(read(&buf), Err(Error::Io(_))));
}

#[test]
fn test_duplicate_bucket_is_rejected() {
    let container: RoaringBitmap = [1u32].into_iter().collect();

    let mut buf = vec![1u8];
    buf.extend_from_slice(&2u64.to_le_bytes());
    for _ in 0..2 {
        buf.extend_from_slice(&5u32.to_le_bytes());
        container.serialize_into(&mut buf).unwrap();
    }

    assert!(matches!(
        read(&buf),
        Err(Error::InvariantViolation { high: 5, .. })
    ));
}

#[test]
fn test_push_existing_key_fails() {
    let mut map: ContainerMap<RoaringBitmap> = ContainerMap::new(KeyOrder::Signed);
    map.push(3, RoaringBitmap::new()).unwrap();

    assert!(matches!(
        map.push(3, RoaringBitmap::new()),
        Err(Error::InvariantViolation { high: 3, .. })
    ));
    assert_eq!(map.len(), 1);
}
