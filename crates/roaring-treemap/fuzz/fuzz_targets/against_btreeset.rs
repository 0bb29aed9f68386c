#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use roaring_treemap::{Bitmap64, KeyOrder};
use std::collections::BTreeSet;
use std::mem;

// High keys around both sign boundaries. Values are built from one of these
// so that buckets are shared and the two orders disagree.
const HIGHS: [u32; 8] = [0, 1, 5, 0x7fff_ffff, 0x8000_0000, 0x8000_0001, u32::MAX - 1, u32::MAX];

#[derive(Debug, Copy, Clone)]
struct Value(u64);

impl<'a> Arbitrary<'a> for Value {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let idx: u8 = u.arbitrary()?;
        let low: u16 = u.arbitrary()?;
        let high = HIGHS[idx as usize % HIGHS.len()];
        Ok(Self(((high as u64) << 32) | low as u64))
    }
}

#[derive(Arbitrary, Debug)]
enum Operation {
    Add(Value),
    Contains(Value),
    Rank(Value),
    Select(u16),
    CheckCardinality,
    CheckMinMax,
    CheckIter,
    Union,
    SwapSides,
    SerializeRoundtrip,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    signed: bool,
    initial_lhs: Vec<Value>,
    initial_rhs: Vec<Value>,
    ops: Vec<Operation>,
}

/// Model values keyed so that `Ord` on the key matches the bitmap's order.
fn key(order: KeyOrder, value: u64) -> u64 {
    if order.is_signed() { value ^ (1 << 63) } else { value }
}

fn make_pair(order: KeyOrder, values: &[Value]) -> (Bitmap64, BTreeSet<u64>) {
    let mut bitmap = Bitmap64::with_order(order);
    let mut model = BTreeSet::new();
    for &Value(v) in values {
        bitmap.add(v);
        model.insert(key(order, v));
    }
    (bitmap, model)
}

/// Assert that a bitmap and its model hold the same values in the same order.
fn check_equal(order: KeyOrder, bitmap: &Bitmap64, model: &BTreeSet<u64>) {
    assert_eq!(bitmap.cardinality(), model.len() as u64, "cardinality mismatch");
    assert_eq!(bitmap.is_empty(), model.is_empty(), "is_empty mismatch");

    let expected: Vec<u64> = model.iter().map(|&k| key(order, k)).collect();
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), expected, "iter mismatch");
}

fuzz_target!(|input: FuzzInput| {
    let order = KeyOrder::from_signed_flag(input.signed);

    let (mut lhs, mut lhs_model) = make_pair(order, &input.initial_lhs);
    let (mut rhs, mut rhs_model) = make_pair(order, &input.initial_rhs);

    check_equal(order, &lhs, &lhs_model);
    check_equal(order, &rhs, &rhs_model);

    for op in &input.ops {
        match *op {
            Operation::Add(Value(v)) => {
                let inserted = lhs_model.insert(key(order, v));
                assert_eq!(lhs.add(v), inserted, "add({v:#x}) mismatch");
            }
            Operation::Contains(Value(v)) => {
                let expected = lhs_model.contains(&key(order, v));
                assert_eq!(lhs.contains(v), expected, "contains({v:#x}) mismatch");
            }
            Operation::Rank(Value(v)) => {
                let expected = lhs_model.range(..key(order, v)).count() as u64;
                assert_eq!(lhs.rank(v), expected, "rank({v:#x}) mismatch");
            }
            Operation::Select(j) => {
                let j = j as u64;
                match lhs_model.iter().nth(j as usize) {
                    Some(&k) => {
                        let expected = key(order, k);
                        assert_eq!(lhs.select(j).unwrap(), expected, "select({j}) mismatch");
                    }
                    None => assert!(lhs.select(j).is_err(), "select({j}) past the end"),
                }
            }
            Operation::CheckCardinality => {
                assert_eq!(lhs.cardinality(), lhs_model.len() as u64, "cardinality mismatch");
            }
            Operation::CheckMinMax => {
                assert_eq!(lhs.min(), lhs_model.first().map(|&k| key(order, k)), "min mismatch");
                assert_eq!(lhs.max(), lhs_model.last().map(|&k| key(order, k)), "max mismatch");
            }
            Operation::CheckIter => {
                check_equal(order, &lhs, &lhs_model);
            }
            Operation::Union => {
                lhs.union_with(&rhs).unwrap();
                lhs_model.extend(rhs_model.iter().copied());
            }
            Operation::SwapSides => {
                mem::swap(&mut lhs, &mut rhs);
                mem::swap(&mut lhs_model, &mut rhs_model);
            }
            Operation::SerializeRoundtrip => {
                let mut buf = Vec::new();
                lhs.write_to(&mut buf).unwrap();
                assert_eq!(buf.len(), lhs.serialized_size(), "serialized_size mismatch");
                let restored: Bitmap64 = Bitmap64::read_from(&buf[..]).unwrap();
                assert_eq!(restored, lhs, "serialize roundtrip mismatch");
                lhs = restored;
            }
        }
    }

    check_equal(order, &lhs, &lhs_model);
    check_equal(order, &rhs, &rhs_model);
});
