//! Persisted form of a [`Bitmap64`].
//!
//! ```text
//! [u8]      key order flag: 1 = signed, 0 = unsigned
//! [u64 LE]  number of buckets
//! per bucket, in key order:
//!   [u32 LE]  high key
//!   [..]      container in its own persisted format
//! ```
//!
//! Cumulative cardinalities are never written. A loaded bitmap starts with
//! an empty cache that is rebuilt by the first query.

use std::io::{Read, Write};

use crate::map::ContainerMap;
use crate::{Bitmap64, Container, Error, KeyOrder, Result};

const HEADER_SIZE: usize = 9; // flag(1) + bucket count(8)
const HIGH_SIZE: usize = 4;

impl<C: Container> Bitmap64<C> {
    /// The number of bytes [`write_to`](Self::write_to) produces.
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE
            + self
                .containers()
                .iter()
                .map(|(_, container)| HIGH_SIZE + container.serialized_size())
                .sum::<usize>()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let containers = self.containers();

        writer.write_all(&[self.order().is_signed() as u8])?;
        writer.write_all(&(containers.len() as u64).to_le_bytes())?;

        for (high, container) in containers.iter() {
            writer.write_all(&high.to_le_bytes())?;
            container.write_to(&mut writer)?;
        }

        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut flag = [0u8; 1];
        reader.read_exact(&mut flag)?;
        let order = match flag[0] {
            0 => KeyOrder::Unsigned,
            1 => KeyOrder::Signed,
            other => return Err(Error::InvalidOrderFlag(other)),
        };

        let mut count = [0u8; 8];
        reader.read_exact(&mut count)?;
        let count = u64::from_le_bytes(count);

        let mut containers = ContainerMap::new(order);
        for _ in 0..count {
            let mut high = [0u8; HIGH_SIZE];
            reader.read_exact(&mut high)?;
            let container = C::read_from(&mut reader)?;
            containers.push(u32::from_le_bytes(high), container)?;
        }

        tracing::debug!(?order, buckets = count, "loaded 64-bit bitmap");

        Ok(Self::from_parts(containers))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::{Deserialize, Deserializer, Error as _};
    use serde::ser::{Serialize, SerializeSeq, Serializer};

    use crate::map::ContainerMap;
    use crate::{Bitmap64, Container, KeyOrder};

    #[derive(serde::Serialize)]
    struct BitmapRef<'a, C: Container> {
        signed: bool,
        buckets: BucketsRef<'a, C>,
    }

    struct BucketsRef<'a, C>(&'a ContainerMap<C>);

    impl<C: Container + Serialize> Serialize for BucketsRef<'_, C> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
            for bucket in self.0.iter() {
                seq.serialize_element(&bucket)?;
            }
            seq.end()
        }
    }

    #[derive(serde::Deserialize)]
    struct BitmapRepr<C> {
        signed: bool,
        buckets: Vec<(u32, C)>,
    }

    impl<C: Container + Serialize> Serialize for Bitmap64<C> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            BitmapRef {
                signed: self.order().is_signed(),
                buckets: BucketsRef(self.containers()),
            }
            .serialize(serializer)
        }
    }

    impl<'de, C: Container + Deserialize<'de>> Deserialize<'de> for Bitmap64<C> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = BitmapRepr::<C>::deserialize(deserializer)?;

            let mut containers = ContainerMap::new(KeyOrder::from_signed_flag(repr.signed));
            for (high, container) in repr.buckets {
                containers.push(high, container).map_err(D::Error::custom)?;
            }

            Ok(Bitmap64::from_parts(containers))
        }
    }
}
