// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! Basic value views (component F): `Boolean` and the fixed-width unsigned integers. These are
//! the only types that pack into shared 32-byte chunks when used as `Vector`/`List` elements.

use primitive_types::U256;

use crate::error::{Result, SszError};
use crate::hash::{zero_hash, Root};
use crate::node::{leaf, NodeRef};
use crate::typ::{AsNode, BasicCodec, Packed, SszType};
use smallvec::SmallVec;

macro_rules! impl_basic_leaf {
    ($name:ident, $byte_len:expr) => {
        impl SszType for $name {
            fn chunk_count() -> u64 {
                1
            }
            fn default_node() -> NodeRef {
                leaf(zero_hash(0))
            }
            fn min_encoded_len() -> usize {
                $byte_len
            }
            fn max_encoded_len() -> usize {
                $byte_len
            }
        }
        impl Packed for $name {
            fn byte_length() -> usize {
                $byte_len
            }
        }
        impl AsNode for $name
        where
            $name: BasicCodec,
        {
            fn as_node(&self) -> NodeRef {
                let mut bytes = [0u8; 32];
                bytes[..$byte_len].copy_from_slice(&self.to_le_bytes());
                leaf(Root::from(bytes))
            }

            fn from_node(node: &NodeRef) -> Result<Self> {
                match node.as_ref() {
                    crate::node::Node::Leaf(root) => Self::from_le_bytes(&root.as_bytes()[..$byte_len]),
                    crate::node::Node::Pair(..) => {
                        Err(SszError::decode(concat!(stringify!($name), " value node is not a leaf")))
                    }
                }
            }
        }
    };
}

/// A single-bit boolean, encoded as one 0x00/0x01 byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct Boolean(pub bool);

impl Boolean {
    pub fn to_leaf(self) -> NodeRef {
        let mut bytes = [0u8; 32];
        bytes[0] = self.0 as u8;
        leaf(Root::from(bytes))
    }

    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Boolean(false)),
            1 => Ok(Boolean(true)),
            other => Err(SszError::invalid(format!(
                "boolean byte must be 0 or 1, got {other}"
            ))),
        }
    }
}
impl_basic_leaf!(Boolean, 1);

impl BasicCodec for Boolean {
    fn to_le_bytes(&self) -> SmallVec<[u8; 32]> {
        SmallVec::from_slice(&[self.0 as u8])
    }

    fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 1 {
            return Err(SszError::decode(format!(
                "boolean must be 1 byte, got {}",
                bytes.len()
            )));
        }
        Boolean::from_byte(bytes[0])
    }
}

macro_rules! impl_uint {
    ($name:ident, $inner:ty, $byte_len:expr) => {
        /// A fixed-width unsigned integer, little-endian encoded.
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Default)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn checked_add(self, rhs: Self) -> Result<Self> {
                self.0
                    .checked_add(rhs.0)
                    .map($name)
                    .ok_or_else(|| SszError::invalid(concat!(stringify!($name), " overflow")))
            }

            pub fn checked_sub(self, rhs: Self) -> Result<Self> {
                self.0
                    .checked_sub(rhs.0)
                    .map($name)
                    .ok_or_else(|| SszError::invalid(concat!(stringify!($name), " underflow")))
            }

            pub fn checked_mul(self, rhs: Self) -> Result<Self> {
                self.0
                    .checked_mul(rhs.0)
                    .map($name)
                    .ok_or_else(|| SszError::invalid(concat!(stringify!($name), " overflow")))
            }
        }
        impl_basic_leaf!($name, $byte_len);

        impl BasicCodec for $name {
            fn to_le_bytes(&self) -> SmallVec<[u8; 32]> {
                SmallVec::from_slice(&self.0.to_le_bytes())
            }

            fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
                if bytes.len() != $byte_len {
                    return Err(SszError::decode(format!(
                        concat!(stringify!($name), " must be {} bytes, got {}"),
                        $byte_len,
                        bytes.len()
                    )));
                }
                let mut buf = [0u8; $byte_len];
                buf.copy_from_slice(bytes);
                Ok($name(<$inner>::from_le_bytes(buf)))
            }
        }
    };
}

impl_uint!(Uint8, u8, 1);
impl_uint!(Uint16, u16, 2);
impl_uint!(Uint32, u32, 4);
impl_uint!(Uint64, u64, 8);
impl_uint!(Uint128, u128, 16);

/// A 256-bit unsigned integer, little-endian encoded. `true` division is unsupported (spec
/// §4.F Non-goal); only the checked operations below are exposed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct Uint256(pub U256);

impl Uint256 {
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Uint256)
            .ok_or_else(|| SszError::invalid("Uint256 overflow"))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Uint256)
            .ok_or_else(|| SszError::invalid("Uint256 underflow"))
    }
}
impl_basic_leaf!(Uint256, 32);

impl BasicCodec for Uint256 {
    fn to_le_bytes(&self) -> SmallVec<[u8; 32]> {
        let mut buf = [0u8; 32];
        self.0.to_little_endian(&mut buf);
        SmallVec::from_slice(&buf)
    }

    fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(SszError::decode(format!(
                "Uint256 must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Uint256(U256::from_little_endian(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint64_checked_add_overflows() {
        assert!(Uint64(u64::MAX).checked_add(Uint64(1)).is_err());
        assert_eq!(Uint64(1).checked_add(Uint64(2)).unwrap(), Uint64(3));
    }

    #[test]
    fn boolean_rejects_non_bit_byte() {
        assert!(Boolean::from_byte(2).is_err());
        assert_eq!(Boolean::from_byte(1).unwrap(), Boolean(true));
    }

    #[test]
    fn uint32_le_bytes_roundtrip() {
        let v = Uint32(0xdead_beef);
        let bytes = v.to_le_bytes();
        assert_eq!(Uint32::from_le_bytes(&bytes).unwrap(), v);
    }

    #[test]
    fn uint256_le_bytes_roundtrip() {
        let v = Uint256(U256::from(123456789u64));
        let bytes = v.to_le_bytes();
        assert_eq!(Uint256::from_le_bytes(&bytes).unwrap(), v);
    }

    #[test]
    fn packed_per_chunk_matches_byte_length() {
        assert_eq!(Uint8::per_chunk(), 32);
        assert_eq!(Uint32::per_chunk(), 8);
        assert_eq!(Uint256::per_chunk(), 1);
    }
}
