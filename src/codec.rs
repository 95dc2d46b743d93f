// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! The bit-exact SSZ binary codec: fixed/variable splitting with a 4-byte little-endian offset
//! table for variable-size homogeneous sequences (`Vector`/`List`), and the single delimiting
//! bit for `Bitlist` (spec §6). `Container`/`Union`/`StableContainer` codecs are generated
//! alongside their field accessors by `ssz_container!`/`ssz_union!`/`ssz_stable_container!`.

use crate::basic::{Boolean, Uint128, Uint16, Uint256, Uint32, Uint64, Uint8};
use crate::bitfield::{Bitlist, Bitvector};
use crate::byte_vector::{ByteList, ByteVector};
use crate::error::{Result, SszError};
use crate::list::List;
use crate::subtree::Element;
use crate::typ::{BasicCodec, SszType};
use crate::vector::Vector;

/// Encode/decode a value to/from its bit-exact SSZ wire representation.
pub trait SszCodec: Sized {
    fn ssz_encode(&self) -> Vec<u8>;
    fn ssz_decode(bytes: &[u8]) -> Result<Self>;
}

macro_rules! impl_basic_codec {
    ($name:ident) => {
        impl SszCodec for $name {
            fn ssz_encode(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn ssz_decode(bytes: &[u8]) -> Result<Self> {
                <$name as BasicCodec>::from_le_bytes(bytes)
            }
        }
    };
}

impl_basic_codec!(Boolean);
impl_basic_codec!(Uint8);
impl_basic_codec!(Uint16);
impl_basic_codec!(Uint32);
impl_basic_codec!(Uint64);
impl_basic_codec!(Uint128);
impl_basic_codec!(Uint256);

/// The SSZ `None` convention: no bytes on the wire at all.
impl SszCodec for () {
    fn ssz_encode(&self) -> Vec<u8> {
        Vec::new()
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        if !bytes.is_empty() {
            return Err(SszError::decode("union none variant carries no payload"));
        }
        Ok(())
    }
}

fn encode_offset_sequence(parts: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 4 * parts.len();
    let mut offsets = Vec::with_capacity(header_len);
    let mut bodies = Vec::new();
    let mut running = header_len;
    for part in parts {
        offsets.extend_from_slice(&(running as u32).to_le_bytes());
        running += part.len();
        bodies.extend_from_slice(part);
    }
    offsets.extend(bodies);
    offsets
}

fn decode_offsets(bytes: &[u8], count: usize) -> Result<Vec<(usize, usize)>> {
    if bytes.len() < 4 * count {
        return Err(SszError::decode("offset table truncated"));
    }
    let mut starts = Vec::with_capacity(count);
    for i in 0..count {
        let raw = u32::from_le_bytes(bytes[4 * i..4 * i + 4].try_into().unwrap()) as usize;
        starts.push(raw);
    }
    let mut ranges = Vec::with_capacity(count);
    for i in 0..count {
        let start = starts[i];
        let end = if i + 1 < count { starts[i + 1] } else { bytes.len() };
        if start > end || end > bytes.len() {
            return Err(SszError::decode("offset out of range"));
        }
        ranges.push((start, end));
    }
    Ok(ranges)
}

impl<E, const N: usize> SszCodec for Vector<E, N>
where
    E: Element + SszType + Clone + SszCodec,
{
    fn ssz_encode(&self) -> Vec<u8> {
        let elements: Vec<E> = (0..N as u64)
            .map(|i| self.get(i).expect("vector index always in range"))
            .collect();
        if E::is_fixed_len() {
            elements.iter().flat_map(|e| e.ssz_encode()).collect()
        } else {
            let parts: Vec<Vec<u8>> = elements.iter().map(|e| e.ssz_encode()).collect();
            encode_offset_sequence(&parts)
        }
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        let mut v = Vector::default();
        if E::is_fixed_len() {
            let elem_len = E::min_encoded_len();
            if elem_len == 0 || bytes.len() != elem_len * N {
                return Err(SszError::decode(format!(
                    "Vector<_, {N}> expected {} bytes, got {}",
                    elem_len * N,
                    bytes.len()
                )));
            }
            for i in 0..N {
                let slice = &bytes[i * elem_len..(i + 1) * elem_len];
                v.set(i as u64, E::ssz_decode(slice)?)?;
            }
        } else {
            let ranges = decode_offsets(bytes, N)?;
            for (i, (start, end)) in ranges.into_iter().enumerate() {
                v.set(i as u64, E::ssz_decode(&bytes[start..end])?)?;
            }
        }
        Ok(v)
    }
}

impl<E, const N: usize> SszCodec for List<E, N>
where
    E: Element + SszType + Clone + Default + SszCodec,
{
    fn ssz_encode(&self) -> Vec<u8> {
        let length = self.len();
        let elements: Vec<E> = (0..length)
            .map(|i| self.get(i).expect("list index always in range"))
            .collect();
        if E::is_fixed_len() {
            elements.iter().flat_map(|e| e.ssz_encode()).collect()
        } else {
            let parts: Vec<Vec<u8>> = elements.iter().map(|e| e.ssz_encode()).collect();
            encode_offset_sequence(&parts)
        }
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        let mut l = List::default();
        if bytes.is_empty() {
            return Ok(l);
        }
        if E::is_fixed_len() {
            let elem_len = E::min_encoded_len();
            if elem_len == 0 || bytes.len() % elem_len != 0 {
                return Err(SszError::decode("List byte length not a multiple of element size"));
            }
            let count = bytes.len() / elem_len;
            if count > N {
                return Err(SszError::decode(format!("List<_, {N}> overflowed by decoded data")));
            }
            for i in 0..count {
                l.append(E::ssz_decode(&bytes[i * elem_len..(i + 1) * elem_len])?)?;
            }
        } else {
            let first_offset =
                u32::from_le_bytes(bytes.get(0..4).ok_or_else(|| SszError::decode("List too short for offset table"))?.try_into().unwrap())
                    as usize;
            if first_offset % 4 != 0 {
                return Err(SszError::decode("first List offset not 4-byte aligned"));
            }
            let count = first_offset / 4;
            if count > N {
                return Err(SszError::decode(format!("List<_, {N}> overflowed by decoded data")));
            }
            let ranges = decode_offsets(bytes, count)?;
            for (start, end) in ranges {
                l.append(E::ssz_decode(&bytes[start..end])?)?;
            }
        }
        Ok(l)
    }
}

impl<const N: usize> SszCodec for Bitvector<N> {
    fn ssz_encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; (N + 7) / 8];
        for i in 0..N as u64 {
            if self.get(i).expect("bitvector index always in range") {
                out[(i / 8) as usize] |= 1 << (i % 8);
            }
        }
        out
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != (N + 7) / 8 {
            return Err(SszError::decode(format!(
                "Bitvector<{N}> expected {} bytes, got {}",
                (N + 7) / 8,
                bytes.len()
            )));
        }
        let mut bv = Bitvector::default();
        for i in 0..N as u64 {
            let bit = (bytes[(i / 8) as usize] >> (i % 8)) & 1 == 1;
            if bit {
                bv.set(i, true)?;
            }
        }
        Ok(bv)
    }
}

impl<const N: usize> SszCodec for Bitlist<N> {
    fn ssz_encode(&self) -> Vec<u8> {
        let length = self.len();
        let mut out = vec![0u8; (length / 8 + 1) as usize];
        for i in 0..length {
            if self.get(i).expect("bitlist index always in range") {
                out[(i / 8) as usize] |= 1 << (i % 8);
            }
        }
        out[(length / 8) as usize] |= 1 << (length % 8);
        out
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(SszError::decode("Bitlist encoding must carry a delimiting bit"));
        }
        let last = bytes[bytes.len() - 1];
        if last == 0 {
            return Err(SszError::decode("Bitlist missing delimiting bit"));
        }
        let msb = 7 - last.leading_zeros() as u64;
        let length = (bytes.len() as u64 - 1) * 8 + msb;
        if length > N as u64 {
            return Err(SszError::decode(format!("Bitlist<{N}> overflowed by decoded data")));
        }
        let mut bl = Bitlist::default();
        for i in 0..length {
            let bit = (bytes[(i / 8) as usize] >> (i % 8)) & 1 == 1;
            bl.append(bit)?;
        }
        Ok(bl)
    }
}

impl<const N: usize> SszCodec for ByteVector<N> {
    fn ssz_encode(&self) -> Vec<u8> {
        self.bytes()
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        ByteVector::from_bytes(bytes)
    }
}

impl<const N: usize> SszCodec for ByteList<N> {
    fn ssz_encode(&self) -> Vec<u8> {
        self.bytes()
    }

    fn ssz_decode(bytes: &[u8]) -> Result<Self> {
        ByteList::from_bytes(bytes)
    }
}

/// Thin `serde` passthrough over the SSZ codec, mirroring the teacher's `SMTObject<T>`/
/// `Node<K, V>` serialization: `serialize` writes the SSZ-encoded bytes, `deserialize` decodes
/// them back through `ssz_decode`. Not a JSON schema — just enough to let a typed view round-trip
/// through any `serde`-backed format a caller already uses elsewhere in their stack.
macro_rules! impl_ssz_serde {
    ($name:ident) => {
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_bytes(&self.ssz_encode())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = <Vec<u8>>::deserialize(deserializer)?;
                Self::ssz_decode(&bytes).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_ssz_serde!(Boolean);
impl_ssz_serde!(Uint8);
impl_ssz_serde!(Uint16);
impl_ssz_serde!(Uint32);
impl_ssz_serde!(Uint64);
impl_ssz_serde!(Uint128);
impl_ssz_serde!(Uint256);

macro_rules! impl_ssz_serde_generic {
    ($name:ident < E, N >) => {
        impl<E, const N: usize> serde::Serialize for $name<E, N>
        where
            Self: SszCodec,
        {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_bytes(&self.ssz_encode())
            }
        }

        impl<'de, E, const N: usize> serde::Deserialize<'de> for $name<E, N>
        where
            Self: SszCodec,
        {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = <Vec<u8>>::deserialize(deserializer)?;
                Self::ssz_decode(&bytes).map_err(serde::de::Error::custom)
            }
        }
    };
    ($name:ident < N >) => {
        impl<const N: usize> serde::Serialize for $name<N> {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_bytes(&self.ssz_encode())
            }
        }

        impl<'de, const N: usize> serde::Deserialize<'de> for $name<N> {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = <Vec<u8>>::deserialize(deserializer)?;
                Self::ssz_decode(&bytes).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_ssz_serde_generic!(Vector<E, N>);
impl_ssz_serde_generic!(List<E, N>);
impl_ssz_serde_generic!(Bitvector<N>);
impl_ssz_serde_generic!(Bitlist<N>);
impl_ssz_serde_generic!(ByteVector<N>);
impl_ssz_serde_generic!(ByteList<N>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint32_codec_roundtrip() {
        let v = Uint32(0x1020_3040);
        let bytes = v.ssz_encode();
        assert_eq!(bytes, vec![0x40, 0x30, 0x20, 0x10]);
        assert_eq!(Uint32::ssz_decode(&bytes).unwrap(), v);
    }

    #[test]
    fn fixed_vector_codec_roundtrip() {
        let v = Vector::<Uint16, 3>::new(vec![Uint16(1), Uint16(2), Uint16(3)]).unwrap();
        let bytes = v.ssz_encode();
        assert_eq!(bytes.len(), 6);
        let decoded = Vector::<Uint16, 3>::ssz_decode(&bytes).unwrap();
        assert_eq!(decoded.get(2).unwrap(), Uint16(3));
    }

    #[test]
    fn list_codec_roundtrip() {
        let mut l: List<Uint8, 8> = List::default();
        l.append(Uint8(10)).unwrap();
        l.append(Uint8(20)).unwrap();
        let bytes = l.ssz_encode();
        assert_eq!(bytes, vec![10, 20]);
        let decoded = List::<Uint8, 8>::ssz_decode(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get(1).unwrap(), Uint8(20));
    }

    #[test]
    fn bitlist_codec_has_delimiting_bit() {
        let mut bl: Bitlist<8> = Bitlist::default();
        bl.append(true).unwrap();
        bl.append(false).unwrap();
        bl.append(true).unwrap();
        let bytes = bl.ssz_encode();
        // bits 1,0,1 then delimiter at position 3: 0b0000_1101 = 0x0d
        assert_eq!(bytes, vec![0x0d]);
        let decoded = Bitlist::<8>::ssz_decode(&bytes).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded.get(0).unwrap());
        assert!(!decoded.get(1).unwrap());
        assert!(decoded.get(2).unwrap());
    }

    #[test]
    fn bitlist_decode_rejects_missing_delimiter() {
        assert!(Bitlist::<8>::ssz_decode(&[0x00]).is_err());
    }

    #[test]
    fn byte_vector_codec_roundtrip() {
        let bv = ByteVector::<4>::from_bytes(&[1, 2, 3, 4]).unwrap();
        let bytes = bv.ssz_encode();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
        assert_eq!(ByteVector::<4>::ssz_decode(&bytes).unwrap().bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn serde_passthrough_matches_ssz_bytes() {
        let v = Uint64(1234);
        let json = serde_json::to_vec(&v).unwrap();
        let decoded: Uint64 = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded, v);
    }
}
