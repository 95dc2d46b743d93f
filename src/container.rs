// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ssz_container!` (component I, Container support): a declarative macro that generates a
//! struct backed by a single `NodeRef`, with one field per declared member, each owning a whole
//! chunk at its own position (containers are never packed, unlike `Vector`/`List` elements).
//! Field access goes through `AsNode`, so nested containers, vectors, and basic fields all
//! compose for free.
//!
//! Each field is declared as `(getter_name, setter_name): FieldType`, since plain `macro_rules!`
//! can't synthesize a `set_foo` identifier from a `foo` field name without a second crate.

#[doc(hidden)]
#[macro_export]
macro_rules! __ssz_container_field_impls {
    ($name:ident, $idx:expr,) => {};
    ($name:ident, $idx:expr, ($getter:ident, $setter:ident): $ftype:ty $(, $( ($rgetter:ident, $rsetter:ident): $rftype:ty ),* )?) => {
        impl $name {
            // Container fields are never packed (spec §4.I/§4.H): each field owns a whole chunk
            // at its own position, regardless of whether $ftype is a basic type or a compound
            // view, so this goes through `AsNode` rather than the packed `Element` path.
            pub fn $getter(&self) -> $crate::error::Result<$ftype> {
                use $crate::typ::AsNode;
                let g = $crate::gindex::to_gindex($idx, Self::tree_depth())?;
                let value_node = $crate::node::getter(&self.node(), g)?;
                <$ftype as AsNode>::from_node(&value_node)
            }

            pub fn $setter(&mut self, value: $ftype) -> $crate::error::Result<()> {
                use $crate::typ::AsNode;
                let g = $crate::gindex::to_gindex($idx, Self::tree_depth())?;
                let set = $crate::node::setter(&self.node(), g, false)?;
                $crate::view::ViewBacking::rebind(&self.backed, set(value.as_node()))
            }
        }

        $(
            $crate::__ssz_container_field_impls!($name, $idx + 1, $( ($rgetter, $rsetter): $rftype ),*);
        )?
    };
}

#[macro_export]
macro_rules! ssz_container {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( ($getter:ident, $setter:ident): $ftype:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            backed: $crate::view::Backed,
        }

        impl $name {
            pub fn default() -> Self {
                use $crate::typ::SszType;
                Self::from_backed($crate::view::ViewBacking::new(Self::default_node()))
            }
        }

        $crate::__ssz_container_field_impls!($name, 0, $( ($getter, $setter): $ftype ),*);

        impl $crate::typ::SszType for $name {
            fn chunk_count() -> u64 {
                1u64 << Self::tree_depth()
            }

            fn tree_depth() -> u32 {
                $crate::gindex::get_depth([$(stringify!($ftype)),*].len() as u64)
            }

            fn default_node() -> $crate::node::NodeRef {
                let fields: Vec<$crate::node::NodeRef> = vec![
                    $( <$ftype as $crate::typ::SszType>::default_node() ),*
                ];
                $crate::node::fill_to_contents(&fields, Self::tree_depth() as usize)
                    .expect("container field count always fits its own tree depth")
            }

            fn min_encoded_len() -> usize {
                0usize $( + <$ftype as $crate::typ::SszType>::min_encoded_len() )*
            }

            fn max_encoded_len() -> usize {
                0usize $( + <$ftype as $crate::typ::SszType>::max_encoded_len() )*
            }

            fn is_variable_length() -> bool {
                false $( || !<$ftype as $crate::typ::SszType>::is_fixed_len() )*
            }
        }

        impl $crate::view::BackedView for $name {
            fn from_backed(backed: $crate::view::Backed) -> Self {
                $name { backed }
            }

            fn backed(&self) -> &$crate::view::Backed {
                &self.backed
            }
        }

        impl $crate::codec::SszCodec for $name {
            fn ssz_encode(&self) -> Vec<u8> {
                use $crate::codec::SszCodec;
                use $crate::typ::SszType;

                let parts: Vec<(bool, Vec<u8>)> = vec![
                    $( (<$ftype as SszType>::is_fixed_len(), self.$getter().expect("container field always readable").ssz_encode()) ),*
                ];
                let header_len: usize = parts.iter().map(|(fixed, bytes)| if *fixed { bytes.len() } else { 4 }).sum();
                let mut fixed_region = Vec::with_capacity(header_len);
                let mut variable_region = Vec::new();
                let mut running = header_len;
                for (fixed, bytes) in &parts {
                    if *fixed {
                        fixed_region.extend_from_slice(bytes);
                    } else {
                        fixed_region.extend_from_slice(&(running as u32).to_le_bytes());
                        running += bytes.len();
                        variable_region.extend_from_slice(bytes);
                    }
                }
                fixed_region.extend(variable_region);
                fixed_region
            }

            fn ssz_decode(bytes: &[u8]) -> $crate::error::Result<Self> {
                use $crate::codec::SszCodec;
                use $crate::typ::SszType;

                let field_info: Vec<(bool, usize)> = vec![
                    $( (<$ftype as SszType>::is_fixed_len(), <$ftype as SszType>::min_encoded_len()) ),*
                ];
                let mut ranges: Vec<(usize, usize)> = vec![(0, 0); field_info.len()];
                let mut cursor = 0usize;
                let mut var_offsets: Vec<usize> = Vec::new();
                for (i, (fixed, size)) in field_info.iter().enumerate() {
                    if *fixed {
                        if cursor + size > bytes.len() {
                            return Err($crate::error::SszError::decode("container fixed region truncated"));
                        }
                        ranges[i] = (cursor, cursor + size);
                        cursor += size;
                    } else {
                        let raw = bytes
                            .get(cursor..cursor + 4)
                            .ok_or_else(|| $crate::error::SszError::decode("container offset table truncated"))?;
                        let offset = u32::from_le_bytes(raw.try_into().unwrap()) as usize;
                        var_offsets.push(offset);
                        cursor += 4;
                    }
                }
                var_offsets.push(bytes.len());
                let mut var_idx = 0usize;
                for (i, (fixed, _)) in field_info.iter().enumerate() {
                    if !fixed {
                        let start = var_offsets[var_idx];
                        let end = var_offsets[var_idx + 1];
                        if start > end || end > bytes.len() {
                            return Err($crate::error::SszError::decode("container offset out of range"));
                        }
                        ranges[i] = (start, end);
                        var_idx += 1;
                    }
                }

                let mut container = Self::default();
                let mut idx = 0usize;
                $(
                    {
                        let (start, end) = ranges[idx];
                        let value = <$ftype as SszCodec>::ssz_decode(&bytes[start..end])?;
                        container.$setter(value)?;
                        idx += 1;
                    }
                )*
                let _ = idx;
                Ok(container)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::basic::{Boolean, Uint32, Uint64};
    use crate::typ::SszType;
    use crate::vector::Vector;
    use crate::view::BackedView;

    ssz_container!(
        struct Pair {
            (a, set_a): Uint64,
            (b, set_b): Boolean,
        }
    );

    ssz_container!(
        struct Nested {
            (pair, set_pair): Pair,
            (values, set_values): Vector<Uint64, 2>,
        }
    );

    #[test]
    fn container_field_get_set_roundtrip() {
        let mut p = Pair::default();
        assert_eq!(p.a().unwrap(), Uint64(0));
        p.set_a(Uint64(5)).unwrap();
        p.set_b(Boolean(true)).unwrap();
        assert_eq!(p.a().unwrap(), Uint64(5));
        assert_eq!(p.b().unwrap(), Boolean(true));
    }

    #[test]
    fn container_set_propagates_through_nested_container() {
        let mut n = Nested::default();
        let mut inner = n.pair().unwrap();
        inner.set_a(Uint64(9)).unwrap();
        n.set_pair(inner).unwrap();
        assert_eq!(n.pair().unwrap().a().unwrap(), Uint64(9));
    }

    #[test]
    fn container_default_root_is_zero_subtree() {
        let p = Pair::default();
        assert_eq!(
            p.hash_tree_root(),
            crate::hash::zero_hash(Pair::tree_depth() as usize)
        );
    }

    ssz_container!(
        struct Foo {
            (a, set_a): Uint32,
            (b, set_b): crate::list::List<crate::basic::Uint16, 4>,
        }
    );

    #[test]
    fn container_codec_splits_fixed_and_dynamic_fields() {
        use crate::codec::SszCodec;

        let mut foo = Foo::default();
        foo.set_a(Uint32(0x0a0b0c0d)).unwrap();
        let b = crate::list::List::<crate::basic::Uint16, 4>::new(vec![
            crate::basic::Uint16(1),
            crate::basic::Uint16(2),
            crate::basic::Uint16(3),
        ])
        .unwrap();
        foo.set_b(b).unwrap();

        let bytes = foo.ssz_encode();
        let mut expected = vec![0x0d, 0x0c, 0x0b, 0x0a];
        expected.extend_from_slice(&8u32.to_le_bytes());
        expected.extend_from_slice(&[1, 0, 2, 0, 3, 0]);
        assert_eq!(bytes, expected);

        let decoded = Foo::ssz_decode(&bytes).unwrap();
        assert_eq!(decoded.a().unwrap(), Uint32(0x0a0b0c0d));
        assert_eq!(decoded.b().unwrap().len(), 3);
    }
}
