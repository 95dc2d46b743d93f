// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ssz_union!` (component L): a declarative macro generating a Rust enum whose variants
//! correspond to SSZ union selectors. Backed the same way `List`'s length is mixed in:
//! `Pair(value, selector)`, where `selector` is a one-byte leaf. Every variant carries exactly
//! one value; write `()` as the variant's type to spell the SSZ "None" convention used for
//! `Optional[T]` (selector `0` with no data).

#[macro_export]
macro_rules! ssz_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $selector:literal => $variant:ident ( $vtype:ty ) ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis enum $name {
            $( $variant($vtype) ),*
        }

        impl $name {
            pub fn selector(&self) -> u8 {
                match self {
                    $( $name::$variant(_) => $selector ),*
                }
            }

            pub fn to_backed(&self) -> $crate::view::Backed {
                let value_node = match self {
                    $( $name::$variant(v) => <$vtype as $crate::typ::AsNode>::as_node(v) ),*
                };
                let mut selector_bytes = [0u8; 32];
                selector_bytes[0] = self.selector();
                $crate::view::ViewBacking::new($crate::node::pair(
                    value_node,
                    $crate::node::leaf($crate::hash::Root::from(selector_bytes)),
                ))
            }

            pub fn from_backed(backed: &$crate::view::Backed) -> $crate::error::Result<Self> {
                let node = $crate::view::ViewBacking::node(backed);
                let selector_node = $crate::node::getter(&node, $crate::gindex::Gindex(3))?;
                let selector = match selector_node.as_ref() {
                    $crate::node::Node::Leaf(root) => root.as_bytes()[0],
                    $crate::node::Node::Pair(..) => {
                        return Err($crate::error::SszError::decode("union selector slot is not a leaf"))
                    }
                };
                let value_node = $crate::node::getter(&node, $crate::gindex::Gindex(2))?;
                match selector {
                    $( $selector => Ok($name::$variant(<$vtype as $crate::typ::AsNode>::from_node(&value_node)?)), )*
                    other => Err($crate::error::SszError::decode(format!(
                        "unknown union selector {other}"
                    ))),
                }
            }

            pub fn hash_tree_root(&self) -> $crate::hash::Root {
                $crate::view::ViewBacking::root(&self.to_backed())
            }
        }

        impl $crate::codec::SszCodec for $name {
            fn ssz_encode(&self) -> Vec<u8> {
                use $crate::codec::SszCodec;
                let mut out = vec![self.selector()];
                match self {
                    $( $name::$variant(v) => out.extend(v.ssz_encode()) ),*
                }
                out
            }

            fn ssz_decode(bytes: &[u8]) -> $crate::error::Result<Self> {
                use $crate::codec::SszCodec;
                let selector = *bytes
                    .first()
                    .ok_or_else(|| $crate::error::SszError::decode("union encoding missing selector byte"))?;
                let payload = &bytes[1..];
                match selector {
                    $( $selector => Ok($name::$variant(<$vtype as SszCodec>::ssz_decode(payload)?)), )*
                    other => Err($crate::error::SszError::decode(format!(
                        "unknown union selector {other}"
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::basic::{Boolean, Uint64};

    ssz_union!(
        enum Choice {
            0 => None(()),
            1 => A(Uint64),
            2 => B(Boolean),
        }
    );

    #[test]
    fn union_roundtrips_through_backing() {
        let value = Choice::A(Uint64(7));
        let backed = value.to_backed();
        let decoded = Choice::from_backed(&backed).unwrap();
        match decoded {
            Choice::A(v) => assert_eq!(v, Uint64(7)),
            _ => panic!("expected A variant"),
        }
    }

    #[test]
    fn union_none_variant_selector_is_zero() {
        let value = Choice::None(());
        assert_eq!(value.selector(), 0);
    }

    #[test]
    fn union_codec_matches_selector_then_payload() {
        use crate::codec::SszCodec;

        let value = Choice::A(Uint64(0xdead_beef));
        let bytes = value.ssz_encode();
        let mut expected = vec![1u8];
        expected.extend_from_slice(&0xdead_beefu64.to_le_bytes());
        assert_eq!(bytes, expected);

        let decoded = Choice::ssz_decode(&bytes).unwrap();
        match decoded {
            Choice::A(v) => assert_eq!(v, Uint64(0xdead_beef)),
            _ => panic!("expected A variant"),
        }
    }

    #[test]
    fn union_none_codec_is_selector_only() {
        use crate::codec::SszCodec;
        assert_eq!(Choice::None(()).ssz_encode(), vec![0u8]);
    }

    #[test]
    fn union_rejects_unknown_selector() {
        let node = crate::node::pair(
            crate::node::zero_node(0),
            crate::node::leaf({
                let mut b = [0u8; 32];
                b[0] = 9;
                crate::hash::Root::from(b)
            }),
        );
        let backed = crate::view::ViewBacking::new(node);
        assert!(Choice::from_backed(&backed).is_err());
    }
}
