// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! `ssz_stable_container!` (component M): a `StableContainer<N>` analogue of `ssz_container!`
//! whose fields are all optional, with presence tracked by an `N`-bit active-fields vector mixed
//! into the root the same way `List`'s length is (`Pair(fields, active)` instead of
//! `Pair(body, length)`). `Variant`/`OneOf` (profiles over a stable container that fix which
//! fields must or may be active) are provided as thin wrappers that check the active mask on
//! construction rather than full standalone types, since their field access is identical to the
//! underlying stable container's once the mask is known to match.

#[doc(hidden)]
#[macro_export]
macro_rules! __ssz_stable_field_impls {
    ($name:ident, $max:literal, $idx:expr,) => {};
    ($name:ident, $max:literal, $idx:expr, ($getter:ident, $setter:ident, $clearer:ident): $ftype:ty $(, $( ($rgetter:ident, $rsetter:ident, $rclearer:ident): $rftype:ty ),* )?) => {
        impl $name {
            // Stable container fields are never packed, same as `ssz_container!`: each field
            // owns a whole chunk within the fields subtree, addressed via `AsNode` rather than
            // the packed `Element` path.
            pub fn $getter(&self) -> $crate::error::Result<Option<$ftype>> {
                use $crate::typ::AsNode;
                let node = self.node();
                let fields = $crate::node::getter(&node, $crate::gindex::Gindex(2))?;
                let active = $crate::node::getter(&node, $crate::gindex::Gindex(3))?;
                let active_bits: $crate::bitfield::Bitvector<$max> =
                    $crate::view::BackedView::from_backed($crate::view::ViewBacking::new(active));
                if !active_bits.get($idx)? {
                    return Ok(None);
                }
                let g = $crate::gindex::to_gindex($idx, $crate::gindex::get_depth($max))?;
                let value_node = $crate::node::getter(&fields, g)?;
                Ok(Some(<$ftype as AsNode>::from_node(&value_node)?))
            }

            pub fn $setter(&mut self, value: $ftype) -> $crate::error::Result<()> {
                use $crate::typ::AsNode;
                let node = self.node();
                let fields = $crate::node::getter(&node, $crate::gindex::Gindex(2))?;
                let g = $crate::gindex::to_gindex($idx, $crate::gindex::get_depth($max))?;
                let set_field = $crate::node::setter(&fields, g, false)?;
                let new_fields = set_field(value.as_node());
                let set_fields = $crate::node::setter(&node, $crate::gindex::Gindex(2), false)?;
                let with_new_fields = set_fields(new_fields);

                let active = $crate::node::getter(&with_new_fields, $crate::gindex::Gindex(3))?;
                let mut active_bits: $crate::bitfield::Bitvector<$max> =
                    $crate::view::BackedView::from_backed($crate::view::ViewBacking::new(active));
                active_bits.set($idx, true)?;
                let set_active = $crate::node::setter(&with_new_fields, $crate::gindex::Gindex(3), false)?;
                let with_new_active = set_active($crate::view::BackedView::node(&active_bits));

                $crate::view::ViewBacking::rebind(&self.backed, with_new_active)
            }

            pub fn $clearer(&mut self) -> $crate::error::Result<()> {
                use $crate::typ::AsNode;
                let node = self.node();
                let fields = $crate::node::getter(&node, $crate::gindex::Gindex(2))?;
                let g = $crate::gindex::to_gindex($idx, $crate::gindex::get_depth($max))?;
                let set_field = $crate::node::setter(&fields, g, false)?;
                let cleared_fields = set_field(<$ftype as Default>::default().as_node());
                let set_fields = $crate::node::setter(&node, $crate::gindex::Gindex(2), false)?;
                let with_cleared_fields = set_fields(cleared_fields);

                let active = $crate::node::getter(&with_cleared_fields, $crate::gindex::Gindex(3))?;
                let mut active_bits: $crate::bitfield::Bitvector<$max> =
                    $crate::view::BackedView::from_backed($crate::view::ViewBacking::new(active));
                active_bits.set($idx, false)?;
                let set_active = $crate::node::setter(&with_cleared_fields, $crate::gindex::Gindex(3), false)?;
                let with_new_active = set_active($crate::view::BackedView::node(&active_bits));

                $crate::view::ViewBacking::rebind(&self.backed, with_new_active)
            }
        }

        $(
            $crate::__ssz_stable_field_impls!($name, $max, $idx + 1, $( ($rgetter, $rsetter, $rclearer): $rftype ),*);
        )?
    };
}

#[macro_export]
macro_rules! ssz_stable_container {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident [$max:literal] {
            $( ($getter:ident, $setter:ident, $clearer:ident): $ftype:ty ),* $(,)?
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

        $crate::__ssz_stable_field_impls!($name, $max, 0, $( ($getter, $setter, $clearer): $ftype ),*);

        impl $crate::typ::SszType for $name {
            fn chunk_count() -> u64 {
                2
            }

            fn tree_depth() -> u32 {
                1
            }

            fn is_variable_length() -> bool {
                true
            }

            fn default_node() -> $crate::node::NodeRef {
                let field_depth = $crate::gindex::get_depth($max);
                let fields = $crate::node::fill_to_depth($crate::node::zero_node(0), field_depth as usize);
                let active = <$crate::bitfield::Bitvector<$max> as $crate::typ::SszType>::default_node();
                $crate::node::pair(fields, active)
            }

            fn min_encoded_len() -> usize {
                ($max + 7) / 8
            }

            fn max_encoded_len() -> usize {
                ($max + 7) / 8 $( + <$ftype as $crate::typ::SszType>::max_encoded_len() )*
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

                let node = self.node();
                let active_node = $crate::node::getter(&node, $crate::gindex::Gindex(3))
                    .expect("stable container always has an active bitvector");
                let active_bits: $crate::bitfield::Bitvector<$max> =
                    $crate::view::BackedView::from_backed($crate::view::ViewBacking::new(active_node));
                let mut out = active_bits.ssz_encode();

                let mut parts: Vec<(bool, Vec<u8>)> = Vec::new();
                let mut field = 0usize;
                $(
                    if active_bits.get(field as u64).unwrap_or(false) {
                        let value = self.$getter().expect("active field always readable").expect("checked active above");
                        parts.push((<$ftype as SszType>::is_fixed_len(), value.ssz_encode()));
                    }
                    field += 1;
                )*
                let _ = field;

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
                out.extend(fixed_region);
                out
            }

            fn ssz_decode(bytes: &[u8]) -> $crate::error::Result<Self> {
                use $crate::codec::SszCodec;
                use $crate::typ::SszType;

                let bitvector_len = ($max + 7) / 8;
                if bytes.len() < bitvector_len {
                    return Err($crate::error::SszError::decode("stable container missing active-bits prefix"));
                }
                let active_bits = <$crate::bitfield::Bitvector<$max> as SszCodec>::ssz_decode(&bytes[..bitvector_len])?;

                let field_count: usize = [$(stringify!($ftype)),*].len();
                for i in field_count..$max {
                    if active_bits.get(i as u64).unwrap_or(false) {
                        return Err($crate::error::SszError::decode("active bit set beyond declared fields"));
                    }
                }

                let rest = &bytes[bitvector_len..];
                let mut field_info: Vec<(bool, usize, bool)> = Vec::new();
                let mut field = 0usize;
                $(
                    field_info.push((
                        active_bits.get(field as u64).unwrap_or(false),
                        <$ftype as SszType>::min_encoded_len(),
                        <$ftype as SszType>::is_fixed_len(),
                    ));
                    field += 1;
                )*
                let _ = field;

                let mut ranges: Vec<Option<(usize, usize)>> = vec![None; field_info.len()];
                let mut cursor = 0usize;
                let mut var_offsets: Vec<usize> = Vec::new();
                for (i, (active, size, fixed)) in field_info.iter().enumerate() {
                    if !active {
                        continue;
                    }
                    if *fixed {
                        if cursor + size > rest.len() {
                            return Err($crate::error::SszError::decode("stable container fixed region truncated"));
                        }
                        ranges[i] = Some((cursor, cursor + size));
                        cursor += size;
                    } else {
                        let raw = rest
                            .get(cursor..cursor + 4)
                            .ok_or_else(|| $crate::error::SszError::decode("stable container offset table truncated"))?;
                        let offset = u32::from_le_bytes(raw.try_into().unwrap()) as usize;
                        var_offsets.push(offset);
                        ranges[i] = Some((0, 0));
                        cursor += 4;
                    }
                }
                var_offsets.push(rest.len());
                let mut var_idx = 0usize;
                for (i, (active, _, fixed)) in field_info.iter().enumerate() {
                    if *active && !*fixed {
                        let start = var_offsets[var_idx];
                        let end = var_offsets[var_idx + 1];
                        if start > end || end > rest.len() {
                            return Err($crate::error::SszError::decode("stable container offset out of range"));
                        }
                        ranges[i] = Some((start, end));
                        var_idx += 1;
                    }
                }

                let mut container = Self::default();
                let mut field = 0usize;
                $(
                    if let Some((start, end)) = ranges[field] {
                        let value = <$ftype as SszCodec>::ssz_decode(&rest[start..end])?;
                        container.$setter(value)?;
                    }
                    field += 1;
                )*
                let _ = field;
                Ok(container)
            }
        }
    };
}

/// A profile over a stable container: asserts (on construction) that the container's active
/// mask matches exactly the field set this profile expects. Field access is just the wrapped
/// container's own getters/setters — a profile restricts which fields may ever be active, it
/// doesn't change how they're read or written.
#[derive(Clone)]
pub struct Variant<S> {
    inner: S,
}

impl<S: crate::view::BackedView> Variant<S> {
    /// `required`/`optional` together must equal the full set of field indices this profile
    /// allows to be active; `required` must always be active, `optional` may or may not be.
    pub fn new(inner: S, active: &[u64], required: &[u64], allowed: &[u64]) -> crate::error::Result<Self> {
        for &r in required {
            if !active.contains(&r) {
                return Err(crate::error::SszError::invalid(format!(
                    "profile requires field {r} to be active"
                )));
            }
        }
        for &a in active {
            if !allowed.contains(&a) {
                return Err(crate::error::SszError::invalid(format!(
                    "profile does not allow field {a} to be active"
                )));
            }
        }
        Ok(Variant { inner })
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

/// A `OneOf` profile: exactly one of the allowed fields is active at a time. Same
/// construction-time validation as `Variant`, specialized to the single-active-field case.
#[derive(Clone)]
pub struct OneOf<S> {
    inner: S,
    active_field: u64,
}

impl<S: crate::view::BackedView> OneOf<S> {
    pub fn new(inner: S, active: &[u64], allowed: &[u64]) -> crate::error::Result<Self> {
        if active.len() != 1 {
            return Err(crate::error::SszError::invalid(
                "OneOf requires exactly one active field",
            ));
        }
        let active_field = active[0];
        if !allowed.contains(&active_field) {
            return Err(crate::error::SszError::invalid(format!(
                "field {active_field} is not a OneOf option"
            )));
        }
        Ok(OneOf { inner, active_field })
    }

    pub fn active_field(&self) -> u64 {
        self.active_field
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use crate::basic::{Boolean, Uint64};

    ssz_stable_container!(
        struct Profile [4] {
            (a, set_a, clear_a): Uint64,
            (b, set_b, clear_b): Boolean,
        }
    );

    #[test]
    fn fields_start_inactive() {
        let p = Profile::default();
        assert_eq!(p.a().unwrap(), None);
        assert_eq!(p.b().unwrap(), None);
    }

    #[test]
    fn set_activates_and_clear_deactivates() {
        let mut p = Profile::default();
        p.set_a(Uint64(9)).unwrap();
        assert_eq!(p.a().unwrap(), Some(Uint64(9)));
        assert_eq!(p.b().unwrap(), None);

        p.clear_a().unwrap();
        assert_eq!(p.a().unwrap(), None);
    }

    #[test]
    fn variant_rejects_missing_required_field() {
        let p = Profile::default();
        let result = super::Variant::new(p, &[], &[0], &[0, 1]);
        assert!(result.is_err());
    }

    #[test]
    fn one_of_rejects_multiple_active_fields() {
        let p = Profile::default();
        let result = super::OneOf::new(p, &[0, 1], &[0, 1]);
        assert!(result.is_err());
    }

    #[test]
    fn stable_container_codec_prefixes_active_bits() {
        use crate::codec::SszCodec;

        let mut p = Profile::default();
        p.set_a(Uint64(7)).unwrap();
        let bytes = p.ssz_encode();

        // Bitvector<4> prefix is 1 byte; only field 0 (a) is active.
        assert_eq!(bytes[0], 0b0000_0001);
        assert_eq!(&bytes[1..9], &7u64.to_le_bytes());

        let decoded = Profile::ssz_decode(&bytes).unwrap();
        assert_eq!(decoded.a().unwrap(), Some(Uint64(7)));
        assert_eq!(decoded.b().unwrap(), None);
    }

    #[test]
    fn stable_container_decode_rejects_active_bit_beyond_fields() {
        let mut bytes = vec![0b0000_0100u8];
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(Profile::ssz_decode(&bytes).is_err());
    }
}
