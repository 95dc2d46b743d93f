// Copyright (c) Kanari Contributors
// SPDX-License-Identifier: Apache-2.0

//! Concrete worked scenarios: specific trees, specific byte strings, specific roots. Where a
//! property test says "this holds for all inputs", these say "this exact tree roots to this
//! exact hash" — useful as a tripwire against an accidental change to the hashing or packing
//! convention.

use ssz_tree::prelude::*;

#[test]
fn empty_list_of_uint64_roots_to_the_well_known_empty_pair_hash() {
    let l: List<Uint64, 4> = List::default();
    assert_eq!(
        hex::encode(l.hash_tree_root().as_bytes()),
        "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"
    );
}

#[test]
fn vector_of_four_uint64_packs_into_a_single_chunk() {
    let v: Vector<Uint64, 4> = Vector::new(vec![Uint64(1), Uint64(2), Uint64(3), Uint64(4)]).unwrap();

    let mut expected = [0u8; 32];
    expected[0..8].copy_from_slice(&1u64.to_le_bytes());
    expected[8..16].copy_from_slice(&2u64.to_le_bytes());
    expected[16..24].copy_from_slice(&3u64.to_le_bytes());
    expected[24..32].copy_from_slice(&4u64.to_le_bytes());

    assert_eq!(v.hash_tree_root().as_bytes(), &expected);
    assert_eq!(v.ssz_encode(), expected.to_vec());
}

// Bit order follows the crate's established LSB-first-within-byte convention (bitfield.rs,
// codec.rs), with bit 0 of the list occupying the least-significant bit of the first byte: a
// delimiting `1` bit is appended immediately after the data bits, which here lands it at bit
// position 8, i.e. the low bit of the second byte.
#[test]
fn bitlist_encodes_data_bits_lsb_first_then_a_delimiting_bit() {
    let mut bl: Bitlist<16> = Bitlist::default();
    for &bit in &[true, false, true, true, false, false, false, true] {
        bl.append(bit).unwrap();
    }

    let bytes = bl.ssz_encode();
    assert_eq!(bytes, vec![0x8d, 0x01]);

    let decoded = Bitlist::<16>::ssz_decode(&bytes).unwrap();
    assert_eq!(decoded.len(), 8);
    for i in 0..8u64 {
        assert_eq!(decoded.get(i).unwrap(), bl.get(i).unwrap());
    }
}

#[test]
fn list_grown_then_shrunk_roots_identically_to_direct_construction() {
    let mut grown: List<Uint32, 512> = List::default();
    for i in 0..300u32 {
        grown.append(Uint32(i)).unwrap();
    }
    grown.pop().unwrap();

    let direct: List<Uint32, 512> =
        List::new((0..299u32).map(Uint32).collect()).unwrap();

    assert_eq!(grown.len(), direct.len());
    assert_eq!(grown.hash_tree_root(), direct.hash_tree_root());
}

ssz_container!(
    struct Record {
        (id, set_id): Uint32,
        (tags, set_tags): List<Uint16, 4>,
    }
);

#[test]
fn container_with_trailing_list_field_splits_fixed_and_offset_regions() {
    let mut r = Record::default();
    r.set_id(Uint32(0x0a0b0c0d)).unwrap();
    r.set_tags(List::<Uint16, 4>::new(vec![Uint16(1), Uint16(2), Uint16(3)]).unwrap())
        .unwrap();

    let bytes = r.ssz_encode();
    let mut expected = vec![0x0d, 0x0c, 0x0b, 0x0a];
    expected.extend_from_slice(&8u32.to_le_bytes());
    expected.extend_from_slice(&[1, 0, 2, 0, 3, 0]);
    assert_eq!(bytes, expected);

    let decoded = Record::ssz_decode(&bytes).unwrap();
    assert_eq!(decoded.id().unwrap(), Uint32(0x0a0b0c0d));
    assert_eq!(decoded.tags().unwrap().len(), 3);
}

ssz_union!(
    enum Selected {
        0 => None(()),
        1 => Count(Uint32),
        2 => Flag(Boolean),
    }
);

#[test]
fn union_default_selector_is_none_and_changing_it_rewrites_selector_and_payload() {
    let default = Selected::None(());
    assert_eq!(default.selector(), 0);
    assert_eq!(default.ssz_encode(), vec![0u8]);

    let changed = Selected::Count(Uint32(7));
    assert_eq!(changed.selector(), 1);
    let mut expected = vec![1u8];
    expected.extend_from_slice(&7u32.to_le_bytes());
    assert_eq!(changed.ssz_encode(), expected);

    match Selected::ssz_decode(&changed.ssz_encode()).unwrap() {
        Selected::Count(v) => assert_eq!(v, Uint32(7)),
        _ => panic!("expected Count variant"),
    }
}

ssz_container!(
    struct Batch {
        (counters, set_counters): Vector<Uint64, 4>,
    }
);

#[test]
fn mutating_a_fetched_child_view_and_writing_it_back_updates_the_parent_root() {
    let mut batch = Batch::default();
    let root_before = batch.hash_tree_root();

    let mut counters = batch.counters().unwrap();
    counters.set(1, Uint64(99)).unwrap();
    batch.set_counters(counters).unwrap();

    assert_eq!(batch.counters().unwrap().get(1).unwrap(), Uint64(99));
    assert_ne!(batch.hash_tree_root(), root_before);
}
