//! Integration tests for range and block views, including the fail-soft
//! fault channel

use memview::fault;
use memview::{FaultKind, FaultSlot, MemoryBlock, MemoryRange};

#[test]
fn test_alphabet_range_scenario() {
    let mut buffer = *b"ABCDEFGHIJ";
    let range = MemoryRange::from_mut_slice(&mut buffer);
    let base = range.begin();

    assert_eq!(range.get(0).unwrap(), b'A');
    unsafe {
        assert_eq!(*range.at(0, true).unwrap(), b'J');
    }

    let sub = range
        .make_sub_range(base.wrapping_add(2), base.wrapping_add(5), true)
        .unwrap();
    assert_eq!(sub.to_vec(), b"CDE");
    assert!(range.has_range(sub.begin(), sub.end()));

    assert!(fault::capture(range.at(10, false)).is_none());
    assert_eq!(fault::get_and_clear(), Some(FaultKind::OutOfRange));
    assert_eq!(range.at(9, false).unwrap(), range.back().unwrap());
}

#[test]
fn test_sub_range_edits_are_visible_in_parent() {
    let mut buffer = *b"ABCDEFGHIJ";
    let range = MemoryRange::from_mut_slice(&mut buffer);

    let mut middle = range.sub_range(3, 4).unwrap();
    middle.insert(0, b'-').unwrap();
    assert_eq!(middle.to_vec(), b"-DEF");
    assert_eq!(range.to_vec(), b"ABC-DEFHIJ");

    middle.fill(b'*').unwrap();
    assert_eq!(range.to_vec(), b"ABC****HIJ");
    assert_eq!(&buffer, b"ABC****HIJ");
}

#[test]
fn test_fault_slot_sentinel_style() {
    let mut buffer = [0u8; 4];
    let slot = FaultSlot::new();
    let mut range = MemoryRange::empty();

    let written = slot.capture(range.insert_range(0, b"abc")).unwrap_or(0);
    assert_eq!(written, 0);
    assert_eq!(slot.get_and_clear(), Some(FaultKind::NullPointer));

    range.set_slice(&mut buffer);
    assert_eq!(slot.capture(range.insert_range(0, b"abc")), Some(3));
    assert_eq!(slot.peek(), None);
}

#[test]
fn test_blocks_with_different_element_sizes_do_not_swap() {
    let mut wide = [[1u8; 24]; 3];
    let mut narrow = [[2u8; 12]; 3];
    let mut a = MemoryBlock::from_mut_slice(&mut wide);
    let mut b = MemoryBlock::from_mut_slice(&mut narrow);
    let (a_range, b_range) = (a.range(), b.range());

    assert!(fault::capture(a.swap(&mut b)).is_none());
    assert_eq!(fault::get_and_clear(), Some(FaultKind::DifferentElementSize));
    assert_eq!(a.range(), a_range);
    assert_eq!(b.range(), b_range);
    assert_eq!(a.element_size(), 24);
    assert_eq!(b.element_size(), 12);
}

#[test]
fn test_block_over_sub_range() {
    let mut buffer = [0u8; 32];
    let range = MemoryRange::from_mut_slice(&mut buffer);
    let mut block = MemoryBlock::new(range.sub_range(4, 26).unwrap(), 8);

    assert_eq!(block.size(), 3);
    block.put(2, 0x1122_3344_5566_7788u64).unwrap();
    assert_eq!(block.get::<u64>(2).unwrap(), 0x1122_3344_5566_7788);

    let last = block.back().unwrap();
    assert_eq!(block.element_base_address(last.wrapping_add(7)).unwrap(), last);
    assert_eq!(
        block.element_base_address(last.wrapping_add(8)).unwrap_err().kind(),
        FaultKind::OutOfRange
    );
}
