//! Tests for StringAccumulator
//!
//! These tests verify:
//! - Bytes are kept in write order
//! - Capacity doubles when full
//! - take() rewinds but keeps the capacity

use xqwire::protocol::StringAccumulator;

#[test]
fn test_new_accumulator_is_empty() {
    let acc = StringAccumulator::with_capacity(8);

    assert!(acc.is_empty());
    assert_eq!(acc.len(), 0);
    assert_eq!(acc.capacity(), 8);
}

#[test]
fn test_zero_capacity_is_raised_to_one() {
    let mut acc = StringAccumulator::with_capacity(0);
    assert_eq!(acc.capacity(), 1);

    acc.push(b'a');
    acc.push(b'b');
    assert_eq!(acc.as_bytes(), b"ab");
}

#[test]
fn test_push_within_capacity() {
    let mut acc = StringAccumulator::with_capacity(4);
    for &b in b"abcd" {
        acc.push(b);
    }

    assert_eq!(acc.as_bytes(), b"abcd");
    assert_eq!(acc.capacity(), 4);
}

#[test]
fn test_capacity_doubles_on_overflow() {
    let mut acc = StringAccumulator::with_capacity(4);
    for &b in b"abcde" {
        acc.push(b);
    }
    assert_eq!(acc.capacity(), 8);

    for &b in b"fghi" {
        acc.push(b);
    }
    assert_eq!(acc.capacity(), 16);
    assert_eq!(acc.as_bytes(), b"abcdefghi");
}

#[test]
fn test_take_rewinds_and_keeps_capacity() {
    let mut acc = StringAccumulator::with_capacity(2);
    for &b in b"hello" {
        acc.push(b);
    }
    let capacity = acc.capacity();

    assert_eq!(acc.take(), b"hello".to_vec());
    assert!(acc.is_empty());
    assert_eq!(acc.capacity(), capacity);

    acc.push(b'x');
    assert_eq!(acc.take(), b"x".to_vec());
}

#[test]
fn test_take_when_empty() {
    let mut acc = StringAccumulator::default();
    assert!(acc.take().is_empty());
}
