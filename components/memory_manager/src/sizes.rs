//! Fixed per-item costs used by the estimator, in bytes.

use std::mem::size_of;

/// Overhead of an empty struct or object header: one pointer.
pub const SIZE_EMPTY_STRUCT: u64 = size_of::<usize>() as u64;

/// A boolean.
pub const SIZE_BOOL: u64 = 1;

/// A 64-bit integer.
pub const SIZE_INT: u64 = 8;

/// A 32-bit integer.
pub const SIZE_INT32: u64 = 4;

/// A double.
pub const SIZE_NUMBER: u64 = 8;

/// String header (pointer + length), added to the payload in refined totals.
pub const SIZE_STRING: u64 = 2 * size_of::<usize>() as u64;
