// Copyright (C) 2025 Category Labs, Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Common internal constants and cursor arithmetic for pagingbuf.

/// Size of the big-endian length prefix in front of every record.
pub(crate) const HEADER_SIZE: usize = 2;

/// Largest payload the length prefix can describe.
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize;

/// Byte that is never written so that `head == tail` always means empty.
pub(crate) const RESERVED_BYTES: usize = 1;

#[inline]
#[cold]
fn cold() {}

#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold();
    }
    b
}

/// Moves `idx` forward by `by` bytes in an arena of `capacity` bytes.
#[inline(always)]
pub(crate) fn advance(idx: usize, by: usize, capacity: usize) -> usize {
    debug_assert!(idx < capacity, "cursor {idx} outside arena of {capacity}");
    debug_assert!(by <= capacity, "advance of {by} exceeds arena of {capacity}");
    let next = idx + by;
    if next >= capacity {
        next - capacity
    } else {
        next
    }
}

/// Number of bytes walked going forward from `from` until `to` is reached.
#[inline(always)]
pub(crate) fn distance(from: usize, to: usize, capacity: usize) -> usize {
    if to >= from {
        to - from
    } else {
        to + capacity - from
    }
}

/// Bytes not occupied by live records. An empty arena reports its whole capacity.
#[inline(always)]
pub(crate) fn free_space(head: usize, tail: usize, capacity: usize) -> usize {
    if head > tail {
        head - tail
    } else {
        head + capacity - tail
    }
}

/// Whether a payload of `size` bytes plus its header fits into `free` bytes while
/// leaving the reserved byte untouched.
#[inline(always)]
pub(crate) fn record_fits(size: usize, free: usize) -> bool {
    crate::frame::record_len(size) + RESERVED_BYTES <= free
}
