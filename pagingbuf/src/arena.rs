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

//! Unsynchronized arena holding length-framed records in a wrap-around byte array.
//!
//! Live bytes are `[head, tail)` when `head <= tail` and `[head, capacity) ∪ [0, tail)`
//! otherwise. One byte is always left free, so `head == tail` only ever means empty.
//! Each record is a [`frame`](crate::frame) header followed by the payload, and either
//! part may straddle the end of the array.

use crate::{
    common::{advance, distance, free_space, record_fits, unlikely, HEADER_SIZE, MAX_PACKET_SIZE},
    error::PacketRingError,
    frame::{self, Header},
    growth::GrowthPolicy,
};
use tracing::debug;

pub(crate) struct Arena {
    storage: Box<[u8]>,
    head: usize,
    tail: usize,
    count: usize,
    growth: GrowthPolicy,
}

impl Arena {
    pub(crate) fn new(capacity: usize, growth: GrowthPolicy) -> Self {
        Arena {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
            growth,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Live bytes, headers included.
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        distance(self.head, self.tail, self.capacity())
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    fn available(&self, size: usize) -> bool {
        record_fits(size, free_space(self.head, self.tail, self.capacity()))
    }

    /// Swaps in a larger arena with the live bytes moved to offset zero.
    fn grow(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = self.growth.next_capacity(old_capacity);
        let live = self.len();

        let mut storage = vec![0u8; new_capacity].into_boxed_slice();
        self.copy_out(self.head, &mut storage[..live]);

        self.storage = storage;
        self.head = 0;
        self.tail = live;

        debug!(
            old_capacity = old_capacity,
            new_capacity = new_capacity,
            live_bytes = live,
            count = self.count,
            "arena grown"
        );
    }

    /// Appends one record, growing the arena until it fits.
    pub(crate) fn push(&mut self, packet: &[u8]) {
        debug_assert!(packet.len() <= MAX_PACKET_SIZE);

        while !self.available(packet.len()) {
            self.grow();
        }

        let header = frame::encode(packet.len());
        self.tail = self.copy_in(self.tail, &header);
        self.tail = self.copy_in(self.tail, packet);
        self.count += 1;
    }

    /// Payload length of the oldest record.
    pub(crate) fn peek_len(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let mut header: Header = [0; HEADER_SIZE];
        self.copy_out(self.head, &mut header);
        Some(frame::decode(header))
    }

    /// Moves the oldest payload into `dst`. Leaves the arena untouched when `dst` is too
    /// small for it.
    pub(crate) fn pop_into(&mut self, dst: &mut [u8]) -> Result<usize, PacketRingError> {
        if self.is_empty() {
            return Ok(0);
        }

        let mut header: Header = [0; HEADER_SIZE];
        let payload_pos = self.copy_out(self.head, &mut header);
        let len = frame::decode(header);

        if unlikely(dst.len() < len) {
            return Err(PacketRingError::ShortBuffer { needed: len });
        }

        self.head = self.copy_out(payload_pos, &mut dst[..len]);
        self.count -= 1;

        if self.head == self.tail {
            self.head = 0;
            self.tail = 0;
        }

        Ok(len)
    }

    /// Writes `src` at `pos`, wrapping at the end of the array. Returns the position after it.
    fn copy_in(&mut self, pos: usize, src: &[u8]) -> usize {
        if src.is_empty() {
            return pos;
        }
        let capacity = self.capacity();
        let first = src.len().min(capacity - pos);
        self.storage[pos..pos + first].copy_from_slice(&src[..first]);
        self.storage[..src.len() - first].copy_from_slice(&src[first..]);
        advance(pos, src.len(), capacity)
    }

    /// Fills `dst` from `pos`, wrapping at the end of the array. Returns the position after it.
    fn copy_out(&self, pos: usize, dst: &mut [u8]) -> usize {
        if dst.is_empty() {
            return pos;
        }
        let capacity = self.capacity();
        let first = dst.len().min(capacity - pos);
        dst[..first].copy_from_slice(&self.storage[pos..pos + first]);
        let rest = dst.len() - first;
        dst[first..].copy_from_slice(&self.storage[..rest]);
        advance(pos, dst.len(), capacity)
    }

    #[cfg(test)]
    pub(crate) fn cursors(&self) -> (usize, usize) {
        (self.head, self.tail)
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Walks the records from `head` and checks they tile the live bytes exactly.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let capacity = self.capacity();
        assert!(self.head < capacity || capacity == 0);
        assert!(self.tail < capacity || capacity == 0);
        assert_eq!(self.is_empty(), self.count == 0);
        if capacity > 0 {
            assert!(free_space(self.head, self.tail, capacity) >= 1);
        }

        let mut pos = self.head;
        let mut walked = 0;
        let mut records = 0;
        while walked < self.len() {
            let mut header: Header = [0; HEADER_SIZE];
            pos = self.copy_out(pos, &mut header);
            let len = frame::decode(header);
            pos = advance(pos, len, capacity);
            walked += frame::record_len(len);
            records += 1;
        }
        assert_eq!(walked, self.len(), "records overrun the live bytes");
        assert_eq!(pos, self.tail);
        assert_eq!(records, self.count);
    }
}
