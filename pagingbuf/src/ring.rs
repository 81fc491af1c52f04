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

use crate::{
    arena::Arena,
    common::{unlikely, HEADER_SIZE, MAX_PACKET_SIZE},
    config::RingConfig,
    error::{ConfigError, PacketRingError},
    growth::GrowthPolicy,
    ring_trace,
    sync::Spinlock,
};
use std::fmt;
use std::io;

/// Growable FIFO of variable-length packets stored back to back in one byte arena.
///
/// Every operation takes the same lock, so a ring can be shared between any number of
/// producer and consumer threads behind an `Arc`. Nothing blocks waiting for data or
/// space: reads of an empty ring return `Ok(0)` and writes grow the arena as needed.
pub struct PacketRing {
    arena: Spinlock<Arena>,
}

impl PacketRing {
    /// Creates an empty ring. No arena is allocated until the first write.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty ring with `capacity` arena bytes allocated up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_policy(capacity, GrowthPolicy::default())
    }

    /// Creates an empty ring from `config`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidGrowthPolicy`] for a policy whose growth steps would
    /// not strictly increase the capacity.
    pub fn from_config(config: &RingConfig) -> Result<Self, ConfigError> {
        config.growth.validate()?;
        Ok(Self::with_policy(config.initial_capacity, config.growth))
    }

    fn with_policy(capacity: usize, growth: GrowthPolicy) -> Self {
        PacketRing {
            arena: Spinlock::new(Arena::new(capacity, growth)),
        }
    }

    /// Queues a copy of `packet`, growing the arena if it does not fit.
    ///
    /// # Errors
    /// Returns [`PacketRingError::PacketTooBig`] for packets of 65536 bytes or more.
    /// The ring is not modified in that case.
    pub fn write(&self, packet: &[u8]) -> Result<usize, PacketRingError> {
        let len = packet.len();
        if unlikely(len > MAX_PACKET_SIZE) {
            return Err(PacketRingError::PacketTooBig(len));
        }

        let mut arena = self.arena.lock();
        arena.push(packet);

        ring_trace!(
            len = len,
            count = arena.count(),
            size = arena.len(),
            capacity = arena.capacity(),
            "packet queued"
        );

        Ok(len)
    }

    /// Moves the oldest packet into `dst` and returns its length, or `0` if the ring is
    /// empty.
    ///
    /// A zero-length packet also reads as `0`; use [`PacketRing::read_packet`] when the
    /// two must be told apart.
    ///
    /// # Errors
    /// Returns [`PacketRingError::ShortBuffer`] with the packet length when `dst` is
    /// smaller than the packet. The packet stays queued.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, PacketRingError> {
        let mut arena = self.arena.lock();
        let result = arena.pop_into(dst);

        ring_trace!(
            result = ?result,
            count = arena.count(),
            size = arena.len(),
            "packet read"
        );

        result
    }

    /// Pops the oldest packet into a new vector.
    pub fn read_packet(&self) -> Option<Vec<u8>> {
        let mut arena = self.arena.lock();
        let len = arena.peek_len()?;
        let mut packet = vec![0u8; len];
        let n = arena.pop_into(&mut packet).ok()?;
        debug_assert_eq!(n, len);
        Some(packet)
    }

    /// Length of the oldest packet, without dequeuing it.
    pub fn peek_len(&self) -> Option<usize> {
        self.arena.lock().peek_len()
    }

    /// Number of queued packets.
    pub fn count(&self) -> usize {
        self.arena.lock().count()
    }

    /// Bytes occupied in the arena by queued packets, 2-byte length headers included.
    pub fn size(&self) -> usize {
        self.arena.lock().len()
    }

    /// Bytes of queued packet payloads, headers excluded.
    pub fn payload_size(&self) -> usize {
        let arena = self.arena.lock();
        arena.len() - arena.count() * HEADER_SIZE
    }

    /// Current arena size. Never shrinks.
    pub fn capacity(&self) -> usize {
        self.arena.lock().capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.lock().is_empty()
    }
}

impl Default for PacketRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PacketRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.lock();
        f.debug_struct("PacketRing")
            .field("count", &arena.count())
            .field("size", &arena.len())
            .field("capacity", &arena.capacity())
            .finish()
    }
}

/// Each `write` queues exactly one packet.
impl io::Write for &PacketRing {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(PacketRing::write(*self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Each `read` dequeues at most one non-empty packet. Zero-length packets carry no bytes
/// and are dropped on the way, so only an empty ring reads as end of stream.
impl io::Read for &PacketRing {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut arena = self.arena.lock();
        loop {
            let n = arena.pop_into(buf)?;
            if n > 0 || arena.is_empty() {
                return Ok(n);
            }
        }
    }
}
