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

//! Record framing: a big-endian `u16` payload length in front of every packet.

use crate::common::{HEADER_SIZE, MAX_PACKET_SIZE};

pub(crate) type Header = [u8; HEADER_SIZE];

/// Encodes the length prefix for a payload of `len` bytes.
///
/// Callers reject payloads above [`MAX_PACKET_SIZE`] before framing.
#[inline(always)]
pub(crate) fn encode(len: usize) -> Header {
    debug_assert!(len <= MAX_PACKET_SIZE);
    [(len >> 8) as u8, len as u8]
}

#[inline(always)]
pub(crate) fn decode(header: Header) -> usize {
    ((header[0] as usize) << 8) | header[1] as usize
}

/// Bytes a payload of `len` bytes occupies in the arena.
#[inline(always)]
pub(crate) fn record_len(len: usize) -> usize {
    HEADER_SIZE + len
}
