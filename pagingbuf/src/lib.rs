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

//! # pagingbuf - Growable Packet Ring
//!
//! FIFO queue for variable-length packets that must be held while their receiver is
//! unreachable, such as downlink data buffered for a UE in the idle/paging state.
//!
//! All queued bytes live in one reusable byte arena. Each packet is stored as a 2-byte
//! big-endian length followed by the payload, and records wrap around the end of the
//! arena. When a packet does not fit, the arena is replaced by a larger one: capacity
//! doubles up to 128 KiB and grows by a quarter after that, starting at 2048 bytes.
//!
//! ## Writing and Reading
//!
//! ```rust
//! use pagingbuf::PacketRing;
//!
//! let ring = PacketRing::new();
//! ring.write(&[0, 1])?;
//!
//! let mut buf = [0u8; 4];
//! let n = ring.read(&mut buf)?;
//! assert_eq!(&buf[..n], &[0, 1]);
//!
//! // an empty ring reads as zero bytes
//! assert_eq!(ring.read(&mut buf)?, 0);
//! # Ok::<(), pagingbuf::PacketRingError>(())
//! ```
//!
//! ## Short Buffers
//!
//! A destination that is too small leaves the packet queued and reports the size needed:
//!
//! ```rust
//! use pagingbuf::{PacketRing, PacketRingError};
//!
//! let ring = PacketRing::new();
//! ring.write(b"queued while paging")?;
//!
//! let mut small = [0u8; 4];
//! if let Err(PacketRingError::ShortBuffer { needed }) = ring.read(&mut small) {
//!     let mut buf = vec![0u8; needed];
//!     ring.read(&mut buf)?;
//!     assert_eq!(buf, b"queued while paging");
//! }
//! # Ok::<(), pagingbuf::PacketRingError>(())
//! ```
//!
//! ## Sharing Between Threads
//!
//! ```rust
//! use pagingbuf::PacketRing;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let ring = Arc::new(PacketRing::new());
//! let producer = {
//!     let ring = ring.clone();
//!     thread::spawn(move || {
//!         for i in 0..100u8 {
//!             ring.write(&[i; 64]).unwrap();
//!         }
//!     })
//! };
//! producer.join().unwrap();
//!
//! let mut received = 0;
//! while let Some(packet) = ring.read_packet() {
//!     assert_eq!(packet, [received; 64]);
//!     received += 1;
//! }
//! assert_eq!(received, 100);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use pagingbuf::{PacketRing, RingConfig};
//!
//! let config = RingConfig::from_toml_str(
//!     r#"
//! initial_capacity = 65536
//!
//! [growth]
//! cutoff_capacity = 1048576
//! "#,
//! )?;
//! let ring = PacketRing::from_config(&config)?;
//! assert_eq!(ring.capacity(), 65536);
//! # Ok::<(), pagingbuf::ConfigError>(())
//! ```

pub use common::MAX_PACKET_SIZE;
pub use config::RingConfig;
pub use error::{ConfigError, PacketRingError};
pub use growth::{GrowthPolicy, DEFAULT_CUTOFF_CAPACITY, DEFAULT_MIN_CAPACITY};
pub use ring::PacketRing;

pub(crate) mod arena;
pub(crate) mod common;
pub mod config;
pub mod error;
pub(crate) mod frame;
pub mod growth;
pub(crate) mod ring;
pub(crate) mod sync;
mod trace_macro;
