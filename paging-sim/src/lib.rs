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

//! Downlink paging simulation on top of [`PacketRing`].
//!
//! Producer threads play the core network: they keep sending rate-limited downlink
//! packets for a UE. The UE is idle, so nothing is delivered until paging succeeds after
//! `paging_delay`; meanwhile packets pile up in the ring. The consumer then drains the
//! ring like a packet I/O driver would and checks that no packet was lost or reordered.

use eyre::{ensure, eyre, Result, WrapErr};
use governor::{Quota, RateLimiter};
use pagingbuf::{PacketRing, MAX_PACKET_SIZE};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Producer id and sequence number at the front of every simulated packet.
pub const STAMP_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct SimParams {
    pub producers: usize,
    pub packets_per_producer: u64,
    pub packet_size: usize,
    pub rate: NonZeroU32,
    pub paging_delay: Duration,
}

impl SimParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.producers > 0, "at least one producer is required");
        ensure!(
            (STAMP_SIZE..=MAX_PACKET_SIZE).contains(&self.packet_size),
            "packet size must be between {} and {} bytes, got {}",
            STAMP_SIZE,
            MAX_PACKET_SIZE,
            self.packet_size
        );
        Ok(())
    }

    pub fn total_packets(&self) -> u64 {
        self.producers as u64 * self.packets_per_producer
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub packets: u64,
    pub bytes: u64,
    /// Packets waiting in the ring when the UE became reachable.
    pub backlog: usize,
    /// Ring bytes, headers included, when the UE became reachable.
    pub paging_size: usize,
    pub final_capacity: usize,
    pub elapsed: Duration,
}

pub fn stamp(producer_id: u64, sequence: u64, packet_size: usize) -> Vec<u8> {
    let mut packet = Vec::with_capacity(packet_size.max(STAMP_SIZE));
    packet.extend_from_slice(&producer_id.to_le_bytes());
    packet.extend_from_slice(&sequence.to_le_bytes());
    packet.resize(packet_size.max(STAMP_SIZE), b'd');
    packet
}

pub fn parse_stamp(packet: &[u8]) -> Option<(u64, u64)> {
    let producer_id = u64::from_le_bytes(packet.get(..8)?.try_into().ok()?);
    let sequence = u64::from_le_bytes(packet.get(8..STAMP_SIZE)?.try_into().ok()?);
    Some((producer_id, sequence))
}

/// Tracks the next expected sequence number of every producer.
#[derive(Debug)]
pub struct OrderCheck {
    next: Vec<u64>,
}

impl OrderCheck {
    pub fn new(producers: usize) -> Self {
        OrderCheck {
            next: vec![0; producers],
        }
    }

    pub fn observe(&mut self, packet: &[u8]) -> Result<()> {
        let (producer_id, sequence) = parse_stamp(packet)
            .ok_or_else(|| eyre!("packet of {} bytes has no stamp", packet.len()))?;
        let expected = self
            .next
            .get_mut(producer_id as usize)
            .ok_or_else(|| eyre!("unknown producer {}", producer_id))?;
        ensure!(
            sequence == *expected,
            "producer {} out of order: expected sequence {}, got {}",
            producer_id,
            *expected,
            sequence
        );
        *expected += 1;
        Ok(())
    }

    pub fn is_complete(&self, packets_per_producer: u64) -> bool {
        self.next.iter().all(|&n| n == packets_per_producer)
    }
}

fn produce(ring: &PacketRing, producer_id: u64, params: &SimParams) -> Result<()> {
    let limiter = RateLimiter::direct(Quota::per_second(params.rate));

    for sequence in 0..params.packets_per_producer {
        while limiter.check().is_err() {
            thread::sleep(Duration::from_micros(50));
        }
        let packet = stamp(producer_id, sequence, params.packet_size);
        ring.write(&packet).wrap_err_with(|| {
            format!(
                "producer {} failed to queue packet {}",
                producer_id, sequence
            )
        })?;
    }

    debug!(producer_id = producer_id, "producer finished");
    Ok(())
}

/// Runs producers against `ring`, pages the UE after the configured delay and drains
/// everything that was queued.
pub fn run(ring: Arc<PacketRing>, params: &SimParams) -> Result<Report> {
    params.validate()?;
    let start = Instant::now();

    let handles: Vec<_> = (0..params.producers)
        .map(|producer_id| {
            let ring = ring.clone();
            let params = params.clone();
            thread::spawn(move || produce(&ring, producer_id as u64, &params))
        })
        .collect();

    thread::sleep(params.paging_delay);

    let mut report = Report {
        backlog: ring.count(),
        paging_size: ring.size(),
        ..Report::default()
    };
    info!(
        backlog = report.backlog,
        size = report.paging_size,
        capacity = ring.capacity(),
        "UE reachable, draining buffered downlink"
    );

    let mut check = OrderCheck::new(params.producers);
    let mut buf = vec![0u8; MAX_PACKET_SIZE];
    loop {
        let n = ring.read(&mut buf)?;
        if n == 0 {
            if handles.iter().all(|handle| handle.is_finished()) && ring.is_empty() {
                break;
            }
            thread::yield_now();
            continue;
        }

        check.observe(&buf[..n])?;
        report.packets += 1;
        report.bytes += n as u64;
    }

    for (producer_id, handle) in handles.into_iter().enumerate() {
        handle
            .join()
            .map_err(|_| eyre!("producer {} panicked", producer_id))??;
    }

    ensure!(
        check.is_complete(params.packets_per_producer),
        "lost packets: received {} of {}",
        report.packets,
        params.total_packets()
    );

    report.final_capacity = ring.capacity();
    report.elapsed = start.elapsed();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    fn params() -> SimParams {
        SimParams {
            producers: 2,
            packets_per_producer: 500,
            packet_size: 64,
            rate: NonZeroU32::new(1_000_000).unwrap(),
            paging_delay: Duration::from_millis(10),
        }
    }

    #[rstest]
    #[case(0, 0, 16)]
    #[case(3, 42, 1400)]
    #[case(u64::MAX, u64::MAX, MAX_PACKET_SIZE)]
    fn test_stamp_roundtrip(
        #[case] producer_id: u64,
        #[case] sequence: u64,
        #[case] size: usize,
    ) {
        let packet = stamp(producer_id, sequence, size);
        assert_eq!(packet.len(), size);
        assert_eq!(parse_stamp(&packet), Some((producer_id, sequence)));
    }

    #[test]
    fn test_parse_stamp_rejects_short_packet() {
        assert_eq!(parse_stamp(&[0u8; 15]), None);
    }

    #[test]
    fn test_order_check() {
        let mut check = OrderCheck::new(2);
        check.observe(&stamp(0, 0, 16)).unwrap();
        check.observe(&stamp(1, 0, 16)).unwrap();
        check.observe(&stamp(0, 1, 16)).unwrap();
        assert!(check.observe(&stamp(1, 2, 16)).is_err());
        assert!(check.observe(&stamp(5, 0, 16)).is_err());
        assert!(!check.is_complete(2));
        check.observe(&stamp(1, 1, 16)).unwrap();
        assert!(check.is_complete(2));
    }

    #[rstest]
    #[case::no_producers(SimParams { producers: 0, ..params() })]
    #[case::tiny_packets(SimParams { packet_size: 8, ..params() })]
    #[case::oversized_packets(SimParams { packet_size: MAX_PACKET_SIZE + 1, ..params() })]
    fn test_invalid_params(#[case] invalid: SimParams) {
        assert!(invalid.validate().is_err());
    }

    #[rstest]
    fn test_report_captures_ring_at_paging_time(params: SimParams) -> Result<()> {
        // producers finish long before the UE answers, so everything is buffered
        let params = SimParams {
            paging_delay: Duration::from_millis(300),
            ..params
        };
        let report = run(Arc::new(PacketRing::new()), &params)?;

        assert_eq!(report.backlog as u64, params.total_packets());
        assert_eq!(
            report.paging_size as u64,
            params.total_packets() * (params.packet_size as u64 + 2)
        );
        Ok(())
    }

    #[rstest]
    fn test_run_delivers_everything(params: SimParams) -> Result<()> {
        let ring = Arc::new(PacketRing::new());
        let report = run(ring.clone(), &params)?;

        assert_eq!(report.packets, params.total_packets());
        assert_eq!(report.bytes, params.total_packets() * params.packet_size as u64);
        assert!(report.final_capacity >= 2048);
        assert!(ring.is_empty());
        Ok(())
    }
}
