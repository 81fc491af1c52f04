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

#![cfg(not(feature = "loom"))]

use pagingbuf::{PacketRing, PacketRingError, RingConfig, MAX_PACKET_SIZE};
use rstest::{fixture, rstest};
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread;

#[fixture]
fn ring() -> PacketRing {
    PacketRing::new()
}

/// Mixed sizes, with zero-length packets at the front and every 40 packets after.
fn packets() -> Vec<Vec<u8>> {
    (0..200u32)
        .map(|i| {
            let len = if i % 40 == 20 { 0 } else { (i * 37 % 1500) as usize };
            (0..len).map(|j| (i as usize + j) as u8).collect()
        })
        .collect()
}

#[rstest]
fn test_io_write_queues_one_packet_per_call(ring: PacketRing) -> io::Result<()> {
    let mut writer = &ring;
    writer.write_all(b"first")?;
    writer.write_all(b"second")?;
    writer.flush()?;

    assert_eq!(ring.count(), 2);
    assert_eq!(ring.read_packet().as_deref(), Some(&b"first"[..]));
    assert_eq!(ring.read_packet().as_deref(), Some(&b"second"[..]));
    Ok(())
}

#[rstest]
fn test_io_errors_map_to_invalid_input(ring: PacketRing) {
    let mut writer = &ring;
    let err = writer.write_all(&vec![0u8; MAX_PACKET_SIZE + 1]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(ring.is_empty());

    ring.write(&[1; 32]).unwrap();
    let mut reader = &ring;
    let mut small = [0u8; 8];
    let err = reader.read_exact(&mut small).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    let inner = err
        .into_inner()
        .and_then(|e| e.downcast::<PacketRingError>().ok())
        .map(|e| *e);
    assert_eq!(inner, Some(PacketRingError::ShortBuffer { needed: 32 }));
    assert_eq!(ring.count(), 1);
}

#[rstest]
fn test_io_copy_between_rings(ring: PacketRing) -> io::Result<()> {
    let sent = packets();
    for packet in &sent {
        ring.write(packet).unwrap();
    }

    let forwarded = PacketRing::new();
    let copied = io::copy(&mut &ring, &mut &forwarded)?;

    // zero-length packets add nothing to the byte stream and are not forwarded
    let non_empty: Vec<&Vec<u8>> = sent.iter().filter(|p| !p.is_empty()).collect();
    assert!(non_empty.len() < sent.len());
    assert_eq!(copied as usize, sent.iter().map(Vec::len).sum::<usize>());
    assert!(ring.is_empty());
    assert_eq!(forwarded.count(), non_empty.len());
    for packet in non_empty {
        assert_eq!(forwarded.read_packet().as_ref(), Some(packet));
    }
    Ok(())
}

#[rstest]
fn test_io_read_skips_zero_length_packets(ring: PacketRing) -> io::Result<()> {
    ring.write(b"abc").unwrap();
    ring.write(&[]).unwrap();
    ring.write(&[]).unwrap();
    ring.write(b"def").unwrap();
    ring.write(&[]).unwrap();

    let forwarded = PacketRing::new();
    let copied = io::copy(&mut &ring, &mut &forwarded)?;

    assert_eq!(copied, 6);
    assert_eq!(ring.count(), 0);
    assert!(ring.is_empty());
    assert_eq!(forwarded.read_packet().as_deref(), Some(&b"abc"[..]));
    assert_eq!(forwarded.read_packet().as_deref(), Some(&b"def"[..]));
    assert_eq!(forwarded.read_packet(), None);
    Ok(())
}

#[rstest]
fn test_io_read_of_only_empty_packets_is_end_of_stream(ring: PacketRing) -> io::Result<()> {
    ring.write(&[]).unwrap();
    ring.write(&[]).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(Read::read(&mut &ring, &mut buf)?, 0);
    assert!(ring.is_empty());
    Ok(())
}

#[rstest]
fn test_size_matches_framing(ring: PacketRing) {
    let sent = packets();
    for packet in &sent {
        ring.write(packet).unwrap();
    }
    let payload: usize = sent.iter().map(Vec::len).sum();
    assert_eq!(ring.payload_size(), payload);
    assert_eq!(ring.size(), payload + 2 * sent.len());
    assert!(ring.capacity() > ring.size());
}

#[test]
fn test_ring_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ring.toml");
    std::fs::write(
        &path,
        r#"
initial_capacity = 4096

[growth]
min_capacity = 1024
cutoff_capacity = 8192
"#,
    )
    .unwrap();

    let config = RingConfig::load(&path).unwrap();
    let ring = PacketRing::from_config(&config).unwrap();
    assert_eq!(ring.capacity(), 4096);

    ring.write(&[0u8; 5000]).unwrap();
    assert_eq!(ring.capacity(), 8192);
    ring.write(&[0u8; 5000]).unwrap();
    assert_eq!(ring.capacity(), 10240);
    ring.write(&[0u8; 1000]).unwrap();
    assert_eq!(ring.capacity(), 12800);
}

#[test]
fn test_producers_and_consumers_share_ring() {
    let ring = Arc::new(PacketRing::new());
    let producers = 3u8;
    let per_producer = 2000usize;

    let producer_handles: Vec<_> = (0..producers)
        .map(|id| {
            let ring = ring.clone();
            thread::spawn(move || {
                for seq in 0..per_producer {
                    let len = 1 + seq % 300;
                    ring.write(&vec![id; len]).unwrap();
                }
            })
        })
        .collect();

    let consumer_handles: Vec<_> = (0..2)
        .map(|_| {
            let ring = ring.clone();
            thread::spawn(move || {
                let mut received = Vec::new();
                let mut idle = 0;
                while idle < 1000 {
                    match ring.read_packet() {
                        Some(packet) => {
                            idle = 0;
                            assert!(packet.iter().all(|&b| b == packet[0]));
                            received.push(packet.len());
                        }
                        None => {
                            idle += 1;
                            thread::yield_now();
                        }
                    }
                }
                received
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().expect("producer panicked");
    }
    let mut received: Vec<usize> = consumer_handles
        .into_iter()
        .flat_map(|handle| handle.join().expect("consumer panicked"))
        .collect();
    while let Some(packet) = ring.read_packet() {
        received.push(packet.len());
    }

    assert_eq!(received.len(), producers as usize * per_producer);
    let total: usize = received.iter().sum();
    let expected: usize =
        (0..per_producer).map(|seq| 1 + seq % 300).sum::<usize>() * producers as usize;
    assert_eq!(total, expected);
    assert!(ring.is_empty());
}
