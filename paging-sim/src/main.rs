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

use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use pagingbuf::{PacketRing, RingConfig};
use paging_sim::SimParams;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "paging-sim")]
#[command(about = "buffer downlink packets for a paged UE and verify their delivery")]
struct Args {
    #[arg(short, long, help = "ring configuration file (toml format)")]
    config: Option<PathBuf>,

    #[arg(short, long, default_value_t = 2, help = "number of producer threads")]
    producers: usize,

    #[arg(
        short = 'n',
        long,
        default_value_t = 10_000,
        help = "packets sent by each producer"
    )]
    packets: u64,

    #[arg(short = 's', long, default_value_t = 1400, help = "packet size in bytes")]
    packet_size: usize,

    #[arg(
        short,
        long,
        default_value_t = 50_000,
        help = "packets per second per producer"
    )]
    rate: u32,

    #[arg(
        short = 'd',
        long,
        default_value = "50ms",
        value_parser = humantime::parse_duration,
        help = "time until the UE answers paging (e.g. 50ms, 2s)"
    )]
    paging_delay: Duration,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match &args.config {
        Some(path) => RingConfig::load(path)
            .wrap_err_with(|| format!("failed to load config path={}", path.display()))?,
        None => RingConfig::default(),
    };
    debug!(?args, ?config, "paging-sim configuration");

    let params = SimParams {
        producers: args.producers,
        packets_per_producer: args.packets,
        packet_size: args.packet_size,
        rate: NonZeroU32::new(args.rate).ok_or_else(|| eyre!("rate must be positive"))?,
        paging_delay: args.paging_delay,
    };

    let ring = PacketRing::from_config(&config).wrap_err("invalid ring configuration")?;
    let ring = Arc::new(ring);
    info!(
        producers = params.producers,
        packets = params.total_packets(),
        packet_size = params.packet_size,
        paging_delay = ?params.paging_delay,
        "starting paging simulation"
    );

    let report = paging_sim::run(ring, &params)?;

    info!(
        packets = report.packets,
        bytes = report.bytes,
        backlog = report.backlog,
        paging_size = report.paging_size,
        final_capacity = report.final_capacity,
        elapsed = ?report.elapsed,
        "all buffered downlink delivered"
    );
    Ok(())
}
