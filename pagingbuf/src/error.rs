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

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketRingError {
    #[error("packet too big: {0} bytes, the length header holds at most 65535")]
    PacketTooBig(usize),

    #[error("short buffer, at least {needed} bytes are needed")]
    ShortBuffer { needed: usize },
}

impl From<PacketRingError> for std::io::Error {
    fn from(err: PacketRingError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid growth policy: {0}")]
    InvalidGrowthPolicy(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
