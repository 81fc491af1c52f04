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

//! Arena growth policy.

use crate::error::ConfigError;
use serde::Deserialize;

/// Capacity of the first arena allocated by a ring created without storage.
pub const DEFAULT_MIN_CAPACITY: usize = 2048;

/// Below this capacity the arena doubles, at or above it the arena grows by a quarter.
pub const DEFAULT_CUTOFF_CAPACITY: usize = 128 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthPolicy {
    pub min_capacity: usize,
    pub cutoff_capacity: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy {
            min_capacity: DEFAULT_MIN_CAPACITY,
            cutoff_capacity: DEFAULT_CUTOFF_CAPACITY,
        }
    }
}

impl GrowthPolicy {
    /// Every growth step must strictly increase the capacity, `5 * c / 4 > c` needs `c >= 4`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_capacity < 4 {
            return Err(ConfigError::InvalidGrowthPolicy(format!(
                "min_capacity must be at least 4, got {}",
                self.min_capacity
            )));
        }
        if self.cutoff_capacity < self.min_capacity {
            return Err(ConfigError::InvalidGrowthPolicy(format!(
                "cutoff_capacity {} is below min_capacity {}",
                self.cutoff_capacity, self.min_capacity
            )));
        }
        Ok(())
    }

    /// Capacity of the arena that replaces one of `current` bytes. Always larger than
    /// `current`, even for a policy that fails [`GrowthPolicy::validate`].
    pub fn next_capacity(&self, current: usize) -> usize {
        let grown = if current < self.cutoff_capacity {
            current.saturating_mul(2)
        } else {
            current.saturating_add(current / 4)
        };
        grown.max(self.min_capacity).max(current.saturating_add(1))
    }
}
