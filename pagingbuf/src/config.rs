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

use crate::error::ConfigError;
use crate::growth::GrowthPolicy;
use serde::Deserialize;
use std::path::Path;

/// Ring settings, usually read from a TOML file:
///
/// ```toml
/// initial_capacity = 65536
///
/// [growth]
/// min_capacity = 2048
/// cutoff_capacity = 131072
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingConfig {
    /// Arena bytes allocated up front. Zero defers allocation to the first write.
    pub initial_capacity: usize,
    pub growth: GrowthPolicy,
}

impl RingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RingConfig = toml::from_str(content)?;
        config.growth.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{DEFAULT_CUTOFF_CAPACITY, DEFAULT_MIN_CAPACITY};
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RingConfig::from_toml_str("").unwrap();
        assert_eq!(config, RingConfig::default());
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.growth.min_capacity, DEFAULT_MIN_CAPACITY);
        assert_eq!(config.growth.cutoff_capacity, DEFAULT_CUTOFF_CAPACITY);
    }

    #[test]
    fn test_partial_growth_table() {
        let config = RingConfig::from_toml_str(
            r#"
initial_capacity = 4096

[growth]
min_capacity = 512
"#,
        )
        .unwrap();
        assert_eq!(config.initial_capacity, 4096);
        assert_eq!(config.growth.min_capacity, 512);
        assert_eq!(config.growth.cutoff_capacity, DEFAULT_CUTOFF_CAPACITY);
    }

    #[test]
    fn test_rejects_invalid_policy() {
        let err = RingConfig::from_toml_str(
            r#"
[growth]
min_capacity = 8192
cutoff_capacity = 1024
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGrowthPolicy(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = RingConfig::from_toml_str("buffer_size = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_capacity = 1024").unwrap();
        let config = RingConfig::load(file.path()).unwrap();
        assert_eq!(config.initial_capacity, 1024);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RingConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
