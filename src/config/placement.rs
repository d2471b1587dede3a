//! Thread placement configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{PowprimError, Result};
use serde::{Deserialize, Serialize};

/// Policy knobs for the init-thread advisor.
///
/// When `reduced_contention` is set, dataset initialization is advised to use
/// `init_numerator / init_denominator` of the available hardware threads,
/// leaving the rest to the OS and other work. The default fraction is 3/4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Scale the init thread count down instead of using every thread
    pub reduced_contention: bool,
    /// Numerator of the fraction of threads to use
    pub init_numerator: u32,
    /// Denominator of the fraction of threads to use
    pub init_denominator: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            reduced_contention: cfg!(target_arch = "riscv64"),
            init_numerator: 3,
            init_denominator: 4,
        }
    }
}

impl Config for PlacementConfig {
    fn validate(&self) -> Result<()> {
        if self.init_denominator == 0 {
            return Err(PowprimError::configuration(
                "init_denominator must be greater than zero",
            ));
        }
        if self.init_numerator > self.init_denominator {
            return Err(PowprimError::configuration(format!(
                "init fraction {}/{} exceeds 1",
                self.init_numerator, self.init_denominator
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.reduced_contention = parse_env_bool(
            &format!("{}PLACEMENT_REDUCED_CONTENTION", prefix),
            config.reduced_contention,
        );
        config.init_numerator = parse_env_var(
            &format!("{}PLACEMENT_INIT_NUMERATOR", prefix),
            config.init_numerator,
        );
        config.init_denominator = parse_env_var(
            &format!("{}PLACEMENT_INIT_DENOMINATOR", prefix),
            config.init_denominator,
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            reduced_contention: false,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            reduced_contention: true,
            init_numerator: 1,
            init_denominator: 2,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            reduced_contention: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fraction() {
        let config = PlacementConfig::default();
        assert_eq!((config.init_numerator, config.init_denominator), (3, 4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_fractions() {
        let zero = PlacementConfig {
            init_denominator: 0,
            ..PlacementConfig::default()
        };
        assert!(zero.validate().is_err());

        let above_one = PlacementConfig {
            init_numerator: 5,
            init_denominator: 4,
            ..PlacementConfig::default()
        };
        assert!(above_one.validate().is_err());
    }

    #[test]
    fn test_presets_validate() {
        assert!(PlacementConfig::performance_preset().validate().is_ok());
        assert!(PlacementConfig::memory_preset().validate().is_ok());
        assert!(PlacementConfig::realtime_preset().validate().is_ok());
        assert!(PlacementConfig::balanced_preset().validate().is_ok());
    }

    #[test]
    fn test_from_env_rejects_bad_fraction() {
        std::env::set_var("PLACETEST_PLACEMENT_INIT_DENOMINATOR", "0");
        assert!(PlacementConfig::from_env_with_prefix("PLACETEST_").is_err());
        std::env::remove_var("PLACETEST_PLACEMENT_INIT_DENOMINATOR");
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placement.json");
        let config = PlacementConfig::memory_preset();
        config.save_to_file(&path).unwrap();
        assert_eq!(PlacementConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = PlacementConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
