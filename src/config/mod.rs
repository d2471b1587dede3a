//! Configuration APIs for powprim
//!
//! Two knobs sets are exposed: [`DispatchConfig`] controls which
//! implementation tiers capability detection may hand to the primitive
//! library, and [`PlacementConfig`] controls the thread placement advisors.
//!
//! # Environment Initialization
//!
//! ```rust
//! use powprim::config::{Config, DispatchConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads POWPRIM_DISPATCH_* variables, falling back to defaults
//! let config = DispatchConfig::from_env()?;
//! assert!(config.validate().is_ok());
//! # Ok(())
//! # }
//! ```
//!
//! # Presets
//!
//! ```rust
//! use powprim::config::{Config, PlacementConfig};
//!
//! let config = PlacementConfig::performance_preset();
//! assert!(!config.reduced_contention);
//! ```

use crate::error::{PowprimError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::env;
use std::fmt;
use std::path::Path;

pub mod dispatch;
pub mod placement;

pub use dispatch::DispatchConfig;
pub use placement::PlacementConfig;

/// Default prefix for environment variables.
pub const ENV_PREFIX: &str = "POWPRIM_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Environment variables use the format `POWPRIM_{COMPONENT}_{FIELD}`,
    /// e.g. `POWPRIM_DISPATCH_VECTOR=0` disables the vector tier.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset tuned for maximum throughput.
    fn performance_preset() -> Self;

    /// Preset tuned for a small footprint on shared machines.
    fn memory_preset() -> Self;

    /// Preset tuned for predictable latency.
    fn realtime_preset() -> Self;

    /// Balanced preset; the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| PowprimError::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load configuration from a JSON file and validate it.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PowprimError::configuration(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparsable.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true and
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.trim().to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_var_fallback() {
        let value: u32 = parse_env_var("POWPRIM_TEST_SURELY_UNSET_VAR", 17);
        assert_eq!(value, 17);
    }

    #[test]
    fn test_parse_env_bool_values() {
        env::set_var("POWPRIM_TEST_BOOL_YES", "Yes");
        env::set_var("POWPRIM_TEST_BOOL_ZERO", "0");
        assert!(parse_env_bool("POWPRIM_TEST_BOOL_YES", false));
        assert!(!parse_env_bool("POWPRIM_TEST_BOOL_ZERO", true));
        assert!(parse_env_bool("POWPRIM_TEST_BOOL_UNSET", true));
        env::remove_var("POWPRIM_TEST_BOOL_YES");
        env::remove_var("POWPRIM_TEST_BOOL_ZERO");
    }

    #[test]
    fn test_parse_env_var_garbage() {
        env::set_var("POWPRIM_TEST_GARBAGE_NUM", "three");
        let value: u32 = parse_env_var("POWPRIM_TEST_GARBAGE_NUM", 3);
        assert_eq!(value, 3);
        env::remove_var("POWPRIM_TEST_GARBAGE_NUM");
    }
}
