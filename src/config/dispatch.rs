//! Dispatch configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{PowprimError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Controls which tiers capability detection may report as usable.
///
/// Disabling a tier here only ever lowers the result of hardware probing;
/// it cannot enable a feature the CPU lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Allow the vector tier (vector unit and crypto-round paths)
    pub enable_vector: bool,
    /// Allow the hardware-scalar tier (rotate, popcount, ctz, add.uw)
    pub enable_hardware_scalar: bool,
    /// Textual hardware description to parse at runtime.
    ///
    /// aarch64 and riscv64 rely on it alone. On x86_64 its `flags` line
    /// further restricts the `cpuid` result when the file is readable.
    pub cpuinfo_path: PathBuf,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enable_vector: true,
            enable_hardware_scalar: true,
            cpuinfo_path: PathBuf::from("/proc/cpuinfo"),
        }
    }
}

impl DispatchConfig {
    /// Configuration that forces every operation onto the pure-scalar tier.
    pub fn scalar_only() -> Self {
        Self {
            enable_vector: false,
            enable_hardware_scalar: false,
            ..Self::default()
        }
    }
}

impl Config for DispatchConfig {
    fn validate(&self) -> Result<()> {
        if self.cpuinfo_path.as_os_str().is_empty() {
            return Err(PowprimError::configuration("cpuinfo_path must not be empty"));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.enable_vector =
            parse_env_bool(&format!("{}DISPATCH_VECTOR", prefix), config.enable_vector);
        config.enable_hardware_scalar = parse_env_bool(
            &format!("{}DISPATCH_HW_SCALAR", prefix),
            config.enable_hardware_scalar,
        );
        config.cpuinfo_path = parse_env_var(
            &format!("{}DISPATCH_CPUINFO", prefix),
            config.cpuinfo_path.clone(),
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            enable_vector: true,
            enable_hardware_scalar: true,
            ..Self::default()
        }
    }

    /// Vector tier off: no wide register state for the OS to save on every
    /// context switch of a shared machine.
    fn memory_preset() -> Self {
        Self {
            enable_vector: false,
            ..Self::default()
        }
    }

    /// Pure scalar everywhere, so every machine runs the same instruction
    /// stream with the same timing profile.
    fn realtime_preset() -> Self {
        Self::scalar_only()
    }
}
