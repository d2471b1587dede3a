//! # Capability Detection
//!
//! Determines which accelerated code paths may run on this machine.
//!
//! Detection has two stages:
//!
//! 1. **Compile time** ([`CapabilityDescriptor::compiled`]): which feature
//!    groups have code in this build at all. Only `x86_64`, `aarch64` and
//!    `riscv64` with the `simd` cargo feature declare any group.
//! 2. **Runtime**: which of the compiled groups the running CPU and OS
//!    actually expose. x86_64 asks `cpuid` and, when the configured cpuinfo
//!    file is readable, also intersects with its `flags` line; aarch64 and
//!    riscv64 parse the kernel's `/proc/cpuinfo` alone.
//!
//! The result is the intersection of both stages. Any failure to read or
//! parse the hardware description makes the affected features absent; it is
//! logged and never reported as an error.
//!
//! [`detect`] caches the descriptor for the process lifetime.

use crate::config::{Config, DispatchConfig};
use crate::error::Result;
use crate::system::isa::{CpuinfoFormat, IsaFeatures};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Largest vector register the RVV specification allows (VLEN, in bits).
pub const MAX_RVV_VLEN_BITS: u32 = 65536;

/// Capability flags of the running hardware.
///
/// Computed once per process by [`detect`]; every field only ever describes
/// features that have code in this build *and* are present at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilityDescriptor {
    /// A vector/SIMD unit usable by the vector tier
    pub vector_unit: bool,
    /// Register width of the vector unit in bits; 0 without one
    pub vector_width_bits: u32,
    /// AES round instructions (encrypt and decrypt)
    pub crypto_rounds: bool,
    /// SHA-2 hash acceleration
    pub hash_extension: bool,
    /// Bit-manipulation instructions used by the hardware-scalar tier
    pub bit_manip: bool,
}

impl CapabilityDescriptor {
    /// Descriptor with every capability absent.
    pub const fn scalar_only() -> Self {
        Self {
            vector_unit: false,
            vector_width_bits: 0,
            crypto_rounds: false,
            hash_extension: false,
            bit_manip: false,
        }
    }

    /// Feature groups that have code in this build.
    ///
    /// The width is the widest register any compiled kernel can use.
    pub const fn compiled() -> Self {
        if !cfg!(feature = "simd") {
            return Self::scalar_only();
        }

        if cfg!(target_arch = "x86_64") {
            Self {
                vector_unit: true,
                vector_width_bits: 256,
                crypto_rounds: true,
                hash_extension: true,
                bit_manip: true,
            }
        } else if cfg!(target_arch = "aarch64") {
            Self {
                vector_unit: true,
                vector_width_bits: 128,
                crypto_rounds: true,
                hash_extension: true,
                bit_manip: true,
            }
        } else if cfg!(target_arch = "riscv64") {
            Self {
                vector_unit: true,
                vector_width_bits: MAX_RVV_VLEN_BITS,
                crypto_rounds: true,
                hash_extension: true,
                bit_manip: true,
            }
        } else {
            Self::scalar_only()
        }
    }

    /// Capabilities present in both descriptors.
    pub fn intersect(&self, other: &Self) -> Self {
        let vector_unit = self.vector_unit && other.vector_unit;
        Self {
            vector_unit,
            vector_width_bits: if vector_unit {
                self.vector_width_bits.min(other.vector_width_bits)
            } else {
                0
            },
            crypto_rounds: self.crypto_rounds && other.crypto_rounds,
            hash_extension: self.hash_extension && other.hash_extension,
            bit_manip: self.bit_manip && other.bit_manip,
        }
    }

    /// Run detection with the default configuration, bypassing the cache.
    pub fn probe() -> Self {
        Self::probe_with_config(&DispatchConfig::default())
    }

    /// Run detection with an explicit configuration, bypassing the cache.
    ///
    /// Tiers disabled in `config` are cleared after probing.
    pub fn probe_with_config(config: &DispatchConfig) -> Self {
        let compiled = Self::compiled();
        if compiled == Self::scalar_only() {
            return compiled;
        }

        let mut descriptor = compiled.intersect(&runtime_probe(&config.cpuinfo_path));

        if !config.enable_vector {
            descriptor.vector_unit = false;
            descriptor.vector_width_bits = 0;
            descriptor.crypto_rounds = false;
            descriptor.hash_extension = false;
        }
        if !config.enable_hardware_scalar {
            descriptor.bit_manip = false;
        }
        descriptor
    }

    /// Whether any accelerated tier is usable.
    pub fn has_acceleration(&self) -> bool {
        self.vector_unit || self.bit_manip
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.vector_unit {
            parts.push(format!("vector({} bit)", self.vector_width_bits));
        }
        if self.crypto_rounds {
            parts.push("crypto".to_string());
        }
        if self.hash_extension {
            parts.push("hash".to_string());
        }
        if self.bit_manip {
            parts.push("bitmanip".to_string());
        }
        if parts.is_empty() {
            "scalar only".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Read and parse the textual hardware description at `path`.
pub fn read_cpuinfo(path: &Path) -> Result<IsaFeatures> {
    let text = std::fs::read_to_string(path)?;
    IsaFeatures::from_cpuinfo(&text, CpuinfoFormat::for_target())
}

/// Descriptor derived from a parsed RISC-V ISA string.
///
/// `vlen_bits` is only consulted when the `v` extension is present.
pub fn descriptor_from_riscv_isa(isa: &IsaFeatures, vlen_bits: impl FnOnce() -> u32) -> CapabilityDescriptor {
    let vector_unit = isa.has("v");
    let scalar_crypto = isa.has("zk") || isa.has("zkn");
    CapabilityDescriptor {
        vector_unit,
        vector_width_bits: if vector_unit { vlen_bits() } else { 0 },
        crypto_rounds: scalar_crypto || isa.has_all(&["zkne", "zknd"]),
        hash_extension: scalar_crypto || isa.has("zknh"),
        bit_manip: isa.has_all(&["zba", "zbb", "zbc"]),
    }
}

/// Descriptor derived from an aarch64 `Features` list.
pub fn descriptor_from_arm_features(features: &IsaFeatures) -> CapabilityDescriptor {
    let vector_unit = features.has("asimd");
    CapabilityDescriptor {
        vector_unit,
        vector_width_bits: if vector_unit { 128 } else { 0 },
        crypto_rounds: features.has_all(&["aes", "pmull"]),
        hash_extension: features.has_all(&["sha1", "sha2"]),
        // rbit, clz and cnt are part of the base A64 ISA
        bit_manip: true,
    }
}

/// Descriptor derived from an x86 `flags` list.
pub fn descriptor_from_x86_flags(flags: &IsaFeatures) -> CapabilityDescriptor {
    let vector_unit = flags.has_all(&["sse2", "ssse3"]);
    CapabilityDescriptor {
        vector_unit,
        vector_width_bits: match (vector_unit, flags.has("avx2")) {
            (false, _) => 0,
            (true, true) => 256,
            (true, false) => 128,
        },
        crypto_rounds: flags.has("aes"),
        hash_extension: flags.has("sha_ni"),
        bit_manip: flags.has_all(&["popcnt", "bmi1", "bmi2"]),
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn runtime_probe(cpuinfo: &Path) -> CapabilityDescriptor {
    let from_cpuid = cpuid_probe();
    match read_cpuinfo(cpuinfo) {
        Ok(flags) => from_cpuid.intersect(&descriptor_from_x86_flags(&flags)),
        Err(e) => {
            log::debug!("cpuinfo unavailable ({}), using cpuid alone", e);
            from_cpuid
        }
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
fn cpuid_probe() -> CapabilityDescriptor {
    let cpuid = raw_cpuid::CpuId::new();

    let (sse2, ssse3, aes, popcnt) = match cpuid.get_feature_info() {
        Some(info) => (info.has_sse2(), info.has_ssse3(), info.has_aesni(), info.has_popcnt()),
        None => (false, false, false, false),
    };
    let (avx2, bmi1, bmi2, sha) = match cpuid.get_extended_feature_info() {
        Some(ext) => (ext.has_avx2(), ext.has_bmi1(), ext.has_bmi2(), ext.has_sha()),
        None => (false, false, false, false),
    };
    // CPUID alone does not say whether the OS saves YMM state
    let avx2 = avx2 && std::arch::is_x86_feature_detected!("avx2");

    let vector_unit = sse2 && ssse3;
    CapabilityDescriptor {
        vector_unit,
        vector_width_bits: match (vector_unit, avx2) {
            (false, _) => 0,
            (true, true) => 256,
            (true, false) => 128,
        },
        crypto_rounds: aes,
        hash_extension: sha,
        bit_manip: popcnt && bmi1 && bmi2,
    }
}

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
fn runtime_probe(cpuinfo: &Path) -> CapabilityDescriptor {
    match read_cpuinfo(cpuinfo) {
        Ok(features) => descriptor_from_arm_features(&features),
        Err(e) => {
            log::debug!("cpuinfo unavailable ({}), treating optional features as absent", e);
            CapabilityDescriptor::scalar_only()
        }
    }
}

#[cfg(all(feature = "simd", target_arch = "riscv64"))]
fn runtime_probe(cpuinfo: &Path) -> CapabilityDescriptor {
    match read_cpuinfo(cpuinfo) {
        // SAFETY: vlenb is only read once the v extension is confirmed.
        Ok(isa) => descriptor_from_riscv_isa(&isa, || unsafe { crate::simd::riscv_vlen_bits() }),
        Err(e) => {
            log::debug!("cpuinfo unavailable ({}), treating optional features as absent", e);
            CapabilityDescriptor::scalar_only()
        }
    }
}

#[cfg(not(all(
    feature = "simd",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
fn runtime_probe(_cpuinfo: &Path) -> CapabilityDescriptor {
    CapabilityDescriptor::scalar_only()
}

static CAPABILITIES: OnceLock<CapabilityDescriptor> = OnceLock::new();

/// Capabilities of this process, detected on first call.
///
/// Honors `POWPRIM_DISPATCH_*` environment variables; an invalid
/// configuration falls back to the defaults.
pub fn detect() -> CapabilityDescriptor {
    *CAPABILITIES.get_or_init(|| {
        let config = DispatchConfig::from_env().unwrap_or_else(|e| {
            log::debug!("ignoring dispatch environment: {}", e);
            DispatchConfig::default()
        });
        let descriptor = CapabilityDescriptor::probe_with_config(&config);
        log::debug!("detected capabilities: {}", descriptor.summary());
        descriptor
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_idempotent() {
        let first = detect();
        for _ in 0..10 {
            assert_eq!(detect(), first);
        }
    }

    #[test]
    fn test_detected_within_compiled() {
        let detected = detect();
        assert_eq!(detected.intersect(&CapabilityDescriptor::compiled()), detected);
        if !detected.vector_unit {
            assert_eq!(detected.vector_width_bits, 0);
        }
    }

    #[test]
    fn test_scalar_only_config() {
        let descriptor = CapabilityDescriptor::probe_with_config(&DispatchConfig::scalar_only());
        assert_eq!(descriptor, CapabilityDescriptor::scalar_only());
        assert_eq!(descriptor.summary(), "scalar only");
    }

    #[test]
    fn test_intersect_width() {
        let wide = CapabilityDescriptor {
            vector_unit: true,
            vector_width_bits: 256,
            crypto_rounds: true,
            hash_extension: false,
            bit_manip: true,
        };
        let narrow = CapabilityDescriptor {
            vector_width_bits: 128,
            ..wide
        };
        assert_eq!(wide.intersect(&narrow).vector_width_bits, 128);
        assert_eq!(wide.intersect(&CapabilityDescriptor::scalar_only()).vector_width_bits, 0);
    }

    #[test]
    fn test_riscv_descriptor_mapping() {
        let isa = IsaFeatures::parse_riscv_isa("rv64imafdcv_zba_zbb_zbc_zkne_zknd_zknh").unwrap();
        let descriptor = descriptor_from_riscv_isa(&isa, || 256);
        assert!(descriptor.vector_unit);
        assert_eq!(descriptor.vector_width_bits, 256);
        assert!(descriptor.crypto_rounds);
        assert!(descriptor.hash_extension);
        assert!(descriptor.bit_manip);
    }

    #[test]
    fn test_riscv_partial_extensions() {
        // zkne without zknd is not enough; zbb without zbc is not enough
        let isa = IsaFeatures::parse_riscv_isa("rv64imafdc_zba_zbb_zkne").unwrap();
        let descriptor = descriptor_from_riscv_isa(&isa, || panic!("vlenb read without v"));
        assert_eq!(descriptor, CapabilityDescriptor::scalar_only());

        let isa = IsaFeatures::parse_riscv_isa("rv64gc_zkn").unwrap();
        let descriptor = descriptor_from_riscv_isa(&isa, || 0);
        assert!(descriptor.crypto_rounds);
        assert!(descriptor.hash_extension);
        assert!(!descriptor.vector_unit);
    }

    #[test]
    fn test_arm_descriptor_mapping() {
        let features = IsaFeatures::parse_flag_list("fp asimd evtstrm aes pmull sha1 sha2 crc32").unwrap();
        let descriptor = descriptor_from_arm_features(&features);
        assert!(descriptor.vector_unit);
        assert_eq!(descriptor.vector_width_bits, 128);
        assert!(descriptor.crypto_rounds);
        assert!(descriptor.hash_extension);
    }

    #[test]
    fn test_x86_flags_mapping() {
        let flags = IsaFeatures::parse_flag_list("fpu sse2 ssse3 popcnt bmi1 aes").unwrap();
        let descriptor = descriptor_from_x86_flags(&flags);
        assert!(descriptor.vector_unit);
        assert_eq!(descriptor.vector_width_bits, 128);
        assert!(descriptor.crypto_rounds);
        // bmi2 missing
        assert!(!descriptor.bit_manip);
    }

    #[test]
    fn test_missing_cpuinfo_is_an_error() {
        let err = read_cpuinfo(Path::new("/nonexistent/powprim/cpuinfo")).unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[test]
    fn test_crafted_cpuinfo_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpuinfo");
        let line = match CpuinfoFormat::for_target() {
            CpuinfoFormat::RiscvIsa => "isa\t\t: rv64imac\n",
            CpuinfoFormat::Features => "Features\t: fp asimd\n",
            CpuinfoFormat::Flags => "flags\t\t: fpu sse2\n",
        };
        std::fs::write(&path, line).unwrap();
        let features = read_cpuinfo(&path).unwrap();
        assert!(!features.is_empty());
    }

    #[test]
    fn test_cpuinfo_path_restricts_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpuinfo");
        // a flags line with nothing usable: no target can grant any tier
        std::fs::write(&path, "processor\t: 0\nflags\t\t: fpu\n").unwrap();

        let config = DispatchConfig {
            cpuinfo_path: path,
            ..DispatchConfig::default()
        };
        let descriptor = CapabilityDescriptor::probe_with_config(&config);
        assert_eq!(descriptor, CapabilityDescriptor::scalar_only());
        assert!(!descriptor.has_acceleration());
    }

    #[test]
    fn test_unreadable_cpuinfo_stays_within_compiled() {
        let config = DispatchConfig {
            cpuinfo_path: "/nonexistent/powprim/cpuinfo".into(),
            ..DispatchConfig::default()
        };
        let descriptor = CapabilityDescriptor::probe_with_config(&config);
        assert_eq!(descriptor.intersect(&CapabilityDescriptor::compiled()), descriptor);
        if !cfg!(target_arch = "x86_64") {
            // only x86_64 has a probe that does not need the file
            assert_eq!(descriptor, CapabilityDescriptor::scalar_only());
        }
    }

    #[test]
    fn test_has_acceleration() {
        assert!(!CapabilityDescriptor::scalar_only().has_acceleration());
        let bit_manip_only = CapabilityDescriptor {
            bit_manip: true,
            ..CapabilityDescriptor::scalar_only()
        };
        assert!(bit_manip_only.has_acceleration());
        assert_eq!(detect().has_acceleration(), detect().vector_unit || detect().bit_manip);
    }

    #[test]
    fn test_summary_lists_flags() {
        let descriptor = CapabilityDescriptor {
            vector_unit: true,
            vector_width_bits: 128,
            crypto_rounds: false,
            hash_extension: false,
            bit_manip: true,
        };
        assert_eq!(descriptor.summary(), "vector(128 bit), bitmanip");
        assert_eq!(descriptor.to_string(), descriptor.summary());
    }
}
