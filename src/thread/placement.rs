//! Thread placement advice
//!
//! Advisory helpers for the dataset-initialization and mining thread pools:
//! how many threads to start for initialization, and which core a worker
//! should prefer. Nothing here spawns threads or is required for
//! correctness.

use crate::config::{Config, PlacementConfig};
use crate::error::{PowprimError, Result};

/// Configured placement advisor.
///
/// # Examples
///
/// ```rust
/// use powprim::config::PlacementConfig;
/// use powprim::thread::ThreadPlacement;
///
/// let placement = ThreadPlacement::new(PlacementConfig {
///     reduced_contention: true,
///     ..PlacementConfig::default()
/// })?;
/// assert_eq!(placement.recommended_init_thread_count(8), 6);
/// assert_eq!(placement.recommended_init_thread_count(1), 1);
/// # Ok::<(), powprim::error::PowprimError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThreadPlacement {
    config: PlacementConfig,
}

impl ThreadPlacement {
    /// Create an advisor; fails if the configuration is invalid.
    pub fn new(config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Advisor configured from `POWPRIM_PLACEMENT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(PlacementConfig::from_env()?)
    }

    /// Active configuration.
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Threads to use for dataset initialization given `available` hardware
    /// threads.
    ///
    /// With reduced contention this is `available * numerator / denominator`
    /// rounded down but never below 1; otherwise `available` unchanged.
    pub fn recommended_init_thread_count(&self, available: usize) -> usize {
        if !self.config.reduced_contention {
            return available;
        }
        let scaled = available as u128 * self.config.init_numerator as u128
            / self.config.init_denominator as u128;
        (scaled as usize).max(1)
    }

    /// Preferred core for worker `thread_id`, round-robin over online cores.
    pub fn core_for_thread(&self, thread_id: usize) -> usize {
        thread_id % online_processor_count()
    }
}

/// [`ThreadPlacement::recommended_init_thread_count`] with the default
/// configuration.
pub fn recommended_init_thread_count(available: usize) -> usize {
    ThreadPlacement::default().recommended_init_thread_count(available)
}

/// [`ThreadPlacement::core_for_thread`] with the default configuration.
pub fn core_for_thread(thread_id: usize) -> usize {
    ThreadPlacement::default().core_for_thread(thread_id)
}

/// Number of online processors; at least 1.
pub fn online_processor_count() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no memory-safety preconditions.
        let online = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if online > 0 {
            return online as usize;
        }
    }

    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Ask the OS to run the calling thread on `core` only.
///
/// Advisory: callers are expected to log and continue on error.
#[cfg(target_os = "linux")]
pub fn apply_affinity_hint(core: usize) -> Result<()> {
    let max_cpus = 8 * std::mem::size_of::<libc::cpu_set_t>();
    if core >= max_cpus {
        return Err(PowprimError::affinity(
            core,
            format!("core index exceeds cpu_set_t capacity of {}", max_cpus),
        ));
    }

    // SAFETY: cpu_set_t is a plain bitmask for which all-zero is valid, and
    // core was bounds-checked against its capacity.
    let rc = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };

    if rc != 0 {
        let err = std::io::Error::last_os_error();
        log::debug!("affinity hint for core {} rejected: {}", core, err);
        return Err(PowprimError::affinity(core, err.to_string()));
    }
    Ok(())
}

/// Ask the OS to run the calling thread on `core` only.
///
/// Core affinity is only implemented on Linux.
#[cfg(not(target_os = "linux"))]
pub fn apply_affinity_hint(core: usize) -> Result<()> {
    let _ = core;
    Err(PowprimError::not_supported("core affinity hints"))
}
