//! # powprim: Hardware-Aware Primitives for Proof-of-Work Hashing
//!
//! This crate provides the low-level building blocks of a proof-of-work hash
//! hot path, each dispatched once per process to the best implementation the
//! running hardware supports.
//!
//! ## Key Features
//!
//! - **Capability Detection**: Compile-time and runtime feature probing
//!   (`cpuid`, `/proc/cpuinfo` ISA strings), cached for the process lifetime
//! - **Three-Tier Dispatch**: Vector (SSE2/AVX2/AES-NI, NEON, RVV),
//!   hardware-scalar (POPCNT/BMI, A64, Zbb/Zba) and portable scalar kernels
//!   with bit-identical results
//! - **Variable-Width Vector Loops**: A chunk cursor that follows the width the
//!   vector unit grants, for fixed-width SIMD and length-agnostic RVV alike
//! - **Memory Ordering**: Exact-strength fences and an atomic cell with a fixed
//!   acquire/release protocol
//! - **Thread Placement**: Init-thread sizing and core affinity advice
//!
//! ## Quick Start
//!
//! ```rust
//! use powprim::{AtomicCell, Op, PrimitiveLibrary};
//!
//! powprim::init();
//!
//! let lib = PrimitiveLibrary::global();
//! println!("copy served by the {} tier", lib.tier(Op::Copy));
//!
//! // Bulk memory
//! let src = vec![0xA5u8; 4096];
//! let mut dst = vec![0u8; 4096];
//! lib.copy(&mut dst, &src);
//! assert_eq!(lib.compare(&dst, &src), 0);
//!
//! // Mixing
//! let mut state = [0u8; 16];
//! lib.byte_substitution(&mut state);
//! assert!(state.iter().all(|&b| b == 0x63));
//! // equal bytes cancel pairwise, leaving the round key
//! assert_eq!(lib.mixing_round(0, 0xDEAD_BEEF), 0xDEAD_BEEF);
//!
//! // Shared nonce counter
//! let nonce = AtomicCell::new(0);
//! assert_eq!(nonce.fetch_add(1), 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod memory;
pub mod simd;
pub mod system;
pub mod thread;

// Re-export core types
pub use config::{Config, DispatchConfig, PlacementConfig};
pub use error::{PowprimError, Result};
pub use memory::{prefetch_nta, prefetch_read, prefetch_write, PrefetchLocality, CACHE_LINE_SIZE};
pub use simd::{select, Op, PrimitiveLibrary, Tier, VectorChunkCursor};
pub use system::{detect, CapabilityDescriptor, IsaFeatures};
pub use thread::{AtomicCell, BarrierKind, ThreadPlacement};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check whether the `simd` feature was compiled in
pub const fn has_simd_support() -> bool {
    cfg!(feature = "simd")
}

/// Initialize the library
///
/// Runs capability detection and builds the global dispatch table up front,
/// so the first hot-path call does not pay for probing. Calling it is
/// optional and idempotent.
pub fn init() {
    log::debug!("Initializing powprim v{}", VERSION);
    let library = PrimitiveLibrary::global();
    log::debug!("powprim dispatch: {:?}", library);
}
