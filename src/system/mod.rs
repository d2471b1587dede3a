//! # Hardware Capability Probing
//!
//! Everything the primitive library needs to know about the machine it runs
//! on: the [`CapabilityDescriptor`] and the parsers that build it from the
//! kernel's textual hardware description.

pub mod cpu_features;
pub mod isa;

pub use cpu_features::{detect, CapabilityDescriptor, MAX_RVV_VLEN_BITS};
pub use isa::{CpuinfoFormat, IsaFeatures};
