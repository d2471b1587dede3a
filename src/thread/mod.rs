//! Threading and synchronization utilities
//!
//! This module provides the concurrency building blocks of the hot path:
//! - Memory-ordering fences with exact per-architecture strengths
//! - An atomic 64-bit cell with a fixed acquire/release/SeqCst protocol
//! - Thread placement advice for dataset initialization and mining workers

pub mod atomic_cell;
pub mod fence;
pub mod placement;

pub use atomic_cell::AtomicCell;
pub use fence::{
    acquire_barrier, barrier, cpu_pause, full_barrier, load_barrier, release_barrier,
    store_barrier, tso_barrier, BarrierKind,
};
pub use placement::{
    apply_affinity_hint, core_for_thread, online_processor_count, recommended_init_thread_count,
    ThreadPlacement,
};
