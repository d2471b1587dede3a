//! Memory-ordering fences
//!
//! Six barrier strengths plus a spin-wait hint. On riscv64 each barrier is
//! the exact `fence` encoding for its scope; elsewhere it maps to the weakest
//! `std::sync::atomic::fence` ordering that covers the scope.
//!
//! | Barrier | riscv64 | Other targets |
//! |---|---|---|
//! | full | `fence rw,rw` | `SeqCst` |
//! | load | `fence r,r` | `Acquire` |
//! | store | `fence w,w` | `Release` |
//! | tso | `fence rw,w` | `Release` |
//! | acquire | `fence r,rw` | `Acquire` |
//! | release | `fence rw,w` | `Release` |
//!
//! A load barrier orders loads against loads only; it says nothing about
//! earlier stores.

/// Barrier strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierKind {
    /// Orders all prior accesses before all later accesses
    Full,
    /// Orders prior loads before later loads
    Load,
    /// Orders prior stores before later stores
    Store,
    /// Orders prior accesses before later stores (x86-TSO strength)
    Tso,
    /// Orders prior loads before all later accesses
    Acquire,
    /// Orders all prior accesses before later stores
    Release,
}

impl BarrierKind {
    /// Every barrier kind.
    pub const ALL: [BarrierKind; 6] = [
        BarrierKind::Full,
        BarrierKind::Load,
        BarrierKind::Store,
        BarrierKind::Tso,
        BarrierKind::Acquire,
        BarrierKind::Release,
    ];
}

/// Emit the barrier for `kind`.
#[inline(always)]
pub fn barrier(kind: BarrierKind) {
    match kind {
        BarrierKind::Full => full_barrier(),
        BarrierKind::Load => load_barrier(),
        BarrierKind::Store => store_barrier(),
        BarrierKind::Tso => tso_barrier(),
        BarrierKind::Acquire => acquire_barrier(),
        BarrierKind::Release => release_barrier(),
    }
}

#[cfg(target_arch = "riscv64")]
macro_rules! riscv_fence {
    ($insn:literal) => {
        // SAFETY: a fence has no operands and cannot fault.
        unsafe { core::arch::asm!($insn, options(nostack, preserves_flags)) }
    };
}

/// Full read/write barrier.
#[inline(always)]
pub fn full_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence rw, rw");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
}

/// Load-load barrier.
#[inline(always)]
pub fn load_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence r, r");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Acquire);
}

/// Store-store barrier.
#[inline(always)]
pub fn store_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence w, w");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Release);
}

/// Total-store-order barrier: prior accesses before later stores.
#[inline(always)]
pub fn tso_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence rw, w");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Release);
}

/// Acquire barrier: prior loads before all later accesses.
#[inline(always)]
pub fn acquire_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence r, rw");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Acquire);
}

/// Release barrier: all prior accesses before later stores.
#[inline(always)]
pub fn release_barrier() {
    #[cfg(target_arch = "riscv64")]
    riscv_fence!("fence rw, w");
    #[cfg(not(target_arch = "riscv64"))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Release);
}

/// Spin-wait hint. Has no ordering effect.
#[inline(always)]
pub fn cpu_pause() {
    #[cfg(target_arch = "riscv64")]
    // SAFETY: pause is a fence-encoded hint (Zihintpause) and a no-op where absent.
    unsafe {
        core::arch::asm!(
            ".option push",
            ".option arch, +zihintpause",
            "pause",
            ".option pop",
            options(nomem, nostack, preserves_flags)
        )
    };
    #[cfg(not(target_arch = "riscv64"))]
    std::hint::spin_loop();
}
