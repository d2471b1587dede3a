//! Tier selection and the dispatch table
//!
//! [`select`] maps an operation and a capability descriptor to the best tier
//! that both exists in this build and is allowed by the descriptor.
//! [`PrimitiveLibrary`] resolves every operation once at construction and
//! stores plain function pointers, so each call afterwards is a single
//! indirect call with no capability test.

use super::backend;
use super::scalar;
use crate::system::{detect, CapabilityDescriptor};
use std::cmp::Ordering;
use std::fmt;
use std::slice;
use std::sync::OnceLock;

/// Implementation tier serving an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Data-parallel kernels over the vector unit
    Vector,
    /// Single dedicated instructions (bit manipulation)
    HardwareScalar,
    /// Portable reference implementation
    PureScalar,
}

impl Tier {
    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Vector => "vector",
            Tier::HardwareScalar => "hardware-scalar",
            Tier::PureScalar => "scalar",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatchable primitive operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Bulk byte copy
    Copy,
    /// Fill with a 64-bit pattern
    Fill,
    /// Lexicographic byte compare
    Compare,
    /// In-place byte-wise XOR
    Xor,
    /// Rotate each 32-bit word left by 8
    RotateLeft8In32,
    /// S-box substitution of every byte
    ByteSubstitution,
    /// Population count
    Popcount,
    /// Trailing zero count
    CountTrailingZeros,
    /// Table-driven substitution-and-diffusion round
    MixingRound,
    /// Sum of zero-extended low words
    AddAsUnsignedWord,
    /// Rotate a 32-bit word right by a variable amount
    RotateRight32,
    /// Rotate a 64-bit word right by a variable amount
    RotateRight64,
}

impl Op {
    /// Number of operations.
    pub const COUNT: usize = 12;

    /// Every operation, in declaration order.
    pub const ALL: [Op; Op::COUNT] = [
        Op::Copy,
        Op::Fill,
        Op::Compare,
        Op::Xor,
        Op::RotateLeft8In32,
        Op::ByteSubstitution,
        Op::Popcount,
        Op::CountTrailingZeros,
        Op::MixingRound,
        Op::AddAsUnsignedWord,
        Op::RotateRight32,
        Op::RotateRight64,
    ];

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Op::Copy => "copy",
            Op::Fill => "fill",
            Op::Compare => "compare",
            Op::Xor => "xor",
            Op::RotateLeft8In32 => "rotate_left8_in32",
            Op::ByteSubstitution => "byte_substitution",
            Op::Popcount => "popcount",
            Op::CountTrailingZeros => "count_trailing_zeros",
            Op::MixingRound => "mixing_round",
            Op::AddAsUnsignedWord => "add_as_unsigned_word",
            Op::RotateRight32 => "rotate_right32",
            Op::RotateRight64 => "rotate_right64",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) type CopyKernel = unsafe fn(*mut u8, *const u8, usize);
pub(crate) type FillKernel = unsafe fn(*mut u64, u64, usize);
pub(crate) type CompareKernel = unsafe fn(*const u8, *const u8, usize) -> i32;
pub(crate) type XorKernel = unsafe fn(*mut u8, *const u8, usize);
pub(crate) type RotateKernel = unsafe fn(*mut u32, usize);
pub(crate) type SubstKernel = unsafe fn(*mut u8, usize);
pub(crate) type BitCountKernel = unsafe fn(u64) -> u32;
pub(crate) type MixKernel = unsafe fn(u32, u32) -> u32;
pub(crate) type AddWordKernel = unsafe fn(u64, u64) -> u64;
pub(crate) type Rotr32Kernel = unsafe fn(u32, u32) -> u32;
pub(crate) type Rotr64Kernel = unsafe fn(u64, u32) -> u64;

/// Kernels one tier offers on this build; `None` where the tier has no
/// implementation of an operation.
#[derive(Clone, Copy)]
pub(crate) struct TierKernels {
    pub copy: Option<CopyKernel>,
    pub fill: Option<FillKernel>,
    pub compare: Option<CompareKernel>,
    pub xor: Option<XorKernel>,
    pub rotate: Option<RotateKernel>,
    pub subst: Option<SubstKernel>,
    pub popcount: Option<BitCountKernel>,
    pub ctz: Option<BitCountKernel>,
    pub mix: Option<MixKernel>,
    pub add_word: Option<AddWordKernel>,
    pub rotr32: Option<Rotr32Kernel>,
    pub rotr64: Option<Rotr64Kernel>,
}

impl TierKernels {
    pub const EMPTY: Self = Self {
        copy: None,
        fill: None,
        compare: None,
        xor: None,
        rotate: None,
        subst: None,
        popcount: None,
        ctz: None,
        mix: None,
        add_word: None,
        rotr32: None,
        rotr64: None,
    };

    pub fn has(&self, op: Op) -> bool {
        match op {
            Op::Copy => self.copy.is_some(),
            Op::Fill => self.fill.is_some(),
            Op::Compare => self.compare.is_some(),
            Op::Xor => self.xor.is_some(),
            Op::RotateLeft8In32 => self.rotate.is_some(),
            Op::ByteSubstitution => self.subst.is_some(),
            Op::Popcount => self.popcount.is_some(),
            Op::CountTrailingZeros => self.ctz.is_some(),
            Op::MixingRound => self.mix.is_some(),
            Op::AddAsUnsignedWord => self.add_word.is_some(),
            Op::RotateRight32 => self.rotr32.is_some(),
            Op::RotateRight64 => self.rotr64.is_some(),
        }
    }
}

// Raw adapters over the slice-based reference tier.

unsafe fn scalar_copy(dst: *mut u8, src: *const u8, n: usize) {
    unsafe { scalar::copy(slice::from_raw_parts_mut(dst, n), slice::from_raw_parts(src, n)) }
}

unsafe fn scalar_fill(dst: *mut u64, pattern: u64, count: usize) {
    unsafe { scalar::fill(slice::from_raw_parts_mut(dst, count), pattern) }
}

unsafe fn scalar_compare(a: *const u8, b: *const u8, n: usize) -> i32 {
    unsafe { scalar::compare(slice::from_raw_parts(a, n), slice::from_raw_parts(b, n)) }
}

unsafe fn scalar_xor(a: *mut u8, b: *const u8, n: usize) {
    unsafe { scalar::xor(slice::from_raw_parts_mut(a, n), slice::from_raw_parts(b, n)) }
}

unsafe fn scalar_rotate(words: *mut u32, count: usize) {
    unsafe { scalar::rotate_left8_in32(slice::from_raw_parts_mut(words, count)) }
}

unsafe fn scalar_subst(state: *mut u8, n: usize) {
    unsafe { scalar::byte_substitution(slice::from_raw_parts_mut(state, n)) }
}

const SCALAR_KERNELS: TierKernels = TierKernels {
    copy: Some(scalar_copy),
    fill: Some(scalar_fill),
    compare: Some(scalar_compare),
    xor: Some(scalar_xor),
    rotate: Some(scalar_rotate),
    subst: Some(scalar_subst),
    popcount: Some(scalar::popcount),
    ctz: Some(scalar::count_trailing_zeros),
    mix: Some(scalar::mixing_round),
    add_word: Some(scalar::add_as_unsigned_word),
    rotr32: Some(scalar::rotate_right32),
    rotr64: Some(scalar::rotate_right64),
};

fn tier_kernels(tier: Tier, descriptor: &CapabilityDescriptor) -> TierKernels {
    match tier {
        Tier::Vector if descriptor.vector_unit => backend::vector_kernels(descriptor),
        Tier::HardwareScalar if descriptor.bit_manip => backend::hardware_scalar_kernels(descriptor),
        Tier::PureScalar => SCALAR_KERNELS,
        _ => TierKernels::EMPTY,
    }
}

/// Best tier for `op` under `descriptor`.
///
/// Pure and deterministic: the same inputs always give the same tier, and a
/// tier is only returned when this build has an implementation of `op` for
/// it and the descriptor grants the features that implementation needs.
pub fn select(op: Op, descriptor: &CapabilityDescriptor) -> Tier {
    [Tier::Vector, Tier::HardwareScalar]
        .into_iter()
        .find(|&tier| tier_kernels(tier, descriptor).has(op))
        .unwrap_or(Tier::PureScalar)
}

#[derive(Clone, Copy)]
struct DispatchTable {
    copy: CopyKernel,
    fill: FillKernel,
    compare: CompareKernel,
    xor: XorKernel,
    rotate: RotateKernel,
    subst: SubstKernel,
    popcount: BitCountKernel,
    ctz: BitCountKernel,
    mix: MixKernel,
    add_word: AddWordKernel,
    rotr32: Rotr32Kernel,
    rotr64: Rotr64Kernel,
    tiers: [Tier; Op::COUNT],
}

impl DispatchTable {
    fn build(descriptor: &CapabilityDescriptor) -> Self {
        let mut tiers = [Tier::PureScalar; Op::COUNT];
        for op in Op::ALL {
            tiers[op.index()] = select(op, descriptor);
            log::trace!("{} -> {} tier", op, tiers[op.index()]);
        }

        let vector = tier_kernels(Tier::Vector, descriptor);
        let hardware = tier_kernels(Tier::HardwareScalar, descriptor);
        let pick = |op: Op| match tiers[op.index()] {
            Tier::Vector => vector,
            Tier::HardwareScalar => hardware,
            Tier::PureScalar => SCALAR_KERNELS,
        };

        // select() only returns a tier whose kernel is present
        Self {
            copy: pick(Op::Copy).copy.unwrap_or(scalar_copy),
            fill: pick(Op::Fill).fill.unwrap_or(scalar_fill),
            compare: pick(Op::Compare).compare.unwrap_or(scalar_compare),
            xor: pick(Op::Xor).xor.unwrap_or(scalar_xor),
            rotate: pick(Op::RotateLeft8In32).rotate.unwrap_or(scalar_rotate),
            subst: pick(Op::ByteSubstitution).subst.unwrap_or(scalar_subst),
            popcount: pick(Op::Popcount).popcount.unwrap_or(scalar::popcount),
            ctz: pick(Op::CountTrailingZeros).ctz.unwrap_or(scalar::count_trailing_zeros),
            mix: pick(Op::MixingRound).mix.unwrap_or(scalar::mixing_round),
            add_word: pick(Op::AddAsUnsignedWord)
                .add_word
                .unwrap_or(scalar::add_as_unsigned_word),
            rotr32: pick(Op::RotateRight32).rotr32.unwrap_or(scalar::rotate_right32),
            rotr64: pick(Op::RotateRight64).rotr64.unwrap_or(scalar::rotate_right64),
            tiers,
        }
    }
}

/// Capability-dispatched primitive operations.
///
/// Every operation produces bit-identical results whichever tier serves it.
/// Instances are cheap to copy and safe to share between threads.
///
/// # Examples
///
/// ```rust
/// use powprim::simd::{Op, PrimitiveLibrary, Tier};
/// use powprim::system::CapabilityDescriptor;
///
/// let lib = PrimitiveLibrary::with_capabilities(CapabilityDescriptor::scalar_only());
/// assert_eq!(lib.tier(Op::Copy), Tier::PureScalar);
///
/// let mut words = [0x1234_5678u32];
/// lib.rotate_left8_in32(&mut words);
/// assert_eq!(words[0], 0x3456_7812);
/// ```
#[derive(Clone, Copy)]
pub struct PrimitiveLibrary {
    descriptor: CapabilityDescriptor,
    table: DispatchTable,
}

impl PrimitiveLibrary {
    fn from_verified(descriptor: CapabilityDescriptor) -> Self {
        Self {
            descriptor,
            table: DispatchTable::build(&descriptor),
        }
    }

    /// Library for the detected capabilities of this machine.
    pub fn detected() -> Self {
        Self::from_verified(detect())
    }

    /// Library restricted to `requested`.
    ///
    /// The request is intersected with the detected capabilities, so asking
    /// for features the machine lacks only yields lower tiers.
    pub fn with_capabilities(requested: CapabilityDescriptor) -> Self {
        Self::from_verified(requested.intersect(&detect()))
    }

    /// Library serving every operation from the pure-scalar tier.
    pub fn scalar() -> Self {
        Self::from_verified(CapabilityDescriptor::scalar_only())
    }

    /// Process-wide library, built from [`detect`] on first use.
    pub fn global() -> &'static Self {
        static GLOBAL_LIBRARY: OnceLock<PrimitiveLibrary> = OnceLock::new();
        GLOBAL_LIBRARY.get_or_init(Self::detected)
    }

    /// Capabilities this library dispatches on.
    pub fn descriptor(&self) -> CapabilityDescriptor {
        self.descriptor
    }

    /// Tier serving `op`.
    pub fn tier(&self, op: Op) -> Tier {
        self.table.tiers[op.index()]
    }

    /// Copy `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    #[inline]
    pub fn copy(&self, dst: &mut [u8], src: &[u8]) {
        assert_eq!(dst.len(), src.len(), "copy: destination and source lengths differ");
        // SAFETY: both slices are valid for len bytes and cannot overlap.
        unsafe { (self.table.copy)(dst.as_mut_ptr(), src.as_ptr(), src.len()) }
    }

    /// Copy `n` bytes from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for `n` byte reads, `dst` for `n` byte writes,
    /// both non-null, and the regions must not overlap.
    #[inline]
    pub unsafe fn copy_raw(&self, dst: *mut u8, src: *const u8, n: usize) {
        unsafe { (self.table.copy)(dst, src, n) }
    }

    /// Write `pattern` into every word of `dst`.
    #[inline]
    pub fn fill(&self, dst: &mut [u64], pattern: u64) {
        // SAFETY: the slice is valid for len words.
        unsafe { (self.table.fill)(dst.as_mut_ptr(), pattern, dst.len()) }
    }

    /// Write `count` copies of `pattern` starting at `dst`.
    ///
    /// # Safety
    ///
    /// `dst` must be non-null, 8-byte aligned and valid for `count` word writes.
    #[inline]
    pub unsafe fn fill_raw(&self, dst: *mut u64, pattern: u64, count: usize) {
        unsafe { (self.table.fill)(dst, pattern, count) }
    }

    /// Compare two buffers lexicographically.
    ///
    /// Returns 0 when equal, otherwise `a[k] - b[k]` at the first differing
    /// index `k`. When one buffer is a prefix of the other the shorter one
    /// orders first (-1 or 1).
    #[inline]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> i32 {
        let n = a.len().min(b.len());
        // SAFETY: both slices are valid for at least n bytes.
        let result = unsafe { (self.table.compare)(a.as_ptr(), b.as_ptr(), n) };
        if result != 0 {
            return result;
        }
        match a.len().cmp(&b.len()) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// Compare exactly `n` bytes at `a` and `b`.
    ///
    /// # Safety
    ///
    /// Both pointers must be non-null and valid for `n` byte reads.
    #[inline]
    pub unsafe fn compare_raw(&self, a: *const u8, b: *const u8, n: usize) -> i32 {
        unsafe { (self.table.compare)(a, b, n) }
    }

    /// `a[i] ^= b[i]` for every index.
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    #[inline]
    pub fn xor(&self, a: &mut [u8], b: &[u8]) {
        assert_eq!(a.len(), b.len(), "xor: operand lengths differ");
        // SAFETY: both slices are valid for len bytes.
        unsafe { (self.table.xor)(a.as_mut_ptr(), b.as_ptr(), a.len()) }
    }

    /// XOR `n` bytes of `b` into `a`.
    ///
    /// # Safety
    ///
    /// `a` must be valid for `n` byte reads and writes, `b` for `n` byte
    /// reads, both non-null. `b` may equal `a` but must not partially overlap.
    #[inline]
    pub unsafe fn xor_raw(&self, a: *mut u8, b: *const u8, n: usize) {
        unsafe { (self.table.xor)(a, b, n) }
    }

    /// Rotate every 32-bit word left by 8 bits.
    #[inline]
    pub fn rotate_left8_in32(&self, words: &mut [u32]) {
        // SAFETY: the slice is valid for len words.
        unsafe { (self.table.rotate)(words.as_mut_ptr(), words.len()) }
    }

    /// Rotate `count` words starting at `words` left by 8 bits.
    ///
    /// # Safety
    ///
    /// `words` must be non-null, 4-byte aligned and valid for `count` word
    /// reads and writes.
    #[inline]
    pub unsafe fn rotate_left8_in32_raw(&self, words: *mut u32, count: usize) {
        unsafe { (self.table.rotate)(words, count) }
    }

    /// Replace every byte with its S-box image.
    #[inline]
    pub fn byte_substitution(&self, state: &mut [u8]) {
        // SAFETY: the slice is valid for len bytes.
        unsafe { (self.table.subst)(state.as_mut_ptr(), state.len()) }
    }

    /// Substitute `n` bytes starting at `state`.
    ///
    /// # Safety
    ///
    /// `state` must be non-null and valid for `n` byte reads and writes.
    #[inline]
    pub unsafe fn byte_substitution_raw(&self, state: *mut u8, n: usize) {
        unsafe { (self.table.subst)(state, n) }
    }

    /// Undo [`byte_substitution`](Self::byte_substitution).
    ///
    /// Not on the hot path; always served by the scalar tier.
    #[inline]
    pub fn inverse_byte_substitution(&self, state: &mut [u8]) {
        scalar::inverse_byte_substitution(state)
    }

    /// Number of set bits in `x`.
    #[inline]
    pub fn popcount(&self, x: u64) -> u32 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.popcount)(x) }
    }

    /// Number of trailing zero bits in `x`; 64 for zero.
    #[inline]
    pub fn count_trailing_zeros(&self, x: u64) -> u32 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.ctz)(x) }
    }

    /// One substitution-and-diffusion round of `input` under `round_key`.
    #[inline]
    pub fn mixing_round(&self, input: u32, round_key: u32) -> u32 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.mix)(input, round_key) }
    }

    /// `(a & 0xFFFF_FFFF) + (b & 0xFFFF_FFFF)` without truncation.
    #[inline]
    pub fn add_as_unsigned_word(&self, a: u64, b: u64) -> u64 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.add_word)(a, b) }
    }

    /// Rotate `x` right by `r` bits; only the low 5 bits of `r` count.
    #[inline]
    pub fn rotate_right32(&self, x: u32, r: u32) -> u32 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.rotr32)(x, r) }
    }

    /// Rotate `x` right by `r` bits; only the low 6 bits of `r` count.
    #[inline]
    pub fn rotate_right64(&self, x: u64, r: u32) -> u64 {
        // SAFETY: the kernel's features were verified when the table was built.
        unsafe { (self.table.rotr64)(x, r) }
    }
}

impl Default for PrimitiveLibrary {
    fn default() -> Self {
        *Self::global()
    }
}

impl fmt::Debug for PrimitiveLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entry(&"capabilities", &self.descriptor.summary());
        for op in Op::ALL {
            map.entry(&op.name(), &self.tier(op).name());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_only_selects_pure_scalar() {
        let descriptor = CapabilityDescriptor::scalar_only();
        for op in Op::ALL {
            assert_eq!(select(op, &descriptor), Tier::PureScalar, "{}", op);
        }
    }

    #[test]
    fn test_select_is_deterministic() {
        let descriptor = detect();
        for op in Op::ALL {
            assert_eq!(select(op, &descriptor), select(op, &descriptor));
        }
    }

    #[test]
    fn test_table_agrees_with_select() {
        let lib = PrimitiveLibrary::detected();
        for op in Op::ALL {
            assert_eq!(lib.tier(op), select(op, &lib.descriptor()), "{}", op);
        }
    }

    #[test]
    fn test_mixing_round_has_no_accelerated_tier() {
        let lib = PrimitiveLibrary::detected();
        assert_eq!(lib.tier(Op::MixingRound), Tier::PureScalar);
    }

    #[test]
    fn test_vector_tier_requires_vector_unit() {
        let descriptor = CapabilityDescriptor {
            vector_unit: false,
            vector_width_bits: 0,
            ..detect()
        };
        for op in [Op::Copy, Op::Fill, Op::Compare, Op::Xor, Op::ByteSubstitution] {
            assert_ne!(select(op, &descriptor), Tier::Vector, "{}", op);
        }
    }

    #[test]
    fn test_bit_counting_without_bit_manip_is_scalar() {
        let descriptor = CapabilityDescriptor {
            bit_manip: false,
            ..detect()
        };
        assert_eq!(select(Op::Popcount, &descriptor), Tier::PureScalar);
        assert_eq!(select(Op::CountTrailingZeros, &descriptor), Tier::PureScalar);
        assert_eq!(select(Op::AddAsUnsignedWord, &descriptor), Tier::PureScalar);
        assert_eq!(select(Op::RotateRight32, &descriptor), Tier::PureScalar);
        assert_eq!(select(Op::RotateRight64, &descriptor), Tier::PureScalar);
    }

    #[test]
    fn test_with_capabilities_never_exceeds_detection() {
        let everything = CapabilityDescriptor {
            vector_unit: true,
            vector_width_bits: u32::MAX,
            crypto_rounds: true,
            hash_extension: true,
            bit_manip: true,
        };
        let lib = PrimitiveLibrary::with_capabilities(everything);
        assert_eq!(lib.descriptor(), detect());
    }

    #[test]
    fn test_compare_length_tie_break() {
        let lib = PrimitiveLibrary::global();
        assert_eq!(lib.compare(b"abc", b"abc"), 0);
        assert_eq!(lib.compare(b"ab", b"abc"), -1);
        assert_eq!(lib.compare(b"abc", b"ab"), 1);
        assert_eq!(lib.compare(b"abd", b"abc"), 1);
        assert_eq!(lib.compare(b"", b""), 0);
    }

    #[test]
    #[should_panic(expected = "lengths differ")]
    fn test_copy_length_mismatch_panics() {
        let mut dst = [0u8; 4];
        PrimitiveLibrary::global().copy(&mut dst, &[1, 2, 3]);
    }

    #[test]
    fn test_raw_entry_points() {
        let lib = PrimitiveLibrary::global();
        let src: Vec<u8> = (0..100).collect();
        let mut dst = vec![0u8; 100];
        unsafe {
            lib.copy_raw(dst.as_mut_ptr(), src.as_ptr(), 100);
            assert_eq!(lib.compare_raw(dst.as_ptr(), src.as_ptr(), 100), 0);
            lib.xor_raw(dst.as_mut_ptr(), src.as_ptr(), 100);
        }
        assert!(dst.iter().all(|&b| b == 0));

        let mut words = vec![0u64; 13];
        unsafe { lib.fill_raw(words.as_mut_ptr(), 7, 13) };
        assert!(words.iter().all(|&w| w == 7));
    }

    #[test]
    fn test_rotate_right_every_amount() {
        let lib = PrimitiveLibrary::detected();
        let scalar = PrimitiveLibrary::scalar();
        let (x32, x64) = (0x8123_4567u32, 0x8123_4567_89AB_CDEFu64);
        for r in 0..32 {
            assert_eq!(lib.rotate_right32(x32, r), x32.rotate_right(r));
            assert_eq!(lib.rotate_right32(x32, r + 32), scalar.rotate_right32(x32, r));
        }
        for r in 0..64 {
            assert_eq!(lib.rotate_right64(x64, r), x64.rotate_right(r));
            assert_eq!(lib.rotate_right64(x64, r + 64), scalar.rotate_right64(x64, r));
        }
    }

    #[test]
    fn test_debug_lists_every_op() {
        let rendered = format!("{:?}", PrimitiveLibrary::scalar());
        for op in Op::ALL {
            assert!(rendered.contains(op.name()));
        }
    }
}
