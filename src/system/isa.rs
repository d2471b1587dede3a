//! Parsing of the OS-provided textual hardware description
//!
//! Linux exposes the ISA of each hart (RISC-V) or the feature flags of each
//! processor (aarch64, x86_64) as a line of `/proc/cpuinfo`. The parsers here
//! are pure functions over that text so they can be fed crafted input.
//!
//! When several processors are listed, the resulting feature set is the
//! intersection across all of them: a thread may migrate to any core, so a
//! feature only counts if every core has it.

use crate::error::{PowprimError, Result};
use std::collections::BTreeSet;

/// Which cpuinfo line carries the feature list, and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuinfoFormat {
    /// `isa : rv64imafdcv_zba_zbb...` (RISC-V)
    RiscvIsa,
    /// `Features : fp asimd aes ...` (aarch64)
    Features,
    /// `flags : fpu sse2 ssse3 ...` (x86_64)
    Flags,
}

impl CpuinfoFormat {
    /// Format used by the Linux kernel for the compilation target.
    pub const fn for_target() -> Self {
        if cfg!(any(target_arch = "riscv64", target_arch = "riscv32")) {
            Self::RiscvIsa
        } else if cfg!(any(target_arch = "aarch64", target_arch = "arm")) {
            Self::Features
        } else {
            Self::Flags
        }
    }

    /// Key of the cpuinfo line holding the list.
    pub const fn key(self) -> &'static str {
        match self {
            Self::RiscvIsa => "isa",
            Self::Features => "Features",
            Self::Flags => "flags",
        }
    }
}

/// A set of lowercase extension / feature names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsaFeatures {
    names: BTreeSet<String>,
}

impl IsaFeatures {
    /// Parse a RISC-V ISA string such as `rv64imafdcv_zicsr_zba_zbb`.
    ///
    /// Single-letter base extensions follow the `rv32`/`rv64` prefix up to the
    /// first underscore; multi-letter extensions are separated by
    /// underscores. Version suffixes (`2p0`) are dropped and `g` expands to
    /// `imafd_zicsr_zifencei`.
    pub fn parse_riscv_isa(isa: &str) -> Result<Self> {
        let isa = isa.trim().to_ascii_lowercase();
        let rest = ["rv128", "rv64", "rv32"]
            .iter()
            .find_map(|prefix| isa.strip_prefix(prefix))
            .ok_or_else(|| PowprimError::parse("isa", format!("missing rv prefix in '{}'", isa)))?;

        let mut segments = rest.split('_');
        let base = segments.next().unwrap_or_default();
        if base.is_empty() {
            return Err(PowprimError::parse("isa", "empty base extension list"));
        }

        let mut names = BTreeSet::new();
        let bytes = base.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            if !c.is_ascii_alphabetic() {
                return Err(PowprimError::parse(
                    "isa",
                    format!("unexpected '{}' in base extensions '{}'", c as char, base),
                ));
            }
            i = skip_version(bytes, i + 1);

            if c == b'g' {
                for ext in ["i", "m", "a", "f", "d", "zicsr", "zifencei"] {
                    names.insert(ext.to_string());
                }
            } else {
                names.insert((c as char).to_string());
            }
        }

        for segment in segments.filter(|s| !s.is_empty()) {
            let name = strip_version(segment);
            if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Err(PowprimError::parse(
                    "isa",
                    format!("malformed extension '{}'", segment),
                ));
            }
            names.insert(name.to_string());
        }

        Ok(Self { names })
    }

    /// Parse a whitespace-separated flag list such as `fp asimd aes pmull`.
    pub fn parse_flag_list(list: &str) -> Result<Self> {
        let names: BTreeSet<String> = list
            .split_whitespace()
            .map(|flag| flag.to_ascii_lowercase())
            .collect();
        if names.is_empty() {
            return Err(PowprimError::parse("flags", "empty feature list"));
        }
        Ok(Self { names })
    }

    /// Parse full cpuinfo text, intersecting the lists of all processors.
    pub fn from_cpuinfo(text: &str, format: CpuinfoFormat) -> Result<Self> {
        let mut merged: Option<Self> = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if key.trim() != format.key() {
                continue;
            }

            let parsed = match format {
                CpuinfoFormat::RiscvIsa => Self::parse_riscv_isa(value)?,
                CpuinfoFormat::Features | CpuinfoFormat::Flags => Self::parse_flag_list(value)?,
            };
            merged = Some(match merged {
                Some(acc) => acc.intersect(&parsed),
                None => parsed,
            });
        }

        merged.ok_or_else(|| {
            PowprimError::parse("cpuinfo", format!("no '{}' line found", format.key()))
        })
    }

    /// Whether the named feature is present.
    pub fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether every named feature is present.
    pub fn has_all(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has(name))
    }

    /// Features common to both sets.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            names: self.names.intersection(&other.names).cloned().collect(),
        }
    }

    /// Number of features in the set.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over feature names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Skip a `2` or `2p1` version suffix starting at `i`.
fn skip_version(bytes: &[u8], mut i: usize) -> usize {
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    // 'p' is also an extension letter; it separates versions only between digits
    if i > start && i + 1 < bytes.len() && bytes[i] == b'p' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

fn strip_version(segment: &str) -> &str {
    let without_minor = segment.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_minor.len() == segment.len() {
        return segment;
    }
    match without_minor.strip_suffix('p') {
        Some(major) if major.ends_with(|c: char| c.is_ascii_digit()) => {
            major.trim_end_matches(|c: char| c.is_ascii_digit())
        }
        _ => without_minor,
    }
}
