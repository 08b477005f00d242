// src/binary/flags.rs

//! Hardening flag classification
//!
//! Derives RELRO, stack protector, PIE, NX and FORTIFY_SOURCE status from a
//! [`BinaryStructure`]. Classification is a pure function; persistence is
//! the pipeline's job.
//!
//! The numeric codes are the values stored in the `flags` table and must not
//! change: relro 0/1/2 = none/full/partial, pie 0/1/2 = none/enabled/DSO,
//! nx 0/1 = disabled/enabled, ssp and fortify 0/1 = absent/present.

use super::inspect::{BinaryStructure, DynamicEntry, FileType, SegmentKind};
use goblin::elf::dynamic::{DF_1_NOW, DF_BIND_NOW};

/// Canary check routine referenced by stack-protected code
const STACK_CHK_FAIL: &str = "__stack_chk_fail";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relro {
    None,
    Partial,
    Full,
}

impl Relro {
    pub fn code(&self) -> i64 {
        match self {
            Relro::None => 0,
            Relro::Full => 1,
            Relro::Partial => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Relro::Full,
            2 => Relro::Partial,
            _ => Relro::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Relro::None => "none",
            Relro::Partial => "partial",
            Relro::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackProtector {
    Absent,
    Present,
}

impl StackProtector {
    pub fn code(&self) -> i64 {
        match self {
            StackProtector::Absent => 0,
            StackProtector::Present => 1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            StackProtector::Present
        } else {
            StackProtector::Absent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StackProtector::Absent => "not found",
            StackProtector::Present => "found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pie {
    None,
    Enabled,
    /// ET_DYN without DT_DEBUG; cannot be told apart from a plain library
    SharedObject,
}

impl Pie {
    pub fn code(&self) -> i64 {
        match self {
            Pie::None => 0,
            Pie::Enabled => 1,
            Pie::SharedObject => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Pie::Enabled,
            2 => Pie::SharedObject,
            _ => Pie::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pie::None => "none",
            Pie::Enabled => "enabled",
            Pie::SharedObject => "DSO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nx {
    Disabled,
    Enabled,
}

impl Nx {
    pub fn code(&self) -> i64 {
        match self {
            Nx::Disabled => 0,
            Nx::Enabled => 1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        if code == 1 { Nx::Enabled } else { Nx::Disabled }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Nx::Disabled => "disabled",
            Nx::Enabled => "enabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fortify {
    Absent,
    Present,
}

impl Fortify {
    pub fn code(&self) -> i64 {
        match self {
            Fortify::Absent => 0,
            Fortify::Present => 1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Fortify::Present
        } else {
            Fortify::Absent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Fortify::Absent => "not found",
            Fortify::Present => "found",
        }
    }
}

/// The five hardening indicators of one executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityFlags {
    pub relro: Relro,
    pub ssp: StackProtector,
    pub pie: Pie,
    pub nx: Nx,
    pub fortify: Fortify,
}

impl SecurityFlags {
    /// Vector recorded for executables the inspector could not parse
    pub fn unparsable() -> Self {
        Self {
            relro: Relro::None,
            ssp: StackProtector::Absent,
            pie: Pie::None,
            nx: Nx::Disabled,
            fortify: Fortify::Absent,
        }
    }
}

/// Classify the hardening attributes of one executable
pub fn classify(binary: &BinaryStructure) -> SecurityFlags {
    SecurityFlags {
        relro: classify_relro(binary),
        ssp: classify_ssp(binary),
        pie: classify_pie(binary),
        nx: classify_nx(binary),
        fortify: classify_fortify(binary),
    }
}

fn classify_relro(binary: &BinaryStructure) -> Relro {
    let has_relro = binary
        .segments
        .iter()
        .any(|s| s.kind == SegmentKind::GnuRelro);
    if !has_relro {
        return Relro::None;
    }

    let bind_now = binary.dynamic.iter().any(|entry| match *entry {
        DynamicEntry::BindNow => true,
        DynamicEntry::Flags(flags) => flags & DF_BIND_NOW != 0,
        DynamicEntry::Flags1(flags) => flags & DF_1_NOW != 0,
        _ => false,
    });

    if bind_now { Relro::Full } else { Relro::Partial }
}

fn classify_ssp(binary: &BinaryStructure) -> StackProtector {
    if binary.symbols.iter().any(|s| s.name == STACK_CHK_FAIL) {
        StackProtector::Present
    } else {
        StackProtector::Absent
    }
}

fn classify_nx(binary: &BinaryStructure) -> Nx {
    let executable_stack = binary
        .segments
        .iter()
        .any(|s| s.kind == SegmentKind::GnuStack && s.executable);
    if executable_stack {
        Nx::Disabled
    } else {
        Nx::Enabled
    }
}

fn classify_pie(binary: &BinaryStructure) -> Pie {
    match binary.file_type {
        FileType::Executable => Pie::None,
        FileType::SharedObject => {
            if binary.dynamic.contains(&DynamicEntry::Debug) {
                Pie::Enabled
            } else {
                Pie::SharedObject
            }
        }
        FileType::Other(_) => Pie::None,
    }
}

fn classify_fortify(binary: &BinaryStructure) -> Fortify {
    let fortified = binary.symbols.iter().any(|s| {
        s.name.ends_with("_chk")
            && s
                .version
                .as_deref()
                .is_some_and(|v| v.starts_with("GLIBC"))
    });
    if fortified {
        Fortify::Present
    } else {
        Fortify::Absent
    }
}
