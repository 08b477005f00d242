// src/binary/inspect.rs

//! Structural inspection of ELF files using goblin
//!
//! Reduces a parsed ELF image to the handful of fields the hardening
//! classifier and the symbol extractor need. Keeping this as plain data lets
//! both consumers stay pure and testable without real binaries.

use crate::error::{Error, Result};
use goblin::elf::Elf;
use goblin::elf::dynamic::{DT_BIND_NOW, DT_DEBUG, DT_FLAGS, DT_FLAGS_1};
use goblin::elf::header::{ET_DYN, ET_EXEC};
use goblin::elf::program_header::{PF_X, PT_GNU_RELRO, PT_GNU_STACK, PT_LOAD};
use goblin::elf::sym::{STB_GLOBAL, STB_WEAK};
use std::collections::HashMap;

/// ELF magic bytes
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// The `e_type` of an ELF header, reduced to what matters for PIE detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Executable,
    SharedObject,
    Other(u16),
}

/// Program header kinds the classifier looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Load,
    GnuRelro,
    GnuStack,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub executable: bool,
}

/// Dynamic section entries the classifier looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicEntry {
    BindNow,
    /// DT_FLAGS value
    Flags(u64),
    /// DT_FLAGS_1 value
    Flags1(u64),
    Debug,
    Other(u64),
}

/// A symbol reference from `.dynsym` or `.symtab`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef {
    pub name: String,
    /// Required version (e.g. `GLIBC_2.3.4`) for versioned dynamic imports
    pub version: Option<String>,
}

impl SymbolRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }
}

/// Structural metadata of one executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryStructure {
    pub file_type: FileType,
    pub segments: Vec<Segment>,
    pub dynamic: Vec<DynamicEntry>,
    /// Every named symbol from both symbol tables
    pub symbols: Vec<SymbolRef>,
    /// Global and weak dynamic symbols in table order (what `nm -D -g` lists)
    pub global_dynamic_symbols: Vec<String>,
}

impl BinaryStructure {
    /// An empty structure of the given type
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            segments: Vec::new(),
            dynamic: Vec::new(),
            symbols: Vec::new(),
            global_dynamic_symbols: Vec::new(),
        }
    }
}

/// Whether `content` starts with the ELF magic
pub fn is_elf(content: &[u8]) -> bool {
    content.starts_with(ELF_MAGIC)
}

/// Parse an ELF image into its structural metadata
pub fn inspect(content: &[u8]) -> Result<BinaryStructure> {
    if !is_elf(content) {
        return Err(Error::BinaryParse("missing ELF magic".to_string()));
    }

    let elf = Elf::parse(content).map_err(|e| Error::BinaryParse(e.to_string()))?;

    let file_type = match elf.header.e_type {
        ET_EXEC => FileType::Executable,
        ET_DYN => FileType::SharedObject,
        other => FileType::Other(other),
    };

    let segments = elf
        .program_headers
        .iter()
        .map(|ph| Segment {
            kind: match ph.p_type {
                PT_LOAD => SegmentKind::Load,
                PT_GNU_RELRO => SegmentKind::GnuRelro,
                PT_GNU_STACK => SegmentKind::GnuStack,
                other => SegmentKind::Other(other),
            },
            executable: ph.p_flags & PF_X != 0,
        })
        .collect();

    let dynamic = elf
        .dynamic
        .as_ref()
        .map(|dynamic| {
            dynamic
                .dyns
                .iter()
                .map(|d| match d.d_tag {
                    DT_BIND_NOW => DynamicEntry::BindNow,
                    DT_FLAGS => DynamicEntry::Flags(d.d_val),
                    DT_FLAGS_1 => DynamicEntry::Flags1(d.d_val),
                    DT_DEBUG => DynamicEntry::Debug,
                    other => DynamicEntry::Other(other),
                })
                .collect()
        })
        .unwrap_or_default();

    let versions = required_versions(&elf);
    let mut symbols = Vec::new();
    let mut global_dynamic_symbols = Vec::new();

    for (index, sym) in elf.dynsyms.iter().enumerate() {
        let Some(name) = elf.dynstrtab.get_at(sym.st_name) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let version = elf
            .versym
            .as_ref()
            .and_then(|versym| versym.get_at(index))
            .and_then(|vs| versions.get(&vs.version()).cloned());
        symbols.push(SymbolRef {
            name: name.to_string(),
            version,
        });

        if matches!(sym.st_bind(), STB_GLOBAL | STB_WEAK) {
            global_dynamic_symbols.push(name.to_string());
        }
    }

    for sym in elf.syms.iter() {
        if let Some(name) = elf.strtab.get_at(sym.st_name)
            && !name.is_empty()
        {
            symbols.push(SymbolRef::new(name));
        }
    }

    Ok(BinaryStructure {
        file_type,
        segments,
        dynamic,
        symbols,
        global_dynamic_symbols,
    })
}

/// Map version indexes from `.gnu.version_r` to their names
fn required_versions(elf: &Elf) -> HashMap<u16, String> {
    let mut versions = HashMap::new();
    if let Some(verneed) = &elf.verneed {
        for need in verneed.iter() {
            for aux in need.iter() {
                if let Some(name) = elf.dynstrtab.get_at(aux.vna_name) {
                    versions.insert(aux.vna_other, name.to_string());
                }
            }
        }
    }
    versions
}
