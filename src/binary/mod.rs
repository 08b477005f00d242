// src/binary/mod.rs

//! ELF executable analysis
//!
//! `inspect` turns raw bytes into a [`BinaryStructure`]; `flags` and
//! `symbols` are pure functions over that structure.

pub mod flags;
pub mod inspect;
pub mod symbols;

pub use flags::{SecurityFlags, classify};
pub use inspect::{BinaryStructure, inspect, is_elf};
pub use symbols::extract_symbols;
