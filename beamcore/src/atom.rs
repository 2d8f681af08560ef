use std::collections::HashMap;

use crate::AtomIndex;

pub const FALSE_ATOM: AtomIndex = AtomIndex(0);
pub const TRUE_ATOM: AtomIndex = AtomIndex(1);
pub const ERROR_ATOM: AtomIndex = AtomIndex(2);
pub const BADARG_ATOM: AtomIndex = AtomIndex(3);
pub const BADARITH_ATOM: AtomIndex = AtomIndex(4);
pub const OVERFLOW_ATOM: AtomIndex = AtomIndex(5);
pub const OUT_OF_MEMORY_ATOM: AtomIndex = AtomIndex(6);
pub const ERLANG_ATOM: AtomIndex = AtomIndex(7);

// order must match the constants above
const DEFAULT_ATOMS: &[&[u8]] = &[
    b"false",
    b"true",
    b"error",
    b"badarg",
    b"badarith",
    b"overflow",
    b"out_of_memory",
    b"erlang",
];

/// Deduplicated byte-string <-> index mapping.
/// Indices are stable for the lifetime of the table and never reused.
#[derive(Debug)]
pub struct AtomTable {
    names: Vec<Box<[u8]>>,
    indices: HashMap<Box<[u8]>, AtomIndex>,
}

impl AtomTable {
    pub fn new() -> Self {
        let mut table = Self {
            names: Vec::with_capacity(DEFAULT_ATOMS.len()),
            indices: HashMap::with_capacity(DEFAULT_ATOMS.len()),
        };
        for name in DEFAULT_ATOMS {
            table.intern(name);
        }
        table
    }

    pub fn intern(&mut self, name: &[u8]) -> AtomIndex {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = AtomIndex(self.names.len() as u32);
        let owned: Box<[u8]> = name.into();
        self.names.push(owned.clone());
        self.indices.insert(owned, index);
        index
    }

    pub fn lookup(&self, name: &[u8]) -> Option<AtomIndex> {
        self.indices.get(name).copied()
    }

    pub fn name(&self, index: AtomIndex) -> Option<&[u8]> {
        self.names.get(index.0 as usize).map(|name| &**name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}
