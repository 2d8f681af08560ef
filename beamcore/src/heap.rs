//! Per-process heap.
//!
//! Cell layouts, one cell per 32-bit word:
//! - boxed integer: `[Header { Integer, n }, Raw; n]`, n = 1 (32-bit) or 2 (64-bit, low word first)
//! - tuple:         `[Header { Tuple, arity }, Term; arity]`
//! - cons:          `[Term (head), Term (tail)]`
//! - binary:        `[Header { Binary, byte_len }, Raw; ceil(byte_len / 4)]`
//!
//! Every write must be preceded by a successful `ensure_free` covering it.
//! This heap never collects, `live` is only threaded through for the collector
//! that owns this contract in a full runtime.
use crate::{HeapRef, Term};

pub const BOXED_TERMS_REQUIRED_FOR_INT: usize = 1;
pub const BOXED_TERMS_REQUIRED_FOR_INT64: usize = 2;
pub const BOXED_INT_SIZE: usize = BOXED_TERMS_REQUIRED_FOR_INT + 1;
pub const BOXED_INT64_SIZE: usize = BOXED_TERMS_REQUIRED_FOR_INT64 + 1;

const WORD_BYTES: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoxKind {
    Integer,
    Tuple,
    Binary,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Cell {
    Header { kind: BoxKind, size: u32 },
    Raw(u32),
    Term(Term),
}

// TODO: growth policy, the heap is a single bounded region for now
#[derive(Debug, Clone, Copy)]
pub struct HeapCreateInfo {
    pub initial_words: usize,
    pub max_words: usize,
}

impl Default for HeapCreateInfo {
    fn default() -> Self {
        Self {
            initial_words: 256,
            max_words: 64 * 1024,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("process heap exhausted: {requested} words requested, {available} available")]
pub struct OutOfMemory {
    pub requested: usize,
    pub available: usize,
}

#[derive(Debug)]
pub struct ProcessHeap {
    cells: Vec<Cell>,
    // end of the region granted by the last ensure_free
    reserved_end: usize,
    max_words: usize,
}

impl ProcessHeap {
    pub fn new(info: &HeapCreateInfo) -> Self {
        Self {
            cells: Vec::with_capacity(info.initial_words.min(info.max_words)),
            reserved_end: 0,
            max_words: info.max_words,
        }
    }

    pub fn used_words(&self) -> usize {
        self.cells.len()
    }

    pub fn free_words(&self) -> usize {
        self.max_words.saturating_sub(self.cells.len())
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Reserve `words` cells for the next writes.
    /// `live` is the number of argument registers that would have to survive a collection.
    pub fn ensure_free(&mut self, live: usize, words: usize) -> Result<(), OutOfMemory> {
        let available = self.free_words();
        if words > available {
            log::trace!(
                target: "heap",
                "ensure_free failed: {words} words requested, {available} available, {live} live"
            );
            return Err(OutOfMemory {
                requested: words,
                available,
            });
        }
        self.cells.reserve(words);
        self.reserved_end = self.cells.len() + words;
        Ok(())
    }

    fn push_cells(&mut self, cells: &[Cell]) -> HeapRef {
        let start = self.cells.len();
        assert!(
            start + cells.len() <= self.reserved_end,
            "heap write of {} words without a matching ensure_free",
            cells.len()
        );
        self.cells.extend_from_slice(cells);
        HeapRef::new(start)
    }

    /// Writes into space reserved by `ensure_free(_, BOXED_INT_SIZE)`.
    pub fn make_boxed_int(&mut self, value: i32) -> Term {
        let cell = self.push_cells(&[
            Cell::Header {
                kind: BoxKind::Integer,
                size: BOXED_TERMS_REQUIRED_FOR_INT as u32,
            },
            Cell::Raw(value.cast_unsigned()),
        ]);
        Term::BoxedInt(cell)
    }

    /// Writes into space reserved by `ensure_free(_, BOXED_INT64_SIZE)`.
    pub fn make_boxed_int64(&mut self, value: i64) -> Term {
        let bits = value.cast_unsigned();
        let cell = self.push_cells(&[
            Cell::Header {
                kind: BoxKind::Integer,
                size: BOXED_TERMS_REQUIRED_FOR_INT64 as u32,
            },
            Cell::Raw(bits as u32),
            Cell::Raw((bits >> 32) as u32),
        ]);
        Term::BoxedInt(cell)
    }

    pub fn alloc_tuple(&mut self, elements: &[Term]) -> Result<Term, OutOfMemory> {
        self.ensure_free(0, elements.len() + 1)?;
        let start = self.push_cells(&[Cell::Header {
            kind: BoxKind::Tuple,
            size: elements.len() as u32,
        }]);
        for element in elements {
            self.push_cells(&[Cell::Term(*element)]);
        }
        Ok(Term::Tuple(start))
    }

    /// Builds `[e0, e1, ... | tail]`
    pub fn alloc_list(&mut self, elements: &[Term], tail: Term) -> Result<Term, OutOfMemory> {
        self.ensure_free(0, elements.len() * 2)?;
        let mut list = tail;
        for element in elements.iter().rev() {
            let cell = self.push_cells(&[Cell::Term(*element), Cell::Term(list)]);
            list = Term::Cons(cell);
        }
        Ok(list)
    }

    pub fn alloc_binary(&mut self, bytes: &[u8]) -> Result<Term, OutOfMemory> {
        self.ensure_free(0, 1 + bytes.len().div_ceil(WORD_BYTES))?;
        let start = self.push_cells(&[Cell::Header {
            kind: BoxKind::Binary,
            size: bytes.len() as u32,
        }]);
        for chunk in bytes.chunks(WORD_BYTES) {
            let mut word = [0u8; WORD_BYTES];
            word[..chunk.len()].copy_from_slice(chunk);
            self.push_cells(&[Cell::Raw(u32::from_le_bytes(word))]);
        }
        Ok(Term::Binary(start))
    }

    fn header(&self, cell: HeapRef, kind: BoxKind) -> usize {
        match self.cells[cell.offset()] {
            Cell::Header { kind: found, size } if found == kind => size as usize,
            other => panic!(
                "expected {kind:?} header at {}, found {other:?}",
                cell.offset()
            ),
        }
    }

    fn raw_at(&self, offset: usize) -> u32 {
        match self.cells[offset] {
            Cell::Raw(word) => word,
            other => panic!("expected raw word at {offset}, found {other:?}"),
        }
    }

    fn term_at(&self, offset: usize) -> Term {
        match self.cells[offset] {
            Cell::Term(term) => term,
            other => panic!("expected term at {offset}, found {other:?}"),
        }
    }

    /// Payload size in words of a boxed integer: 1 (32-bit) or 2 (64-bit)
    pub fn boxed_size(&self, term: Term) -> usize {
        match term {
            Term::BoxedInt(cell) => self.header(cell, BoxKind::Integer),
            other => panic!("boxed_size on {other:?}"),
        }
    }

    pub fn boxed_int_value(&self, term: Term) -> i64 {
        let Term::BoxedInt(cell) = term else {
            panic!("boxed_int_value on {term:?}");
        };
        let payload = cell.offset() + 1;
        match self.header(cell, BoxKind::Integer) {
            BOXED_TERMS_REQUIRED_FOR_INT => i64::from(self.raw_at(payload).cast_signed()),
            BOXED_TERMS_REQUIRED_FOR_INT64 => {
                let low = u64::from(self.raw_at(payload));
                let high = u64::from(self.raw_at(payload + 1));
                (low | (high << 32)).cast_signed()
            }
            size => panic!("invalid boxed integer size {size}"),
        }
    }

    /// Value of an immediate or boxed integer
    pub fn maybe_unbox_int(&self, term: Term) -> i64 {
        match term {
            Term::Int(value) => i64::from(value.get()),
            Term::BoxedInt(_) => self.boxed_int_value(term),
            other => panic!("maybe_unbox_int on {other:?}"),
        }
    }

    pub fn tuple_arity(&self, term: Term) -> usize {
        match term {
            Term::Tuple(cell) => self.header(cell, BoxKind::Tuple),
            other => panic!("tuple_arity on {other:?}"),
        }
    }

    /// 0-based
    pub fn tuple_element(&self, term: Term, index: usize) -> Term {
        let Term::Tuple(cell) = term else {
            panic!("tuple_element on {term:?}");
        };
        let arity = self.header(cell, BoxKind::Tuple);
        assert!(index < arity, "tuple index {index} out of bounds for arity {arity}");
        self.term_at(cell.offset() + 1 + index)
    }

    pub fn list_head(&self, term: Term) -> Term {
        match term {
            Term::Cons(cell) => self.term_at(cell.offset()),
            other => panic!("list_head on {other:?}"),
        }
    }

    pub fn list_tail(&self, term: Term) -> Term {
        match term {
            Term::Cons(cell) => self.term_at(cell.offset() + 1),
            other => panic!("list_tail on {other:?}"),
        }
    }

    /// Length of a proper list, `None` for improper lists
    pub fn list_length(&self, term: Term) -> Option<usize> {
        let mut length = 0;
        let mut current = term;
        loop {
            match current {
                Term::Nil => return Some(length),
                Term::Cons(_) => {
                    length += 1;
                    current = self.list_tail(current);
                }
                _ => return None,
            }
        }
    }

    pub fn binary_size(&self, term: Term) -> usize {
        match term {
            Term::Binary(cell) => self.header(cell, BoxKind::Binary),
            other => panic!("binary_size on {other:?}"),
        }
    }

    pub fn binary_bytes(&self, term: Term) -> Vec<u8> {
        let Term::Binary(cell) = term else {
            panic!("binary_bytes on {term:?}");
        };
        let size = self.header(cell, BoxKind::Binary);
        let words = size.div_ceil(WORD_BYTES);
        let mut bytes = Vec::with_capacity(words * WORD_BYTES);
        for offset in cell.offset() + 1..cell.offset() + 1 + words {
            bytes.extend_from_slice(&self.raw_at(offset).to_le_bytes());
        }
        bytes.truncate(size);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(max_words: usize) -> ProcessHeap {
        ProcessHeap::new(&HeapCreateInfo {
            initial_words: 16,
            max_words,
        })
    }

    #[test]
    fn boxed_ints_keep_their_width_and_value() {
        let mut heap = heap(64);
        heap.ensure_free(0, BOXED_INT_SIZE).unwrap();
        let small = heap.make_boxed_int(-2_000_000_000);
        heap.ensure_free(0, BOXED_INT64_SIZE).unwrap();
        let wide = heap.make_boxed_int64(-9_000_000_000_000);

        assert_eq!(heap.boxed_size(small), 1);
        assert_eq!(heap.boxed_size(wide), 2);
        assert_eq!(heap.boxed_int_value(small), -2_000_000_000);
        assert_eq!(heap.boxed_int_value(wide), -9_000_000_000_000);
        assert_eq!(heap.maybe_unbox_int(wide), -9_000_000_000_000);
        assert_eq!(heap.maybe_unbox_int(Term::from_int(12)), 12);
        assert_eq!(heap.used_words(), BOXED_INT_SIZE + BOXED_INT64_SIZE);
    }

    #[test]
    fn int64_extremes_roundtrip() {
        let mut heap = heap(64);
        for value in [i64::MIN, i64::MAX, 1 << 32, -(1 << 32)] {
            heap.ensure_free(0, BOXED_INT64_SIZE).unwrap();
            let term = heap.make_boxed_int64(value);
            assert_eq!(heap.boxed_int_value(term), value);
        }
    }

    #[test]
    fn ensure_free_fails_without_touching_the_heap() {
        let mut heap = heap(2);
        assert_eq!(
            heap.ensure_free(1, BOXED_INT64_SIZE),
            Err(OutOfMemory {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(heap.used_words(), 0);
        assert!(heap.ensure_free(1, BOXED_INT_SIZE).is_ok());
    }

    #[test]
    #[should_panic(expected = "without a matching ensure_free")]
    fn writing_unreserved_space_is_a_defect() {
        let mut heap = heap(64);
        heap.make_boxed_int(1 << 30);
    }

    #[test]
    fn tuples_and_lists_read_back() {
        let mut heap = heap(64);
        let tuple = heap
            .alloc_tuple(&[Term::from_int(1), Term::TRUE, Term::Nil])
            .unwrap();
        assert_eq!(heap.tuple_arity(tuple), 3);
        assert_eq!(heap.tuple_element(tuple, 0), Term::from_int(1));
        assert_eq!(heap.tuple_element(tuple, 2), Term::Nil);

        let list = heap
            .alloc_list(&[Term::from_int(1), Term::from_int(2)], Term::Nil)
            .unwrap();
        assert_eq!(heap.list_head(list), Term::from_int(1));
        assert_eq!(heap.list_head(heap.list_tail(list)), Term::from_int(2));
        assert_eq!(heap.list_length(list), Some(2));
        assert_eq!(heap.list_length(Term::Nil), Some(0));

        let improper = heap.alloc_list(&[Term::TRUE], Term::FALSE).unwrap();
        assert_eq!(heap.list_length(improper), None);
    }

    #[test]
    fn binaries_pack_bytes() {
        let mut heap = heap(64);
        let bin = heap.alloc_binary(b"hello").unwrap();
        assert_eq!(heap.binary_size(bin), 5);
        assert_eq!(heap.binary_bytes(bin), b"hello");
        assert_eq!(heap.used_words(), 3);

        let empty = heap.alloc_binary(b"").unwrap();
        assert_eq!(heap.binary_size(empty), 0);
        assert!(heap.binary_bytes(empty).is_empty());
    }

    #[test]
    #[should_panic]
    fn tuple_element_out_of_bounds_is_a_defect() {
        let mut heap = heap(16);
        let tuple = heap.alloc_tuple(&[Term::TRUE]).unwrap();
        heap.tuple_element(tuple, 1);
    }
}
