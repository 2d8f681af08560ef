//! Term: the uniform value of the runtime.
//!
//! Immediates (small integers, atoms, pids, references, nil) carry their value inline.
//! Boxed integers, tuples, cons cells and binaries are `HeapRef`s into the heap of the
//! process that owns them, see `heap.rs` for the cell layouts.
//!
//! SmallInt: an integer that fits the immediate range. A term word is 32 bits wide and
//! sacrifices `TAG_BITS` of them, which leaves 28 signed bits for the value.
use std::{fmt, num::NonZeroU32};

use crate::{
    BADARG_ATOM, BADARITH_ATOM, ERROR_ATOM, FALSE_ATOM, OUT_OF_MEMORY_ATOM, OVERFLOW_ATOM,
    TRUE_ATOM,
};

pub const TAG_BITS: u32 = 4;

pub const MAX_NOT_BOXED_INT: i32 = (1 << (31 - TAG_BITS)) - 1;
pub const MIN_NOT_BOXED_INT: i32 = -(1 << (31 - TAG_BITS));

/// Index into the atom table
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomIndex(pub u32);

/// Local process identity, 0 is reserved as "no process"
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(NonZeroU32);

/// Word offset of a cell inside a process heap
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HeapRef(u32);

/// A signed integer inside `[MIN_NOT_BOXED_INT, MAX_NOT_BOXED_INT]`
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SmallInt(i32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Int(SmallInt),
    BoxedInt(HeapRef),
    Atom(AtomIndex),
    Pid(ProcessId),
    Reference(u64),
    Nil,
    Cons(HeapRef),
    Tuple(HeapRef),
    Binary(HeapRef),
}

impl ProcessId {
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<0.{}.0>", self.get())
    }
}

impl HeapRef {
    #[inline]
    pub(crate) fn new(offset: usize) -> Self {
        debug_assert!(offset <= u32::MAX as usize, "heap offset out of range");
        Self(offset as u32)
    }

    #[inline]
    pub fn offset(self) -> usize {
        self.0 as usize
    }
}

impl SmallInt {
    pub const MIN: SmallInt = SmallInt(MIN_NOT_BOXED_INT);
    pub const MAX: SmallInt = SmallInt(MAX_NOT_BOXED_INT);
    pub const ZERO: SmallInt = SmallInt(0);

    pub const fn new(value: i64) -> Option<Self> {
        if value >= MIN_NOT_BOXED_INT as i64 && value <= MAX_NOT_BOXED_INT as i64 {
            Some(Self(value as i32))
        } else {
            None
        }
    }

    /// Drops the bits that do not survive tagging, the same way storing a native
    /// 32-bit value into a term word does.
    #[inline]
    pub const fn truncating(value: i32) -> Self {
        Self((value << TAG_BITS) >> TAG_BITS)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Self::new(i64::from(self.0) + i64::from(other.0))
    }

    #[inline]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Self::new(i64::from(self.0) - i64::from(other.0))
    }

    #[inline]
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        Self::new(i64::from(self.0) * i64::from(other.0))
    }
}

impl Term {
    pub const TRUE: Term = Term::Atom(TRUE_ATOM);
    pub const FALSE: Term = Term::Atom(FALSE_ATOM);
    pub const ERROR: Term = Term::Atom(ERROR_ATOM);
    pub const BADARG: Term = Term::Atom(BADARG_ATOM);
    pub const BADARITH: Term = Term::Atom(BADARITH_ATOM);
    pub const OVERFLOW: Term = Term::Atom(OVERFLOW_ATOM);
    pub const OUT_OF_MEMORY: Term = Term::Atom(OUT_OF_MEMORY_ATOM);

    /// Encode an immediate integer.
    /// Panics if `value` is outside the immediate range, use `try_from_int` for values
    /// that may need boxing.
    pub fn from_int(value: i32) -> Self {
        match SmallInt::new(i64::from(value)) {
            Some(small) => Term::Int(small),
            None => panic!("{value} is outside the immediate integer range"),
        }
    }

    pub fn try_from_int(value: i64) -> Option<Self> {
        SmallInt::new(value).map(Term::Int)
    }

    /// Decode an immediate integer
    #[inline]
    pub fn to_int(self) -> Option<i32> {
        self.as_small().map(SmallInt::get)
    }

    #[inline]
    pub fn as_small(self) -> Option<SmallInt> {
        match self {
            Term::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value { Term::TRUE } else { Term::FALSE }
    }

    pub fn atom(index: AtomIndex) -> Self {
        Term::Atom(index)
    }

    pub fn pid(id: ProcessId) -> Self {
        Term::Pid(id)
    }

    /// Immediate integers only
    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, Term::Int(_))
    }

    #[inline]
    pub fn is_boxed_integer(self) -> bool {
        matches!(self, Term::BoxedInt(_))
    }

    #[inline]
    pub fn is_any_integer(self) -> bool {
        self.is_integer() || self.is_boxed_integer()
    }

    #[inline]
    pub fn is_atom(self) -> bool {
        matches!(self, Term::Atom(_))
    }

    #[inline]
    pub fn is_boolean(self) -> bool {
        self == Term::TRUE || self == Term::FALSE
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        matches!(self, Term::Binary(_))
    }

    #[inline]
    pub fn is_list(self) -> bool {
        matches!(self, Term::Nil | Term::Cons(_))
    }

    #[inline]
    pub fn is_nonempty_list(self) -> bool {
        matches!(self, Term::Cons(_))
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self == Term::Nil
    }

    #[inline]
    pub fn is_pid(self) -> bool {
        matches!(self, Term::Pid(_))
    }

    #[inline]
    pub fn is_reference(self) -> bool {
        matches!(self, Term::Reference(_))
    }

    #[inline]
    pub fn is_tuple(self) -> bool {
        matches!(self, Term::Tuple(_))
    }

    pub fn as_atom(self) -> Option<AtomIndex> {
        match self {
            Term::Atom(index) => Some(index),
            _ => None,
        }
    }

    pub fn as_pid(self) -> Option<ProcessId> {
        match self {
            Term::Pid(id) => Some(id),
            _ => None,
        }
    }
}

impl From<SmallInt> for Term {
    fn from(value: SmallInt) -> Self {
        Term::Int(value)
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::from_bool(value)
    }
}

impl From<AtomIndex> for Term {
    fn from(value: AtomIndex) -> Self {
        Term::Atom(value)
    }
}

impl From<ProcessId> for Term {
    fn from(value: ProcessId) -> Self {
        Term::Pid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_range_matches_tag_width() {
        assert_eq!(MAX_NOT_BOXED_INT, 134_217_727);
        assert_eq!(MIN_NOT_BOXED_INT, -134_217_728);
    }

    #[test]
    fn encode_decode_immediate_roundtrip() {
        let samples = [
            MIN_NOT_BOXED_INT,
            MIN_NOT_BOXED_INT + 1,
            -65_536,
            -1,
            0,
            1,
            42,
            MAX_NOT_BOXED_INT - 1,
            MAX_NOT_BOXED_INT,
        ];
        for value in samples {
            let term = Term::from_int(value);
            assert!(term.is_integer());
            assert_eq!(term.to_int(), Some(value));
        }

        for value in (MIN_NOT_BOXED_INT..=MAX_NOT_BOXED_INT).step_by(9_973) {
            assert_eq!(Term::from_int(value).to_int(), Some(value));
        }
    }

    #[test]
    fn try_from_int_rejects_values_needing_a_box() {
        assert!(Term::try_from_int(i64::from(MAX_NOT_BOXED_INT) + 1).is_none());
        assert!(Term::try_from_int(i64::from(MIN_NOT_BOXED_INT) - 1).is_none());
        assert!(Term::try_from_int(i64::MAX).is_none());
        assert_eq!(Term::try_from_int(-5).and_then(Term::to_int), Some(-5));
    }

    #[test]
    #[should_panic]
    fn from_int_out_of_range_is_a_defect() {
        let _ = Term::from_int(MAX_NOT_BOXED_INT + 1);
    }

    #[test]
    fn truncating_keeps_low_bits_sign_extended() {
        assert_eq!(SmallInt::truncating(5).get(), 5);
        assert_eq!(SmallInt::truncating(-5).get(), -5);
        assert_eq!(SmallInt::truncating(MAX_NOT_BOXED_INT + 1).get(), MIN_NOT_BOXED_INT);
        assert_eq!(SmallInt::truncating(1 << 28).get(), 0);
    }

    #[test]
    fn small_int_checked_ops_stay_in_range() {
        let one = SmallInt::new(1).unwrap();
        assert_eq!(SmallInt::MAX.checked_add(one), None);
        assert_eq!(SmallInt::MIN.checked_sub(one), None);
        assert_eq!(
            SmallInt::new(10_000).unwrap().checked_mul(SmallInt::new(10_000).unwrap()),
            Some(SmallInt::new(100_000_000).unwrap())
        );
        assert_eq!(
            SmallInt::new(20_000).unwrap().checked_mul(SmallInt::new(20_000).unwrap()),
            None
        );
    }

    #[test]
    fn predicates_are_mutually_exclusive() {
        let pid = ProcessId::new(3).unwrap();
        let terms = [
            Term::from_int(7),
            Term::BoxedInt(HeapRef::new(0)),
            Term::TRUE,
            Term::Pid(pid),
            Term::Reference(9),
            Term::Nil,
            Term::Cons(HeapRef::new(2)),
            Term::Tuple(HeapRef::new(4)),
            Term::Binary(HeapRef::new(6)),
        ];
        for term in terms {
            let hits = [
                term.is_integer(),
                term.is_boxed_integer(),
                term.is_atom(),
                term.is_pid(),
                term.is_reference(),
                term.is_nil(),
                term.is_nonempty_list(),
                term.is_tuple(),
                term.is_binary(),
            ];
            assert_eq!(
                hits.iter().filter(|hit| **hit).count(),
                1,
                "{term:?} must decode to exactly one variant"
            );
        }
        assert!(Term::Nil.is_list());
        assert!(Term::Cons(HeapRef::new(0)).is_list());
    }

    #[test]
    fn booleans_are_atoms() {
        assert!(Term::TRUE.is_boolean());
        assert!(Term::FALSE.is_boolean());
        assert!(!Term::ERROR.is_boolean());
        assert_eq!(Term::from(true), Term::TRUE);
        assert_eq!(Term::from_bool(false), Term::FALSE);
    }

    #[test]
    fn process_id_zero_is_reserved() {
        assert!(ProcessId::new(0).is_none());
        let pid = ProcessId::new(5).unwrap();
        assert_eq!(pid.get(), 5);
        assert_eq!(pid.to_string(), "<0.5.0>");
    }
}
