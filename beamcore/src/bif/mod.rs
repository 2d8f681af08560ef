use std::{fmt, io::Write};

use crate::{AtomIndex, AtomTable, BifResult, Process, Term};

pub mod arith;
pub mod bitwise;
pub mod compare;
pub mod general;
pub mod logic;

/// Longest "module:function/arity" key accepted by `lookup_bif`
pub const MAX_BIF_NAME_LEN: usize = 260;

/// A built-in function, by calling convention.
/// The `GcBif*` shapes may allocate and receive the live register count for `ensure_free`.
#[derive(Clone, Copy)]
pub enum BifImpl {
    Bif0(fn(&mut Process) -> BifResult),
    Bif1(fn(&mut Process, Term) -> BifResult),
    Bif2(fn(&mut Process, Term, Term) -> BifResult),
    GcBif1(fn(&mut Process, usize, Term) -> BifResult),
    GcBif2(fn(&mut Process, usize, Term, Term) -> BifResult),
}

impl BifImpl {
    pub const fn arity(&self) -> usize {
        match self {
            BifImpl::Bif0(_) => 0,
            BifImpl::Bif1(_) | BifImpl::GcBif1(_) => 1,
            BifImpl::Bif2(_) | BifImpl::GcBif2(_) => 2,
        }
    }

    pub fn call(self, process: &mut Process, live: usize, args: &[Term]) -> BifResult {
        assert_eq!(
            args.len(),
            self.arity(),
            "bif called with the wrong number of arguments"
        );
        match self {
            BifImpl::Bif0(f) => f(process),
            BifImpl::Bif1(f) => f(process, args[0]),
            BifImpl::Bif2(f) => f(process, args[0], args[1]),
            BifImpl::GcBif1(f) => f(process, live, args[0]),
            BifImpl::GcBif2(f) => f(process, live, args[0], args[1]),
        }
    }
}

impl fmt::Debug for BifImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            BifImpl::Bif0(_) => "Bif0",
            BifImpl::Bif1(_) => "Bif1",
            BifImpl::Bif2(_) => "Bif2",
            BifImpl::GcBif1(_) => "GcBif1",
            BifImpl::GcBif2(_) => "GcBif2",
        };
        f.write_str(shape)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BifEntry {
    pub name: &'static str,
    pub bif: BifImpl,
}

impl BifEntry {
    pub const fn new(name: &'static str, bif: BifImpl) -> Self {
        Self { name, bif }
    }
}

// sorted by name bytes, lookup is a binary search
pub const BIFS: &[BifEntry] = &[
    BifEntry::new("erlang:*/2", BifImpl::GcBif2(arith::mul_2)),
    BifEntry::new("erlang:+/2", BifImpl::GcBif2(arith::add_2)),
    BifEntry::new("erlang:-/1", BifImpl::GcBif1(arith::neg_1)),
    BifEntry::new("erlang:-/2", BifImpl::GcBif2(arith::sub_2)),
    BifEntry::new("erlang:/=/2", BifImpl::Bif2(compare::not_equal_to_2)),
    BifEntry::new("erlang:</2", BifImpl::Bif2(compare::less_than_2)),
    BifEntry::new("erlang:=/=/2", BifImpl::Bif2(compare::exactly_not_equal_to_2)),
    BifEntry::new("erlang:=:=/2", BifImpl::Bif2(compare::exactly_equal_to_2)),
    BifEntry::new("erlang:=</2", BifImpl::Bif2(compare::less_than_or_equal_2)),
    BifEntry::new("erlang:==/2", BifImpl::Bif2(compare::equal_to_2)),
    BifEntry::new("erlang:>/2", BifImpl::Bif2(compare::greater_than_2)),
    BifEntry::new("erlang:>=/2", BifImpl::Bif2(compare::greater_than_or_equal_2)),
    BifEntry::new("erlang:abs/1", BifImpl::GcBif1(arith::abs_1)),
    BifEntry::new("erlang:and/2", BifImpl::Bif2(logic::and_2)),
    BifEntry::new("erlang:band/2", BifImpl::GcBif2(bitwise::band_2)),
    BifEntry::new("erlang:bnot/1", BifImpl::GcBif1(bitwise::bnot_1)),
    BifEntry::new("erlang:bor/2", BifImpl::GcBif2(bitwise::bor_2)),
    BifEntry::new("erlang:bsl/2", BifImpl::GcBif2(bitwise::bsl_2)),
    BifEntry::new("erlang:bsr/2", BifImpl::GcBif2(bitwise::bsr_2)),
    BifEntry::new("erlang:bxor/2", BifImpl::GcBif2(bitwise::bxor_2)),
    BifEntry::new("erlang:byte_size/1", BifImpl::GcBif1(general::byte_size_1)),
    BifEntry::new("erlang:div/2", BifImpl::GcBif2(arith::div_2)),
    BifEntry::new("erlang:element/2", BifImpl::Bif2(general::element_2)),
    BifEntry::new("erlang:hd/1", BifImpl::Bif1(general::hd_1)),
    BifEntry::new("erlang:is_atom/1", BifImpl::Bif1(general::is_atom_1)),
    BifEntry::new("erlang:is_binary/1", BifImpl::Bif1(general::is_binary_1)),
    BifEntry::new("erlang:is_integer/1", BifImpl::Bif1(general::is_integer_1)),
    BifEntry::new("erlang:is_list/1", BifImpl::Bif1(general::is_list_1)),
    BifEntry::new("erlang:is_number/1", BifImpl::Bif1(general::is_number_1)),
    BifEntry::new("erlang:is_pid/1", BifImpl::Bif1(general::is_pid_1)),
    BifEntry::new("erlang:is_reference/1", BifImpl::Bif1(general::is_reference_1)),
    BifEntry::new("erlang:is_tuple/1", BifImpl::Bif1(general::is_tuple_1)),
    BifEntry::new("erlang:length/1", BifImpl::GcBif1(general::length_1)),
    BifEntry::new("erlang:not/1", BifImpl::Bif1(logic::not_1)),
    BifEntry::new("erlang:or/2", BifImpl::Bif2(logic::or_2)),
    BifEntry::new("erlang:rem/2", BifImpl::GcBif2(arith::rem_2)),
    BifEntry::new("erlang:self/0", BifImpl::Bif0(general::self_0)),
    BifEntry::new("erlang:tl/1", BifImpl::Bif1(general::tl_1)),
    BifEntry::new("erlang:tuple_size/1", BifImpl::Bif1(general::tuple_size_1)),
    BifEntry::new("erlang:xor/2", BifImpl::Bif2(logic::xor_2)),
];

/// Renders "module:function/arity" into `buf`, `None` if it does not fit
fn write_mfa<'a>(
    buf: &'a mut [u8; MAX_BIF_NAME_LEN],
    module: &[u8],
    function: &[u8],
    arity: usize,
) -> Option<&'a [u8]> {
    let mut cursor: &mut [u8] = &mut buf[..];
    cursor.write_all(module).ok()?;
    cursor.write_all(b":").ok()?;
    cursor.write_all(function).ok()?;
    write!(cursor, "/{arity}").ok()?;
    let written = MAX_BIF_NAME_LEN - cursor.len();
    Some(&buf[..written])
}

pub fn lookup_bif(module: &[u8], function: &[u8], arity: usize) -> Option<BifImpl> {
    let mut buf = [0u8; MAX_BIF_NAME_LEN];
    let key = write_mfa(&mut buf, module, function, arity)?;
    BIFS.binary_search_by(|entry| entry.name.as_bytes().cmp(key))
        .ok()
        .map(|index| BIFS[index].bif)
}

pub fn lookup_bif_by_atoms(
    atoms: &AtomTable,
    module: AtomIndex,
    function: AtomIndex,
    arity: usize,
) -> Option<BifImpl> {
    lookup_bif(atoms.name(module)?, atoms.name(function)?, arity)
}
