use crate::{BifError, BifResult, Process, Term, bif::arith::make_integer};

pub fn self_0(process: &mut Process) -> BifResult {
    Ok(Term::Pid(process.id()))
}

pub fn byte_size_1(process: &mut Process, live: usize, a: Term) -> BifResult {
    if !a.is_binary() {
        return Err(BifError::Badarg);
    }
    let size = process.heap.binary_size(a);
    make_integer(process, live, size as i64)
}

macro_rules! type_test {
    ($($name:ident => $test:ident),* $(,)?) => {
        $(
            pub fn $name(_process: &mut Process, a: Term) -> BifResult {
                Ok(Term::from_bool(a.$test()))
            }
        )*
    };
}

type_test! {
    is_atom_1 => is_atom,
    is_binary_1 => is_binary,
    // boxed integers are integers too
    is_integer_1 => is_any_integer,
    is_list_1 => is_list,
    is_number_1 => is_any_integer,
    is_pid_1 => is_pid,
    is_reference_1 => is_reference,
    is_tuple_1 => is_tuple,
}

pub fn length_1(process: &mut Process, live: usize, a: Term) -> BifResult {
    if !a.is_list() {
        return Err(BifError::Badarg);
    }
    let Some(length) = process.heap.list_length(a) else {
        log::trace!(target: "bif", "length of improper list {a:?}");
        return Err(BifError::Badarg);
    };
    make_integer(process, live, length as i64)
}

pub fn hd_1(process: &mut Process, a: Term) -> BifResult {
    if !a.is_nonempty_list() {
        return Err(BifError::Badarg);
    }
    Ok(process.heap.list_head(a))
}

pub fn tl_1(process: &mut Process, a: Term) -> BifResult {
    if !a.is_nonempty_list() {
        return Err(BifError::Badarg);
    }
    Ok(process.heap.list_tail(a))
}

/// element(Index, Tuple), Index is 1-based
pub fn element_2(process: &mut Process, index: Term, tuple: Term) -> BifResult {
    let (Some(index), true) = (index.to_int(), tuple.is_tuple()) else {
        return Err(BifError::Badarg);
    };
    let arity = process.heap.tuple_arity(tuple);
    match usize::try_from(index) {
        Ok(index) if (1..=arity).contains(&index) => {
            Ok(process.heap.tuple_element(tuple, index - 1))
        }
        _ => Err(BifError::Badarg),
    }
}

pub fn tuple_size_1(process: &mut Process, a: Term) -> BifResult {
    if !a.is_tuple() {
        return Err(BifError::Badarg);
    }
    let arity = process.heap.tuple_arity(a);
    // arities are bounded by the heap size, far below the immediate range
    Term::try_from_int(arity as i64).ok_or(BifError::Badarg)
}
