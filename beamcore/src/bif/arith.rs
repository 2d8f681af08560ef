//! Integer arithmetic.
//!
//! add and mul promote: results that leave the immediate range are boxed with the
//! narrowest sufficient width. sub, div, neg and abs only operate on immediates and
//! report `overflow` instead.
use crate::{
    BOXED_INT_SIZE, BOXED_INT64_SIZE, BifError, BifResult, MAX_NOT_BOXED_INT, Process,
    ProcessHeap, SmallInt, Term,
};

#[derive(Debug, Copy, Clone)]
enum PromotingOp {
    Add,
    Mul,
}

impl PromotingOp {
    fn checked_i32(self, a: i32, b: i32) -> Option<i32> {
        match self {
            PromotingOp::Add => a.checked_add(b),
            PromotingOp::Mul => a.checked_mul(b),
        }
    }

    // exact for 32-bit operands
    fn wide(self, a: i32, b: i32) -> i64 {
        let (a, b) = (i64::from(a), i64::from(b));
        match self {
            PromotingOp::Add => a + b,
            PromotingOp::Mul => a * b,
        }
    }

    fn checked_i64(self, a: i64, b: i64) -> Option<i64> {
        match self {
            PromotingOp::Add => a.checked_add(b),
            PromotingOp::Mul => a.checked_mul(b),
        }
    }
}

/// Build an integer term in the narrowest representation: immediate, 32-bit or 64-bit box
pub fn make_integer(process: &mut Process, live: usize, value: i64) -> BifResult {
    if let Some(term) = Term::try_from_int(value) {
        return Ok(term);
    }
    match i32::try_from(value) {
        Ok(value) => {
            process.heap.ensure_free(live, BOXED_INT_SIZE)?;
            Ok(process.heap.make_boxed_int(value))
        }
        Err(_) => {
            process.heap.ensure_free(live, BOXED_INT64_SIZE)?;
            Ok(process.heap.make_boxed_int64(value))
        }
    }
}

fn size_class(heap: &ProcessHeap, a: Term, b: Term) -> Result<usize, BifError> {
    let class = |term: Term| match term {
        Term::Int(_) => Ok(0),
        Term::BoxedInt(_) => Ok(heap.boxed_size(term)),
        _ => Err(BifError::Badarith),
    };
    match (class(a), class(b)) {
        (Ok(a), Ok(b)) => Ok(a | b),
        _ => {
            log::trace!(target: "bif", "error: arg1: {a:?}, arg2: {b:?}");
            Err(BifError::Badarith)
        }
    }
}

fn boxed_op(process: &mut Process, live: usize, a: Term, b: Term, op: PromotingOp) -> BifResult {
    match size_class(&process.heap, a, b)? {
        0 => unreachable!("two immediates must take the fast path"),
        1 => {
            // both fit 32 bits
            let x = process.heap.maybe_unbox_int(a) as i32;
            let y = process.heap.maybe_unbox_int(b) as i32;
            match op.checked_i32(x, y) {
                Some(res) => make_integer(process, live, i64::from(res)),
                None => {
                    let res = op.wide(x, y);
                    process.heap.ensure_free(live, BOXED_INT64_SIZE)?;
                    Ok(process.heap.make_boxed_int64(res))
                }
            }
        }
        2 | 3 => {
            let x = process.heap.maybe_unbox_int(a);
            let y = process.heap.maybe_unbox_int(b);
            match op.checked_i64(x, y) {
                Some(res) => make_integer(process, live, res),
                None => {
                    log::trace!(target: "bif", "overflow: {op:?} {x} {y} exceeds 64 bits");
                    Err(BifError::Overflow)
                }
            }
        }
        class => unreachable!("invalid boxed size class {class}"),
    }
}

fn small_operands(a: Term, b: Term) -> Result<(SmallInt, SmallInt), BifError> {
    match (a, b) {
        (Term::Int(x), Term::Int(y)) => Ok((x, y)),
        _ => {
            log::trace!(target: "bif", "error: arg1: {a:?}, arg2: {b:?}");
            Err(BifError::Badarith)
        }
    }
}

pub fn add_2(process: &mut Process, live: usize, a: Term, b: Term) -> BifResult {
    if let (Term::Int(x), Term::Int(y)) = (a, b) {
        return match x.checked_add(y) {
            Some(res) => Ok(Term::Int(res)),
            None => make_integer(process, live, i64::from(x.get()) + i64::from(y.get())),
        };
    }
    boxed_op(process, live, a, b, PromotingOp::Add)
}

pub fn sub_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    match x.checked_sub(y) {
        Some(res) => Ok(Term::Int(res)),
        None => {
            log::trace!(target: "bif", "overflow: arg1: {a:?}, arg2: {b:?}");
            Err(BifError::Overflow)
        }
    }
}

pub fn mul_2(process: &mut Process, live: usize, a: Term, b: Term) -> BifResult {
    if let (Term::Int(x), Term::Int(y)) = (a, b) {
        return match x.checked_mul(y) {
            Some(res) => Ok(Term::Int(res)),
            None => make_integer(process, live, i64::from(x.get()) * i64::from(y.get())),
        };
    }
    boxed_op(process, live, a, b, PromotingOp::Mul)
}

/// Truncates toward zero
pub fn div_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    if y.get() == 0 {
        return Err(BifError::Badarith);
    }
    let res = x.get() / y.get();
    if res > MAX_NOT_BOXED_INT {
        log::trace!(target: "bif", "overflow: arg1: {a:?}, arg2: {b:?}");
        return Err(BifError::Overflow);
    }
    Ok(Term::from_int(res))
}

/// Sign of the dividend
pub fn rem_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    if y.get() == 0 {
        return Err(BifError::Badarith);
    }
    Ok(Term::from_int(x.get() % y.get()))
}

pub fn neg_1(_process: &mut Process, _live: usize, a: Term) -> BifResult {
    let Term::Int(x) = a else {
        log::trace!(target: "bif", "error: arg1: {a:?}");
        return Err(BifError::Badarith);
    };
    SmallInt::ZERO
        .checked_sub(x)
        .map(Term::Int)
        .ok_or(BifError::Overflow)
}

// abs/1 is a function, not an operator: non-integers are badarg
pub fn abs_1(_process: &mut Process, _live: usize, a: Term) -> BifResult {
    let Term::Int(x) = a else {
        log::trace!(target: "bif", "error: arg1: {a:?}");
        return Err(BifError::Badarg);
    };
    if x.get() >= 0 {
        return Ok(a);
    }
    SmallInt::ZERO
        .checked_sub(x)
        .map(Term::Int)
        .ok_or(BifError::Overflow)
}
