use crate::{BifError, BifResult, Process, SmallInt, Term};

fn small_operands(a: Term, b: Term) -> Result<(i32, i32), BifError> {
    match (a, b) {
        (Term::Int(x), Term::Int(y)) => Ok((x.get(), y.get())),
        _ => Err(BifError::Badarith),
    }
}

// and/or/xor/not of two sign-extended values is still sign-extended,
// so these never leave the immediate range
fn bitwise_binop(a: Term, b: Term, op: fn(i32, i32) -> i32) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    Ok(Term::from_int(op(x, y)))
}

pub fn bor_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    bitwise_binop(a, b, |x, y| x | y)
}

pub fn band_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    bitwise_binop(a, b, |x, y| x & y)
}

pub fn bxor_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    bitwise_binop(a, b, |x, y| x ^ y)
}

pub fn bnot_1(_process: &mut Process, _live: usize, a: Term) -> BifResult {
    match a {
        Term::Int(x) => Ok(Term::from_int(!x.get())),
        _ => Err(BifError::Badarith),
    }
}

fn shift_left(value: i32, amount: i32) -> i32 {
    if amount < 0 {
        return shift_right(value, -amount);
    }
    value.checked_shl(amount as u32).unwrap_or(0)
}

fn shift_right(value: i32, amount: i32) -> i32 {
    if amount < 0 {
        return shift_left(value, -amount);
    }
    value
        .checked_shr(amount as u32)
        .unwrap_or(if value < 0 { -1 } else { 0 })
}

// shifts are not overflow checked, the result is truncated to the immediate width
pub fn bsl_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    Ok(Term::Int(SmallInt::truncating(shift_left(x, y))))
}

pub fn bsr_2(_process: &mut Process, _live: usize, a: Term, b: Term) -> BifResult {
    let (x, y) = small_operands(a, b)?;
    Ok(Term::Int(SmallInt::truncating(shift_right(x, y))))
}
