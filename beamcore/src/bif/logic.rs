use crate::{BifError, BifResult, FALSE_ATOM, Process, TRUE_ATOM, Term};

fn as_bool(term: Term) -> Result<bool, BifError> {
    match term.as_atom() {
        Some(TRUE_ATOM) => Ok(true),
        Some(FALSE_ATOM) => Ok(false),
        _ => Err(BifError::Badarg),
    }
}

fn bool_binop(a: Term, b: Term, op: fn(bool, bool) -> bool) -> BifResult {
    let (x, y) = (as_bool(a)?, as_bool(b)?);
    Ok(Term::from_bool(op(x, y)))
}

pub fn not_1(_process: &mut Process, a: Term) -> BifResult {
    as_bool(a).map(|value| Term::from_bool(!value))
}

pub fn and_2(_process: &mut Process, a: Term, b: Term) -> BifResult {
    bool_binop(a, b, |x, y| x && y)
}

pub fn or_2(_process: &mut Process, a: Term, b: Term) -> BifResult {
    bool_binop(a, b, |x, y| x || y)
}

pub fn xor_2(_process: &mut Process, a: Term, b: Term) -> BifResult {
    bool_binop(a, b, |x, y| x != y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeapCreateInfo, ProcessId};

    const T: Term = Term::TRUE;
    const F: Term = Term::FALSE;

    fn process() -> Process {
        Process::new(ProcessId::new(1).unwrap(), &HeapCreateInfo::default())
    }

    #[test]
    fn truth_tables() {
        let mut p = process();
        let cases = [(F, F), (F, T), (T, F), (T, T)];
        let and = [F, F, F, T];
        let or = [F, T, T, T];
        let xor = [F, T, T, F];
        for (i, (a, b)) in cases.into_iter().enumerate() {
            assert_eq!(and_2(&mut p, a, b), Ok(and[i]), "and({a:?}, {b:?})");
            assert_eq!(or_2(&mut p, a, b), Ok(or[i]), "or({a:?}, {b:?})");
            assert_eq!(xor_2(&mut p, a, b), Ok(xor[i]), "xor({a:?}, {b:?})");
        }
        assert_eq!(not_1(&mut p, T), Ok(F));
        assert_eq!(not_1(&mut p, F), Ok(T));
    }

    #[test]
    fn non_booleans_are_badarg() {
        let mut p = process();
        let one = Term::from_int(1);
        assert_eq!(not_1(&mut p, one), Err(BifError::Badarg));
        assert_eq!(not_1(&mut p, Term::ERROR), Err(BifError::Badarg));
        assert_eq!(and_2(&mut p, T, one), Err(BifError::Badarg));
        assert_eq!(and_2(&mut p, F, Term::Nil), Err(BifError::Badarg));
        assert_eq!(or_2(&mut p, one, T), Err(BifError::Badarg));
        assert_eq!(xor_2(&mut p, T, Term::ERROR), Err(BifError::Badarg));
    }
}
