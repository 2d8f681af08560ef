//! Term comparison.
//!
//! Equality is structural: integers compare by value whatever their representation,
//! aggregates element-wise. Ordering is only defined between integers here, an ordering
//! comparison on anything else is a defect of the caller and panics.
use std::cmp::Ordering;

use crate::{BifResult, Process, ProcessHeap, Term};

pub fn terms_equal(heap: &ProcessHeap, a: Term, b: Term) -> bool {
    let (mut a, mut b) = (a, b);
    loop {
        match (a, b) {
            (Term::Int(_) | Term::BoxedInt(_), Term::Int(_) | Term::BoxedInt(_)) => {
                return heap.maybe_unbox_int(a) == heap.maybe_unbox_int(b);
            }
            (Term::Tuple(_), Term::Tuple(_)) => {
                let arity = heap.tuple_arity(a);
                return arity == heap.tuple_arity(b)
                    && (0..arity).all(|i| {
                        terms_equal(heap, heap.tuple_element(a, i), heap.tuple_element(b, i))
                    });
            }
            // walk the spine instead of recursing on tails
            (Term::Cons(_), Term::Cons(_)) => {
                if !terms_equal(heap, heap.list_head(a), heap.list_head(b)) {
                    return false;
                }
                a = heap.list_tail(a);
                b = heap.list_tail(b);
            }
            (Term::Binary(_), Term::Binary(_)) => {
                return heap.binary_size(a) == heap.binary_size(b)
                    && heap.binary_bytes(a) == heap.binary_bytes(b);
            }
            _ => return a == b,
        }
    }
}

fn integer_order(heap: &ProcessHeap, a: Term, b: Term) -> Ordering {
    if !(a.is_any_integer() && b.is_any_integer()) {
        panic!("ordering comparison is only defined on integers, got {a:?} and {b:?}");
    }
    heap.maybe_unbox_int(a).cmp(&heap.maybe_unbox_int(b))
}

pub fn equal_to_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(terms_equal(&process.heap, a, b)))
}

pub fn not_equal_to_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(!terms_equal(&process.heap, a, b)))
}

// without floats, exact and arithmetic equality agree
pub fn exactly_equal_to_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(terms_equal(&process.heap, a, b)))
}

pub fn exactly_not_equal_to_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(!terms_equal(&process.heap, a, b)))
}

pub fn less_than_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(integer_order(&process.heap, a, b).is_lt()))
}

pub fn greater_than_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(integer_order(&process.heap, a, b).is_gt()))
}

pub fn less_than_or_equal_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(integer_order(&process.heap, a, b).is_le()))
}

pub fn greater_than_or_equal_2(process: &mut Process, a: Term, b: Term) -> BifResult {
    Ok(Term::from_bool(integer_order(&process.heap, a, b).is_ge()))
}
