use std::fmt;

use crate::{AtomTable, ProcessHeap, Term};

/// Erlang-style rendering of a term, boxed values are read from `heap`
pub struct TermDisplay<'a> {
    term: Term,
    heap: &'a ProcessHeap,
    atoms: &'a AtomTable,
}

impl<'a> TermDisplay<'a> {
    pub fn new(term: Term, heap: &'a ProcessHeap, atoms: &'a AtomTable) -> Self {
        Self { term, heap, atoms }
    }

    fn nested(&self, term: Term) -> Self {
        Self::new(term, self.heap, self.atoms)
    }
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heap = self.heap;
        match self.term {
            Term::Int(value) => write!(f, "{}", value.get()),
            Term::BoxedInt(_) => write!(f, "{}", heap.boxed_int_value(self.term)),
            Term::Atom(index) => match self.atoms.name(index) {
                Some(name) => f.write_str(&String::from_utf8_lossy(name)),
                None => write!(f, "#Atom<{}>", index.0),
            },
            Term::Pid(id) => write!(f, "{id}"),
            Term::Reference(value) => write!(f, "#Ref<{value}>"),
            Term::Nil => f.write_str("[]"),
            Term::Cons(_) => {
                f.write_str("[")?;
                let mut current = self.term;
                let mut first = true;
                while let Term::Cons(_) = current {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{}", self.nested(heap.list_head(current)))?;
                    current = heap.list_tail(current);
                }
                if !current.is_nil() {
                    write!(f, "|{}", self.nested(current))?;
                }
                f.write_str("]")
            }
            Term::Tuple(_) => {
                f.write_str("{")?;
                for i in 0..heap.tuple_arity(self.term) {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", self.nested(heap.tuple_element(self.term, i)))?;
                }
                f.write_str("}")
            }
            Term::Binary(_) => {
                f.write_str("<<")?;
                for (i, byte) in heap.binary_bytes(self.term).iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{byte}")?;
                }
                f.write_str(">>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BOXED_INT64_SIZE, HeapCreateInfo, ProcessId};

    #[test]
    fn renders_erlang_syntax() {
        let mut heap = ProcessHeap::new(&HeapCreateInfo::default());
        let mut atoms = AtomTable::new();
        let ok = Term::Atom(atoms.intern(b"ok"));

        heap.ensure_free(0, BOXED_INT64_SIZE).unwrap();
        let big = heap.make_boxed_int64(-(1 << 40));
        let bin = heap.alloc_binary(&[1, 2, 255]).unwrap();
        let list = heap
            .alloc_list(&[Term::from_int(1), Term::from_int(-2)], Term::Nil)
            .unwrap();
        let improper = heap.alloc_list(&[ok], Term::from_int(3)).unwrap();
        let pid = Term::Pid(ProcessId::new(4).unwrap());
        let tuple = heap
            .alloc_tuple(&[ok, big, list, improper, bin, pid, Term::Reference(8), Term::Nil])
            .unwrap();

        assert_eq!(
            TermDisplay::new(tuple, &heap, &atoms).to_string(),
            "{ok,-1099511627776,[1,-2],[ok|3],<<1,2,255>>,<0.4.0>,#Ref<8>,[]}"
        );
        let empty = heap.alloc_tuple(&[]).unwrap();
        assert_eq!(TermDisplay::new(empty, &heap, &atoms).to_string(), "{}");
        assert_eq!(TermDisplay::new(Term::TRUE, &heap, &atoms).to_string(), "true");
    }
}
