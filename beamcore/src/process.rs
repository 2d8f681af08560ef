use crate::{BifError, BifImpl, HeapCreateInfo, ProcessHeap, ProcessId, Term};

pub const REGISTER_COUNT: usize = 16;

/// One actor: identity, x registers and its own heap
#[derive(Debug)]
pub struct Process {
    id: ProcessId,
    pub x: [Term; REGISTER_COUNT],
    pub heap: ProcessHeap,
}

impl Process {
    pub fn new(id: ProcessId, heap: &HeapCreateInfo) -> Self {
        Self {
            id,
            x: [Term::Nil; REGISTER_COUNT],
            heap: ProcessHeap::new(heap),
        }
    }

    #[inline]
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// error convention: x[0] = error, x[1] = kind
    pub fn raise(&mut self, err: BifError) {
        self.x[0] = Term::ERROR;
        self.x[1] = Term::Atom(err.atom());
    }

    /// The error kind raised by the last `call_bif`, `None` if it succeeded
    pub fn raised_error(&self) -> Option<BifError> {
        if self.x[0] != Term::ERROR {
            return None;
        }
        self.x[1].as_atom().and_then(BifError::from_atom)
    }

    /// Entry point for the interpreter.
    /// `None` is the invalid term: the error kind has been written to x[0]/x[1].
    pub fn call_bif(&mut self, bif: BifImpl, live: usize, args: &[Term]) -> Option<Term> {
        match bif.call(self, live, args) {
            Ok(term) => {
                // drop the marker of an earlier failure
                if self.x[0] == Term::ERROR {
                    self.x[0] = Term::Nil;
                }
                Some(term)
            }
            Err(err) => {
                log::trace!(target: "bif", "{} raised {err}", self.id);
                self.raise(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_bif;

    fn process() -> Process {
        Process::new(ProcessId::new(1).unwrap(), &HeapCreateInfo::default())
    }

    #[test]
    fn call_bif_returns_result_and_leaves_registers() {
        let mut p = process();
        let add = lookup_bif(b"erlang", b"+", 2).unwrap();
        let res = p.call_bif(add, 2, &[Term::from_int(2), Term::from_int(3)]);
        assert_eq!(res, Some(Term::from_int(5)));
        assert_eq!(p.x[0], Term::Nil);
        assert_eq!(p.raised_error(), None);
    }

    #[test]
    fn call_bif_error_uses_register_convention() {
        let mut p = process();
        let div = lookup_bif(b"erlang", b"div", 2).unwrap();
        let res = p.call_bif(div, 2, &[Term::from_int(2), Term::from_int(0)]);
        assert_eq!(res, None);
        assert_eq!(p.x[0], Term::ERROR);
        assert_eq!(p.x[1], Term::BADARITH);
        assert_eq!(p.raised_error(), Some(BifError::Badarith));
    }

    #[test]
    fn success_after_failure_clears_the_error() {
        let mut p = process();
        let div = lookup_bif(b"erlang", b"div", 2).unwrap();
        assert_eq!(p.call_bif(div, 2, &[Term::from_int(1), Term::from_int(0)]), None);
        assert_eq!(p.raised_error(), Some(BifError::Badarith));

        let bif = lookup_bif(b"erlang", b"self", 0).unwrap();
        assert_eq!(p.call_bif(bif, 0, &[]), Some(Term::Pid(p.id())));
        assert_eq!(p.raised_error(), None);
        assert_eq!(p.x[0], Term::Nil);
    }

    #[test]
    fn self_is_the_process_pid() {
        let mut p = process();
        let bif = lookup_bif(b"erlang", b"self", 0).unwrap();
        assert_eq!(p.call_bif(bif, 0, &[]), Some(Term::Pid(p.id())));
    }
}
