use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::{
    AtomIndex, AtomTable, CallError, ContextError, GlobalContext, HeapCreateInfo, Process,
    ProcessId, Term, TermDisplay, lookup_bif_by_atoms,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct VMCreateInfo {
    pub heap: HeapCreateInfo,
}

#[derive(Debug)]
pub struct VMShared {
    pub info: VMCreateInfo,
    pub global: Mutex<GlobalContext>,
    pub atoms: RwLock<AtomTable>,
}

impl Drop for VMShared {
    fn drop(&mut self) {
        std::mem::take(self.global.get_mut()).destroy();
    }
}

#[derive(Debug)]
pub struct VM {
    inner: Arc<VMShared>,
}

/// Cheap handle onto a running `VM`, every proxy sees the same context
#[derive(Debug, Clone)]
pub struct VMProxy {
    pub shared: Arc<VMShared>,
}

impl VM {
    pub fn new(info: VMCreateInfo) -> Self {
        let inner = VMShared {
            info,
            global: Mutex::new(GlobalContext::new()),
            atoms: RwLock::new(AtomTable::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn new_proxy(&self) -> VMProxy {
        VMProxy {
            shared: self.inner.clone(),
        }
    }
}

impl VMProxy {
    pub fn create_proxy(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }

    pub fn spawn(&self) -> Result<ProcessId, ContextError> {
        self.shared.global.lock().spawn(&self.shared.info.heap)
    }

    /// Drops the process together with its name bindings, `false` if it did not exist
    pub fn exit(&self, pid: ProcessId) -> bool {
        self.shared.global.lock().remove_process(pid).is_some()
    }

    pub fn intern(&self, name: &[u8]) -> AtomIndex {
        self.shared.atoms.write().intern(name)
    }

    pub fn register(&self, name: AtomIndex, pid: ProcessId) -> Result<(), ContextError> {
        self.shared.global.lock().register_name(name, pid)
    }

    pub fn whereis(&self, name: AtomIndex) -> Option<ProcessId> {
        self.shared.global.lock().resolve_name(name)
    }

    /// Run `f` against the process while holding the context lock
    pub fn with_process<R>(&self, pid: ProcessId, f: impl FnOnce(&mut Process) -> R) -> Option<R> {
        let mut global = self.shared.global.lock();
        global.find_process_mut(pid).map(f)
    }

    /// Apply `module:function/args.len()` inside `pid`.
    /// Boxed arguments must live on that process's heap.
    pub fn call(
        &self,
        pid: ProcessId,
        module: AtomIndex,
        function: AtomIndex,
        args: &[Term],
    ) -> Result<Term, CallError> {
        let bif = {
            let atoms = self.shared.atoms.read();
            lookup_bif_by_atoms(&atoms, module, function, args.len()).ok_or_else(|| {
                let lossy = |atom| {
                    String::from_utf8_lossy(atoms.name(atom).unwrap_or_default()).into_owned()
                };
                CallError::UnknownBif {
                    module: lossy(module),
                    function: lossy(function),
                    arity: args.len(),
                }
            })?
        };

        let mut global = self.shared.global.lock();
        let process = global
            .find_process_mut(pid)
            .ok_or(CallError::NoSuchProcess(pid))?;
        process.x[..args.len()].copy_from_slice(args);
        process
            .call_bif(bif, args.len(), args)
            .ok_or_else(|| match process.raised_error() {
                Some(err) => CallError::Raised(err),
                None => unreachable!("failed bif call left no error in the registers"),
            })
    }

    /// Render a term owned by `pid`
    pub fn display(&self, pid: ProcessId, term: Term) -> Option<String> {
        let atoms = self.shared.atoms.read();
        self.with_process(pid, |process| {
            TermDisplay::new(term, &process.heap, &atoms).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BifError, ERLANG_ATOM, bif::arith::make_integer};

    fn vm() -> VM {
        VM::new(VMCreateInfo::default())
    }

    #[test]
    fn proxies_share_the_context() {
        let vm = vm();
        let first = vm.new_proxy();
        let second = first.create_proxy();

        let pid = first.spawn().unwrap();
        let name = second.intern(b"logger");
        assert_eq!(first.intern(b"logger"), name);
        second.register(name, pid).unwrap();
        assert_eq!(first.whereis(name), Some(pid));

        assert!(second.exit(pid));
        assert_eq!(first.whereis(name), None);
        assert!(!first.exit(pid));
    }

    #[test]
    fn call_runs_bifs_on_the_process() {
        let proxy = vm().new_proxy();
        let pid = proxy.spawn().unwrap();
        let plus = proxy.intern(b"+");
        let res = proxy.call(pid, ERLANG_ATOM, plus, &[Term::from_int(2), Term::from_int(40)]);
        assert_eq!(res, Ok(Term::from_int(42)));

        let this = proxy.intern(b"self");
        assert_eq!(proxy.call(pid, ERLANG_ATOM, this, &[]), Ok(Term::Pid(pid)));
    }

    #[test]
    fn call_reports_raised_errors() {
        let proxy = vm().new_proxy();
        let pid = proxy.spawn().unwrap();
        let div = proxy.intern(b"div");
        let res = proxy.call(pid, ERLANG_ATOM, div, &[Term::from_int(1), Term::from_int(0)]);
        assert_eq!(res, Err(CallError::Raised(BifError::Badarith)));
        let kind = proxy.with_process(pid, |p| p.raised_error());
        assert_eq!(kind, Some(Some(BifError::Badarith)));
    }

    #[test]
    fn call_reports_unknown_bifs_and_processes() {
        let proxy = vm().new_proxy();
        let pid = proxy.spawn().unwrap();
        let nope = proxy.intern(b"nope");
        assert_eq!(
            proxy.call(pid, ERLANG_ATOM, nope, &[Term::Nil]),
            Err(CallError::UnknownBif {
                module: "erlang".into(),
                function: "nope".into(),
                arity: 1,
            })
        );

        let plus = proxy.intern(b"+");
        let ghost = ProcessId::new(77).unwrap();
        assert_eq!(
            proxy.call(ghost, ERLANG_ATOM, plus, &[Term::from_int(1), Term::from_int(1)]),
            Err(CallError::NoSuchProcess(ghost))
        );
    }

    #[test]
    fn boxed_results_are_displayed_from_the_owner_heap() {
        let proxy = vm().new_proxy();
        let pid = proxy.spawn().unwrap();
        let big = proxy
            .with_process(pid, |p| make_integer(p, 0, 1 << 40))
            .unwrap()
            .unwrap();
        let times = proxy.intern(b"*");
        let res = proxy
            .call(pid, ERLANG_ATOM, times, &[big, Term::from_int(2)])
            .unwrap();
        assert_eq!(proxy.display(pid, res).as_deref(), Some("2199023255552"));
    }
}
