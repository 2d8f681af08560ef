use crate::{
    AtomIndex, BADARG_ATOM, BADARITH_ATOM, OUT_OF_MEMORY_ATOM, OVERFLOW_ATOM, OutOfMemory,
    ProcessId, Term,
};

/// Catchable failure of a built-in function, each kind maps to its atom
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BifError {
    #[error("badarg")]
    Badarg,
    #[error("badarith")]
    Badarith,
    #[error("overflow")]
    Overflow,
    #[error("out_of_memory")]
    OutOfMemory,
}

pub type BifResult = Result<Term, BifError>;

impl BifError {
    pub fn atom(self) -> AtomIndex {
        match self {
            BifError::Badarg => BADARG_ATOM,
            BifError::Badarith => BADARITH_ATOM,
            BifError::Overflow => OVERFLOW_ATOM,
            BifError::OutOfMemory => OUT_OF_MEMORY_ATOM,
        }
    }

    pub fn from_atom(atom: AtomIndex) -> Option<Self> {
        match atom {
            BADARG_ATOM => Some(BifError::Badarg),
            BADARITH_ATOM => Some(BifError::Badarith),
            OVERFLOW_ATOM => Some(BifError::Overflow),
            OUT_OF_MEMORY_ATOM => Some(BifError::OutOfMemory),
            _ => None,
        }
    }
}

impl From<OutOfMemory> for BifError {
    fn from(_: OutOfMemory) -> Self {
        BifError::OutOfMemory
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("process id space exhausted")]
    ProcessIdsExhausted,
    #[error("name {0:?} is already registered")]
    NameTaken(AtomIndex),
    #[error("no process {0}")]
    NoSuchProcess(ProcessId),
    #[error("process {0} is already in the process table")]
    DuplicateProcess(ProcessId),
}

/// Failure of a call made through the `VM` boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("no built-in function {module}:{function}/{arity}")]
    UnknownBif {
        module: String,
        function: String,
        arity: usize,
    },
    #[error("no process {0}")]
    NoSuchProcess(ProcessId),
    #[error("exception error: {0}")]
    Raised(BifError),
}
