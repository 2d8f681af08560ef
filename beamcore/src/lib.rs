mod atom;
pub mod bif;
mod error;
mod format;
mod global_context;
mod heap;
mod process;
mod term;
mod vm;

pub use atom::*;
pub use bif::{BIFS, BifEntry, BifImpl, MAX_BIF_NAME_LEN, lookup_bif, lookup_bif_by_atoms};
pub use error::*;
pub use format::TermDisplay;
pub use global_context::GlobalContext;
pub use heap::*;
pub use process::*;
pub use term::*;
pub use vm::*;
