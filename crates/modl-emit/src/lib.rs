//! Code-generation backends for the Modl modeling language.
//!
//! Three backends share the traversal and text scaffolding in this crate:
//! a plain C translation ([`emit_c`]), a self-contained explicit-state
//! checker ([`emit_checker`]), and an SMT encoding of expressions
//! ([`emit_smt`]). All of them are deterministic functions of a resolved,
//! validated tree.

pub mod c;
pub mod checker;
mod emitter;
pub mod logic;
pub mod smt;

pub use c::emit_c;
pub use checker::emit_checker;
pub use logic::Logic;
pub use smt::{emit_smt, translate};

use modl_ast::Loc;
use thiserror::Error;

/// A failure raised by one of the backends.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Ast(#[from] modl_ast::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("the {backend} backend cannot translate {construct}")]
    Unsupported {
        backend: &'static str,
        construct: &'static str,
        loc: Loc,
    },
}

/// Result type for the backends.
pub type Result<T> = std::result::Result<T, EmitError>;

/// Options shared by the emitter backends.
///
/// The `includes` and `header` blobs are owned by the front-end and spliced
/// verbatim into the generated checker; the library never reads them.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Bit-level state layout when true, byte-aligned otherwise.
    pub pack: bool,
    /// Worker threads baked into the generated checker.
    pub threads: usize,
    /// Initial capacity of the generated checker's seen set.
    pub set_capacity: usize,
    /// Occupancy percentage at which the seen set grows.
    pub set_expand_threshold: usize,
    /// Keep assertions in the generated checker.
    pub debug: bool,
    /// Include block written before the checker's compile-time constants.
    pub includes: String,
    /// Runtime support code written after the compile-time constants.
    pub header: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            pack: true,
            threads: 1,
            set_capacity: 8 * 1024 * 1024,
            set_expand_threshold: 75,
            debug: false,
            includes: String::new(),
            header: String::new(),
        }
    }
}
