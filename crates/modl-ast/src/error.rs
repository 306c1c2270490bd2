//! Error types for resolution, validation, and constant folding.

use crate::loc::Loc;
use thiserror::Error;

/// A failure raised by one of the semantic passes.
///
/// Every variant carries the location of the offending node. Passes abort on
/// the first failure; no recovery is attempted.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // === Resolution ===
    #[error("unknown symbol: {name}")]
    UnknownSymbol { name: String, loc: Loc },

    #[error("duplicate declaration of {name}")]
    DuplicateDeclaration { name: String, loc: Loc },

    #[error("closing the global scope")]
    CloseGlobalScope { loc: Loc },

    #[error("unresolved reference to {name}")]
    UnresolvedReference { name: String, loc: Loc },

    // === Validation ===
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String, loc: Loc },

    #[error("expression is not an lvalue")]
    NotAnLvalue { loc: Loc },

    #[error("statement returns a value from a procedure")]
    ReturnValueFromProcedure { loc: Loc },

    #[error("empty return statement in a function")]
    EmptyReturnInFunction { loc: Loc },

    #[error("returning a number from a function that does not return a range")]
    ReturnNumberFromNonRange { loc: Loc },

    #[error("returning incompatible typed value from a function")]
    IncompatibleReturnType { loc: Loc },

    #[error("return statement in rule or startstate returns a value")]
    ReturnValueFromRule { loc: Loc },

    #[error("const definition is not a constant")]
    NonConstantConst { loc: Loc },

    #[error("enum with no members")]
    EmptyEnum { loc: Loc },

    #[error("duplicate enum member {name}")]
    DuplicateEnumMember { name: String, loc: Loc },

    #[error("scalarset bound must be a positive constant")]
    NonPositiveScalarset { loc: Loc },

    #[error("call to {name} with {found} arguments where {expected} were expected")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        loc: Loc,
    },

    #[error("non-lvalue argument passed for writable parameter of {name}")]
    NonLvalueArgument { name: String, loc: Loc },

    #[error("call to procedure {name} where a value is required")]
    CallToProcedure { name: String, loc: Loc },

    #[error("unconditional clause before the end of an if statement")]
    MisplacedElse { loc: Loc },

    // === Folding ===
    #[error("not a constant")]
    NotConstant { loc: Loc },

    #[error("division by zero")]
    DivisionByZero { loc: Loc },
}

impl Error {
    /// Get the source location of this error.
    pub fn loc(&self) -> &Loc {
        match self {
            Error::UnknownSymbol { loc, .. }
            | Error::DuplicateDeclaration { loc, .. }
            | Error::CloseGlobalScope { loc }
            | Error::UnresolvedReference { loc, .. }
            | Error::TypeMismatch { loc, .. }
            | Error::NotAnLvalue { loc }
            | Error::ReturnValueFromProcedure { loc }
            | Error::EmptyReturnInFunction { loc }
            | Error::ReturnNumberFromNonRange { loc }
            | Error::IncompatibleReturnType { loc }
            | Error::ReturnValueFromRule { loc }
            | Error::NonConstantConst { loc }
            | Error::EmptyEnum { loc }
            | Error::DuplicateEnumMember { loc, .. }
            | Error::NonPositiveScalarset { loc }
            | Error::ArityMismatch { loc, .. }
            | Error::NonLvalueArgument { loc, .. }
            | Error::CallToProcedure { loc, .. }
            | Error::MisplacedElse { loc }
            | Error::NotConstant { loc }
            | Error::DivisionByZero { loc } => loc,
        }
    }
}

/// Result type for the semantic passes.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loc::Position;

    #[test]
    fn test_message_rendering() {
        let e = Error::UnknownSymbol {
            name: "pc".into(),
            loc: Loc::dummy(),
        };
        assert_eq!(e.to_string(), "unknown symbol: pc");
    }

    #[test]
    fn test_loc_accessor() {
        let loc = Loc::new("m.m", Position::new(2, 1), Position::new(2, 5));
        let e = Error::DivisionByZero { loc: loc.clone() };
        assert_eq!(e.loc(), &loc);
    }
}
