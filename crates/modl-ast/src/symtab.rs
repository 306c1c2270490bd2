//! Scoped symbol table.

use crate::decl::{DeclId, DeclPool, SymbolKind};
use crate::error::{Error, Result};
use crate::loc::Loc;
use std::collections::HashMap;

/// A stack of scopes mapping names to pool declarations.
///
/// Names are case-sensitive at this layer; any case folding belongs to the
/// front-end.
#[derive(Debug, Default)]
pub struct Symtab {
    scopes: Vec<HashMap<String, DeclId>>,
}

impl Symtab {
    /// Create an empty table; callers open the global scope themselves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new innermost scope.
    pub fn open_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Leave the innermost scope. The global scope cannot be closed.
    pub fn close_scope(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(Error::CloseGlobalScope { loc: Loc::dummy() });
        }
        self.scopes.pop();
        Ok(())
    }

    /// Whether only the global scope is open.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Bind a name in the innermost scope, shadowing any outer binding.
    /// Rebinding a name already bound in this scope is an error.
    pub fn declare(&mut self, name: &str, id: DeclId, loc: &Loc) -> Result<()> {
        let scope = self.scopes.last_mut().ok_or(Error::CloseGlobalScope {
            loc: loc.clone(),
        })?;
        if scope.contains_key(name) {
            return Err(Error::DuplicateDeclaration {
                name: name.to_string(),
                loc: loc.clone(),
            });
        }
        scope.insert(name.to_string(), id);
        Ok(())
    }

    /// Find the innermost binding of `name` whose declaration has the
    /// expected kind.
    ///
    /// A binding of the wrong kind ends the search: an inner binding of
    /// `name` as, say, a type hides any outer binding of `name` as a value.
    pub fn lookup(
        &self,
        pool: &DeclPool,
        name: &str,
        kind: SymbolKind,
        loc: &Loc,
    ) -> Result<DeclId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.get(name) {
                if pool.get(id).category() == kind {
                    return Ok(id);
                }
                break;
            }
        }
        Err(Error::UnknownSymbol {
            name: name.to_string(),
            loc: loc.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Decl;
    use crate::expr::Expr;
    use crate::number::Int;
    use crate::types::TypeExpr;

    fn var_decl(name: &str) -> Decl {
        Decl::var(
            name,
            TypeExpr::range(
                Expr::number(Int::from(0), Loc::dummy()),
                Expr::number(Int::from(3), Loc::dummy()),
                Loc::dummy(),
            ),
            false,
            Loc::dummy(),
        )
    }

    #[test]
    fn test_shadowing_and_unshadowing() {
        let mut pool = DeclPool::new();
        let outer = pool.insert(var_decl("x"));
        let inner = pool.insert(var_decl("x"));

        let mut tab = Symtab::new();
        tab.open_scope();
        tab.declare("x", outer, &Loc::dummy()).unwrap();
        tab.open_scope();
        tab.declare("x", inner, &Loc::dummy()).unwrap();

        let found = tab
            .lookup(&pool, "x", SymbolKind::Value, &Loc::dummy())
            .unwrap();
        assert_eq!(found, inner);

        tab.close_scope().unwrap();
        let found = tab
            .lookup(&pool, "x", SymbolKind::Value, &Loc::dummy())
            .unwrap();
        assert_eq!(found, outer);
    }

    #[test]
    fn test_duplicate_declaration_in_one_scope() {
        let mut pool = DeclPool::new();
        let a = pool.insert(var_decl("x"));
        let b = pool.insert(var_decl("x"));

        let mut tab = Symtab::new();
        tab.open_scope();
        tab.declare("x", a, &Loc::dummy()).unwrap();
        assert!(matches!(
            tab.declare("x", b, &Loc::dummy()),
            Err(Error::DuplicateDeclaration { .. })
        ));
    }

    #[test]
    fn test_unknown_symbol() {
        let pool = DeclPool::new();
        let mut tab = Symtab::new();
        tab.open_scope();
        assert!(matches!(
            tab.lookup(&pool, "ghost", SymbolKind::Value, &Loc::dummy()),
            Err(Error::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_wrong_kind_hides_outer_binding() {
        let mut pool = DeclPool::new();
        let value = pool.insert(var_decl("t"));
        let ty = pool.insert(Decl::type_decl("t", TypeExpr::boolean(), Loc::dummy()));

        let mut tab = Symtab::new();
        tab.open_scope();
        tab.declare("t", value, &Loc::dummy()).unwrap();
        tab.open_scope();
        tab.declare("t", ty, &Loc::dummy()).unwrap();

        // the inner type binding stops the search even though an outer
        // value binding exists
        assert!(matches!(
            tab.lookup(&pool, "t", SymbolKind::Value, &Loc::dummy()),
            Err(Error::UnknownSymbol { .. })
        ));
        assert!(tab
            .lookup(&pool, "t", SymbolKind::Type, &Loc::dummy())
            .is_ok());
    }

    #[test]
    fn test_global_scope_cannot_close() {
        let mut tab = Symtab::new();
        tab.open_scope();
        assert!(tab.is_global_scope());
        assert!(matches!(
            tab.close_scope(),
            Err(Error::CloseGlobalScope { .. })
        ));

        tab.open_scope();
        assert!(!tab.is_global_scope());
        tab.close_scope().unwrap();
        assert!(tab.is_global_scope());
    }
}
