//! Declarations and the resolved declaration pool.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::loc::Loc;
use crate::stmt::{Stmt, StmtKind};
use crate::types::{TypeExpr, TypeExprKind};
use crate::NodeId;

/// Index of a declaration in a [`DeclPool`].
///
/// Reference nodes carry these instead of pointers; an id stays meaningful
/// for as long as the model root that owns the pool is alive, and survives
/// cloning of any subtree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(usize);

/// Arena of resolved declarations, owned by the model root.
///
/// The resolver clones each declaration in here at its declaration point and
/// adds synthesized entries for bound variables, enum members, and the
/// built-ins. The pool is append-only.
#[derive(Debug, Clone, Default)]
pub struct DeclPool {
    decls: Vec<Decl>,
}

impl DeclPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len());
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.0]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls.iter().enumerate().map(|(i, d)| (DeclId(i), d))
    }
}

/// The kind of symbol a declaration introduces, used by scoped lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Value,
    Type,
    Function,
}

/// A declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub name: String,
    pub kind: DeclKind,
}

/// The kind of declaration.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Named constant. The value must fold. The optional type is carried by
    /// enum-member constants so that references take the enum's type.
    Const {
        ty: Option<TypeExpr>,
        value: Expr,
    },
    /// Named type.
    Type { value: TypeExpr },
    /// Variable. `readonly` distinguishes read-only parameters and bound
    /// variables from writable state.
    Var { ty: TypeExpr, readonly: bool },
    /// Named expression alias.
    Alias { value: Expr },
    /// Function or procedure.
    Func(Function),
}

/// A function (with a return type) or procedure (without).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Parameters, each a Var declaration; a writable parameter has
    /// `readonly == false`.
    pub parameters: Vec<Decl>,
    pub return_type: Option<TypeExpr>,
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
}

impl Decl {
    pub fn constant(
        name: impl Into<String>,
        ty: Option<TypeExpr>,
        value: Expr,
        loc: Loc,
    ) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: DeclKind::Const { ty, value },
        }
    }

    pub fn type_decl(name: impl Into<String>, value: TypeExpr, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: DeclKind::Type { value },
        }
    }

    pub fn var(name: impl Into<String>, ty: TypeExpr, readonly: bool, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: DeclKind::Var { ty, readonly },
        }
    }

    pub fn alias(name: impl Into<String>, value: Expr, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: DeclKind::Alias { value },
        }
    }

    pub fn function(
        name: impl Into<String>,
        parameters: Vec<Decl>,
        return_type: Option<TypeExpr>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
        loc: Loc,
    ) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: DeclKind::Func(Function {
                parameters,
                return_type,
                decls,
                body,
            }),
        }
    }

    /// The symbol category this declaration binds under.
    pub fn category(&self) -> SymbolKind {
        match &self.kind {
            DeclKind::Const { .. } | DeclKind::Var { .. } | DeclKind::Alias { .. } => {
                SymbolKind::Value
            }
            DeclKind::Type { .. } => SymbolKind::Type,
            DeclKind::Func(_) => SymbolKind::Function,
        }
    }

    /// Local contract checks; children are validated by the pass.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            DeclKind::Const { value, .. } => {
                if !value.constant(pool) {
                    return Err(Error::NonConstantConst {
                        loc: value.loc.clone(),
                    });
                }
                value.constant_fold(pool)?;
                Ok(())
            }
            DeclKind::Type { .. } | DeclKind::Var { .. } | DeclKind::Alias { .. } => Ok(()),
            DeclKind::Func(f) => f.validate(pool),
        }
    }
}

impl Function {
    /// Check every return statement in the body against the return type.
    ///
    /// Walks statements only; a return cannot occur inside an expression, so
    /// nothing deeper needs visiting.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        check_returns(&self.body, self.return_type.as_ref(), pool)
    }
}

fn check_returns(body: &[Stmt], return_type: Option<&TypeExpr>, pool: &DeclPool) -> Result<()> {
    for stmt in body {
        match &stmt.kind {
            StmtKind::Return(expr) => match (expr, return_type) {
                (None, Some(_)) => {
                    return Err(Error::EmptyReturnInFunction {
                        loc: stmt.loc.clone(),
                    })
                }
                (Some(_), None) => {
                    return Err(Error::ReturnValueFromProcedure {
                        loc: stmt.loc.clone(),
                    })
                }
                (Some(e), Some(rt)) => match e.type_of(pool)? {
                    None => {
                        if !matches!(rt.resolve(pool)?.kind, TypeExprKind::Range { .. }) {
                            return Err(Error::ReturnNumberFromNonRange {
                                loc: stmt.loc.clone(),
                            });
                        }
                    }
                    Some(t) => {
                        if &t != rt {
                            return Err(Error::IncompatibleReturnType {
                                loc: stmt.loc.clone(),
                            });
                        }
                    }
                },
                (None, None) => {}
            },
            StmtKind::If { clauses } => {
                for clause in clauses {
                    check_returns(&clause.body, return_type, pool)?;
                }
            }
            StmtKind::For { body, .. } | StmtKind::While { body, .. } => {
                check_returns(body, return_type, pool)?;
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    check_returns(&case.body, return_type, pool)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Check that no statement in a rule or startstate body returns a value.
///
/// Does not descend into called functions; their returns are checked against
/// their own signatures.
pub(crate) fn check_rule_returns(body: &[Stmt]) -> Result<()> {
    for stmt in body {
        match &stmt.kind {
            StmtKind::Return(Some(_)) => {
                return Err(Error::ReturnValueFromRule {
                    loc: stmt.loc.clone(),
                })
            }
            StmtKind::If { clauses } => {
                for clause in clauses {
                    check_rule_returns(&clause.body)?;
                }
            }
            StmtKind::For { body, .. } | StmtKind::While { body, .. } => {
                check_rule_returns(body)?;
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    check_rule_returns(&case.body)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

impl PartialEq for Decl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Decl {}

impl PartialEq for DeclKind {
    fn eq(&self, other: &Self) -> bool {
        use DeclKind::*;
        match (self, other) {
            (Const { ty: t1, value: v1 }, Const { ty: t2, value: v2 }) => t1 == t2 && v1 == v2,
            (Type { value: a }, Type { value: b }) => a == b,
            (
                Var {
                    ty: t1,
                    readonly: r1,
                },
                Var {
                    ty: t2,
                    readonly: r2,
                },
            ) => t1 == t2 && r1 == r2,
            (Alias { value: a }, Alias { value: b }) => a == b,
            (Func(a), Func(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DeclKind {}
