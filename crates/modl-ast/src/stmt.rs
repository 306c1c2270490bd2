//! Statement nodes.

use crate::decl::{DeclId, DeclKind, DeclPool};
use crate::error::{Error, Result};
use crate::expr::{equatable, validate_call_arguments, Expr, Quantifier};
use crate::loc::Loc;
use crate::property::Property;
use crate::NodeId;

/// A statement.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub kind: StmtKind,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `lhs := rhs`.
    Assignment { lhs: Expr, rhs: Expr },
    /// Zero a region of state.
    Clear(Expr),
    /// Mark a region of state undefined.
    Undefine(Expr),
    /// Unconditional failure with a message.
    ErrorStmt { message: String },
    /// Chain of conditional clauses; only the final clause may be
    /// unconditional.
    If { clauses: Vec<IfClause> },
    /// Iterate the body over a quantifier.
    For {
        quantifier: Quantifier,
        body: Vec<Stmt>,
    },
    /// Loop while a boolean condition holds.
    While { condition: Expr, body: Vec<Stmt> },
    /// Dispatch on the value of an expression.
    Switch { expr: Expr, cases: Vec<SwitchCase> },
    /// Return from the enclosing function, procedure, or rule.
    Return(Option<Expr>),
    /// Call a procedure for its effects. The back-link is set during
    /// resolution.
    ProcedureCall {
        name: String,
        function: Option<DeclId>,
        args: Vec<Expr>,
    },
    /// Inline property with a diagnostic message.
    PropertyStmt { property: Property, message: String },
}

/// One arm of an if statement; a `None` condition is an unconditional else.
#[derive(Debug, Clone)]
pub struct IfClause {
    pub loc: Loc,
    pub condition: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// One arm of a switch statement; an empty match list is the default case.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub loc: Loc,
    pub matches: Vec<Expr>,
    pub body: Vec<Stmt>,
}

impl Stmt {
    pub fn new(kind: StmtKind, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            kind,
        }
    }

    pub fn assignment(lhs: Expr, rhs: Expr, loc: Loc) -> Self {
        Self::new(StmtKind::Assignment { lhs, rhs }, loc)
    }

    pub fn clear(lvalue: Expr, loc: Loc) -> Self {
        Self::new(StmtKind::Clear(lvalue), loc)
    }

    pub fn undefine(lvalue: Expr, loc: Loc) -> Self {
        Self::new(StmtKind::Undefine(lvalue), loc)
    }

    pub fn error_stmt(message: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            StmtKind::ErrorStmt {
                message: message.into(),
            },
            loc,
        )
    }

    pub fn if_stmt(clauses: Vec<IfClause>, loc: Loc) -> Self {
        Self::new(StmtKind::If { clauses }, loc)
    }

    pub fn for_stmt(quantifier: Quantifier, body: Vec<Stmt>, loc: Loc) -> Self {
        Self::new(StmtKind::For { quantifier, body }, loc)
    }

    pub fn while_stmt(condition: Expr, body: Vec<Stmt>, loc: Loc) -> Self {
        Self::new(StmtKind::While { condition, body }, loc)
    }

    pub fn switch(expr: Expr, cases: Vec<SwitchCase>, loc: Loc) -> Self {
        Self::new(StmtKind::Switch { expr, cases }, loc)
    }

    pub fn return_stmt(expr: Option<Expr>, loc: Loc) -> Self {
        Self::new(StmtKind::Return(expr), loc)
    }

    pub fn procedure_call(name: impl Into<String>, args: Vec<Expr>, loc: Loc) -> Self {
        Self::new(
            StmtKind::ProcedureCall {
                name: name.into(),
                function: None,
                args,
            },
            loc,
        )
    }

    pub fn property_stmt(property: Property, message: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            StmtKind::PropertyStmt {
                property,
                message: message.into(),
            },
            loc,
        )
    }

    /// Local contract checks; children are validated by the pass.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            StmtKind::Assignment { lhs, rhs } => {
                if !lhs.is_lvalue(pool) {
                    return Err(Error::NotAnLvalue {
                        loc: lhs.loc.clone(),
                    });
                }
                if !equatable(&lhs.resolved_type(pool)?, &rhs.resolved_type(pool)?) {
                    return Err(Error::TypeMismatch {
                        message: "assigned value does not match the target type".to_string(),
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            StmtKind::Clear(lvalue) | StmtKind::Undefine(lvalue) => {
                if !lvalue.is_lvalue(pool) {
                    return Err(Error::NotAnLvalue {
                        loc: lvalue.loc.clone(),
                    });
                }
                Ok(())
            }
            StmtKind::ErrorStmt { .. } => Ok(()),
            StmtKind::If { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    match &clause.condition {
                        Some(cond) => {
                            if !cond.is_boolean(pool)? {
                                return Err(Error::TypeMismatch {
                                    message: "if condition is not a boolean".to_string(),
                                    loc: cond.loc.clone(),
                                });
                            }
                        }
                        None => {
                            if i + 1 != clauses.len() {
                                return Err(Error::MisplacedElse {
                                    loc: clause.loc.clone(),
                                });
                            }
                        }
                    }
                }
                Ok(())
            }
            StmtKind::For { .. } => Ok(()),
            StmtKind::While { condition, .. } => {
                if !condition.is_boolean(pool)? {
                    return Err(Error::TypeMismatch {
                        message: "while condition is not a boolean".to_string(),
                        loc: condition.loc.clone(),
                    });
                }
                Ok(())
            }
            StmtKind::Switch { expr, cases } => {
                let scrutinee = expr.resolved_type(pool)?;
                for case in cases {
                    for m in &case.matches {
                        if !equatable(&scrutinee, &m.resolved_type(pool)?) {
                            return Err(Error::TypeMismatch {
                                message: "case expression does not match the switch type"
                                    .to_string(),
                                loc: m.loc.clone(),
                            });
                        }
                    }
                }
                Ok(())
            }
            StmtKind::Return(_) => Ok(()),
            StmtKind::ProcedureCall {
                name,
                function,
                args,
            } => {
                let id = function.ok_or_else(|| Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                })?;
                match &pool.get(id).kind {
                    DeclKind::Func(f) => validate_call_arguments(name, f, args, pool, &self.loc),
                    _ => Err(Error::TypeMismatch {
                        message: format!("{} does not name a procedure", name),
                        loc: self.loc.clone(),
                    }),
                }
            }
            StmtKind::PropertyStmt { .. } => Ok(()),
        }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Stmt {}

impl PartialEq for StmtKind {
    fn eq(&self, other: &Self) -> bool {
        use StmtKind::*;
        match (self, other) {
            (Assignment { lhs: l1, rhs: r1 }, Assignment { lhs: l2, rhs: r2 }) => {
                l1 == l2 && r1 == r2
            }
            (Clear(a), Clear(b)) | (Undefine(a), Undefine(b)) => a == b,
            (ErrorStmt { message: a }, ErrorStmt { message: b }) => a == b,
            (If { clauses: a }, If { clauses: b }) => a == b,
            (
                For {
                    quantifier: q1,
                    body: b1,
                },
                For {
                    quantifier: q2,
                    body: b2,
                },
            ) => q1 == q2 && b1 == b2,
            (
                While {
                    condition: c1,
                    body: b1,
                },
                While {
                    condition: c2,
                    body: b2,
                },
            ) => c1 == c2 && b1 == b2,
            (
                Switch {
                    expr: e1,
                    cases: c1,
                },
                Switch {
                    expr: e2,
                    cases: c2,
                },
            ) => e1 == e2 && c1 == c2,
            (Return(a), Return(b)) => a == b,
            (
                ProcedureCall {
                    name: n1, args: a1, ..
                },
                ProcedureCall {
                    name: n2, args: a2, ..
                },
            ) => n1 == n2 && a1 == a2,
            (
                PropertyStmt {
                    property: p1,
                    message: m1,
                },
                PropertyStmt {
                    property: p2,
                    message: m2,
                },
            ) => p1 == p2 && m1 == m2,
            _ => false,
        }
    }
}

impl Eq for StmtKind {}

impl PartialEq for IfClause {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.body == other.body
    }
}

impl Eq for IfClause {}

impl PartialEq for SwitchCase {
    fn eq(&self, other: &Self) -> bool {
        self.matches == other.matches && self.body == other.body
    }
}

impl Eq for SwitchCase {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Int;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    #[test]
    fn test_assignment_needs_an_lvalue() {
        let pool = DeclPool::new();
        let s = Stmt::assignment(num(1), num(2), Loc::dummy());
        assert!(matches!(
            s.validate(&pool),
            Err(Error::NotAnLvalue { .. })
        ));
    }

    #[test]
    fn test_else_must_be_last() {
        let pool = DeclPool::new();
        let s = Stmt::if_stmt(
            vec![
                IfClause {
                    loc: Loc::dummy(),
                    condition: None,
                    body: vec![],
                },
                IfClause {
                    loc: Loc::dummy(),
                    condition: None,
                    body: vec![],
                },
            ],
            Loc::dummy(),
        );
        assert!(matches!(
            s.validate(&pool),
            Err(Error::MisplacedElse { .. })
        ));
    }

    #[test]
    fn test_while_condition_must_be_boolean() {
        let pool = DeclPool::new();
        let s = Stmt::while_stmt(num(1), vec![], Loc::dummy());
        assert!(matches!(
            s.validate(&pool),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_switch_cases_share_the_scrutinee_type() {
        let pool = DeclPool::new();
        let s = Stmt::switch(
            num(1),
            vec![SwitchCase {
                loc: Loc::dummy(),
                matches: vec![num(0), num(2)],
                body: vec![],
            }],
            Loc::dummy(),
        );
        assert!(s.validate(&pool).is_ok());
    }
}
