//! Expression nodes, operator families, and the constant folder.

use crate::decl::{DeclId, DeclKind, DeclPool};
use crate::error::{Error, Result};
use crate::loc::Loc;
use crate::number::Int;
use crate::types::{TypeExpr, TypeExprKind};
use crate::NodeId;

/// An expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub kind: ExprKind,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Numeric literal.
    Number(Int),
    /// Identifier reference. The back-link is set during resolution.
    Id { name: String, decl: Option<DeclId> },
    /// Record field access.
    Field { record: Box<Expr>, field: String },
    /// Array element access.
    Element { array: Box<Expr>, index: Box<Expr> },
    /// Function call. The back-link is set during resolution and is not
    /// part of structural equality.
    Call {
        name: String,
        function: Option<DeclId>,
        args: Vec<Expr>,
    },
    /// `cond ? lhs : rhs`. Never an lvalue.
    Ternary {
        cond: Box<Expr>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary { op: UnaryOp, rhs: Box<Expr> },
    /// Existential quantification.
    Exists {
        quantifier: Quantifier,
        expr: Box<Expr>,
    },
    /// Universal quantification.
    Forall {
        quantifier: Quantifier,
        expr: Box<Expr>,
    },
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Logical
    And,
    Or,
    Implication,
    // Comparison
    Lt,
    Leq,
    Gt,
    Geq,
    // Equatable
    Eq,
    Neq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Typing family of a binary operator; one row of operand/result rules per
/// family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpFamily {
    Boolean,
    Comparison,
    Equatable,
    Arithmetic,
}

impl BinaryOp {
    pub fn family(self) -> OpFamily {
        match self {
            BinaryOp::And | BinaryOp::Or | BinaryOp::Implication => OpFamily::Boolean,
            BinaryOp::Lt | BinaryOp::Leq | BinaryOp::Gt | BinaryOp::Geq => OpFamily::Comparison,
            BinaryOp::Eq | BinaryOp::Neq => OpFamily::Equatable,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                OpFamily::Arithmetic
            }
        }
    }

    /// Apply the operator to folded operands. Boolean results are 0/1.
    fn fold(self, lhs: &Int, rhs: &Int, loc: &Loc) -> Result<Int> {
        let truth = |b: bool| if b { Int::one() } else { Int::zero() };
        match self {
            BinaryOp::And => Ok(truth(!lhs.is_zero() && !rhs.is_zero())),
            BinaryOp::Or => Ok(truth(!lhs.is_zero() || !rhs.is_zero())),
            BinaryOp::Implication => Ok(truth(lhs.is_zero() || !rhs.is_zero())),
            BinaryOp::Lt => Ok(truth(lhs < rhs)),
            BinaryOp::Leq => Ok(truth(lhs <= rhs)),
            BinaryOp::Gt => Ok(truth(lhs > rhs)),
            BinaryOp::Geq => Ok(truth(lhs >= rhs)),
            BinaryOp::Eq => Ok(truth(lhs == rhs)),
            BinaryOp::Neq => Ok(truth(lhs != rhs)),
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => lhs.checked_div(rhs).ok_or(Error::DivisionByZero {
                loc: loc.clone(),
            }),
            BinaryOp::Mod => lhs.checked_rem(rhs).ok_or(Error::DivisionByZero {
                loc: loc.clone(),
            }),
        }
    }
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
}

/// A bound variable ranging over a type or an explicit from/to/step
/// interval. The two forms are mutually exclusive by construction.
#[derive(Debug, Clone)]
pub struct Quantifier {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub name: String,
    pub kind: QuantifierKind,
    /// Synthesized bound-variable declaration, set during resolution.
    pub decl: Option<DeclId>,
}

/// The domain of a quantifier.
#[derive(Debug, Clone)]
pub enum QuantifierKind {
    /// Range over every value of a type.
    Over(TypeExpr),
    /// Range from/to with an optional step (default 1).
    Bounds {
        from: Box<Expr>,
        to: Box<Expr>,
        step: Option<Box<Expr>>,
    },
}

impl Quantifier {
    pub fn over(name: impl Into<String>, ty: TypeExpr, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: QuantifierKind::Over(ty),
            decl: None,
        }
    }

    pub fn bounds(
        name: impl Into<String>,
        from: Expr,
        to: Expr,
        step: Option<Expr>,
        loc: Loc,
    ) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            kind: QuantifierKind::Bounds {
                from: Box::new(from),
                to: Box::new(to),
                step: step.map(Box::new),
            },
            decl: None,
        }
    }

    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            QuantifierKind::Over(ty) => {
                if !ty.resolve(pool)?.is_simple() {
                    return Err(Error::TypeMismatch {
                        message: format!("quantifier {} ranges over a non-simple type", self.name),
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            QuantifierKind::Bounds { from, to, step } => {
                for bound in [Some(from), Some(to), step.as_ref()].into_iter().flatten() {
                    if !bound.is_numeric(pool)? {
                        return Err(Error::TypeMismatch {
                            message: format!(
                                "quantifier {} has a non-numeric bound",
                                self.name
                            ),
                            loc: bound.loc.clone(),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Quantifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Quantifier {}

impl PartialEq for QuantifierKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QuantifierKind::Over(a), QuantifierKind::Over(b)) => a == b,
            (
                QuantifierKind::Bounds {
                    from: f1,
                    to: t1,
                    step: s1,
                },
                QuantifierKind::Bounds {
                    from: f2,
                    to: t2,
                    step: s2,
                },
            ) => f1 == f2 && t1 == t2 && s1 == s2,
            _ => false,
        }
    }
}

impl Eq for QuantifierKind {}

impl Expr {
    pub fn new(kind: ExprKind, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            kind,
        }
    }

    pub fn number(value: Int, loc: Loc) -> Self {
        Self::new(ExprKind::Number(value), loc)
    }

    pub fn id(name: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            ExprKind::Id {
                name: name.into(),
                decl: None,
            },
            loc,
        )
    }

    pub fn field(record: Expr, field: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            ExprKind::Field {
                record: Box::new(record),
                field: field.into(),
            },
            loc,
        )
    }

    pub fn element(array: Expr, index: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Element {
                array: Box::new(array),
                index: Box::new(index),
            },
            loc,
        )
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>, loc: Loc) -> Self {
        Self::new(
            ExprKind::Call {
                name: name.into(),
                function: None,
                args,
            },
            loc,
        )
    }

    pub fn ternary(cond: Expr, lhs: Expr, rhs: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    pub fn unary(op: UnaryOp, rhs: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    pub fn exists(quantifier: Quantifier, expr: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Exists {
                quantifier,
                expr: Box::new(expr),
            },
            loc,
        )
    }

    pub fn forall(quantifier: Quantifier, expr: Expr, loc: Loc) -> Self {
        Self::new(
            ExprKind::Forall {
                quantifier,
                expr: Box::new(expr),
            },
            loc,
        )
    }

    /// Whether this expression is a compile-time constant.
    pub fn constant(&self, pool: &DeclPool) -> bool {
        match &self.kind {
            ExprKind::Number(_) => true,
            ExprKind::Id { decl, .. } => match decl {
                Some(id) => match &pool.get(*id).kind {
                    DeclKind::Const { .. } => true,
                    DeclKind::Alias { value } => value.constant(pool),
                    _ => false,
                },
                None => false,
            },
            ExprKind::Field { .. } | ExprKind::Element { .. } | ExprKind::Call { .. } => false,
            ExprKind::Ternary { cond, lhs, rhs } => {
                cond.constant(pool) && lhs.constant(pool) && rhs.constant(pool)
            }
            ExprKind::Binary { lhs, rhs, .. } => lhs.constant(pool) && rhs.constant(pool),
            ExprKind::Unary { rhs, .. } => rhs.constant(pool),
            ExprKind::Exists { .. } | ExprKind::Forall { .. } => false,
        }
    }

    /// The type of this expression. `None` means the type is equivalent to a
    /// numeric literal, an unbounded range.
    pub fn type_of(&self, pool: &DeclPool) -> Result<Option<TypeExpr>> {
        match &self.kind {
            ExprKind::Number(_) => Ok(None),
            ExprKind::Id { name, decl } => {
                let id = decl.ok_or_else(|| Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                })?;
                match &pool.get(id).kind {
                    DeclKind::Const { ty, .. } => Ok(ty.clone()),
                    DeclKind::Var { ty, .. } => Ok(Some(ty.clone())),
                    DeclKind::Alias { value } => value.type_of(pool),
                    DeclKind::Type { .. } | DeclKind::Func(_) => Err(Error::TypeMismatch {
                        message: format!("{} does not name a value", name),
                        loc: self.loc.clone(),
                    }),
                }
            }
            ExprKind::Field { record, field } => {
                let record_ty = record.type_of(pool)?.ok_or_else(|| Error::TypeMismatch {
                    message: format!("accessing field {} of a non-record", field),
                    loc: self.loc.clone(),
                })?;
                match record_ty.resolve(pool)?.kind {
                    TypeExprKind::Record { fields } => {
                        for f in &fields {
                            if f.name == *field {
                                if let DeclKind::Var { ty, .. } = &f.kind {
                                    return Ok(Some(ty.clone()));
                                }
                            }
                        }
                        Err(Error::TypeMismatch {
                            message: format!("record has no field {}", field),
                            loc: self.loc.clone(),
                        })
                    }
                    _ => Err(Error::TypeMismatch {
                        message: format!("accessing field {} of a non-record", field),
                        loc: self.loc.clone(),
                    }),
                }
            }
            ExprKind::Element { array, .. } => {
                let array_ty = array.type_of(pool)?.ok_or_else(|| Error::TypeMismatch {
                    message: "indexing a non-array".to_string(),
                    loc: self.loc.clone(),
                })?;
                match array_ty.resolve(pool)?.kind {
                    TypeExprKind::Array { element_type, .. } => Ok(Some(*element_type)),
                    _ => Err(Error::TypeMismatch {
                        message: "indexing a non-array".to_string(),
                        loc: self.loc.clone(),
                    }),
                }
            }
            ExprKind::Call { name, function, .. } => {
                let id = function.ok_or_else(|| Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                })?;
                match &pool.get(id).kind {
                    DeclKind::Func(f) => match &f.return_type {
                        Some(ty) => Ok(Some(ty.clone())),
                        None => Err(Error::CallToProcedure {
                            name: name.clone(),
                            loc: self.loc.clone(),
                        }),
                    },
                    _ => Err(Error::TypeMismatch {
                        message: format!("{} does not name a function", name),
                        loc: self.loc.clone(),
                    }),
                }
            }
            ExprKind::Ternary { lhs, .. } => lhs.type_of(pool),
            ExprKind::Binary { op, .. } => match op.family() {
                OpFamily::Arithmetic => Ok(None),
                _ => Ok(Some(TypeExpr::boolean())),
            },
            ExprKind::Unary { op, .. } => match op {
                UnaryOp::Not => Ok(Some(TypeExpr::boolean())),
                UnaryOp::Negative => Ok(None),
            },
            ExprKind::Exists { .. } | ExprKind::Forall { .. } => Ok(Some(TypeExpr::boolean())),
        }
    }

    /// `type_of` with named references followed.
    pub fn resolved_type(&self, pool: &DeclPool) -> Result<Option<TypeExpr>> {
        match self.type_of(pool)? {
            Some(t) => Ok(Some(t.resolve(pool)?)),
            None => Ok(None),
        }
    }

    /// Whether this expression has boolean type.
    pub fn is_boolean(&self, pool: &DeclPool) -> Result<bool> {
        Ok(self
            .resolved_type(pool)?
            .map(|t| t.is_boolean_type())
            .unwrap_or(false))
    }

    /// Whether this expression has a numeric type (a range, or an unbounded
    /// literal).
    pub fn is_numeric(&self, pool: &DeclPool) -> Result<bool> {
        Ok(is_numeric_type(&self.resolved_type(pool)?))
    }

    /// Whether this expression may appear on the left of an assignment: an
    /// identifier of a writable declaration, a field of an lvalue, or an
    /// element of an lvalue.
    pub fn is_lvalue(&self, pool: &DeclPool) -> bool {
        match &self.kind {
            ExprKind::Id { decl, .. } => match decl {
                Some(id) => match &pool.get(*id).kind {
                    DeclKind::Var { readonly, .. } => !readonly,
                    DeclKind::Alias { value } => value.is_lvalue(pool),
                    _ => false,
                },
                None => false,
            },
            ExprKind::Field { record, .. } => record.is_lvalue(pool),
            ExprKind::Element { array, .. } => array.is_lvalue(pool),
            _ => false,
        }
    }

    /// Evaluate a compile-time constant. Booleans fold to 0/1 and enum
    /// members to their positional index.
    pub fn constant_fold(&self, pool: &DeclPool) -> Result<Int> {
        match &self.kind {
            ExprKind::Number(value) => Ok(value.clone()),
            ExprKind::Id { name, decl } => match decl {
                Some(id) => match &pool.get(*id).kind {
                    DeclKind::Const { value, .. } => value.constant_fold(pool),
                    DeclKind::Alias { value } => value.constant_fold(pool),
                    _ => Err(Error::NotConstant {
                        loc: self.loc.clone(),
                    }),
                },
                None => Err(Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                }),
            },
            ExprKind::Ternary { cond, lhs, rhs } => {
                if cond.constant_fold(pool)?.is_zero() {
                    rhs.constant_fold(pool)
                } else {
                    lhs.constant_fold(pool)
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let l = lhs.constant_fold(pool)?;
                let r = rhs.constant_fold(pool)?;
                op.fold(&l, &r, &self.loc)
            }
            ExprKind::Unary { op, rhs } => {
                let v = rhs.constant_fold(pool)?;
                match op {
                    UnaryOp::Not => Ok(if v.is_zero() { Int::one() } else { Int::zero() }),
                    UnaryOp::Negative => Ok(-&v),
                }
            }
            ExprKind::Field { .. }
            | ExprKind::Element { .. }
            | ExprKind::Call { .. }
            | ExprKind::Exists { .. }
            | ExprKind::Forall { .. } => Err(Error::NotConstant {
                loc: self.loc.clone(),
            }),
        }
    }

    /// Local contract checks; children are validated by the pass.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            ExprKind::Number(_) => Ok(()),
            ExprKind::Id { name, decl } => {
                if decl.is_none() {
                    return Err(Error::UnresolvedReference {
                        name: name.clone(),
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            // Field typing is established by computing the type; the error
            // carries this node's location.
            ExprKind::Field { .. } => {
                self.type_of(pool)?;
                Ok(())
            }
            ExprKind::Element { array, index } => {
                self.type_of(pool)?;
                if let Some(array_ty) = array.resolved_type(pool)? {
                    if let TypeExprKind::Array { index_type, .. } = &array_ty.kind {
                        if !comparable(&index.resolved_type(pool)?, &Some(index_type.resolve(pool)?))
                        {
                            return Err(Error::TypeMismatch {
                                message: "index expression does not match the array index type"
                                    .to_string(),
                                loc: index.loc.clone(),
                            });
                        }
                    }
                }
                Ok(())
            }
            ExprKind::Call {
                name,
                function,
                args,
            } => {
                let id = function.ok_or_else(|| Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                })?;
                let func = match &pool.get(id).kind {
                    DeclKind::Func(f) => f,
                    _ => {
                        return Err(Error::TypeMismatch {
                            message: format!("{} does not name a function", name),
                            loc: self.loc.clone(),
                        })
                    }
                };
                if func.return_type.is_none() {
                    return Err(Error::CallToProcedure {
                        name: name.clone(),
                        loc: self.loc.clone(),
                    });
                }
                validate_call_arguments(name, func, args, pool, &self.loc)
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                if !cond.is_boolean(pool)? {
                    return Err(Error::TypeMismatch {
                        message: "ternary condition is not a boolean".to_string(),
                        loc: cond.loc.clone(),
                    });
                }
                if !equatable(&lhs.resolved_type(pool)?, &rhs.resolved_type(pool)?) {
                    return Err(Error::TypeMismatch {
                        message: "ternary branches have different types".to_string(),
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let fail = |message: String| Error::TypeMismatch {
                    message,
                    loc: self.loc.clone(),
                };
                match op.family() {
                    OpFamily::Boolean => {
                        if !lhs.is_boolean(pool)? || !rhs.is_boolean(pool)? {
                            return Err(fail(format!(
                                "operands of {:?} must be booleans",
                                op
                            )));
                        }
                    }
                    OpFamily::Comparison => {
                        if !comparable(&lhs.resolved_type(pool)?, &rhs.resolved_type(pool)?) {
                            return Err(fail(
                                "comparison operands do not share a domain".to_string(),
                            ));
                        }
                    }
                    OpFamily::Equatable => {
                        if !equatable(&lhs.resolved_type(pool)?, &rhs.resolved_type(pool)?) {
                            return Err(fail(
                                "equality operands have different types".to_string(),
                            ));
                        }
                    }
                    OpFamily::Arithmetic => {
                        if !lhs.is_numeric(pool)? || !rhs.is_numeric(pool)? {
                            return Err(fail(format!(
                                "operands of {:?} must be numeric",
                                op
                            )));
                        }
                    }
                }
                Ok(())
            }
            ExprKind::Unary { op, rhs } => match op {
                UnaryOp::Not => {
                    if !rhs.is_boolean(pool)? {
                        return Err(Error::TypeMismatch {
                            message: "operand of not must be a boolean".to_string(),
                            loc: self.loc.clone(),
                        });
                    }
                    Ok(())
                }
                UnaryOp::Negative => {
                    if !rhs.is_numeric(pool)? {
                        return Err(Error::TypeMismatch {
                            message: "operand of negation must be numeric".to_string(),
                            loc: self.loc.clone(),
                        });
                    }
                    Ok(())
                }
            },
            ExprKind::Exists { expr, .. } | ExprKind::Forall { expr, .. } => {
                if !expr.is_boolean(pool)? {
                    return Err(Error::TypeMismatch {
                        message: "quantified expression is not a boolean".to_string(),
                        loc: expr.loc.clone(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Shared arity and writability checks for function and procedure calls.
pub(crate) fn validate_call_arguments(
    name: &str,
    func: &crate::decl::Function,
    args: &[Expr],
    pool: &DeclPool,
    loc: &Loc,
) -> Result<()> {
    if func.parameters.len() != args.len() {
        return Err(Error::ArityMismatch {
            name: name.to_string(),
            expected: func.parameters.len(),
            found: args.len(),
            loc: loc.clone(),
        });
    }
    for (param, arg) in func.parameters.iter().zip(args) {
        if let DeclKind::Var { readonly, .. } = &param.kind {
            if !readonly && !arg.is_lvalue(pool) {
                return Err(Error::NonLvalueArgument {
                    name: name.to_string(),
                    loc: arg.loc.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Whether a resolved optional type denotes a numeric domain.
pub(crate) fn is_numeric_type(ty: &Option<TypeExpr>) -> bool {
    match ty {
        None => true,
        Some(t) => matches!(t.kind, TypeExprKind::Range { .. }),
    }
}

/// Operands are equatable when both are numeric or their resolved types are
/// structurally equal.
pub(crate) fn equatable(lhs: &Option<TypeExpr>, rhs: &Option<TypeExpr>) -> bool {
    if is_numeric_type(lhs) && is_numeric_type(rhs) {
        return true;
    }
    match (lhs, rhs) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Operands are comparable when they share a numeric domain: both numeric,
/// or the same enum, or the same scalarset.
pub(crate) fn comparable(lhs: &Option<TypeExpr>, rhs: &Option<TypeExpr>) -> bool {
    if is_numeric_type(lhs) && is_numeric_type(rhs) {
        return true;
    }
    match (lhs, rhs) {
        (Some(a), Some(b)) => match (&a.kind, &b.kind) {
            (TypeExprKind::Enum { .. }, TypeExprKind::Enum { .. })
            | (TypeExprKind::Scalarset { .. }, TypeExprKind::Scalarset { .. }) => a == b,
            _ => false,
        },
        _ => false,
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        use ExprKind::*;
        match (self, other) {
            (Number(a), Number(b)) => a == b,
            (Id { name: a, .. }, Id { name: b, .. }) => a == b,
            (
                Field {
                    record: r1,
                    field: f1,
                },
                Field {
                    record: r2,
                    field: f2,
                },
            ) => f1 == f2 && r1 == r2,
            (
                Element {
                    array: a1,
                    index: i1,
                },
                Element {
                    array: a2,
                    index: i2,
                },
            ) => a1 == a2 && i1 == i2,
            (
                Call {
                    name: n1, args: a1, ..
                },
                Call {
                    name: n2, args: a2, ..
                },
            ) => n1 == n2 && a1 == a2,
            (
                Ternary {
                    cond: c1,
                    lhs: l1,
                    rhs: r1,
                },
                Ternary {
                    cond: c2,
                    lhs: l2,
                    rhs: r2,
                },
            ) => c1 == c2 && l1 == l2 && r1 == r2,
            (
                Binary {
                    op: o1,
                    lhs: l1,
                    rhs: r1,
                },
                Binary {
                    op: o2,
                    lhs: l2,
                    rhs: r2,
                },
            ) => o1 == o2 && l1 == l2 && r1 == r2,
            (Unary { op: o1, rhs: r1 }, Unary { op: o2, rhs: r2 }) => o1 == o2 && r1 == r2,
            (
                Exists {
                    quantifier: q1,
                    expr: e1,
                },
                Exists {
                    quantifier: q2,
                    expr: e2,
                },
            ) => q1 == q2 && e1 == e2,
            (
                Forall {
                    quantifier: q1,
                    expr: e1,
                },
                Forall {
                    quantifier: q2,
                    expr: e2,
                },
            ) => q1 == q2 && e1 == e2,
            _ => false,
        }
    }
}

impl Eq for ExprKind {}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn bin(op: BinaryOp, l: Expr, r: Expr) -> Expr {
        Expr::binary(op, l, r, Loc::dummy())
    }

    #[test]
    fn test_fold_arithmetic() {
        let pool = DeclPool::new();
        // (1 + 2) * 3
        let e = bin(BinaryOp::Mul, bin(BinaryOp::Add, num(1), num(2)), num(3));
        assert!(e.constant(&pool));
        assert_eq!(e.constant_fold(&pool).unwrap(), Int::from(9));
    }

    #[test]
    fn test_fold_division_by_zero() {
        let pool = DeclPool::new();
        let e = bin(BinaryOp::Div, num(5), num(0));
        assert!(matches!(
            e.constant_fold(&pool),
            Err(Error::DivisionByZero { .. })
        ));
        let e = bin(BinaryOp::Mod, num(5), num(0));
        assert!(matches!(
            e.constant_fold(&pool),
            Err(Error::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_implication_truth_table() {
        let pool = DeclPool::new();
        let cases = [(0, 0, 1), (0, 1, 1), (1, 0, 0), (1, 1, 1)];
        for (a, b, expected) in cases {
            let e = bin(BinaryOp::Implication, num(a), num(b));
            assert_eq!(e.constant_fold(&pool).unwrap(), Int::from(expected));
        }
    }

    #[test]
    fn test_ternary_folds_through_condition() {
        let pool = DeclPool::new();
        let e = Expr::ternary(num(1), num(10), num(20), Loc::dummy());
        assert_eq!(e.constant_fold(&pool).unwrap(), Int::from(10));
        let e = Expr::ternary(num(0), num(10), num(20), Loc::dummy());
        assert_eq!(e.constant_fold(&pool).unwrap(), Int::from(20));
    }

    #[test]
    fn test_unary_folds() {
        let pool = DeclPool::new();
        assert_eq!(
            Expr::unary(UnaryOp::Not, num(0), Loc::dummy())
                .constant_fold(&pool)
                .unwrap(),
            Int::one()
        );
        assert_eq!(
            Expr::unary(UnaryOp::Negative, num(7), Loc::dummy())
                .constant_fold(&pool)
                .unwrap(),
            Int::from(-7)
        );
    }

    #[test]
    fn test_unresolved_identifier_is_not_constant() {
        let pool = DeclPool::new();
        let e = Expr::id("x", Loc::dummy());
        assert!(!e.constant(&pool));
        assert!(e.constant_fold(&pool).is_err());
    }

    #[test]
    fn test_arithmetic_type_is_numeric() {
        let pool = DeclPool::new();
        let e = bin(BinaryOp::Add, num(1), num(2));
        assert!(e.type_of(&pool).unwrap().is_none());
        let e = bin(BinaryOp::Lt, num(1), num(2));
        assert!(e.type_of(&pool).unwrap().unwrap().is_boolean_type());
    }

    #[test]
    fn test_ternary_is_not_an_lvalue() {
        let pool = DeclPool::new();
        let e = Expr::ternary(num(1), num(2), num(3), Loc::dummy());
        assert!(!e.is_lvalue(&pool));
    }

    #[test]
    fn test_equality_ignores_location_and_id() {
        let mut a = bin(BinaryOp::Add, num(1), num(2));
        let b = bin(BinaryOp::Add, num(1), num(2));
        a.unique_id = 42;
        a.loc = Loc::new("x.m", crate::loc::Position::new(1, 1), Default::default());
        assert_eq!(a, b);
        let c = bin(BinaryOp::Sub, num(1), num(2));
        assert_ne!(a, c);
    }

    #[test]
    fn test_boolean_operand_validation() {
        let pool = DeclPool::new();
        // numbers are not booleans, so `1 and 2` must be rejected
        let e = bin(BinaryOp::And, num(1), num(2));
        assert!(matches!(
            e.validate(&pool),
            Err(Error::TypeMismatch { .. })
        ));
        // arithmetic over numbers is fine
        let e = bin(BinaryOp::Add, num(1), num(2));
        assert!(e.validate(&pool).is_ok());
    }
}
