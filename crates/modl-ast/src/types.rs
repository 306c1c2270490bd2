//! Type expressions.

use crate::decl::{Decl, DeclId, DeclKind, DeclPool};
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::loc::Loc;
use crate::number::Int;
use crate::NodeId;

/// A type expression.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub kind: TypeExprKind,
}

/// The kind of type expression.
#[derive(Debug, Clone)]
pub enum TypeExprKind {
    /// Reference to a declared type by name. The back-link is set during
    /// resolution.
    Named { name: String, decl: Option<DeclId> },
    /// Bounded integer interval `min..max`; both bounds are constant
    /// expressions.
    Range { min: Box<Expr>, max: Box<Expr> },
    /// Ordered finite set of named constants.
    Enum { members: Vec<(String, Loc)> },
    /// Symmetry type of indistinguishable values, `0..bound` inclusive.
    Scalarset { bound: Box<Expr> },
    /// Array indexed by a simple type.
    Array {
        index_type: Box<TypeExpr>,
        element_type: Box<TypeExpr>,
    },
    /// Record with ordered named fields (Var declarations).
    Record { fields: Vec<Decl> },
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            kind,
        }
    }

    pub fn named(name: impl Into<String>, loc: Loc) -> Self {
        Self::new(
            TypeExprKind::Named {
                name: name.into(),
                decl: None,
            },
            loc,
        )
    }

    pub fn range(min: Expr, max: Expr, loc: Loc) -> Self {
        Self::new(
            TypeExprKind::Range {
                min: Box::new(min),
                max: Box::new(max),
            },
            loc,
        )
    }

    pub fn enumeration(members: Vec<(String, Loc)>, loc: Loc) -> Self {
        Self::new(TypeExprKind::Enum { members }, loc)
    }

    pub fn scalarset(bound: Expr, loc: Loc) -> Self {
        Self::new(
            TypeExprKind::Scalarset {
                bound: Box::new(bound),
            },
            loc,
        )
    }

    pub fn array(index_type: TypeExpr, element_type: TypeExpr, loc: Loc) -> Self {
        Self::new(
            TypeExprKind::Array {
                index_type: Box::new(index_type),
                element_type: Box::new(element_type),
            },
            loc,
        )
    }

    pub fn record(fields: Vec<Decl>, loc: Loc) -> Self {
        Self::new(TypeExprKind::Record { fields }, loc)
    }

    /// The built-in boolean type, an enum over `false` and `true`.
    pub fn boolean() -> Self {
        Self::enumeration(
            vec![
                ("false".to_string(), Loc::dummy()),
                ("true".to_string(), Loc::dummy()),
            ],
            Loc::dummy(),
        )
    }

    /// Follow named references until a structural type is reached.
    ///
    /// Resolution declares types strictly before they can be referenced, so
    /// the chain of references is acyclic and this terminates.
    pub fn resolve(&self, pool: &DeclPool) -> Result<TypeExpr> {
        match &self.kind {
            TypeExprKind::Named { name, decl } => {
                let id = decl.ok_or_else(|| Error::UnresolvedReference {
                    name: name.clone(),
                    loc: self.loc.clone(),
                })?;
                match &pool.get(id).kind {
                    DeclKind::Type { value } => value.resolve(pool),
                    _ => Err(Error::UnresolvedReference {
                        name: name.clone(),
                        loc: self.loc.clone(),
                    }),
                }
            }
            _ => Ok(self.clone()),
        }
    }

    /// Whether this is the built-in boolean enum. Callers resolve first.
    pub fn is_boolean_type(&self) -> bool {
        match &self.kind {
            TypeExprKind::Enum { members } => {
                members.len() == 2 && members[0].0 == "false" && members[1].0 == "true"
            }
            _ => false,
        }
    }

    /// Whether this is a scalar type (range, enum, or scalarset). Callers
    /// resolve first.
    pub fn is_simple(&self) -> bool {
        matches!(
            self.kind,
            TypeExprKind::Range { .. } | TypeExprKind::Enum { .. } | TypeExprKind::Scalarset { .. }
        )
    }

    /// Number of values a simple type can take.
    pub fn value_count(&self, pool: &DeclPool) -> Result<Int> {
        let resolved = self.resolve(pool)?;
        match &resolved.kind {
            TypeExprKind::Range { min, max } => {
                let lo = min.constant_fold(pool)?;
                let hi = max.constant_fold(pool)?;
                if hi < lo {
                    Ok(Int::zero())
                } else {
                    Ok(&(&hi - &lo) + &Int::one())
                }
            }
            TypeExprKind::Enum { members } => Ok(Int::from(members.len() as u64)),
            TypeExprKind::Scalarset { bound } => {
                Ok(&bound.constant_fold(pool)? + &Int::one())
            }
            _ => Err(Error::TypeMismatch {
                message: "type has no scalar value count".to_string(),
                loc: self.loc.clone(),
            }),
        }
    }

    /// Width in bits of a value of this type, with one extra encoding
    /// reserved for "undefined".
    pub fn width_bits(&self, pool: &DeclPool) -> Result<Int> {
        let resolved = self.resolve(pool)?;
        match &resolved.kind {
            TypeExprKind::Range { .. } | TypeExprKind::Enum { .. } | TypeExprKind::Scalarset { .. } => {
                Ok(Int::from(resolved.value_count(pool)?.bits()))
            }
            TypeExprKind::Array {
                index_type,
                element_type,
            } => {
                let count = index_type.value_count(pool)?;
                Ok(&count * &element_type.width_bits(pool)?)
            }
            TypeExprKind::Record { fields } => {
                let mut total = Int::zero();
                for f in fields {
                    if let DeclKind::Var { ty, .. } = &f.kind {
                        total = &total + &ty.width_bits(pool)?;
                    }
                }
                Ok(total)
            }
            TypeExprKind::Named { .. } => unreachable!("resolve returned a named type"),
        }
    }

    /// Smallest value of a simple type (0 for enums and scalarsets).
    pub fn lower_bound(&self, pool: &DeclPool) -> Result<Int> {
        let resolved = self.resolve(pool)?;
        match &resolved.kind {
            TypeExprKind::Range { min, .. } => min.constant_fold(pool),
            TypeExprKind::Enum { .. } | TypeExprKind::Scalarset { .. } => Ok(Int::zero()),
            _ => Err(Error::TypeMismatch {
                message: "type has no scalar bounds".to_string(),
                loc: self.loc.clone(),
            }),
        }
    }

    /// Largest value of a simple type.
    pub fn upper_bound(&self, pool: &DeclPool) -> Result<Int> {
        let resolved = self.resolve(pool)?;
        match &resolved.kind {
            TypeExprKind::Range { max, .. } => max.constant_fold(pool),
            TypeExprKind::Enum { members } => {
                Ok(Int::from(members.len().saturating_sub(1) as u64))
            }
            TypeExprKind::Scalarset { bound } => bound.constant_fold(pool),
            _ => Err(Error::TypeMismatch {
                message: "type has no scalar bounds".to_string(),
                loc: self.loc.clone(),
            }),
        }
    }

    /// Local well-formedness checks; children are validated by the pass.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            TypeExprKind::Named { name, decl } => {
                if decl.is_none() {
                    return Err(Error::UnresolvedReference {
                        name: name.clone(),
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            TypeExprKind::Range { min, max } => {
                for bound in [min, max] {
                    if !bound.constant(pool) {
                        return Err(Error::TypeMismatch {
                            message: "range bound is not a constant".to_string(),
                            loc: bound.loc.clone(),
                        });
                    }
                    bound.constant_fold(pool)?;
                }
                Ok(())
            }
            TypeExprKind::Enum { members } => {
                if members.is_empty() {
                    return Err(Error::EmptyEnum {
                        loc: self.loc.clone(),
                    });
                }
                for (i, (name, loc)) in members.iter().enumerate() {
                    if members[..i].iter().any(|(other, _)| other == name) {
                        return Err(Error::DuplicateEnumMember {
                            name: name.clone(),
                            loc: loc.clone(),
                        });
                    }
                }
                Ok(())
            }
            TypeExprKind::Scalarset { bound } => {
                if !bound.constant(pool) {
                    return Err(Error::NonPositiveScalarset {
                        loc: self.loc.clone(),
                    });
                }
                if bound.constant_fold(pool)? <= Int::zero() {
                    return Err(Error::NonPositiveScalarset {
                        loc: self.loc.clone(),
                    });
                }
                Ok(())
            }
            TypeExprKind::Array { index_type, .. } => {
                if !index_type.resolve(pool)?.is_simple() {
                    return Err(Error::TypeMismatch {
                        message: "array index type must be a simple type".to_string(),
                        loc: index_type.loc.clone(),
                    });
                }
                Ok(())
            }
            TypeExprKind::Record { fields } => {
                for (i, f) in fields.iter().enumerate() {
                    if fields[..i].iter().any(|other| other.name == f.name) {
                        return Err(Error::DuplicateDeclaration {
                            name: f.name.clone(),
                            loc: f.loc.clone(),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for TypeExpr {}

impl PartialEq for TypeExprKind {
    fn eq(&self, other: &Self) -> bool {
        use TypeExprKind::*;
        match (self, other) {
            (Named { name: a, .. }, Named { name: b, .. }) => a == b,
            (Range { min: a1, max: a2 }, Range { min: b1, max: b2 }) => a1 == b1 && a2 == b2,
            (Enum { members: a }, Enum { members: b }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.0 == y.0)
            }
            (Scalarset { bound: a }, Scalarset { bound: b }) => a == b,
            (
                Array {
                    index_type: ai,
                    element_type: ae,
                },
                Array {
                    index_type: bi,
                    element_type: be,
                },
            ) => ai == bi && ae == be,
            (Record { fields: a }, Record { fields: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeExprKind {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    fn range(lo: i64, hi: i64) -> TypeExpr {
        TypeExpr::range(
            Expr::number(Int::from(lo), Loc::dummy()),
            Expr::number(Int::from(hi), Loc::dummy()),
            Loc::dummy(),
        )
    }

    #[test]
    fn test_boolean_detection() {
        assert!(TypeExpr::boolean().is_boolean_type());
        let other = TypeExpr::enumeration(
            vec![("a".into(), Loc::dummy()), ("b".into(), Loc::dummy())],
            Loc::dummy(),
        );
        assert!(!other.is_boolean_type());
    }

    #[test]
    fn test_resolve_structural_is_identity() {
        let pool = DeclPool::new();
        let t = range(0, 3);
        assert_eq!(t.resolve(&pool).unwrap(), t);
    }

    #[test]
    fn test_value_count_and_width() {
        let pool = DeclPool::new();
        // 0..3 has 4 values plus an undefined encoding: 3 bits.
        assert_eq!(range(0, 3).value_count(&pool).unwrap(), Int::from(4));
        assert_eq!(range(0, 3).width_bits(&pool).unwrap(), Int::from(3));
        // 1..1 has a single value: 1 bit.
        assert_eq!(range(1, 1).width_bits(&pool).unwrap(), Int::from(1));
    }

    #[test]
    fn test_empty_enum_rejected() {
        let pool = DeclPool::new();
        let t = TypeExpr::enumeration(vec![], Loc::dummy());
        assert!(matches!(t.validate(&pool), Err(Error::EmptyEnum { .. })));
    }

    #[test]
    fn test_duplicate_enum_member_rejected() {
        let pool = DeclPool::new();
        let t = TypeExpr::enumeration(
            vec![("a".into(), Loc::dummy()), ("a".into(), Loc::dummy())],
            Loc::dummy(),
        );
        assert!(matches!(
            t.validate(&pool),
            Err(Error::DuplicateEnumMember { .. })
        ));
    }

    #[test]
    fn test_scalarset_bound_must_be_positive() {
        let pool = DeclPool::new();
        let t = TypeExpr::scalarset(Expr::number(Int::from(0), Loc::dummy()), Loc::dummy());
        assert!(matches!(
            t.validate(&pool),
            Err(Error::NonPositiveScalarset { .. })
        ));
        let ok = TypeExpr::scalarset(Expr::number(Int::from(3), Loc::dummy()), Loc::dummy());
        assert!(ok.validate(&pool).is_ok());
        // scalarset N holds N+1 values 0..N inclusive
        assert_eq!(ok.value_count(&pool).unwrap(), Int::from(4));
    }

    #[test]
    fn test_array_width_scales_with_index() {
        let pool = DeclPool::new();
        let t = TypeExpr::array(range(0, 3), range(0, 1), Loc::dummy());
        // 4 slots of 2 bits each
        assert_eq!(t.width_bits(&pool).unwrap(), Int::from(8));
    }

    #[test]
    fn test_structural_equality_ignores_locations() {
        let a = range(0, 3);
        let mut b = range(0, 3);
        b.loc = Loc::new("elsewhere.m", Position::new(9, 9), Position::new(9, 12));
        b.unique_id = 77;
        assert_eq!(a, b);
    }

    use crate::loc::Position;
}
