//! Properties attached to statements and rules.

use crate::decl::DeclPool;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::loc::Loc;
use crate::NodeId;

/// How a property participates in checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Must hold; a violation is a counterexample.
    Assertion,
    /// Assumed to hold; a violating path is discarded.
    Assumption,
    /// Reached instances are recorded rather than required.
    Cover,
    /// Must hold eventually.
    Liveness,
}

/// A checkable property: a category and a boolean expression.
#[derive(Debug, Clone)]
pub struct Property {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub category: Category,
    pub expr: Expr,
}

impl Property {
    pub fn new(category: Category, expr: Expr, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            category,
            expr,
        }
    }

    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        if !self.expr.is_boolean(pool)? {
            return Err(Error::TypeMismatch {
                message: "property expression is not a boolean".to_string(),
                loc: self.expr.loc.clone(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.expr == other.expr
    }
}

impl Eq for Property {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Int;

    #[test]
    fn test_property_body_must_be_boolean() {
        let pool = DeclPool::new();
        let p = Property::new(
            Category::Assertion,
            Expr::number(Int::from(1), Loc::dummy()),
            Loc::dummy(),
        );
        assert!(matches!(
            p.validate(&pool),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
