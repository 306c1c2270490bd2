//! The validation pass.

use crate::decl::DeclPool;
use crate::error::Result;
use crate::model::Model;
use crate::traverse::{NodeRef, Postorder};

/// Check every node's local contract, children before parents.
///
/// Runs after resolution. The first failure aborts the pass; validation does
/// not attempt recovery. A tree that validated once validates again.
pub fn validate(model: &Model) -> Result<()> {
    for node in Postorder::new(NodeRef::Model(model)) {
        validate_node(node, &model.pool)?;
    }
    Ok(())
}

fn validate_node(node: NodeRef<'_>, pool: &DeclPool) -> Result<()> {
    match node {
        NodeRef::Model(n) => n.validate(pool),
        NodeRef::Decl(n) => n.validate(pool),
        NodeRef::TypeExpr(n) => n.validate(pool),
        NodeRef::Expr(n) => n.validate(pool),
        NodeRef::Stmt(n) => n.validate(pool),
        NodeRef::Rule(n) => n.validate(pool),
        NodeRef::Quantifier(n) => n.validate(pool),
        NodeRef::Property(n) => n.validate(pool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Decl;
    use crate::error::Error;
    use crate::expr::{BinaryOp, Expr};
    use crate::loc::Loc;
    use crate::number::Int;
    use crate::resolve::resolve;
    use crate::rule::Rule;
    use crate::stmt::Stmt;
    use crate::types::TypeExpr;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn checked(mut model: Model) -> Result<Model> {
        model.assign_ids();
        resolve(&mut model)?;
        validate(&model)?;
        Ok(model)
    }

    #[test]
    fn test_well_formed_model_validates() {
        let m = Model::new(
            vec![
                Decl::constant("limit", None, num(3), Loc::dummy()),
                Decl::var(
                    "x",
                    TypeExpr::range(num(0), Expr::id("limit", Loc::dummy()), Loc::dummy()),
                    false,
                    Loc::dummy(),
                ),
            ],
            vec![Rule::simple(
                "bump",
                Some(Expr::binary(
                    BinaryOp::Lt,
                    Expr::id("x", Loc::dummy()),
                    num(3),
                    Loc::dummy(),
                )),
                vec![],
                vec![Stmt::assignment(
                    Expr::id("x", Loc::dummy()),
                    Expr::binary(
                        BinaryOp::Add,
                        Expr::id("x", Loc::dummy()),
                        num(1),
                        Loc::dummy(),
                    ),
                    Loc::dummy(),
                )],
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        checked(m).unwrap();
    }

    #[test]
    fn test_validation_is_idempotent() {
        let m = checked(Model::new(
            vec![Decl::constant("n", None, num(1), Loc::dummy())],
            vec![],
            Loc::dummy(),
        ))
        .unwrap();
        validate(&m).unwrap();
        validate(&m).unwrap();
    }

    #[test]
    fn test_non_boolean_guard_is_rejected() {
        let m = Model::new(
            vec![Decl::var(
                "x",
                TypeExpr::range(num(0), num(3), Loc::dummy()),
                false,
                Loc::dummy(),
            )],
            vec![Rule::simple(
                "broken",
                Some(num(1)),
                vec![],
                vec![],
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        assert!(matches!(checked(m), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_assignment_to_constant_is_rejected() {
        let m = Model::new(
            vec![Decl::constant("k", None, num(1), Loc::dummy())],
            vec![Rule::start_state(
                "init",
                vec![],
                vec![Stmt::assignment(
                    Expr::id("k", Loc::dummy()),
                    num(2),
                    Loc::dummy(),
                )],
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        assert!(matches!(checked(m), Err(Error::NotAnLvalue { .. })));
    }

    #[test]
    fn test_non_constant_const_is_rejected() {
        let m = Model::new(
            vec![
                Decl::var(
                    "x",
                    TypeExpr::range(num(0), num(3), Loc::dummy()),
                    false,
                    Loc::dummy(),
                ),
                Decl::constant("c", None, Expr::id("x", Loc::dummy()), Loc::dummy()),
            ],
            vec![],
            Loc::dummy(),
        );
        assert!(matches!(checked(m), Err(Error::NonConstantConst { .. })));
    }

    #[test]
    fn test_return_with_value_in_procedure_is_rejected() {
        let m = Model::new(
            vec![Decl::function(
                "p",
                vec![],
                None,
                vec![],
                vec![Stmt::return_stmt(Some(num(5)), Loc::dummy())],
                Loc::dummy(),
            )],
            vec![],
            Loc::dummy(),
        );
        let err = checked(m).unwrap_err();
        assert_eq!(
            err.to_string(),
            "statement returns a value from a procedure"
        );
    }
}
