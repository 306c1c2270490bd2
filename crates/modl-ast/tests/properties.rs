//! Property tests over randomly generated expression trees.

use modl_ast::{
    BinaryOp, DeclPool, Error, Expr, Int, Loc, NodeRef, Postorder, Preorder, UnaryOp,
};
use proptest::prelude::*;

/// Strategy for constant expression trees built from literals, arithmetic,
/// ternaries, and negation.
fn constant_expr() -> impl Strategy<Value = Expr> {
    let leaf = (-64i64..=64).prop_map(|v| Expr::number(Int::from(v), Loc::dummy()));
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (
                prop_oneof![
                    Just(BinaryOp::Add),
                    Just(BinaryOp::Sub),
                    Just(BinaryOp::Mul),
                    Just(BinaryOp::Div),
                ],
                inner.clone(),
                inner.clone(),
            )
                .prop_map(|(op, l, r)| Expr::binary(op, l, r, Loc::dummy())),
            inner
                .clone()
                .prop_map(|e| Expr::unary(UnaryOp::Negative, e, Loc::dummy())),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(c, t, f)| Expr::ternary(c, t, f, Loc::dummy())),
        ]
    })
}

/// Strategy that also mixes in free identifiers and divisions, so folding
/// may fail either way.
fn arbitrary_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        (-64i64..=64).prop_map(|v| Expr::number(Int::from(v), Loc::dummy())),
        "[a-z]{1,4}".prop_map(|name| Expr::id(name, Loc::dummy())),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (
                prop_oneof![
                    Just(BinaryOp::Add),
                    Just(BinaryOp::Mul),
                    Just(BinaryOp::Div),
                    Just(BinaryOp::Mod),
                ],
                inner.clone(),
                inner.clone(),
            )
                .prop_map(|(op, l, r)| Expr::binary(op, l, r, Loc::dummy())),
            inner
                .clone()
                .prop_map(|e| Expr::unary(UnaryOp::Negative, e, Loc::dummy())),
        ]
    })
}

proptest! {
    /// A clone is structurally equal to its source and fully detached.
    #[test]
    fn clone_equals_and_is_detached(e in arbitrary_expr()) {
        let original = e.clone();
        let mut copy = e.clone();
        prop_assert_eq!(&copy, &e);
        // clone of a clone still matches the original
        prop_assert_eq!(&copy.clone(), &e);

        // mutating the copy leaves the source untouched
        copy.kind = modl_ast::ExprKind::Number(Int::from(12345i64));
        prop_assert_eq!(&e, &original);
        prop_assert_ne!(&copy, &original);
    }

    /// Folding a constant expression terminates, is deterministic, and
    /// `constant` predicts whether the not-a-constant failure can occur.
    #[test]
    fn folding_is_deterministic(e in constant_expr()) {
        let pool = DeclPool::new();
        prop_assert!(e.constant(&pool));
        let first = e.constant_fold(&pool);
        let second = e.constant_fold(&pool);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            // constant subtrees may still divide by zero
            (Err(Error::DivisionByZero { .. }), Err(Error::DivisionByZero { .. })) => {}
            (a, b) => prop_assert!(false, "non-deterministic fold: {:?} vs {:?}", a, b),
        }
    }

    /// Non-constant expressions fail with the not-a-constant kind, never a
    /// wrong answer.
    #[test]
    fn non_constants_fail_with_the_right_kind(e in arbitrary_expr()) {
        let pool = DeclPool::new();
        if !e.constant(&pool) {
            match e.constant_fold(&pool) {
                Err(Error::NotConstant { .. })
                | Err(Error::UnresolvedReference { .. })
                | Err(Error::DivisionByZero { .. }) => {}
                other => prop_assert!(false, "unexpected fold result: {:?}", other),
            }
        }
    }

    /// Pre-order and post-order visit the same set of nodes; pre-order
    /// yields parents before children and post-order the reverse.
    #[test]
    fn orderings_agree_on_the_node_set(e in arbitrary_expr()) {
        let pre: Vec<*const ()> = Preorder::new(NodeRef::Expr(&e))
            .map(|n| match n {
                NodeRef::Expr(x) => x as *const _ as *const (),
                _ => std::ptr::null(),
            })
            .collect();
        let post: Vec<*const ()> = Postorder::new(NodeRef::Expr(&e))
            .map(|n| match n {
                NodeRef::Expr(x) => x as *const _ as *const (),
                _ => std::ptr::null(),
            })
            .collect();

        prop_assert_eq!(pre.len(), post.len());
        let pre_set: std::collections::HashSet<_> = pre.iter().copied().collect();
        let post_set: std::collections::HashSet<_> = post.iter().copied().collect();
        prop_assert_eq!(&pre_set, &post_set);

        // the root comes first in pre-order and last in post-order
        let root = &e as *const _ as *const ();
        prop_assert_eq!(pre[0], root);
        prop_assert_eq!(post[post.len() - 1], root);
    }
}
