//! The model root.

use crate::decl::{Decl, DeclKind, DeclPool};
use crate::error::Result;
use crate::expr::Quantifier;
use crate::loc::Loc;
use crate::number::Int;
use crate::property::Property;
use crate::rule::{flatten_all, Rule};
use crate::stmt::Stmt;
use crate::traverse::{
    walk_decl_mut, walk_expr_mut, walk_model_mut, walk_property_mut, walk_quantifier_mut,
    walk_rule_mut, walk_stmt_mut, walk_type_expr_mut, NodeRef, Preorder, VisitorMut,
};
use crate::types::TypeExpr;
use crate::{Expr, NodeId};

/// The root of an AST: an ordered declaration list and an ordered rule
/// list, plus the declaration pool populated by resolution.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub decls: Vec<Decl>,
    pub rules: Vec<Rule>,
    /// Resolved declarations referenced by back-links throughout the tree.
    /// Not part of structural equality; it is derived state.
    pub pool: DeclPool,
}

impl Model {
    pub fn new(decls: Vec<Decl>, rules: Vec<Rule>, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            decls,
            rules,
            pool: DeclPool::new(),
        }
    }

    /// Number every node in pre-order, starting at 1.
    pub fn assign_ids(&mut self) {
        let mut numberer = Numberer { next: 1 };
        numberer.visit_model(self);
    }

    /// The largest unique id assigned anywhere in the tree.
    pub fn max_unique_id(&self) -> NodeId {
        Preorder::new(NodeRef::Model(self))
            .map(|n| n.unique_id())
            .max()
            .unwrap_or(0)
    }

    /// Size of the packed state in bits: the sum of the widths of the
    /// model's variable declarations.
    pub fn size_bits(&self) -> Result<Int> {
        let mut total = Int::zero();
        for d in &self.decls {
            if let DeclKind::Var { ty, .. } = &d.kind {
                total = &total + &ty.width_bits(&self.pool)?;
            }
        }
        Ok(total)
    }

    /// Flatten the rule list into simple, start-state, and property rules.
    pub fn flat_rules(&self) -> Vec<Rule> {
        flatten_all(&self.rules)
    }

    pub fn validate(&self, _pool: &DeclPool) -> Result<()> {
        Ok(())
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.decls == other.decls && self.rules == other.rules
    }
}

impl Eq for Model {}

/// Assigns pre-order ids to every node.
struct Numberer {
    next: NodeId,
}

impl Numberer {
    fn bump(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl VisitorMut for Numberer {
    fn visit_model(&mut self, n: &mut Model) {
        n.unique_id = self.bump();
        walk_model_mut(self, n);
    }

    fn visit_decl(&mut self, n: &mut Decl) {
        n.unique_id = self.bump();
        walk_decl_mut(self, n);
    }

    fn visit_type_expr(&mut self, n: &mut TypeExpr) {
        n.unique_id = self.bump();
        walk_type_expr_mut(self, n);
    }

    fn visit_expr(&mut self, n: &mut Expr) {
        n.unique_id = self.bump();
        walk_expr_mut(self, n);
    }

    fn visit_stmt(&mut self, n: &mut Stmt) {
        n.unique_id = self.bump();
        walk_stmt_mut(self, n);
    }

    fn visit_rule(&mut self, n: &mut Rule) {
        n.unique_id = self.bump();
        walk_rule_mut(self, n);
    }

    fn visit_quantifier(&mut self, n: &mut Quantifier) {
        n.unique_id = self.bump();
        walk_quantifier_mut(self, n);
    }

    fn visit_property(&mut self, n: &mut Property) {
        n.unique_id = self.bump();
        walk_property_mut(self, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;
    use std::collections::HashSet;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn sample_model() -> Model {
        let decls = vec![
            Decl::constant("N", None, num(4), Loc::dummy()),
            Decl::var(
                "x",
                TypeExpr::range(num(0), num(3), Loc::dummy()),
                false,
                Loc::dummy(),
            ),
        ];
        let rules = vec![Rule::simple(
            "tick",
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
        )];
        Model::new(decls, rules, Loc::dummy())
    }

    #[test]
    fn test_assign_ids_is_preorder_and_distinct() {
        let mut m = sample_model();
        m.assign_ids();
        assert_eq!(m.unique_id, 1);

        let ids: Vec<NodeId> = Preorder::new(NodeRef::Model(&m))
            .map(|n| n.unique_id())
            .collect();
        let distinct: HashSet<NodeId> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());
        assert!(ids.iter().all(|&id| id != 0));
        // pre-order numbering yields consecutive ids in visit order
        let expected: Vec<NodeId> = (1..=ids.len() as NodeId).collect();
        assert_eq!(ids, expected);
        assert_eq!(m.max_unique_id(), ids.len() as NodeId);
    }

    #[test]
    fn test_clone_equals_original() {
        let mut m = sample_model();
        m.assign_ids();
        let copy = m.clone();
        assert_eq!(copy, m);
    }

    #[test]
    fn test_mutating_a_clone_leaves_the_original_alone() {
        let m = sample_model();
        let mut copy = m.clone();
        copy.rules.clear();
        assert_eq!(m.rules.len(), 1);
        assert_ne!(copy, m);
    }

    #[test]
    fn test_size_bits_sums_variables() {
        let m = sample_model();
        // one variable of type 0..3: 4 values plus undefined = 3 bits
        assert_eq!(m.size_bits().unwrap(), Int::from(3));
    }

    #[test]
    fn test_flat_rules_of_flat_model_is_identity() {
        let m = sample_model();
        let flat = m.flat_rules();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0], m.rules[0]);
    }
}
