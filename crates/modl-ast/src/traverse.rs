//! Traversal framework: by-reference iteration and visitors.
//!
//! Child order is fixed: declarations before rules, lhs before rhs,
//! quantifier before body, following the field order of the node types.
//! Every traversal in the crate observes the same order, so passes and
//! emitters are deterministic.

use crate::decl::{Decl, DeclKind};
use crate::expr::{Expr, ExprKind, Quantifier, QuantifierKind};
use crate::loc::Loc;
use crate::model::Model;
use crate::property::Property;
use crate::rule::{Rule, RuleKind};
use crate::stmt::{Stmt, StmtKind};
use crate::types::{TypeExpr, TypeExprKind};
use crate::NodeId;

/// A reference to any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Model(&'a Model),
    Decl(&'a Decl),
    TypeExpr(&'a TypeExpr),
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Rule(&'a Rule),
    Quantifier(&'a Quantifier),
    Property(&'a Property),
}

impl<'a> NodeRef<'a> {
    pub fn loc(&self) -> &'a Loc {
        match self {
            NodeRef::Model(n) => &n.loc,
            NodeRef::Decl(n) => &n.loc,
            NodeRef::TypeExpr(n) => &n.loc,
            NodeRef::Expr(n) => &n.loc,
            NodeRef::Stmt(n) => &n.loc,
            NodeRef::Rule(n) => &n.loc,
            NodeRef::Quantifier(n) => &n.loc,
            NodeRef::Property(n) => &n.loc,
        }
    }

    pub fn unique_id(&self) -> NodeId {
        match self {
            NodeRef::Model(n) => n.unique_id,
            NodeRef::Decl(n) => n.unique_id,
            NodeRef::TypeExpr(n) => n.unique_id,
            NodeRef::Expr(n) => n.unique_id,
            NodeRef::Stmt(n) => n.unique_id,
            NodeRef::Rule(n) => n.unique_id,
            NodeRef::Quantifier(n) => n.unique_id,
            NodeRef::Property(n) => n.unique_id,
        }
    }

    /// Children in traversal order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match self {
            NodeRef::Model(m) => {
                out.extend(m.decls.iter().map(NodeRef::Decl));
                out.extend(m.rules.iter().map(NodeRef::Rule));
            }
            NodeRef::Decl(d) => match &d.kind {
                DeclKind::Const { ty, value } => {
                    out.extend(ty.iter().map(NodeRef::TypeExpr));
                    out.push(NodeRef::Expr(value));
                }
                DeclKind::Type { value } => out.push(NodeRef::TypeExpr(value)),
                DeclKind::Var { ty, .. } => out.push(NodeRef::TypeExpr(ty)),
                DeclKind::Alias { value } => out.push(NodeRef::Expr(value)),
                DeclKind::Func(f) => {
                    out.extend(f.parameters.iter().map(NodeRef::Decl));
                    out.extend(f.return_type.iter().map(NodeRef::TypeExpr));
                    out.extend(f.decls.iter().map(NodeRef::Decl));
                    out.extend(f.body.iter().map(NodeRef::Stmt));
                }
            },
            NodeRef::TypeExpr(t) => match &t.kind {
                TypeExprKind::Named { .. } | TypeExprKind::Enum { .. } => {}
                TypeExprKind::Range { min, max } => {
                    out.push(NodeRef::Expr(min));
                    out.push(NodeRef::Expr(max));
                }
                TypeExprKind::Scalarset { bound } => out.push(NodeRef::Expr(bound)),
                TypeExprKind::Array {
                    index_type,
                    element_type,
                } => {
                    out.push(NodeRef::TypeExpr(index_type));
                    out.push(NodeRef::TypeExpr(element_type));
                }
                TypeExprKind::Record { fields } => {
                    out.extend(fields.iter().map(NodeRef::Decl));
                }
            },
            NodeRef::Expr(e) => match &e.kind {
                ExprKind::Number(_) | ExprKind::Id { .. } => {}
                ExprKind::Field { record, .. } => out.push(NodeRef::Expr(record)),
                ExprKind::Element { array, index } => {
                    out.push(NodeRef::Expr(array));
                    out.push(NodeRef::Expr(index));
                }
                ExprKind::Call { args, .. } => out.extend(args.iter().map(NodeRef::Expr)),
                ExprKind::Ternary { cond, lhs, rhs } => {
                    out.push(NodeRef::Expr(cond));
                    out.push(NodeRef::Expr(lhs));
                    out.push(NodeRef::Expr(rhs));
                }
                ExprKind::Binary { lhs, rhs, .. } => {
                    out.push(NodeRef::Expr(lhs));
                    out.push(NodeRef::Expr(rhs));
                }
                ExprKind::Unary { rhs, .. } => out.push(NodeRef::Expr(rhs)),
                ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
                    out.push(NodeRef::Quantifier(quantifier));
                    out.push(NodeRef::Expr(expr));
                }
            },
            NodeRef::Stmt(s) => match &s.kind {
                StmtKind::Assignment { lhs, rhs } => {
                    out.push(NodeRef::Expr(lhs));
                    out.push(NodeRef::Expr(rhs));
                }
                StmtKind::Clear(e) | StmtKind::Undefine(e) => out.push(NodeRef::Expr(e)),
                StmtKind::ErrorStmt { .. } => {}
                StmtKind::If { clauses } => {
                    for clause in clauses {
                        out.extend(clause.condition.iter().map(NodeRef::Expr));
                        out.extend(clause.body.iter().map(NodeRef::Stmt));
                    }
                }
                StmtKind::For { quantifier, body } => {
                    out.push(NodeRef::Quantifier(quantifier));
                    out.extend(body.iter().map(NodeRef::Stmt));
                }
                StmtKind::While { condition, body } => {
                    out.push(NodeRef::Expr(condition));
                    out.extend(body.iter().map(NodeRef::Stmt));
                }
                StmtKind::Switch { expr, cases } => {
                    out.push(NodeRef::Expr(expr));
                    for case in cases {
                        out.extend(case.matches.iter().map(NodeRef::Expr));
                        out.extend(case.body.iter().map(NodeRef::Stmt));
                    }
                }
                StmtKind::Return(e) => out.extend(e.iter().map(NodeRef::Expr)),
                StmtKind::ProcedureCall { args, .. } => {
                    out.extend(args.iter().map(NodeRef::Expr))
                }
                StmtKind::PropertyStmt { property, .. } => out.push(NodeRef::Property(property)),
            },
            NodeRef::Rule(r) => {
                out.extend(r.quantifiers.iter().map(NodeRef::Quantifier));
                out.extend(r.aliases.iter().map(NodeRef::Decl));
                match &r.kind {
                    RuleKind::Simple { guard, decls, body } => {
                        out.extend(guard.iter().map(NodeRef::Expr));
                        out.extend(decls.iter().map(NodeRef::Decl));
                        out.extend(body.iter().map(NodeRef::Stmt));
                    }
                    RuleKind::StartState { decls, body } => {
                        out.extend(decls.iter().map(NodeRef::Decl));
                        out.extend(body.iter().map(NodeRef::Stmt));
                    }
                    RuleKind::Property(p) => out.push(NodeRef::Property(p)),
                    RuleKind::Ruleset { rules } | RuleKind::AliasRule { rules } => {
                        out.extend(rules.iter().map(NodeRef::Rule));
                    }
                }
            }
            NodeRef::Quantifier(q) => match &q.kind {
                QuantifierKind::Over(ty) => out.push(NodeRef::TypeExpr(ty)),
                QuantifierKind::Bounds { from, to, step } => {
                    out.push(NodeRef::Expr(from));
                    out.push(NodeRef::Expr(to));
                    out.extend(step.iter().map(|s| NodeRef::Expr(s)));
                }
            },
            NodeRef::Property(p) => out.push(NodeRef::Expr(&p.expr)),
        }
        out
    }
}

/// Pre-order iteration: each node before its children, children
/// left-to-right.
pub struct Preorder<'a> {
    remaining: Vec<NodeRef<'a>>,
}

impl<'a> Preorder<'a> {
    pub fn new(root: NodeRef<'a>) -> Self {
        Self {
            remaining: vec![root],
        }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.remaining.pop()?;
        let mut children = node.children();
        children.reverse();
        self.remaining.extend(children);
        Some(node)
    }
}

/// Post-order iteration: children before parents.
///
/// Pending nodes carry an expanded flag; the first pop pushes the node back
/// flagged and queues its children, the second pop yields it.
pub struct Postorder<'a> {
    remaining: Vec<(NodeRef<'a>, bool)>,
}

impl<'a> Postorder<'a> {
    pub fn new(root: NodeRef<'a>) -> Self {
        Self {
            remaining: vec![(root, false)],
        }
    }
}

impl<'a> Iterator for Postorder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, expanded) = self.remaining.pop()?;
            if expanded {
                return Some(node);
            }
            self.remaining.push((node, true));
            let mut children = node.children();
            children.reverse();
            self.remaining
                .extend(children.into_iter().map(|c| (c, false)));
        }
    }
}

/// Read-only visitor over all node categories. Every handler defaults to
/// recursing into children via the matching `walk_*` function.
pub trait Visitor {
    fn visit_model(&mut self, n: &Model) {
        walk_model(self, n)
    }
    fn visit_decl(&mut self, n: &Decl) {
        walk_decl(self, n)
    }
    fn visit_type_expr(&mut self, n: &TypeExpr) {
        walk_type_expr(self, n)
    }
    fn visit_expr(&mut self, n: &Expr) {
        walk_expr(self, n)
    }
    fn visit_stmt(&mut self, n: &Stmt) {
        walk_stmt(self, n)
    }
    fn visit_rule(&mut self, n: &Rule) {
        walk_rule(self, n)
    }
    fn visit_quantifier(&mut self, n: &Quantifier) {
        walk_quantifier(self, n)
    }
    fn visit_property(&mut self, n: &Property) {
        walk_property(self, n)
    }
}

pub fn walk_model<V: Visitor + ?Sized>(v: &mut V, n: &Model) {
    for d in &n.decls {
        v.visit_decl(d);
    }
    for r in &n.rules {
        v.visit_rule(r);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, n: &Decl) {
    match &n.kind {
        DeclKind::Const { ty, value } => {
            if let Some(ty) = ty {
                v.visit_type_expr(ty);
            }
            v.visit_expr(value);
        }
        DeclKind::Type { value } => v.visit_type_expr(value),
        DeclKind::Var { ty, .. } => v.visit_type_expr(ty),
        DeclKind::Alias { value } => v.visit_expr(value),
        DeclKind::Func(f) => {
            for p in &f.parameters {
                v.visit_decl(p);
            }
            if let Some(rt) = &f.return_type {
                v.visit_type_expr(rt);
            }
            for d in &f.decls {
                v.visit_decl(d);
            }
            for s in &f.body {
                v.visit_stmt(s);
            }
        }
    }
}

pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, n: &TypeExpr) {
    match &n.kind {
        TypeExprKind::Named { .. } | TypeExprKind::Enum { .. } => {}
        TypeExprKind::Range { min, max } => {
            v.visit_expr(min);
            v.visit_expr(max);
        }
        TypeExprKind::Scalarset { bound } => v.visit_expr(bound),
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            v.visit_type_expr(index_type);
            v.visit_type_expr(element_type);
        }
        TypeExprKind::Record { fields } => {
            for f in fields {
                v.visit_decl(f);
            }
        }
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, n: &Expr) {
    match &n.kind {
        ExprKind::Number(_) | ExprKind::Id { .. } => {}
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array);
            v.visit_expr(index);
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond);
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
            v.visit_quantifier(quantifier);
            v.visit_expr(expr);
        }
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, n: &Stmt) {
    match &n.kind {
        StmtKind::Assignment { lhs, rhs } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        StmtKind::Clear(e) | StmtKind::Undefine(e) => v.visit_expr(e),
        StmtKind::ErrorStmt { .. } => {}
        StmtKind::If { clauses } => {
            for clause in clauses {
                if let Some(cond) = &clause.condition {
                    v.visit_expr(cond);
                }
                for s in &clause.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::For { quantifier, body } => {
            v.visit_quantifier(quantifier);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::Switch { expr, cases } => {
            v.visit_expr(expr);
            for case in cases {
                for m in &case.matches {
                    v.visit_expr(m);
                }
                for s in &case.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Return(e) => {
            if let Some(e) = e {
                v.visit_expr(e);
            }
        }
        StmtKind::ProcedureCall { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        StmtKind::PropertyStmt { property, .. } => v.visit_property(property),
    }
}

pub fn walk_rule<V: Visitor + ?Sized>(v: &mut V, n: &Rule) {
    for q in &n.quantifiers {
        v.visit_quantifier(q);
    }
    for a in &n.aliases {
        v.visit_decl(a);
    }
    match &n.kind {
        RuleKind::Simple { guard, decls, body } => {
            if let Some(g) = guard {
                v.visit_expr(g);
            }
            for d in decls {
                v.visit_decl(d);
            }
            for s in body {
                v.visit_stmt(s);
            }
        }
        RuleKind::StartState { decls, body } => {
            for d in decls {
                v.visit_decl(d);
            }
            for s in body {
                v.visit_stmt(s);
            }
        }
        RuleKind::Property(p) => v.visit_property(p),
        RuleKind::Ruleset { rules } | RuleKind::AliasRule { rules } => {
            for r in rules {
                v.visit_rule(r);
            }
        }
    }
}

pub fn walk_quantifier<V: Visitor + ?Sized>(v: &mut V, n: &Quantifier) {
    match &n.kind {
        QuantifierKind::Over(ty) => v.visit_type_expr(ty),
        QuantifierKind::Bounds { from, to, step } => {
            v.visit_expr(from);
            v.visit_expr(to);
            if let Some(step) = step {
                v.visit_expr(step);
            }
        }
    }
}

pub fn walk_property<V: Visitor + ?Sized>(v: &mut V, n: &Property) {
    v.visit_expr(&n.expr);
}

/// Mutating visitor over all node categories.
pub trait VisitorMut {
    fn visit_model(&mut self, n: &mut Model) {
        walk_model_mut(self, n)
    }
    fn visit_decl(&mut self, n: &mut Decl) {
        walk_decl_mut(self, n)
    }
    fn visit_type_expr(&mut self, n: &mut TypeExpr) {
        walk_type_expr_mut(self, n)
    }
    fn visit_expr(&mut self, n: &mut Expr) {
        walk_expr_mut(self, n)
    }
    fn visit_stmt(&mut self, n: &mut Stmt) {
        walk_stmt_mut(self, n)
    }
    fn visit_rule(&mut self, n: &mut Rule) {
        walk_rule_mut(self, n)
    }
    fn visit_quantifier(&mut self, n: &mut Quantifier) {
        walk_quantifier_mut(self, n)
    }
    fn visit_property(&mut self, n: &mut Property) {
        walk_property_mut(self, n)
    }
}

pub fn walk_model_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Model) {
    for d in &mut n.decls {
        v.visit_decl(d);
    }
    for r in &mut n.rules {
        v.visit_rule(r);
    }
}

pub fn walk_decl_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Decl) {
    match &mut n.kind {
        DeclKind::Const { ty, value } => {
            if let Some(ty) = ty {
                v.visit_type_expr(ty);
            }
            v.visit_expr(value);
        }
        DeclKind::Type { value } => v.visit_type_expr(value),
        DeclKind::Var { ty, .. } => v.visit_type_expr(ty),
        DeclKind::Alias { value } => v.visit_expr(value),
        DeclKind::Func(f) => {
            for p in &mut f.parameters {
                v.visit_decl(p);
            }
            if let Some(rt) = &mut f.return_type {
                v.visit_type_expr(rt);
            }
            for d in &mut f.decls {
                v.visit_decl(d);
            }
            for s in &mut f.body {
                v.visit_stmt(s);
            }
        }
    }
}

pub fn walk_type_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut TypeExpr) {
    match &mut n.kind {
        TypeExprKind::Named { .. } | TypeExprKind::Enum { .. } => {}
        TypeExprKind::Range { min, max } => {
            v.visit_expr(min);
            v.visit_expr(max);
        }
        TypeExprKind::Scalarset { bound } => v.visit_expr(bound),
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            v.visit_type_expr(index_type);
            v.visit_type_expr(element_type);
        }
        TypeExprKind::Record { fields } => {
            for f in fields {
                v.visit_decl(f);
            }
        }
    }
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Expr) {
    match &mut n.kind {
        ExprKind::Number(_) | ExprKind::Id { .. } => {}
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array);
            v.visit_expr(index);
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond);
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
            v.visit_quantifier(quantifier);
            v.visit_expr(expr);
        }
    }
}

pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Stmt) {
    match &mut n.kind {
        StmtKind::Assignment { lhs, rhs } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        StmtKind::Clear(e) | StmtKind::Undefine(e) => v.visit_expr(e),
        StmtKind::ErrorStmt { .. } => {}
        StmtKind::If { clauses } => {
            for clause in clauses {
                if let Some(cond) = &mut clause.condition {
                    v.visit_expr(cond);
                }
                for s in &mut clause.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::For { quantifier, body } => {
            v.visit_quantifier(quantifier);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition);
            for s in body {
                v.visit_stmt(s);
            }
        }
        StmtKind::Switch { expr, cases } => {
            v.visit_expr(expr);
            for case in cases {
                for m in &mut case.matches {
                    v.visit_expr(m);
                }
                for s in &mut case.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Return(e) => {
            if let Some(e) = e {
                v.visit_expr(e);
            }
        }
        StmtKind::ProcedureCall { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        StmtKind::PropertyStmt { property, .. } => v.visit_property(property),
    }
}

pub fn walk_rule_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Rule) {
    for q in &mut n.quantifiers {
        v.visit_quantifier(q);
    }
    for a in &mut n.aliases {
        v.visit_decl(a);
    }
    match &mut n.kind {
        RuleKind::Simple { guard, decls, body } => {
            if let Some(g) = guard {
                v.visit_expr(g);
            }
            for d in decls {
                v.visit_decl(d);
            }
            for s in body {
                v.visit_stmt(s);
            }
        }
        RuleKind::StartState { decls, body } => {
            for d in decls {
                v.visit_decl(d);
            }
            for s in body {
                v.visit_stmt(s);
            }
        }
        RuleKind::Property(p) => v.visit_property(p),
        RuleKind::Ruleset { rules } | RuleKind::AliasRule { rules } => {
            for r in rules {
                v.visit_rule(r);
            }
        }
    }
}

pub fn walk_quantifier_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Quantifier) {
    match &mut n.kind {
        QuantifierKind::Over(ty) => v.visit_type_expr(ty),
        QuantifierKind::Bounds { from, to, step } => {
            v.visit_expr(from);
            v.visit_expr(to);
            if let Some(step) = step {
                v.visit_expr(step);
            }
        }
    }
}

pub fn walk_property_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Property) {
    v.visit_expr(&mut n.expr);
}

/// Read-only visitor over expressions only. The default handler recurses
/// into sub-expressions (including quantifier bounds) and nothing else.
pub trait ExprVisitor {
    fn visit_expr(&mut self, n: &Expr) {
        walk_subexprs(self, n)
    }
}

pub fn walk_subexprs<V: ExprVisitor + ?Sized>(v: &mut V, n: &Expr) {
    match &n.kind {
        ExprKind::Number(_) | ExprKind::Id { .. } => {}
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array);
            v.visit_expr(index);
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond);
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
            if let QuantifierKind::Bounds { from, to, step } = &quantifier.kind {
                v.visit_expr(from);
                v.visit_expr(to);
                if let Some(step) = step {
                    v.visit_expr(step);
                }
            }
            v.visit_expr(expr);
        }
    }
}

/// Mutating visitor over expressions only.
pub trait ExprVisitorMut {
    fn visit_expr(&mut self, n: &mut Expr) {
        walk_subexprs_mut(self, n)
    }
}

pub fn walk_subexprs_mut<V: ExprVisitorMut + ?Sized>(v: &mut V, n: &mut Expr) {
    match &mut n.kind {
        ExprKind::Number(_) | ExprKind::Id { .. } => {}
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array);
            v.visit_expr(index);
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond);
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
            if let QuantifierKind::Bounds { from, to, step } = &mut quantifier.kind {
                v.visit_expr(from);
                v.visit_expr(to);
                if let Some(step) = step {
                    v.visit_expr(step);
                }
            }
            v.visit_expr(expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;
    use crate::number::Int;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn sample_expr() -> Expr {
        // (1 + 2) * 3
        Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, num(1), num(2), Loc::dummy()),
            num(3),
            Loc::dummy(),
        )
    }

    #[test]
    fn test_preorder_visits_parents_first() {
        let e = sample_expr();
        let order: Vec<String> = Preorder::new(NodeRef::Expr(&e))
            .map(|n| match n {
                NodeRef::Expr(e) => match &e.kind {
                    ExprKind::Number(v) => v.to_string(),
                    ExprKind::Binary { op, .. } => format!("{:?}", op),
                    _ => "?".into(),
                },
                _ => "?".into(),
            })
            .collect();
        assert_eq!(order, vec!["Mul", "Add", "1", "2", "3"]);
    }

    #[test]
    fn test_postorder_visits_children_first() {
        let e = sample_expr();
        let order: Vec<String> = Postorder::new(NodeRef::Expr(&e))
            .map(|n| match n {
                NodeRef::Expr(e) => match &e.kind {
                    ExprKind::Number(v) => v.to_string(),
                    ExprKind::Binary { op, .. } => format!("{:?}", op),
                    _ => "?".into(),
                },
                _ => "?".into(),
            })
            .collect();
        assert_eq!(order, vec!["1", "2", "Add", "3", "Mul"]);
    }

    #[test]
    fn test_pre_and_postorder_visit_the_same_nodes() {
        let e = sample_expr();
        let pre = Preorder::new(NodeRef::Expr(&e)).count();
        let post = Postorder::new(NodeRef::Expr(&e)).count();
        assert_eq!(pre, 5);
        assert_eq!(pre, post);
    }

    #[test]
    fn test_default_visitor_reaches_every_expression() {
        struct Counter(usize);
        impl Visitor for Counter {
            fn visit_expr(&mut self, n: &Expr) {
                self.0 += 1;
                walk_expr(self, n);
            }
        }
        let e = sample_expr();
        let mut c = Counter(0);
        c.visit_expr(&e);
        assert_eq!(c.0, 5);
    }

    #[test]
    fn test_expr_visitor_skips_nothing_in_nested_operands() {
        struct Leaves(Vec<String>);
        impl ExprVisitor for Leaves {
            fn visit_expr(&mut self, n: &Expr) {
                if let ExprKind::Number(v) = &n.kind {
                    self.0.push(v.to_string());
                }
                walk_subexprs(self, n);
            }
        }
        let e = sample_expr();
        let mut l = Leaves(Vec::new());
        l.visit_expr(&e);
        assert_eq!(l.0, vec!["1", "2", "3"]);
    }
}
