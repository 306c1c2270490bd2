//! Symbol resolution: binds every reference to a pool declaration.

use crate::decl::{Decl, DeclId, DeclKind, DeclPool, SymbolKind};
use crate::error::Result;
use crate::expr::{Expr, ExprKind, Quantifier, QuantifierKind};
use crate::loc::Loc;
use crate::model::Model;
use crate::number::Int;
use crate::rule::{Rule, RuleKind};
use crate::stmt::{Stmt, StmtKind};
use crate::symtab::Symtab;
use crate::types::{TypeExpr, TypeExprKind};
use crate::NodeId;
use tracing::debug;

/// Resolve every name in the model against its lexical scope.
///
/// Populates `model.pool` and sets the back-links on identifiers, calls,
/// named type references, and quantifiers. Run after [`Model::assign_ids`]
/// so that pool entries keep the ids of the declarations they were cloned
/// from; synthesized entries are numbered above the tree maximum.
pub fn resolve(model: &mut Model) -> Result<()> {
    let mut resolver = Resolver {
        pool: DeclPool::new(),
        symtab: Symtab::new(),
        next_id: model.max_unique_id() + 1,
    };
    resolver.symtab.open_scope();
    resolver.install_builtins()?;

    for d in &mut model.decls {
        resolver.resolve_decl(d)?;
    }
    for r in &mut model.rules {
        resolver.resolve_rule(r)?;
    }

    debug!(decls = resolver.pool.len(), "resolved model");
    model.pool = resolver.pool;
    Ok(())
}

struct Resolver {
    pool: DeclPool,
    symtab: Symtab,
    next_id: NodeId,
}

impl Resolver {
    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Seed the global scope with the boolean type and its members.
    fn install_builtins(&mut self) -> Result<()> {
        let boolean = TypeExpr::boolean();
        self.declare_enum_members(&boolean)?;
        self.declare_synthesized(Decl::type_decl("boolean", boolean, Loc::dummy()))?;
        Ok(())
    }

    /// Clone a declaration into the pool and bind its name in the current
    /// scope.
    fn declare(&mut self, d: &Decl) -> Result<DeclId> {
        let mut entry = d.clone();
        if entry.unique_id == 0 {
            entry.unique_id = self.fresh_id();
        }
        let id = self.pool.insert(entry);
        self.symtab.declare(&d.name, id, &d.loc)?;
        Ok(id)
    }

    /// Pool and bind a declaration that has no tree counterpart.
    fn declare_synthesized(&mut self, mut decl: Decl) -> Result<DeclId> {
        decl.unique_id = self.fresh_id();
        let id = self.pool.insert(decl.clone());
        self.symtab.declare(&decl.name, id, &decl.loc)?;
        Ok(id)
    }

    /// Bind each member of an enum as a constant of the enum's type with
    /// its positional index as value.
    fn declare_enum_members(&mut self, enum_ty: &TypeExpr) -> Result<()> {
        if let TypeExprKind::Enum { members } = &enum_ty.kind {
            for (i, (name, mloc)) in members.iter().enumerate() {
                let value = Expr::number(Int::from(i as u64), mloc.clone());
                let decl = Decl::constant(name.clone(), Some(enum_ty.clone()), value, mloc.clone());
                self.declare_synthesized(decl)?;
            }
        }
        Ok(())
    }

    fn resolve_decl(&mut self, d: &mut Decl) -> Result<()> {
        match &mut d.kind {
            DeclKind::Const { ty, value } => {
                if let Some(ty) = ty {
                    self.resolve_type(ty)?;
                }
                self.resolve_expr(value)?;
            }
            DeclKind::Type { value } => self.resolve_type(value)?,
            DeclKind::Var { ty, .. } => self.resolve_type(ty)?,
            DeclKind::Alias { value } => self.resolve_expr(value)?,
            DeclKind::Func(f) => {
                self.symtab.open_scope();
                for p in &mut f.parameters {
                    self.resolve_decl(p)?;
                }
                if let Some(rt) = &mut f.return_type {
                    self.resolve_type(rt)?;
                }
                for inner in &mut f.decls {
                    self.resolve_decl(inner)?;
                }
                for s in &mut f.body {
                    self.resolve_stmt(s)?;
                }
                self.symtab.close_scope()?;
            }
        }
        self.declare(d)?;
        Ok(())
    }

    fn resolve_type(&mut self, t: &mut TypeExpr) -> Result<()> {
        match &mut t.kind {
            TypeExprKind::Named { name, decl } => {
                *decl = Some(self.symtab.lookup(&self.pool, name, SymbolKind::Type, &t.loc)?);
            }
            TypeExprKind::Range { min, max } => {
                self.resolve_expr(min)?;
                self.resolve_expr(max)?;
            }
            TypeExprKind::Enum { .. } => {}
            TypeExprKind::Scalarset { bound } => self.resolve_expr(bound)?,
            TypeExprKind::Array {
                index_type,
                element_type,
            } => {
                self.resolve_type(index_type)?;
                self.resolve_type(element_type)?;
            }
            // Record fields are reached through the record type, not the
            // scope, so only their types need resolving.
            TypeExprKind::Record { fields } => {
                for f in fields {
                    if let DeclKind::Var { ty, .. } = &mut f.kind {
                        self.resolve_type(ty)?;
                    }
                }
            }
        }
        if matches!(t.kind, TypeExprKind::Enum { .. }) {
            let snapshot = t.clone();
            self.declare_enum_members(&snapshot)?;
        }
        Ok(())
    }

    fn resolve_expr(&mut self, e: &mut Expr) -> Result<()> {
        match &mut e.kind {
            ExprKind::Number(_) => {}
            ExprKind::Id { name, decl } => {
                *decl = Some(self.symtab.lookup(&self.pool, name, SymbolKind::Value, &e.loc)?);
            }
            ExprKind::Field { record, .. } => self.resolve_expr(record)?,
            ExprKind::Element { array, index } => {
                self.resolve_expr(array)?;
                self.resolve_expr(index)?;
            }
            ExprKind::Call {
                name,
                function,
                args,
            } => {
                *function =
                    Some(self.symtab.lookup(&self.pool, name, SymbolKind::Function, &e.loc)?);
                for a in args {
                    self.resolve_expr(a)?;
                }
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.resolve_expr(cond)?;
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)?;
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)?;
            }
            ExprKind::Unary { rhs, .. } => self.resolve_expr(rhs)?,
            ExprKind::Exists { quantifier, expr } | ExprKind::Forall { quantifier, expr } => {
                self.symtab.open_scope();
                self.resolve_quantifier(quantifier)?;
                self.resolve_expr(expr)?;
                self.symtab.close_scope()?;
            }
        }
        Ok(())
    }

    /// Resolve a quantifier's domain and synthesize its read-only bound
    /// variable in the current scope.
    fn resolve_quantifier(&mut self, q: &mut Quantifier) -> Result<()> {
        let ty = match &mut q.kind {
            QuantifierKind::Over(ty) => {
                self.resolve_type(ty)?;
                ty.clone()
            }
            QuantifierKind::Bounds { from, to, step } => {
                self.resolve_expr(from)?;
                self.resolve_expr(to)?;
                if let Some(step) = step {
                    self.resolve_expr(step)?;
                }
                TypeExpr::range((**from).clone(), (**to).clone(), q.loc.clone())
            }
        };
        let var = Decl::var(q.name.clone(), ty, true, q.loc.clone());
        q.decl = Some(self.declare_synthesized(var)?);
        Ok(())
    }

    fn resolve_stmt(&mut self, s: &mut Stmt) -> Result<()> {
        match &mut s.kind {
            StmtKind::Assignment { lhs, rhs } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)?;
            }
            StmtKind::Clear(e) | StmtKind::Undefine(e) => self.resolve_expr(e)?,
            StmtKind::ErrorStmt { .. } => {}
            StmtKind::If { clauses } => {
                for clause in clauses {
                    if let Some(cond) = &mut clause.condition {
                        self.resolve_expr(cond)?;
                    }
                    for inner in &mut clause.body {
                        self.resolve_stmt(inner)?;
                    }
                }
            }
            StmtKind::For { quantifier, body } => {
                self.symtab.open_scope();
                self.resolve_quantifier(quantifier)?;
                for inner in body {
                    self.resolve_stmt(inner)?;
                }
                self.symtab.close_scope()?;
            }
            StmtKind::While { condition, body } => {
                self.resolve_expr(condition)?;
                for inner in body {
                    self.resolve_stmt(inner)?;
                }
            }
            StmtKind::Switch { expr, cases } => {
                self.resolve_expr(expr)?;
                for case in cases {
                    for m in &mut case.matches {
                        self.resolve_expr(m)?;
                    }
                    for inner in &mut case.body {
                        self.resolve_stmt(inner)?;
                    }
                }
            }
            StmtKind::Return(e) => {
                if let Some(e) = e {
                    self.resolve_expr(e)?;
                }
            }
            StmtKind::ProcedureCall {
                name,
                function,
                args,
            } => {
                *function =
                    Some(self.symtab.lookup(&self.pool, name, SymbolKind::Function, &s.loc)?);
                for a in args {
                    self.resolve_expr(a)?;
                }
            }
            StmtKind::PropertyStmt { property, .. } => self.resolve_expr(&mut property.expr)?,
        }
        Ok(())
    }

    fn resolve_rule(&mut self, r: &mut Rule) -> Result<()> {
        self.symtab.open_scope();
        for q in &mut r.quantifiers {
            self.resolve_quantifier(q)?;
        }
        for a in &mut r.aliases {
            self.resolve_decl(a)?;
        }
        match &mut r.kind {
            RuleKind::Simple { guard, decls, body } => {
                if let Some(g) = guard {
                    self.resolve_expr(g)?;
                }
                for d in decls {
                    self.resolve_decl(d)?;
                }
                for s in body {
                    self.resolve_stmt(s)?;
                }
            }
            RuleKind::StartState { decls, body } => {
                for d in decls {
                    self.resolve_decl(d)?;
                }
                for s in body {
                    self.resolve_stmt(s)?;
                }
            }
            RuleKind::Property(p) => self.resolve_expr(&mut p.expr)?,
            RuleKind::Ruleset { rules } | RuleKind::AliasRule { rules } => {
                for inner in rules {
                    self.resolve_rule(inner)?;
                }
            }
        }
        self.symtab.close_scope()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::expr::BinaryOp;
    use crate::traverse::{NodeRef, Preorder};

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    /// type state = enum { idle, busy };
    /// var s : state;
    /// var n : 0..3;
    /// rule "step" s = idle ==> begin s := busy; end
    fn sample_model() -> Model {
        let state_ty = TypeExpr::enumeration(
            vec![("idle".into(), Loc::dummy()), ("busy".into(), Loc::dummy())],
            Loc::dummy(),
        );
        let decls = vec![
            Decl::type_decl("state", state_ty, Loc::dummy()),
            Decl::var("s", TypeExpr::named("state", Loc::dummy()), false, Loc::dummy()),
            Decl::var("n", TypeExpr::range(num(0), num(3), Loc::dummy()), false, Loc::dummy()),
        ];
        let guard = Expr::binary(
            BinaryOp::Eq,
            Expr::id("s", Loc::dummy()),
            Expr::id("idle", Loc::dummy()),
            Loc::dummy(),
        );
        let body = vec![Stmt::assignment(
            Expr::id("s", Loc::dummy()),
            Expr::id("busy", Loc::dummy()),
            Loc::dummy(),
        )];
        let rules = vec![Rule::simple("step", Some(guard), vec![], body, Loc::dummy())];
        Model::new(decls, rules, Loc::dummy())
    }

    #[test]
    fn test_every_identifier_gets_a_back_link() {
        let mut m = sample_model();
        m.assign_ids();
        resolve(&mut m).unwrap();

        for node in Preorder::new(NodeRef::Model(&m)) {
            if let NodeRef::Expr(e) = node {
                if let ExprKind::Id { name, decl } = &e.kind {
                    let id = decl.unwrap_or_else(|| panic!("{} unresolved", name));
                    assert_eq!(m.pool.get(id).name, *name);
                }
            }
        }
    }

    #[test]
    fn test_enum_members_fold_to_their_index() {
        let mut m = sample_model();
        m.assign_ids();
        resolve(&mut m).unwrap();

        let mut idle = Expr::id("idle", Loc::dummy());
        let mut busy = Expr::id("busy", Loc::dummy());
        // bind through the pool the way the resolver left it
        for (id, d) in m.pool.iter() {
            if d.name == "idle" {
                if let ExprKind::Id { decl, .. } = &mut idle.kind {
                    *decl = Some(id);
                }
            }
            if d.name == "busy" {
                if let ExprKind::Id { decl, .. } = &mut busy.kind {
                    *decl = Some(id);
                }
            }
        }
        assert_eq!(idle.constant_fold(&m.pool).unwrap(), Int::from(0));
        assert_eq!(busy.constant_fold(&m.pool).unwrap(), Int::from(1));
        assert!(idle.is_boolean(&m.pool).is_ok());
    }

    #[test]
    fn test_named_type_resolves_to_structural_enum() {
        let mut m = sample_model();
        m.assign_ids();
        resolve(&mut m).unwrap();

        let DeclKind::Var { ty, .. } = &m.decls[1].kind else {
            panic!("expected var");
        };
        let resolved = ty.resolve(&m.pool).unwrap();
        assert!(matches!(resolved.kind, TypeExprKind::Enum { .. }));
    }

    #[test]
    fn test_unknown_symbol_aborts_resolution() {
        let mut m = Model::new(
            vec![Decl::constant(
                "c",
                None,
                Expr::id("missing", Loc::dummy()),
                Loc::dummy(),
            )],
            vec![],
            Loc::dummy(),
        );
        m.assign_ids();
        let err = resolve(&mut m).unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol { .. }));
        assert_eq!(err.to_string(), "unknown symbol: missing");
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut m = Model::new(
            vec![
                Decl::constant("c", None, num(1), Loc::dummy()),
                Decl::constant("c", None, num(2), Loc::dummy()),
            ],
            vec![],
            Loc::dummy(),
        );
        m.assign_ids();
        assert!(matches!(
            resolve(&mut m),
            Err(Error::DuplicateDeclaration { .. })
        ));
    }

    #[test]
    fn test_quantifier_shadows_outer_binding() {
        // const n = 1; ruleset n : 0..3 holds a rule referencing n
        let body_ref = Expr::binary(
            BinaryOp::Leq,
            Expr::id("n", Loc::dummy()),
            num(3),
            Loc::dummy(),
        );
        let inner = Rule::simple("r", Some(body_ref), vec![], vec![], Loc::dummy());
        let set = Rule::ruleset(
            vec![Quantifier::bounds("n", num(0), num(3), None, Loc::dummy())],
            vec![inner],
            Loc::dummy(),
        );
        let mut m = Model::new(
            vec![Decl::constant("n", None, num(1), Loc::dummy())],
            vec![set],
            Loc::dummy(),
        );
        m.assign_ids();
        resolve(&mut m).unwrap();

        // the guard's n must point at the quantifier's synthesized variable,
        // not the outer constant
        let RuleKind::Ruleset { rules } = &m.rules[0].kind else {
            panic!("expected ruleset");
        };
        let RuleKind::Simple { guard, .. } = &rules[0].kind else {
            panic!("expected simple rule");
        };
        let ExprKind::Binary { lhs, .. } = &guard.as_ref().unwrap().kind else {
            panic!("expected binary guard");
        };
        let ExprKind::Id { decl, .. } = &lhs.kind else {
            panic!("expected identifier");
        };
        let bound = m.pool.get(decl.unwrap());
        assert!(matches!(bound.kind, DeclKind::Var { readonly: true, .. }));
    }

    #[test]
    fn test_synthesized_ids_are_above_tree_ids() {
        let mut m = sample_model();
        m.assign_ids();
        let tree_max = m.max_unique_id();
        resolve(&mut m).unwrap();
        let mut seen = std::collections::HashSet::new();
        for (_, d) in m.pool.iter() {
            assert!(d.unique_id != 0);
            assert!(seen.insert(d.unique_id) || d.unique_id <= tree_max);
        }
        assert!(m.pool.iter().any(|(_, d)| d.unique_id > tree_max));
    }
}
