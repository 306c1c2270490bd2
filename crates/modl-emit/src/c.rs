//! Plain C translation of a model.

use crate::emitter::{c_op, c_string, Writer};
use crate::{EmitError, EmitOptions, Result};
use modl_ast::{
    BinaryOp, Category, Decl, DeclKind, DeclPool, Expr, ExprKind, Model, Quantifier,
    QuantifierKind, Rule, RuleKind, Stmt, StmtKind, TypeExpr, TypeExprKind, UnaryOp,
};
use std::io;
use tracing::debug;

/// Translate a resolved, validated model into C.
///
/// Constants, types, and variables come first, then functions, then the
/// flattened rules: a `guard_`/`rule_` function pair per simple rule, a
/// `startstate_` function per start state, and a boolean function per
/// property rule.
pub fn emit_c<W: io::Write>(model: &Model, _options: &EmitOptions, out: &mut W) -> Result<()> {
    debug!(decls = model.decls.len(), rules = model.rules.len(), "emitting C");
    let mut gen = CGenerator {
        w: Writer::new(out),
        pool: &model.pool,
    };
    gen.model(model)
}

struct CGenerator<'a, W: io::Write> {
    w: Writer<'a, W>,
    pool: &'a DeclPool,
}

impl<'a, W: io::Write> CGenerator<'a, W> {
    fn model(&mut self, model: &Model) -> Result<()> {
        // constants, types and variables
        for d in &model.decls {
            if !matches!(d.kind, DeclKind::Func(_)) {
                self.decl(d)?;
            }
        }

        writeln!(self.w.out)?;

        // functions and procedures
        for d in &model.decls {
            if matches!(d.kind, DeclKind::Func(_)) {
                self.decl(d)?;
                writeln!(self.w.out)?;
            }
        }

        // flatten the rules so the emission below never sees a ruleset or
        // alias-rule
        for r in model.flat_rules() {
            self.rule(&r)?;
            writeln!(self.w.out)?;
        }
        Ok(())
    }

    fn decl(&mut self, d: &Decl) -> Result<()> {
        let ind = self.w.indentation();
        match &d.kind {
            DeclKind::Const { ty, value } => {
                let ty = match ty {
                    Some(t) => self.c_type(t)?,
                    None => "int64_t".to_string(),
                };
                writeln!(
                    self.w.out,
                    "{}const {} {} = {};",
                    ind,
                    ty,
                    d.name,
                    self.expr(value)?
                )?;
            }
            DeclKind::Type { value } => {
                writeln!(self.w.out, "{}typedef {} {};", ind, self.c_type(value)?, d.name)?;
            }
            DeclKind::Var { ty, .. } => {
                writeln!(self.w.out, "{}{} {};", ind, self.c_type(ty)?, d.name)?;
            }
            DeclKind::Alias { value } => {
                writeln!(self.w.out, "#define {} ({})", d.name, self.expr(value)?)?;
            }
            DeclKind::Func(f) => {
                let ret = match &f.return_type {
                    Some(t) => self.c_type(t)?,
                    None => "void".to_string(),
                };
                write!(self.w.out, "{}{} {}(", ind, ret, d.name)?;
                let mut first = true;
                for p in &f.parameters {
                    if !first {
                        write!(self.w.out, ", ")?;
                    }
                    if let DeclKind::Var { ty, readonly } = &p.kind {
                        write!(self.w.out, "{} ", self.c_type(ty)?)?;
                        // a var parameter needs to be a pointer
                        if !readonly {
                            write!(self.w.out, "*{}_", p.name)?;
                        } else {
                            write!(self.w.out, "{}", p.name)?;
                        }
                    }
                    first = false;
                }
                writeln!(self.w.out, ") {{")?;
                self.w.indent();
                // expose var parameters under their original name
                for p in &f.parameters {
                    if let DeclKind::Var { readonly: false, .. } = &p.kind {
                        writeln!(self.w.out, "#define {} (*{}_)", p.name, p.name)?;
                    }
                }
                for inner in &f.decls {
                    self.decl(inner)?;
                }
                for s in &f.body {
                    self.stmt(s)?;
                }
                for p in &f.parameters {
                    if let DeclKind::Var { readonly: false, .. } = &p.kind {
                        writeln!(self.w.out, "#undef {}", p.name)?;
                    }
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", self.w.indentation())?;
            }
        }
        Ok(())
    }

    fn rule(&mut self, r: &Rule) -> Result<()> {
        match &r.kind {
            RuleKind::Simple { guard, decls, body } => {
                self.guard_function(r, guard.as_ref())?;
                writeln!(self.w.out)?;
                self.rule_function(r, decls, body, "rule_")
            }
            RuleKind::StartState { decls, body } => self.rule_function(r, decls, body, "startstate_"),
            RuleKind::Property(p) => {
                let ind = self.w.indentation();
                write!(self.w.out, "{}bool {}(", ind, r.name)?;
                self.quantifier_parameters(r)?;
                writeln!(self.w.out, ") {{")?;
                self.w.indent();
                for a in &r.aliases {
                    self.decl(a)?;
                }
                writeln!(
                    self.w.out,
                    "{}return {};",
                    self.w.indentation(),
                    self.expr(&p.expr)?
                )?;
                for a in &r.aliases {
                    writeln!(self.w.out, "#undef {}", a.name)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
                Ok(())
            }
            RuleKind::Ruleset { .. } | RuleKind::AliasRule { .. } => {
                unreachable!("rules are flattened before emission")
            }
        }
    }

    fn guard_function(&mut self, r: &Rule, guard: Option<&Expr>) -> Result<()> {
        let ind = self.w.indentation();
        write!(self.w.out, "{}bool guard_{}(", ind, r.name)?;
        self.quantifier_parameters(r)?;
        writeln!(self.w.out, ") {{")?;
        self.w.indent();
        for a in &r.aliases {
            self.decl(a)?;
        }
        let guard = match guard {
            Some(g) => self.expr(g)?,
            None => "true".to_string(),
        };
        writeln!(self.w.out, "{}return {};", self.w.indentation(), guard)?;
        for a in &r.aliases {
            writeln!(self.w.out, "#undef {}", a.name)?;
        }
        self.w.dedent();
        writeln!(self.w.out, "{}}}", ind)?;
        Ok(())
    }

    fn rule_function(&mut self, r: &Rule, decls: &[Decl], body: &[Stmt], prefix: &str) -> Result<()> {
        let ind = self.w.indentation();
        write!(self.w.out, "{}void {}{}(", ind, prefix, r.name)?;
        self.quantifier_parameters(r)?;
        writeln!(self.w.out, ") {{")?;
        self.w.indent();
        for a in &r.aliases {
            self.decl(a)?;
        }
        for d in decls {
            self.decl(d)?;
        }
        for s in body {
            self.stmt(s)?;
        }
        // clean up any aliases we defined
        for d in decls {
            if matches!(d.kind, DeclKind::Alias { .. }) {
                writeln!(self.w.out, "#undef {}", d.name)?;
            }
        }
        for a in &r.aliases {
            writeln!(self.w.out, "#undef {}", a.name)?;
        }
        self.w.dedent();
        writeln!(self.w.out, "{}}}", ind)?;
        Ok(())
    }

    /// Rule quantifiers surface as function parameters, typed by the named
    /// type where one was written and int64_t otherwise.
    fn quantifier_parameters(&mut self, r: &Rule) -> Result<()> {
        let mut first = true;
        for q in &r.quantifiers {
            if !first {
                write!(self.w.out, ", ")?;
            }
            match &q.kind {
                QuantifierKind::Over(TypeExpr {
                    kind: TypeExprKind::Named { name, .. },
                    ..
                }) => write!(self.w.out, "{} {}", name, q.name)?,
                _ => write!(self.w.out, "int64_t {}", q.name)?,
            }
            first = false;
        }
        Ok(())
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        let ind = self.w.indentation();
        match &s.kind {
            StmtKind::Assignment { lhs, rhs } => {
                writeln!(self.w.out, "{}{} = {};", ind, self.expr(lhs)?, self.expr(rhs)?)?;
            }
            StmtKind::Clear(lv) | StmtKind::Undefine(lv) => {
                let lv = self.expr(lv)?;
                writeln!(self.w.out, "{}memset(&{}, 0, sizeof({}));", ind, lv, lv)?;
            }
            StmtKind::ErrorStmt { message } => {
                writeln!(self.w.out, "{}error(\"{}\");", ind, c_string(message))?;
            }
            StmtKind::If { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i == 0 {
                        write!(self.w.out, "{}", ind)?;
                    } else {
                        write!(self.w.out, " else ")?;
                    }
                    if let Some(cond) = &clause.condition {
                        write!(self.w.out, "if ({}) ", self.expr(cond)?)?;
                    }
                    writeln!(self.w.out, "{{")?;
                    self.w.indent();
                    for inner in &clause.body {
                        self.stmt(inner)?;
                    }
                    self.w.dedent();
                    write!(self.w.out, "{}}}", ind)?;
                }
                writeln!(self.w.out)?;
            }
            StmtKind::For { quantifier, body } => {
                writeln!(self.w.out, "{}{} {{", ind, self.quantifier_header(quantifier)?)?;
                self.w.indent();
                for inner in body {
                    self.stmt(inner)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
            }
            StmtKind::While { condition, body } => {
                writeln!(self.w.out, "{}while ({}) {{", ind, self.expr(condition)?)?;
                self.w.indent();
                for inner in body {
                    self.stmt(inner)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
            }
            StmtKind::Switch { expr, cases } => {
                // snapshot the scrutinee so case comparisons evaluate it once
                let tmp = format!("switch_{}", s.unique_id);
                writeln!(self.w.out, "{}{{", ind)?;
                self.w.indent();
                writeln!(
                    self.w.out,
                    "{}__typeof__({}) {} = {};",
                    self.w.indentation(),
                    self.expr(expr)?,
                    tmp,
                    self.expr(expr)?
                )?;
                for (i, case) in cases.iter().enumerate() {
                    if i == 0 {
                        write!(self.w.out, "{}", self.w.indentation())?;
                    } else {
                        write!(self.w.out, " else ")?;
                    }
                    if !case.matches.is_empty() {
                        let arms: Vec<String> = case
                            .matches
                            .iter()
                            .map(|m| Ok(format!("{} == ({})", tmp, self.expr(m)?)))
                            .collect::<Result<_>>()?;
                        write!(self.w.out, "if ({}) ", arms.join(" || "))?;
                    }
                    writeln!(self.w.out, "{{")?;
                    self.w.indent();
                    for inner in &case.body {
                        self.stmt(inner)?;
                    }
                    self.w.dedent();
                    write!(self.w.out, "{}}}", self.w.indentation())?;
                }
                if !cases.is_empty() {
                    writeln!(self.w.out)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
            }
            StmtKind::Return(expr) => match expr {
                Some(e) => writeln!(self.w.out, "{}return {};", ind, self.expr(e)?)?,
                None => writeln!(self.w.out, "{}return;", ind)?,
            },
            StmtKind::ProcedureCall {
                name,
                function,
                args,
            } => {
                let call = self.call_text(name, *function, args)?;
                writeln!(self.w.out, "{}{};", ind, call)?;
            }
            StmtKind::PropertyStmt { property, message } => match property.category {
                Category::Assertion => {
                    writeln!(
                        self.w.out,
                        "{}assert(({}) && \"{}\");",
                        ind,
                        self.expr(&property.expr)?,
                        c_string(message)
                    )?;
                }
                Category::Assumption => {
                    // a violated assumption prunes the current execution
                    writeln!(
                        self.w.out,
                        "{}if (!({})) {{ exit(EXIT_SUCCESS); }}",
                        ind,
                        self.expr(&property.expr)?
                    )?;
                }
                Category::Cover => {
                    writeln!(
                        self.w.out,
                        "{}cover(({}), \"{}\");",
                        ind,
                        self.expr(&property.expr)?,
                        c_string(message)
                    )?;
                }
                Category::Liveness => {
                    return Err(EmitError::Unsupported {
                        backend: "C",
                        construct: "liveness properties",
                        loc: property.loc.clone(),
                    })
                }
            },
        }
        Ok(())
    }

    fn expr(&self, e: &Expr) -> Result<String> {
        Ok(match &e.kind {
            ExprKind::Number(v) => v.to_string(),
            ExprKind::Id { name, .. } => name.clone(),
            ExprKind::Field { record, field } => format!("{}.{}", self.expr(record)?, field),
            ExprKind::Element { array, index } => {
                let lb = self.index_lower_bound(array)?;
                if lb.is_zero() {
                    format!("{}.data[{}]", self.expr(array)?, self.expr(index)?)
                } else {
                    format!(
                        "{}.data[({}) - ({})]",
                        self.expr(array)?,
                        self.expr(index)?,
                        lb
                    )
                }
            }
            ExprKind::Call {
                name,
                function,
                args,
            } => self.call_text(name, *function, args)?,
            ExprKind::Ternary { cond, lhs, rhs } => format!(
                "({} ? {} : {})",
                self.expr(cond)?,
                self.expr(lhs)?,
                self.expr(rhs)?
            ),
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinaryOp::Implication => {
                    format!("(!{} || {})", self.expr(lhs)?, self.expr(rhs)?)
                }
                _ => format!("({} {} {})", self.expr(lhs)?, c_op(*op), self.expr(rhs)?),
            },
            ExprKind::Unary { op, rhs } => match op {
                UnaryOp::Not => format!("(!{})", self.expr(rhs)?),
                UnaryOp::Negative => format!("(-{})", self.expr(rhs)?),
            },
            ExprKind::Exists { quantifier, expr } => {
                self.quantified_text(quantifier, expr, e, false)?
            }
            ExprKind::Forall { quantifier, expr } => {
                self.quantified_text(quantifier, expr, e, true)?
            }
        })
    }

    /// Quantified expressions become GNU statement expressions looping over
    /// the domain.
    fn quantified_text(
        &self,
        quantifier: &Quantifier,
        body: &Expr,
        whole: &Expr,
        universal: bool,
    ) -> Result<String> {
        let acc = format!("quant_{}", whole.unique_id);
        let (init, fold) = if universal {
            ("true", "&=")
        } else {
            ("false", "|=")
        };
        Ok(format!(
            "({{ bool {acc} = {init}; {header} {{ {acc} {fold} (bool)({body}); }} {acc}; }})",
            acc = acc,
            init = init,
            header = self.quantifier_header(quantifier)?,
            fold = fold,
            body = self.expr(body)?
        ))
    }

    /// The `for` header iterating a quantifier's domain. Constant bounds
    /// with to < from count downwards; enum domains run first member to
    /// last; ranges run min to max; scalarsets run 0 to the bound.
    fn quantifier_header(&self, q: &Quantifier) -> Result<String> {
        match &q.kind {
            QuantifierKind::Bounds { from, to, step } => {
                let down_count = from.constant(self.pool)
                    && to.constant(self.pool)
                    && to.constant_fold(self.pool)? < from.constant_fold(self.pool)?;
                let step = match step {
                    Some(s) => self.expr(s)?,
                    None if down_count => "-1".to_string(),
                    None => "1".to_string(),
                };
                Ok(format!(
                    "for (int64_t {name} = {from}; {name} {cmp} {to}; {name} += {step})",
                    name = q.name,
                    from = self.expr(from)?,
                    cmp = if down_count { ">=" } else { "<=" },
                    to = self.expr(to)?,
                    step = step
                ))
            }
            QuantifierKind::Over(ty) => {
                let resolved = ty.resolve(self.pool)?;
                match &resolved.kind {
                    TypeExprKind::Enum { members } => {
                        if members.is_empty() {
                            // degenerate loop
                            Ok(format!(
                                "for (int {name} = 0; {name} < 0; {name}++)",
                                name = q.name
                            ))
                        } else {
                            let first = &members[0].0;
                            let last = &members[members.len() - 1].0;
                            Ok(format!(
                                "for (__typeof__({first}) {name} = {first}; {name} <= {last}; {name}++)",
                                first = first,
                                last = last,
                                name = q.name
                            ))
                        }
                    }
                    TypeExprKind::Range { min, max } => Ok(format!(
                        "for (int64_t {name} = {min}; {name} <= {max}; {name}++)",
                        name = q.name,
                        min = self.expr(min)?,
                        max = self.expr(max)?
                    )),
                    TypeExprKind::Scalarset { bound } => Ok(format!(
                        "for (int64_t {name} = 0; {name} <= {bound}; {name}++)",
                        name = q.name,
                        bound = self.expr(bound)?
                    )),
                    _ => Err(EmitError::Unsupported {
                        backend: "C",
                        construct: "quantifiers over compound types",
                        loc: q.loc.clone(),
                    }),
                }
            }
        }
    }

    /// A call expression, passing addresses for var parameters.
    fn call_text(
        &self,
        name: &str,
        function: Option<modl_ast::DeclId>,
        args: &[Expr],
    ) -> Result<String> {
        let func = function.map(|id| self.pool.get(id));
        let mut parts = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let by_reference = matches!(
                func.map(|f| &f.kind),
                Some(DeclKind::Func(f)) if matches!(
                    f.parameters.get(i).map(|p| &p.kind),
                    Some(DeclKind::Var { readonly: false, .. })
                )
            );
            if by_reference {
                parts.push(format!("&({})", self.expr(arg)?));
            } else {
                parts.push(self.expr(arg)?);
            }
        }
        Ok(format!("{}({})", name, parts.join(", ")))
    }

    /// Lower bound of the index type of an array-typed expression.
    fn index_lower_bound(&self, array: &Expr) -> Result<modl_ast::Int> {
        let ty = array.resolved_type(self.pool)?;
        match ty.as_ref().map(|t| &t.kind) {
            Some(TypeExprKind::Array { index_type, .. }) => {
                Ok(index_type.lower_bound(self.pool)?)
            }
            _ => Err(EmitError::Unsupported {
                backend: "C",
                construct: "indexing a non-array value",
                loc: array.loc.clone(),
            }),
        }
    }

    fn c_type(&self, t: &TypeExpr) -> Result<String> {
        Ok(match &t.kind {
            TypeExprKind::Named { name, .. } => name.clone(),
            TypeExprKind::Range { .. } | TypeExprKind::Scalarset { .. } => "int64_t".to_string(),
            TypeExprKind::Enum { members } => {
                let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
                format!("enum {{ {} }}", names.join(", "))
            }
            TypeExprKind::Array {
                index_type,
                element_type,
            } => {
                let count = index_type.value_count(self.pool)?;
                format!(
                    "struct {{ {} data[{}]; }}",
                    self.c_type(element_type)?,
                    count
                )
            }
            TypeExprKind::Record { fields } => {
                let mut body = String::new();
                for f in fields {
                    if let DeclKind::Var { ty, .. } = &f.kind {
                        body.push_str(&format!("{} {}; ", self.c_type(ty)?, f.name));
                    }
                }
                format!("struct {{ {}}}", body)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modl_ast::{resolve, validate, Int, Loc, Property};

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn emit(mut model: Model) -> String {
        model.assign_ids();
        resolve(&mut model).unwrap();
        validate(&model).unwrap();
        let mut out = Vec::new();
        emit_c(&model, &EmitOptions::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_const_and_var_decls() {
        let model = Model::new(
            vec![
                Decl::constant("N", None, num(4), Loc::dummy()),
                Decl::var(
                    "x",
                    TypeExpr::range(num(0), num(3), Loc::dummy()),
                    false,
                    Loc::dummy(),
                ),
            ],
            vec![],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("const int64_t N = 4;"));
        assert!(out.contains("int64_t x;"));
    }

    #[test]
    fn test_simple_rule_emits_guard_and_rule_pair() {
        let model = Model::new(
            vec![Decl::var(
                "x",
                TypeExpr::range(num(0), num(3), Loc::dummy()),
                false,
                Loc::dummy(),
            )],
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
        let out = emit(model);
        assert!(out.contains("bool guard_bump() {"));
        assert!(out.contains("return (x < 3);"));
        assert!(out.contains("void rule_bump() {"));
        assert!(out.contains("x = (x + 1);"));
    }

    #[test]
    fn test_guardless_rule_guards_true() {
        let model = Model::new(
            vec![],
            vec![Rule::simple("spin", None, vec![], vec![], Loc::dummy())],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("return true;"));
    }

    #[test]
    fn test_ruleset_quantifier_becomes_parameter_and_startstate_prefix() {
        let inner = Rule::start_state("init", vec![], vec![], Loc::dummy());
        let set = Rule::ruleset(
            vec![Quantifier::bounds("i", num(0), num(3), None, Loc::dummy())],
            vec![inner],
            Loc::dummy(),
        );
        let out = emit(Model::new(vec![], vec![set], Loc::dummy()));
        assert!(out.contains("void startstate_init(int64_t i) {"));
    }

    #[test]
    fn test_descending_constant_bounds_count_down() {
        let body = vec![Stmt::for_stmt(
            Quantifier::bounds("i", num(3), num(0), None, Loc::dummy()),
            vec![],
            Loc::dummy(),
        )];
        let model = Model::new(
            vec![],
            vec![Rule::start_state("init", vec![], body, Loc::dummy())],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("for (int64_t i = 3; i >= 0; i += -1)"));
    }

    #[test]
    fn test_enum_quantifier_iterates_members() {
        let colors = TypeExpr::enumeration(
            vec![("red".into(), Loc::dummy()), ("blue".into(), Loc::dummy())],
            Loc::dummy(),
        );
        let body = vec![Stmt::for_stmt(
            Quantifier::over("c", TypeExpr::named("color", Loc::dummy()), Loc::dummy()),
            vec![],
            Loc::dummy(),
        )];
        let model = Model::new(
            vec![Decl::type_decl("color", colors, Loc::dummy())],
            vec![Rule::start_state("init", vec![], body, Loc::dummy())],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("for (__typeof__(red) c = red; c <= blue; c++)"));
    }

    #[test]
    fn test_property_rule_is_a_boolean_function() {
        let model = Model::new(
            vec![Decl::var(
                "x",
                TypeExpr::range(num(0), num(3), Loc::dummy()),
                false,
                Loc::dummy(),
            )],
            vec![Rule::property(
                "bounded",
                Property::new(
                    Category::Assertion,
                    Expr::binary(
                        BinaryOp::Leq,
                        Expr::id("x", Loc::dummy()),
                        num(3),
                        Loc::dummy(),
                    ),
                    Loc::dummy(),
                ),
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("bool bounded() {"));
        assert!(out.contains("return (x <= 3);"));
    }

    #[test]
    fn test_implication_rewrites_to_disjunction() {
        let model = Model::new(
            vec![
                Decl::var("a", TypeExpr::named("boolean", Loc::dummy()), false, Loc::dummy()),
                Decl::var("b", TypeExpr::named("boolean", Loc::dummy()), false, Loc::dummy()),
            ],
            vec![Rule::simple(
                "r",
                Some(Expr::binary(
                    BinaryOp::Implication,
                    Expr::id("a", Loc::dummy()),
                    Expr::id("b", Loc::dummy()),
                    Loc::dummy(),
                )),
                vec![],
                vec![],
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        let out = emit(model);
        assert!(out.contains("return (!a || b);"));
    }

    #[test]
    fn test_function_var_parameter_uses_pointer_alias() {
        let param = Decl::var(
            "out",
            TypeExpr::range(num(0), num(9), Loc::dummy()),
            false,
            Loc::dummy(),
        );
        let f = Decl::function(
            "set",
            vec![param],
            None,
            vec![],
            vec![Stmt::assignment(
                Expr::id("out", Loc::dummy()),
                num(1),
                Loc::dummy(),
            )],
            Loc::dummy(),
        );
        let out = emit(Model::new(vec![f], vec![], Loc::dummy()));
        assert!(out.contains("void set(int64_t *out_) {"));
        assert!(out.contains("#define out (*out_)"));
        assert!(out.contains("#undef out"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let build = || {
            Model::new(
                vec![Decl::constant("N", None, num(2), Loc::dummy())],
                vec![Rule::simple("r", None, vec![], vec![], Loc::dummy())],
                Loc::dummy(),
            )
        };
        assert_eq!(emit(build()), emit(build()));
    }
}
