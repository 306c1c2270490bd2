//! Self-contained explicit-state checker generation.
//!
//! The generated program stores states as packed bit vectors and drives
//! breadth-first exploration from a queue and a seen set. The queue, set,
//! handle accessors, and state allocation are provided by the runtime
//! support code passed through [`EmitOptions::header`]; this backend emits
//! everything model-specific: layout constants, constant accessors, guard
//! and body functions over state handles, registration tables, the
//! counterexample printer, and `main`.

use crate::emitter::{c_op, c_string, Writer};
use crate::{EmitError, EmitOptions, Result};
use modl_ast::{
    BinaryOp, Category, Decl, DeclKind, DeclPool, Expr, ExprKind, Int, Model, NodeId, Quantifier,
    QuantifierKind, Rule, RuleKind, Stmt, StmtKind, TypeExpr, TypeExprKind, UnaryOp,
};
use std::collections::HashSet;
use std::io;
use tracing::debug;

/// Generate the checker for a resolved, validated model.
pub fn emit_checker<W: io::Write>(
    model: &Model,
    options: &EmitOptions,
    out: &mut W,
) -> Result<()> {
    let flat = model.flat_rules();
    debug!(rules = flat.len(), pack = options.pack, "emitting checker");

    let state_vars: Vec<&Decl> = model
        .decls
        .iter()
        .filter(|d| matches!(d.kind, DeclKind::Var { .. }))
        .collect();
    let state_uids: HashSet<NodeId> = state_vars.iter().map(|d| d.unique_id).collect();

    let mut gen = CheckerGenerator {
        w: Writer::new(out),
        pool: &model.pool,
        pack: options.pack,
        state_uids,
    };

    if !options.debug {
        writeln!(gen.w.out, "#define NDEBUG 1\n")?;
    }
    writeln!(gen.w.out, "{}", options.includes)?;

    writeln!(gen.w.out, "enum {{ SET_CAPACITY = {}ul }};\n", options.set_capacity)?;
    writeln!(
        gen.w.out,
        "enum {{ SET_EXPAND_THRESHOLD = {} }};\n",
        options.set_expand_threshold
    )?;
    writeln!(gen.w.out, "enum {{ THREADS = {}ul }};\n", options.threads)?;

    let mut state_bits = Int::zero();
    for d in &state_vars {
        if let DeclKind::Var { ty, .. } = &d.kind {
            state_bits = &state_bits + &gen.width_of(ty)?;
        }
    }
    writeln!(gen.w.out, "enum {{ STATE_SIZE_BITS = {}ul }};\n", state_bits)?;

    writeln!(gen.w.out, "{}", options.header)?;

    gen.layout(&state_vars)?;
    gen.constants(model)?;
    gen.rules(&flat)?;
    gen.tables(&flat)?;
    gen.counterexample_printer()?;
    gen.main_function(&flat)?;
    Ok(())
}

struct CheckerGenerator<'a, W: io::Write> {
    w: Writer<'a, W>,
    pool: &'a DeclPool,
    pack: bool,
    /// Unique ids of the model's state variables; identifiers resolving to
    /// one of these read and write through handles.
    state_uids: HashSet<NodeId>,
}

impl<'a, W: io::Write> CheckerGenerator<'a, W> {
    /// Width of a value of this type under the configured packing: exact
    /// bits when packed, scalars rounded up to whole bytes otherwise.
    fn width_of(&self, ty: &TypeExpr) -> Result<Int> {
        let resolved = ty.resolve(self.pool)?;
        match &resolved.kind {
            TypeExprKind::Range { .. }
            | TypeExprKind::Enum { .. }
            | TypeExprKind::Scalarset { .. } => {
                let mut bits = resolved.value_count(self.pool)?.bits();
                if !self.pack {
                    bits = bits.div_ceil(8) * 8;
                }
                Ok(Int::from(bits))
            }
            TypeExprKind::Array {
                index_type,
                element_type,
            } => {
                let count = index_type.value_count(self.pool)?;
                Ok(&count * &self.width_of(element_type)?)
            }
            TypeExprKind::Record { fields } => {
                let mut total = Int::zero();
                for f in fields {
                    if let DeclKind::Var { ty, .. } = &f.kind {
                        total = &total + &self.width_of(ty)?;
                    }
                }
                Ok(total)
            }
            TypeExprKind::Named { .. } => unreachable!("resolve returned a named type"),
        }
    }

    /// Per-variable offset and width constants.
    fn layout(&mut self, state_vars: &[&Decl]) -> Result<()> {
        let mut offset = Int::zero();
        for d in state_vars {
            if let DeclKind::Var { ty, .. } = &d.kind {
                let width = self.width_of(ty)?;
                writeln!(
                    self.w.out,
                    "enum {{ OFFSET_{name} = {offset}ul, WIDTH_{name} = {width}ul }};",
                    name = d.name,
                    offset = offset,
                    width = width
                )?;
                offset = &offset + &width;
            }
        }
        writeln!(self.w.out)?;
        Ok(())
    }

    /// Model constants become state-independent accessor functions.
    fn constants(&mut self, model: &Model) -> Result<()> {
        for d in &model.decls {
            if let DeclKind::Const { value, .. } = &d.kind {
                writeln!(
                    self.w.out,
                    "static int64_t model_{}(const struct state *s __attribute__((unused))) {{ return {}; }}",
                    d.name,
                    self.rvalue(value)?
                )?;
            }
        }
        writeln!(self.w.out)?;
        Ok(())
    }

    fn rules(&mut self, flat: &[Rule]) -> Result<()> {
        for (index, r) in flat.iter().enumerate() {
            match &r.kind {
                RuleKind::Simple { guard, decls, body } => {
                    self.guard_function(index, r, guard.as_ref())?;
                    self.body_function(index, r, decls, body, "rule")?;
                }
                RuleKind::StartState { decls, body } => {
                    self.body_function(index, r, decls, body, "startstate")?;
                }
                RuleKind::Property(p) => {
                    if p.category != Category::Assertion {
                        return Err(EmitError::Unsupported {
                            backend: "checker",
                            construct: "non-assertion property rules",
                            loc: p.loc.clone(),
                        });
                    }
                    writeln!(
                        self.w.out,
                        "static bool invariant_{}(const struct state *s, const int64_t *q) {{",
                        index
                    )?;
                    self.w.indent();
                    self.bind_quantifiers(r)?;
                    writeln!(
                        self.w.out,
                        "{}return {};",
                        self.w.indentation(),
                        self.rvalue(&p.expr)?
                    )?;
                    self.w.dedent();
                    writeln!(self.w.out, "}}\n")?;
                }
                RuleKind::Ruleset { .. } | RuleKind::AliasRule { .. } => {
                    unreachable!("rules are flattened before emission")
                }
            }
        }
        Ok(())
    }

    fn guard_function(&mut self, index: usize, r: &Rule, guard: Option<&Expr>) -> Result<()> {
        writeln!(
            self.w.out,
            "static bool guard_{}(const struct state *s, const int64_t *q) {{",
            index
        )?;
        self.w.indent();
        self.bind_quantifiers(r)?;
        let guard = match guard {
            Some(g) => self.rvalue(g)?,
            None => "true".to_string(),
        };
        writeln!(self.w.out, "{}return {};", self.w.indentation(), guard)?;
        self.w.dedent();
        writeln!(self.w.out, "}}\n")?;
        Ok(())
    }

    fn body_function(
        &mut self,
        index: usize,
        r: &Rule,
        decls: &[Decl],
        body: &[Stmt],
        prefix: &str,
    ) -> Result<()> {
        writeln!(
            self.w.out,
            "static void {}_{}(struct state *s, const int64_t *q) {{",
            prefix, index
        )?;
        self.w.indent();
        self.bind_quantifiers(r)?;
        for d in decls {
            self.local_decl(d)?;
        }
        for stmt in body {
            self.stmt(stmt)?;
        }
        self.w.dedent();
        writeln!(self.w.out, "}}\n")?;
        Ok(())
    }

    /// Expose the rule's quantifier values, passed by the driver as an
    /// array, under their declared names.
    fn bind_quantifiers(&mut self, r: &Rule) -> Result<()> {
        for (k, quant) in r.quantifiers.iter().enumerate() {
            writeln!(
                self.w.out,
                "{}const int64_t {} = q[{}];",
                self.w.indentation(),
                quant.name,
                k
            )?;
        }
        if r.quantifiers.is_empty() {
            writeln!(self.w.out, "{}(void)q;", self.w.indentation())?;
        }
        Ok(())
    }

    fn local_decl(&mut self, d: &Decl) -> Result<()> {
        let ind = self.w.indentation();
        match &d.kind {
            DeclKind::Var { ty, .. } => {
                if !ty.resolve(self.pool)?.is_simple() {
                    return Err(EmitError::Unsupported {
                        backend: "checker",
                        construct: "compound-typed rule locals",
                        loc: d.loc.clone(),
                    });
                }
                writeln!(self.w.out, "{}int64_t {} = 0;", ind, d.name)?;
            }
            DeclKind::Const { value, .. } => {
                writeln!(
                    self.w.out,
                    "{}const int64_t {} = {};",
                    ind,
                    d.name,
                    self.rvalue(value)?
                )?;
            }
            // aliases are expanded at each use and types are structural
            DeclKind::Alias { .. } | DeclKind::Type { .. } => {}
            DeclKind::Func(_) => {
                return Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "function declarations inside rules",
                    loc: d.loc.clone(),
                })
            }
        }
        Ok(())
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        let ind = self.w.indentation();
        match &s.kind {
            StmtKind::Assignment { lhs, rhs } => {
                if self.rooted_in_state(lhs)? {
                    let ty = lhs.resolved_type(self.pool)?;
                    let ty = match ty {
                        Some(t) if t.is_simple() => t,
                        _ => {
                            return Err(EmitError::Unsupported {
                                backend: "checker",
                                construct: "assignment to compound values",
                                loc: s.loc.clone(),
                            })
                        }
                    };
                    writeln!(
                        self.w.out,
                        "{}handle_write(s, {}, {}, {}, {});",
                        ind,
                        ty.lower_bound(self.pool)?,
                        ty.upper_bound(self.pool)?,
                        self.handle(lhs)?,
                        self.rvalue(rhs)?
                    )?;
                } else {
                    writeln!(self.w.out, "{}{} = {};", ind, self.rvalue(lhs)?, self.rvalue(rhs)?)?;
                }
            }
            StmtKind::Undefine(lv) => {
                writeln!(self.w.out, "{}handle_zero({});", ind, self.handle(lv)?)?;
            }
            // the semantics of clear in generated checkers are not pinned
            // down by the language reference yet
            StmtKind::Clear(_) => {
                return Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "clear statements",
                    loc: s.loc.clone(),
                })
            }
            StmtKind::ErrorStmt { message } => {
                writeln!(self.w.out, "{}error(s, false, \"{}\");", ind, c_string(message))?;
            }
            StmtKind::If { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i == 0 {
                        write!(self.w.out, "{}", ind)?;
                    } else {
                        write!(self.w.out, " else ")?;
                    }
                    if let Some(cond) = &clause.condition {
                        write!(self.w.out, "if ({}) ", self.rvalue(cond)?)?;
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
                writeln!(self.w.out, "{}{} {{", ind, self.quantifier_loop(quantifier)?)?;
                self.w.indent();
                for inner in body {
                    self.stmt(inner)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
            }
            StmtKind::While { condition, body } => {
                writeln!(self.w.out, "{}while ({}) {{", ind, self.rvalue(condition)?)?;
                self.w.indent();
                for inner in body {
                    self.stmt(inner)?;
                }
                self.w.dedent();
                writeln!(self.w.out, "{}}}", ind)?;
            }
            StmtKind::Switch { expr, cases } => {
                let tmp = format!("switch_{}", s.unique_id);
                writeln!(self.w.out, "{}{{", ind)?;
                self.w.indent();
                writeln!(
                    self.w.out,
                    "{}int64_t {} = {};",
                    self.w.indentation(),
                    tmp,
                    self.rvalue(expr)?
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
                            .map(|m| Ok(format!("{} == ({})", tmp, self.rvalue(m)?)))
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
            StmtKind::Return(None) => {
                writeln!(self.w.out, "{}return;", ind)?;
            }
            StmtKind::Return(Some(_)) => {
                return Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "value-returning return statements",
                    loc: s.loc.clone(),
                })
            }
            // like clear, procedure call semantics in generated checkers
            // await the language reference
            StmtKind::ProcedureCall { .. } => {
                return Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "procedure calls",
                    loc: s.loc.clone(),
                })
            }
            StmtKind::PropertyStmt { property, message } => match property.category {
                Category::Assertion => {
                    writeln!(
                        self.w.out,
                        "{}if (__builtin_expect(!({}), 0)) {{ error(s, false, \"{}\"); }}",
                        ind,
                        self.rvalue(&property.expr)?,
                        c_string(message)
                    )?;
                }
                Category::Assumption => {
                    writeln!(
                        self.w.out,
                        "{}if (__builtin_expect(!({}), 0)) {{\n{ind}  assert(JMP_BUF_NEEDED && \"longjmping without a setup jmp_buf\");\n{ind}  longjmp(checkpoint, 1);\n{ind}}}",
                        ind,
                        self.rvalue(&property.expr)?,
                        ind = ind
                    )?;
                }
                Category::Cover | Category::Liveness => {
                    return Err(EmitError::Unsupported {
                        backend: "checker",
                        construct: "cover and liveness properties",
                        loc: property.loc.clone(),
                    })
                }
            },
        }
        Ok(())
    }

    /// Whether an lvalue bottoms out in a state variable (rather than a
    /// rule-local or bound variable).
    fn rooted_in_state(&self, e: &Expr) -> Result<bool> {
        match &e.kind {
            ExprKind::Id { name, decl } => match decl {
                Some(id) => {
                    let d = self.pool.get(*id);
                    match &d.kind {
                        DeclKind::Alias { value } => self.rooted_in_state(value),
                        _ => Ok(self.state_uids.contains(&d.unique_id)),
                    }
                }
                None => Err(EmitError::Ast(modl_ast::Error::UnresolvedReference {
                    name: name.clone(),
                    loc: e.loc.clone(),
                })),
            },
            ExprKind::Field { record, .. } => self.rooted_in_state(record),
            ExprKind::Element { array, .. } => self.rooted_in_state(array),
            _ => Ok(false),
        }
    }

    /// A handle expression addressing the bits of a state-rooted lvalue.
    fn handle(&self, e: &Expr) -> Result<String> {
        match &e.kind {
            ExprKind::Id { name, decl } => {
                let d = decl.map(|id| self.pool.get(id));
                match d.map(|d| &d.kind) {
                    Some(DeclKind::Alias { value }) => self.handle(value),
                    Some(DeclKind::Var { .. }) => Ok(format!(
                        "state_handle(s, OFFSET_{name}, WIDTH_{name})",
                        name = name
                    )),
                    _ => Err(EmitError::Unsupported {
                        backend: "checker",
                        construct: "handles to non-variables",
                        loc: e.loc.clone(),
                    }),
                }
            }
            ExprKind::Field { record, field } => {
                let record_ty = record.resolved_type(self.pool)?;
                let fields = match record_ty.as_ref().map(|t| &t.kind) {
                    Some(TypeExprKind::Record { fields }) => fields,
                    _ => {
                        return Err(EmitError::Unsupported {
                            backend: "checker",
                            construct: "field access on non-records",
                            loc: e.loc.clone(),
                        })
                    }
                };
                let mut offset = Int::zero();
                for f in fields {
                    if let DeclKind::Var { ty, .. } = &f.kind {
                        let width = self.width_of(ty)?;
                        if f.name == *field {
                            return Ok(format!(
                                "handle_narrow({}, {}, {})",
                                self.handle(record)?,
                                offset,
                                width
                            ));
                        }
                        offset = &offset + &width;
                    }
                }
                Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "access to a missing record field",
                    loc: e.loc.clone(),
                })
            }
            ExprKind::Element { array, index } => {
                let array_ty = array.resolved_type(self.pool)?;
                let (index_type, element_type) = match array_ty.as_ref().map(|t| &t.kind) {
                    Some(TypeExprKind::Array {
                        index_type,
                        element_type,
                    }) => (index_type, element_type),
                    _ => {
                        return Err(EmitError::Unsupported {
                            backend: "checker",
                            construct: "indexing non-arrays",
                            loc: e.loc.clone(),
                        })
                    }
                };
                let width = self.width_of(element_type)?;
                let lb = index_type.lower_bound(self.pool)?;
                let idx = if lb.is_zero() {
                    self.rvalue(index)?
                } else {
                    format!("({}) - ({})", self.rvalue(index)?, lb)
                };
                Ok(format!(
                    "handle_index({}, {}, {})",
                    self.handle(array)?,
                    width,
                    idx
                ))
            }
            _ => Err(EmitError::Unsupported {
                backend: "checker",
                construct: "handles to non-lvalues",
                loc: e.loc.clone(),
            }),
        }
    }

    fn rvalue(&self, e: &Expr) -> Result<String> {
        Ok(match &e.kind {
            ExprKind::Number(v) => v.to_string(),
            ExprKind::Id { name, decl } => {
                let id = decl.ok_or_else(|| modl_ast::Error::UnresolvedReference {
                    name: name.clone(),
                    loc: e.loc.clone(),
                })?;
                let d = self.pool.get(id);
                match &d.kind {
                    DeclKind::Const { .. } => format!("model_{}(s)", name),
                    DeclKind::Alias { value } => format!("({})", self.rvalue(value)?),
                    DeclKind::Var { ty, .. } => {
                        if self.state_uids.contains(&d.unique_id) {
                            let resolved = ty.resolve(self.pool)?;
                            format!(
                                "handle_read(s, {}, {}, {})",
                                resolved.lower_bound(self.pool)?,
                                resolved.upper_bound(self.pool)?,
                                self.handle(e)?
                            )
                        } else {
                            name.clone()
                        }
                    }
                    _ => {
                        return Err(EmitError::Unsupported {
                            backend: "checker",
                            construct: "reading non-value declarations",
                            loc: e.loc.clone(),
                        })
                    }
                }
            }
            ExprKind::Field { .. } | ExprKind::Element { .. } => {
                let ty = e.resolved_type(self.pool)?;
                let ty = match ty {
                    Some(t) if t.is_simple() => t,
                    _ => {
                        return Err(EmitError::Unsupported {
                            backend: "checker",
                            construct: "reading compound values",
                            loc: e.loc.clone(),
                        })
                    }
                };
                format!(
                    "handle_read(s, {}, {}, {})",
                    ty.lower_bound(self.pool)?,
                    ty.upper_bound(self.pool)?,
                    self.handle(e)?
                )
            }
            ExprKind::Call { .. } => {
                return Err(EmitError::Unsupported {
                    backend: "checker",
                    construct: "function calls",
                    loc: e.loc.clone(),
                })
            }
            ExprKind::Ternary { cond, lhs, rhs } => format!(
                "({} ? {} : {})",
                self.rvalue(cond)?,
                self.rvalue(lhs)?,
                self.rvalue(rhs)?
            ),
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinaryOp::Implication => {
                    format!("(!{} || {})", self.rvalue(lhs)?, self.rvalue(rhs)?)
                }
                _ => format!(
                    "({} {} {})",
                    self.rvalue(lhs)?,
                    c_op(*op),
                    self.rvalue(rhs)?
                ),
            },
            ExprKind::Unary { op, rhs } => match op {
                UnaryOp::Not => format!("(!{})", self.rvalue(rhs)?),
                UnaryOp::Negative => format!("(-{})", self.rvalue(rhs)?),
            },
            ExprKind::Exists { quantifier, expr } => {
                self.quantified_rvalue(quantifier, expr, e, false)?
            }
            ExprKind::Forall { quantifier, expr } => {
                self.quantified_rvalue(quantifier, expr, e, true)?
            }
        })
    }

    fn quantified_rvalue(
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
            header = self.quantifier_loop(quantifier)?,
            fold = fold,
            body = self.rvalue(body)?
        ))
    }

    /// A `for` header iterating a quantifier's domain inside a rule body.
    fn quantifier_loop(&self, q: &Quantifier) -> Result<String> {
        match &q.kind {
            QuantifierKind::Bounds { from, to, step } => {
                let down_count = from.constant(self.pool)
                    && to.constant(self.pool)
                    && to.constant_fold(self.pool)? < from.constant_fold(self.pool)?;
                let step = match step {
                    Some(s) => self.rvalue(s)?,
                    None if down_count => "-1".to_string(),
                    None => "1".to_string(),
                };
                Ok(format!(
                    "for (int64_t {name} = {from}; {name} {cmp} {to}; {name} += {step})",
                    name = q.name,
                    from = self.rvalue(from)?,
                    cmp = if down_count { ">=" } else { "<=" },
                    to = self.rvalue(to)?,
                    step = step
                ))
            }
            QuantifierKind::Over(ty) => {
                let resolved = ty.resolve(self.pool)?;
                if !resolved.is_simple() {
                    return Err(EmitError::Unsupported {
                        backend: "checker",
                        construct: "quantifiers over compound types",
                        loc: q.loc.clone(),
                    });
                }
                Ok(format!(
                    "for (int64_t {name} = {lb}; {name} <= {ub}; {name}++)",
                    name = q.name,
                    lb = resolved.lower_bound(self.pool)?,
                    ub = resolved.upper_bound(self.pool)?
                ))
            }
        }
    }

    /// Folded iteration bounds for a rule quantifier, registered alongside
    /// the rule so the driver can enumerate bindings.
    fn quant_entry(&self, q: &Quantifier) -> Result<String> {
        match &q.kind {
            QuantifierKind::Over(ty) => {
                let resolved = ty.resolve(self.pool)?;
                Ok(format!(
                    "{{ {}, {}, 1 }}",
                    resolved.lower_bound(self.pool)?,
                    resolved.upper_bound(self.pool)?
                ))
            }
            QuantifierKind::Bounds { from, to, step } => {
                let lb = from.constant_fold(self.pool)?;
                let ub = to.constant_fold(self.pool)?;
                let step = match step {
                    Some(s) => s.constant_fold(self.pool)?,
                    None if ub < lb => Int::from(-1i64),
                    None => Int::one(),
                };
                Ok(format!("{{ {}, {}, {} }}", lb, ub, step))
            }
        }
    }

    /// Registration tables for start states, rules, and invariants.
    fn tables(&mut self, flat: &[Rule]) -> Result<()> {
        let max_quants = flat.iter().map(|r| r.quantifiers.len()).max().unwrap_or(0);
        writeln!(
            self.w.out,
            "enum {{ MAX_QUANTIFIERS = {} }};\n",
            max_quants.max(1)
        )?;

        for (index, r) in flat.iter().enumerate() {
            if r.quantifiers.is_empty() {
                continue;
            }
            let entries: Vec<String> = r
                .quantifiers
                .iter()
                .map(|q| self.quant_entry(q))
                .collect::<Result<_>>()?;
            writeln!(
                self.w.out,
                "static const struct quant quants_{}[] = {{ {} }};",
                index,
                entries.join(", ")
            )?;
        }
        writeln!(self.w.out)?;

        let mut starts = Vec::new();
        let mut rules = Vec::new();
        let mut invariants = Vec::new();
        for (index, r) in flat.iter().enumerate() {
            let quants = if r.quantifiers.is_empty() {
                "NULL".to_string()
            } else {
                format!("quants_{}", index)
            };
            let n = r.quantifiers.len();
            let name = c_string(&r.name);
            match &r.kind {
                RuleKind::StartState { .. } => starts.push(format!(
                    "{{ \"{}\", NULL, startstate_{}, {}, {} }}",
                    name, index, quants, n
                )),
                RuleKind::Simple { .. } => rules.push(format!(
                    "{{ \"{}\", guard_{}, rule_{}, {}, {} }}",
                    name, index, index, quants, n
                )),
                RuleKind::Property(_) => invariants.push(format!(
                    "{{ \"{}\", invariant_{}, NULL, {}, {} }}",
                    name, index, quants, n
                )),
                _ => unreachable!("rules are flattened before emission"),
            }
        }

        for (table, entries) in [
            ("START_RULES", starts),
            ("RULES", rules),
            ("INVARIANTS", invariants),
        ] {
            writeln!(self.w.out, "enum {{ N_{} = {} }};", table, entries.len())?;
            if entries.is_empty() {
                writeln!(self.w.out, "static const struct rule {}[1];", table)?;
            } else {
                writeln!(
                    self.w.out,
                    "static const struct rule {}[] = {{\n  {},\n}};",
                    table,
                    entries.join(",\n  ")
                )?;
            }
            writeln!(self.w.out)?;
        }
        Ok(())
    }

    /// Recursively print the trace leading to a failing state, walking the
    /// previous-state back-links so states appear in traversal order.
    fn counterexample_printer(&mut self) -> Result<()> {
        writeln!(
            self.w.out,
            "static unsigned print_counterexample(const struct state *s) {{
  unsigned step = 0;
  if (s->previous != NULL) {{
    step = print_counterexample(s->previous) + 1;
  }}
  fprintf(stderr, \"State %u:\\n\", step);
  print_state(s);
  fprintf(stderr, \"------------------------------------------------------------\\n\");
  return step;
}}
"
        )?;
        Ok(())
    }

    fn main_function(&mut self, _flat: &[Rule]) -> Result<()> {
        writeln!(
            self.w.out,
            "static time_t start_time;

static unsigned long long gettime(void) {{
  return (unsigned long long)(time(NULL) - start_time);
}}

static bool check_invariants(const struct state *s) {{
  for (size_t i = 0; i < N_INVARIANTS; i++) {{
    const struct rule *inv = &INVARIANTS[i];
    int64_t binding[MAX_QUANTIFIERS];
    for (bool more = quant_init(binding, inv); more; more = quant_next(binding, inv)) {{
      if (!inv->guard(s, binding)) {{
        print_counterexample(s);
        fprintf(stderr, \"invariant %s failed\\n\", inv->name);
        return false;
      }}
    }}
  }}
  return true;
}}

int main(void) {{
  start_time = time(NULL);
  printf(\"State size: %zu bits\\n\", (size_t)STATE_SIZE_BITS);

  /* A queue of states to expand. Every state in it has passed all
   * invariants. */
  struct queue *pending = queue_new(THREADS);

  /* The states seen so far. This collection only ever grows. */
  struct set *seen = set_new(SET_CAPACITY, SET_EXPAND_THRESHOLD);

  for (size_t i = 0; i < N_START_RULES; i++) {{
    const struct rule *r = &START_RULES[i];
    int64_t binding[MAX_QUANTIFIERS];
    for (bool more = quant_init(binding, r); more; more = quant_next(binding, r)) {{
      struct state *s = state_new();
      r->body(s, binding);
      if (!set_insert(seen, s)) {{
        state_free(s);
        continue;
      }}
      /* Check invariants eagerly. */
      if (!check_invariants(s)) {{
        printf(\"%zu states covered\\n\", set_size(seen));
        return EXIT_FAILURE;
      }}
      queue_push(pending, s);
    }}
  }}

  for (;;) {{
    struct state *s = queue_pop(pending);
    if (s == NULL) {{
      break;
    }}

    for (size_t i = 0; i < N_RULES; i++) {{
      const struct rule *r = &RULES[i];
      int64_t binding[MAX_QUANTIFIERS];
      for (bool more = quant_init(binding, r); more; more = quant_next(binding, r)) {{
        if (!r->guard(s, binding)) {{
          continue;
        }}
        struct state *next = state_duplicate(s);
        next->previous = s;
        r->body(next, binding);
        if (!set_insert(seen, next)) {{
          state_free(next);
          continue;
        }}
        if (!check_invariants(next)) {{
          fprintf(stderr, \"rule %s caused the failure\\n\", r->name);
          printf(\"%zu states covered\\n\", set_size(seen));
          return EXIT_FAILURE;
        }}
        size_t in_queue = queue_push(pending, next);
        if (set_size(seen) % 10000 == 0) {{
          printf(\"%zu states seen in %llu seconds, %zu states in queue\\n\",
            set_size(seen), gettime(), in_queue);
        }}
      }}
    }}
  }}

  printf(\"%zu states covered, no errors found\\n\", set_size(seen));
  return EXIT_SUCCESS;
}}"
        )?;
        Ok(())
    }
}
