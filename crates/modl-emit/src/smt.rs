//! SMT translation of expressions.

use crate::logic::Logic;
use crate::{EmitError, Result};
use modl_ast::{BinaryOp, DeclPool, Expr, ExprKind, NodeId, UnaryOp};

/// Translate an expression to an s-expression in integer logic.
///
/// Quantified expressions and function calls have no SMT counterpart here
/// and raise the unsupported error kind.
pub fn emit_smt(expr: &Expr, pool: &DeclPool) -> Result<String> {
    translate(expr, pool, &Logic::Integer)
}

/// Translate an expression to an s-expression in the given logic.
pub fn translate(expr: &Expr, pool: &DeclPool, logic: &Logic) -> Result<String> {
    let mut translator = Translator {
        buffer: String::new(),
        pool,
        logic,
    };
    translator.dispatch(expr)?;
    Ok(translator.buffer)
}

/// Map a source name to a solver symbol.
///
/// Boolean literals and the boolean type are names the solver already
/// knows; everything else gets a node-unique name derived from its
/// declaration's id.
pub fn mangle(name: &str, id: NodeId) -> String {
    let lower = name.to_lowercase();
    if lower == "true" || lower == "false" {
        return lower;
    }
    if lower == "boolean" {
        return "Bool".to_string();
    }
    format!("s{}", id)
}

struct Translator<'a> {
    buffer: String,
    pool: &'a DeclPool,
    logic: &'a Logic,
}

impl<'a> Translator<'a> {
    fn push(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn dispatch(&mut self, e: &Expr) -> Result<()> {
        match &e.kind {
            ExprKind::Number(value) => {
                let lit = self.logic.numeric_literal(value);
                self.push(&lit);
            }
            ExprKind::Id { name, decl } => {
                let id = decl.ok_or_else(|| modl_ast::Error::UnresolvedReference {
                    name: name.clone(),
                    loc: e.loc.clone(),
                })?;
                let mangled = mangle(name, self.pool.get(id).unique_id);
                self.push(&mangled);
            }
            ExprKind::Field { record, field } => {
                // the record type was previously defined as a synthesized
                // solver type; its per-field accessors are named after the
                // type's mangled id
                let ty = record
                    .resolved_type(self.pool)
                    .map_err(EmitError::Ast)?
                    .ok_or_else(|| EmitError::Unsupported {
                        backend: "SMT",
                        construct: "field access on numeric values",
                        loc: e.loc.clone(),
                    })?;
                let getter = format!("{}_{}", mangle("", ty.unique_id), field);
                self.push(&format!("({} ", getter));
                self.dispatch(record)?;
                self.push(")");
            }
            ExprKind::Element { array, index } => {
                self.push("(select ");
                self.dispatch(array)?;
                self.push(" ");
                self.dispatch(index)?;
                self.push(")");
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.push("(ite ");
                self.dispatch(cond)?;
                self.push(" ");
                self.dispatch(lhs)?;
                self.push(" ");
                self.dispatch(rhs)?;
                self.push(")");
            }
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinaryOp::Neq => {
                    self.push("(not (= ");
                    self.dispatch(lhs)?;
                    self.push(" ");
                    self.dispatch(rhs)?;
                    self.push("))");
                }
                _ => {
                    let symbol = self.binary_symbol(*op);
                    self.push(&format!("({} ", symbol));
                    self.dispatch(lhs)?;
                    self.push(" ");
                    self.dispatch(rhs)?;
                    self.push(")");
                }
            },
            ExprKind::Unary { op, rhs } => {
                let symbol = match op {
                    UnaryOp::Not => "not".to_string(),
                    UnaryOp::Negative => self.logic.neg().to_string(),
                };
                self.push(&format!("({} ", symbol));
                self.dispatch(rhs)?;
                self.push(")");
            }
            ExprKind::Exists { .. } => {
                return Err(EmitError::Unsupported {
                    backend: "SMT",
                    construct: "existential quantifiers",
                    loc: e.loc.clone(),
                })
            }
            ExprKind::Forall { .. } => {
                return Err(EmitError::Unsupported {
                    backend: "SMT",
                    construct: "universal quantifiers",
                    loc: e.loc.clone(),
                })
            }
            ExprKind::Call { .. } => {
                return Err(EmitError::Unsupported {
                    backend: "SMT",
                    construct: "function calls",
                    loc: e.loc.clone(),
                })
            }
        }
        Ok(())
    }

    fn binary_symbol(&self, op: BinaryOp) -> String {
        match op {
            BinaryOp::And => "and".to_string(),
            BinaryOp::Or => "or".to_string(),
            BinaryOp::Implication => "=>".to_string(),
            BinaryOp::Eq => "=".to_string(),
            BinaryOp::Neq => unreachable!("inequality is expanded by the caller"),
            BinaryOp::Lt => self.logic.lt().to_string(),
            BinaryOp::Leq => self.logic.leq().to_string(),
            BinaryOp::Gt => self.logic.gt().to_string(),
            BinaryOp::Geq => self.logic.geq().to_string(),
            BinaryOp::Add => self.logic.add().to_string(),
            BinaryOp::Sub => self.logic.sub().to_string(),
            BinaryOp::Mul => self.logic.mul().to_string(),
            BinaryOp::Div => self.logic.div().to_string(),
            BinaryOp::Mod => self.logic.modulo().to_string(),
        }
    }
}
