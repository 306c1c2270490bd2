//! AST, semantic passes, and symbol resolution for the Modl modeling language.
//!
//! The parser (an external collaborator) constructs a [`Model`] through the
//! node constructors, after which the pipeline is: [`Model::assign_ids`],
//! [`resolve`], [`validate`], and then either [`Model::flat_rules`] or one of
//! the emitter backends in `modl-emit`.

pub mod decl;
pub mod error;
pub mod expr;
pub mod loc;
pub mod model;
pub mod number;
pub mod property;
pub mod resolve;
pub mod rule;
pub mod stmt;
pub mod symtab;
pub mod traverse;
pub mod types;
pub mod validate;

pub use decl::{Decl, DeclId, DeclKind, DeclPool, Function, SymbolKind};
pub use error::{Error, Result};
pub use expr::{BinaryOp, Expr, ExprKind, OpFamily, Quantifier, QuantifierKind, UnaryOp};
pub use loc::{Loc, Position};
pub use model::Model;
pub use number::Int;
pub use property::{Category, Property};
pub use resolve::resolve;
pub use rule::{Rule, RuleKind};
pub use stmt::{IfClause, Stmt, StmtKind, SwitchCase};
pub use symtab::Symtab;
pub use traverse::{
    walk_decl, walk_decl_mut, walk_expr, walk_expr_mut, walk_model, walk_model_mut, walk_property,
    walk_property_mut, walk_quantifier, walk_quantifier_mut, walk_rule, walk_rule_mut, walk_stmt,
    walk_stmt_mut, walk_subexprs, walk_subexprs_mut, walk_type_expr, walk_type_expr_mut,
    ExprVisitor, ExprVisitorMut, NodeRef, Postorder, Preorder, Visitor, VisitorMut,
};
pub use types::{TypeExpr, TypeExprKind};
pub use validate::validate;

/// Identity assigned to every node by the numbering pass.
///
/// 0 means "not yet assigned"; the pass numbers nodes in pre-order starting
/// at 1, so assigned ids are pairwise distinct within one tree.
pub type NodeId = u64;
