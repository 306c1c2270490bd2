//! Rules, start states, property rules, and the flattener.

use crate::decl::{check_rule_returns, Decl, DeclPool};
use crate::error::{Error, Result};
use crate::expr::{Expr, Quantifier};
use crate::loc::Loc;
use crate::property::Property;
use crate::stmt::Stmt;
use crate::NodeId;
use tracing::debug;

/// A rule. The quantifier and alias vectors are shared by every kind; the
/// flattener prepends enclosing rulesets' quantifiers and alias-rules'
/// aliases into them.
#[derive(Debug, Clone)]
pub struct Rule {
    pub loc: Loc,
    pub unique_id: NodeId,
    pub name: String,
    pub quantifiers: Vec<Quantifier>,
    pub aliases: Vec<Decl>,
    pub kind: RuleKind,
}

/// The kind of rule.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Named guarded transition.
    Simple {
        guard: Option<Expr>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
    },
    /// Guardless initializer.
    StartState { decls: Vec<Decl>, body: Vec<Stmt> },
    /// Invariant or liveness property.
    Property(Property),
    /// Inner rules replicated across quantifiers.
    Ruleset { rules: Vec<Rule> },
    /// Inner rules sharing expression aliases.
    AliasRule { rules: Vec<Rule> },
}

impl Rule {
    pub fn simple(
        name: impl Into<String>,
        guard: Option<Expr>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
        loc: Loc,
    ) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            quantifiers: Vec::new(),
            aliases: Vec::new(),
            kind: RuleKind::Simple { guard, decls, body },
        }
    }

    pub fn start_state(
        name: impl Into<String>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
        loc: Loc,
    ) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            quantifiers: Vec::new(),
            aliases: Vec::new(),
            kind: RuleKind::StartState { decls, body },
        }
    }

    pub fn property(name: impl Into<String>, property: Property, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: name.into(),
            quantifiers: Vec::new(),
            aliases: Vec::new(),
            kind: RuleKind::Property(property),
        }
    }

    pub fn ruleset(quantifiers: Vec<Quantifier>, rules: Vec<Rule>, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: String::new(),
            quantifiers,
            aliases: Vec::new(),
            kind: RuleKind::Ruleset { rules },
        }
    }

    pub fn alias_rule(aliases: Vec<Decl>, rules: Vec<Rule>, loc: Loc) -> Self {
        Self {
            loc,
            unique_id: 0,
            name: String::new(),
            quantifiers: Vec::new(),
            aliases,
            kind: RuleKind::AliasRule { rules },
        }
    }

    /// Expand ruleset and alias-rule nesting into a flat list of simple,
    /// start-state, and property rules.
    ///
    /// Enclosing quantifiers and aliases are prepended to each produced
    /// rule, outermost first; produced order follows a pre-order walk. The
    /// receiver is left untouched.
    pub fn flatten(&self) -> Vec<Rule> {
        match &self.kind {
            RuleKind::Ruleset { rules } => {
                let mut flat = Vec::new();
                for rule in rules {
                    for mut f in rule.flatten() {
                        f.quantifiers.splice(0..0, self.quantifiers.iter().cloned());
                        flat.push(f);
                    }
                }
                flat
            }
            RuleKind::AliasRule { rules } => {
                let mut flat = Vec::new();
                for rule in rules {
                    for mut f in rule.flatten() {
                        f.aliases.splice(0..0, self.aliases.iter().cloned());
                        flat.push(f);
                    }
                }
                flat
            }
            _ => vec![self.clone()],
        }
    }

    /// Local contract checks; children are validated by the pass.
    pub fn validate(&self, pool: &DeclPool) -> Result<()> {
        match &self.kind {
            RuleKind::Simple { guard, body, .. } => {
                if let Some(guard) = guard {
                    if !guard.is_boolean(pool)? {
                        return Err(Error::TypeMismatch {
                            message: format!("guard of rule {} is not a boolean", self.name),
                            loc: guard.loc.clone(),
                        });
                    }
                }
                check_rule_returns(body)
            }
            RuleKind::StartState { body, .. } => check_rule_returns(body),
            RuleKind::Property(_) | RuleKind::Ruleset { .. } | RuleKind::AliasRule { .. } => Ok(()),
        }
    }
}

/// Flatten a whole rule list, preserving pre-order.
pub(crate) fn flatten_all(rules: &[Rule]) -> Vec<Rule> {
    let flat: Vec<Rule> = rules.iter().flat_map(Rule::flatten).collect();
    debug!(nested = rules.len(), flat = flat.len(), "flattened rules");
    flat
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.quantifiers == other.quantifiers
            && self.aliases == other.aliases
            && self.kind == other.kind
    }
}

impl Eq for Rule {}

impl PartialEq for RuleKind {
    fn eq(&self, other: &Self) -> bool {
        use RuleKind::*;
        match (self, other) {
            (
                Simple {
                    guard: g1,
                    decls: d1,
                    body: b1,
                },
                Simple {
                    guard: g2,
                    decls: d2,
                    body: b2,
                },
            ) => g1 == g2 && d1 == d2 && b1 == b2,
            (
                StartState {
                    decls: d1,
                    body: b1,
                },
                StartState {
                    decls: d2,
                    body: b2,
                },
            ) => d1 == d2 && b1 == b2,
            (Property(a), Property(b)) => a == b,
            (Ruleset { rules: a }, Ruleset { rules: b })
            | (AliasRule { rules: a }, AliasRule { rules: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for RuleKind {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Int;

    fn num(v: i64) -> Expr {
        Expr::number(Int::from(v), Loc::dummy())
    }

    fn quant(name: &str, lo: i64, hi: i64) -> Quantifier {
        Quantifier::bounds(name, num(lo), num(hi), None, Loc::dummy())
    }

    #[test]
    fn test_flatten_nested_rulesets_prepends_outer_first() {
        // ruleset i : 1..2 do ruleset j : 0..1 do rule "r" ==> end end end
        let inner_rule = Rule::simple("r", None, vec![], vec![], Loc::dummy());
        let inner = Rule::ruleset(vec![quant("j", 0, 1)], vec![inner_rule], Loc::dummy());
        let outer = Rule::ruleset(vec![quant("i", 1, 2)], vec![inner], Loc::dummy());

        let flat = outer.flatten();
        assert_eq!(flat.len(), 1);
        let rule = &flat[0];
        assert!(matches!(rule.kind, RuleKind::Simple { .. }));
        assert_eq!(rule.name, "r");
        assert_eq!(rule.quantifiers.len(), 2);
        assert_eq!(rule.quantifiers[0].name, "i");
        assert_eq!(rule.quantifiers[1].name, "j");
    }

    #[test]
    fn test_flatten_preserves_rule_count() {
        let a = Rule::simple("a", None, vec![], vec![], Loc::dummy());
        let b = Rule::start_state("b", vec![], vec![], Loc::dummy());
        let set = Rule::ruleset(vec![quant("i", 0, 3)], vec![a, b], Loc::dummy());
        let flat = set.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].name, "a");
        assert_eq!(flat[1].name, "b");
        assert!(flat
            .iter()
            .all(|r| !matches!(r.kind, RuleKind::Ruleset { .. } | RuleKind::AliasRule { .. })));
    }

    #[test]
    fn test_alias_rule_prepends_aliases() {
        let alias = Decl::alias("cell", Expr::id("grid", Loc::dummy()), Loc::dummy());
        let inner = Rule::simple("r", None, vec![], vec![], Loc::dummy());
        let ar = Rule::alias_rule(vec![alias.clone()], vec![inner], Loc::dummy());
        let flat = ar.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].aliases.len(), 1);
        assert_eq!(flat[0].aliases[0].name, "cell");
    }

    #[test]
    fn test_flatten_is_pure() {
        let inner = Rule::simple("r", None, vec![], vec![], Loc::dummy());
        let set = Rule::ruleset(vec![quant("i", 0, 1)], vec![inner], Loc::dummy());
        let before = set.clone();
        let _ = set.flatten();
        assert_eq!(set, before);
    }

    #[test]
    fn test_rule_body_must_not_return_a_value() {
        let pool = DeclPool::new();
        let body = vec![Stmt::return_stmt(Some(num(5)), Loc::dummy())];
        let rule = Rule::simple("r", None, vec![], body, Loc::dummy());
        assert!(matches!(
            rule.validate(&pool),
            Err(Error::ReturnValueFromRule { .. })
        ));
    }
}
