//! Solver logic selection: the operator symbols and numeral syntax used by
//! the SMT backend.

use modl_ast::Int;

/// The theory an SMT translation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logic {
    /// Unbounded integer arithmetic.
    Integer,
    /// Fixed-width signed bit vectors.
    BitVector { width: u32 },
}

impl Logic {
    pub fn add(&self) -> &'static str {
        match self {
            Logic::Integer => "+",
            Logic::BitVector { .. } => "bvadd",
        }
    }

    pub fn sub(&self) -> &'static str {
        match self {
            Logic::Integer => "-",
            Logic::BitVector { .. } => "bvsub",
        }
    }

    pub fn mul(&self) -> &'static str {
        match self {
            Logic::Integer => "*",
            Logic::BitVector { .. } => "bvmul",
        }
    }

    pub fn div(&self) -> &'static str {
        match self {
            Logic::Integer => "div",
            Logic::BitVector { .. } => "bvsdiv",
        }
    }

    pub fn modulo(&self) -> &'static str {
        match self {
            Logic::Integer => "mod",
            Logic::BitVector { .. } => "bvsrem",
        }
    }

    pub fn neg(&self) -> &'static str {
        match self {
            Logic::Integer => "-",
            Logic::BitVector { .. } => "bvneg",
        }
    }

    pub fn lt(&self) -> &'static str {
        match self {
            Logic::Integer => "<",
            Logic::BitVector { .. } => "bvslt",
        }
    }

    pub fn leq(&self) -> &'static str {
        match self {
            Logic::Integer => "<=",
            Logic::BitVector { .. } => "bvsle",
        }
    }

    pub fn gt(&self) -> &'static str {
        match self {
            Logic::Integer => ">",
            Logic::BitVector { .. } => "bvsgt",
        }
    }

    pub fn geq(&self) -> &'static str {
        match self {
            Logic::Integer => ">=",
            Logic::BitVector { .. } => "bvsge",
        }
    }

    /// Render a numeral. Integer numerals are decimal (negatives through
    /// unary minus, which SMT-LIB requires); bit-vector numerals use the
    /// `(_ bvN w)` form.
    pub fn numeric_literal(&self, value: &Int) -> String {
        let negative = *value < Int::zero();
        match self {
            Logic::Integer => {
                if negative {
                    format!("(- {})", -value)
                } else {
                    value.to_string()
                }
            }
            Logic::BitVector { width } => {
                if negative {
                    format!("(bvneg (_ bv{} {}))", -value, width)
                } else {
                    format!("(_ bv{} {})", value, width)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_symbols() {
        let logic = Logic::Integer;
        assert_eq!(logic.add(), "+");
        assert_eq!(logic.div(), "div");
        assert_eq!(logic.modulo(), "mod");
        assert_eq!(logic.leq(), "<=");
    }

    #[test]
    fn test_bitvector_symbols() {
        let logic = Logic::BitVector { width: 8 };
        assert_eq!(logic.add(), "bvadd");
        assert_eq!(logic.div(), "bvsdiv");
        assert_eq!(logic.lt(), "bvslt");
    }

    #[test]
    fn test_numerals() {
        assert_eq!(Logic::Integer.numeric_literal(&Int::from(42)), "42");
        assert_eq!(Logic::Integer.numeric_literal(&Int::from(-5)), "(- 5)");
        assert_eq!(
            Logic::BitVector { width: 16 }.numeric_literal(&Int::from(42)),
            "(_ bv42 16)"
        );
        assert_eq!(
            Logic::BitVector { width: 16 }.numeric_literal(&Int::from(-1)),
            "(bvneg (_ bv1 16))"
        );
    }
}
