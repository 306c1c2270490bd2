//! Shared text-emission scaffolding.

use modl_ast::BinaryOp;
use std::io;

/// Indentation-tracking wrapper over an output stream. Both C-family
/// backends embed one.
pub(crate) struct Writer<'w, W: io::Write> {
    pub out: &'w mut W,
    level: usize,
}

impl<'w, W: io::Write> Writer<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self { out, level: 0 }
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.level > 0);
        self.level = self.level.saturating_sub(1);
    }

    /// The whitespace prefix for the current nesting level.
    pub fn indentation(&self) -> String {
        "  ".repeat(self.level)
    }
}

/// The C-family spelling of a binary operator. Implication has no direct
/// spelling and is handled by the callers.
pub(crate) fn c_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Implication => unreachable!("implication is rewritten by the emitters"),
        BinaryOp::Lt => "<",
        BinaryOp::Leq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Geq => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
    }
}

/// Escape a diagnostic message for inclusion in a C string literal.
pub(crate) fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_tracks_nesting() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        assert_eq!(w.indentation(), "");
        w.indent();
        w.indent();
        assert_eq!(w.indentation(), "    ");
        w.dedent();
        assert_eq!(w.indentation(), "  ");
    }

    #[test]
    fn test_c_string_escapes() {
        assert_eq!(c_string("a \"b\" \\n"), "a \\\"b\\\" \\\\n");
    }
}
