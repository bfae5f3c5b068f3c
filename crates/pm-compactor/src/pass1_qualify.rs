//! Pass 1: reference qualification and logical-operator normalization.
//!
//! Bare names the symbol oracle knows as global constants or functions get a
//! leading `\`, so the engine skips the namespace-local lookup at run time.
//! Word-form `and` / `or` become `&&` / `||`.

use pm_core::{SymbolOracle, Token, TokenKind, TokenStream};
use tracing::{debug, trace};

/// Tokens after which a bare name is never a reference to a global symbol.
const IGNORE_AFTER: &[&str] = &[
    "\\", "::", "->", "?->", "function", "const", "new", "use", "namespace", "class",
    "interface", "trait", "enum", "extends", "implements", "instanceof", "insteadof", "goto",
    "as",
];

fn follows_declaration(prev: Option<&Token<'_>>) -> bool {
    prev.is_some_and(|p| IGNORE_AFTER.iter().any(|w| p.text.eq_ignore_ascii_case(w)))
}

/// Decide whether the word at `index` should be written as `\word`.
fn should_qualify(stream: &TokenStream<'_>, index: usize, oracle: &dyn SymbolOracle) -> bool {
    let word = stream.tokens()[index].text;
    let prev = stream.prev_significant(index);
    if follows_declaration(prev) {
        return false;
    }
    let next = stream.next_significant(index);
    if next.is_some_and(|n| n.is(TokenKind::NsSeparator) || n.is(TokenKind::DoubleColon)) {
        return false;
    }
    // Named argument: `f(name: ...)`.
    if next.is_some_and(|n| n.is_punct(":"))
        && prev.is_some_and(|p| p.is_punct("(") || p.is_punct(","))
    {
        return false;
    }
    if oracle.is_constant(word) {
        return true;
    }
    oracle.is_function(word) && stream.get(index + 1).is_some_and(|n| n.is_punct("("))
}

/// Rewrite `stream`, qualifying known globals and normalizing `and` / `or`.
pub fn rewrite(stream: &TokenStream<'_>, oracle: &dyn SymbolOracle) -> String {
    let mut out = String::with_capacity(crate::source_len(stream) + 16);
    let mut qualified = 0usize;
    let mut normalized = 0usize;

    for (i, token) in stream.iter().enumerate() {
        match token.kind {
            TokenKind::Word if should_qualify(stream, i, oracle) => {
                trace!(name = token.text, "qualified");
                out.push('\\');
                out.push_str(token.text);
                qualified += 1;
            }
            TokenKind::LogicalOr => {
                out.push_str("||");
                normalized += 1;
            }
            TokenKind::LogicalAnd => {
                out.push_str("&&");
                normalized += 1;
            }
            _ => out.push_str(token.text),
        }
    }

    debug!(qualified, normalized, "code-optimize pass done");
    out
}
