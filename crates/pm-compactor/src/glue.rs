//! Detects when deleting the text between two tokens would merge them.

/// Two-character prefixes of operators, comments and tags.
const FUSING_PAIRS: &[&str] = &[
    "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "?-", "**", "++", "--", "+=", "-=", "*=",
    "/=", ".=", "%=", "&=", "|=", "^=", "<<", ">>", "::", "->", "=>", "..", "?>", "<?", "//",
    "/*",
];

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii()
}

/// Whether `prev` (last emitted character) directly followed by `next` would
/// lex differently than with a space between them.
pub fn would_fuse(prev: Option<char>, next: &str) -> bool {
    let (Some(a), Some(b)) = (prev, next.chars().next()) else {
        return false;
    };
    if is_word_char(a) && is_word_char(b) {
        return true;
    }
    if a == '$' && (is_word_char(b) || b == '{') {
        return true;
    }
    if (a.is_ascii_digit() && b == '.') || (a == '.' && b.is_ascii_digit()) {
        return true;
    }
    let mut pair = [0u8; 8];
    let a_len = a.encode_utf8(&mut pair).len();
    let b_len = b.encode_utf8(&mut pair[a_len..]).len();
    std::str::from_utf8(&pair[..a_len + b_len])
        .map(|p| FUSING_PAIRS.contains(&p))
        .unwrap_or(false)
}
