//! Reserved words of the grammar.

const KEYWORDS: &[&str] = &[
    "abstract", "array", "as", "break", "callable", "case", "catch", "class", "clone",
    "const", "continue", "declare", "default", "die", "do", "echo", "else", "elseif",
    "empty", "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "eval",
    "exit", "extends", "final", "finally", "fn", "for", "foreach", "function", "global",
    "goto", "if", "implements", "include", "include_once", "instanceof", "insteadof",
    "interface", "isset", "list", "match", "namespace", "new", "print", "private",
    "protected", "public", "readonly", "require", "require_once", "return", "static",
    "switch", "throw", "trait", "try", "unset", "use", "var", "while", "xor", "yield",
    "__halt_compiler", "__class__", "__dir__", "__file__", "__function__", "__line__",
    "__method__", "__namespace__", "__trait__",
];

const CAST_TYPES: &[&str] = &[
    "int", "integer", "bool", "boolean", "float", "double", "real", "string", "array",
    "object", "unset", "binary",
];

/// Case-insensitive keyword check.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

pub fn is_cast_type(word: &str) -> bool {
    CAST_TYPES.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// First byte of an identifier: letter, underscore or any non-ASCII byte.
pub fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || b >= 0x80
}

pub fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
