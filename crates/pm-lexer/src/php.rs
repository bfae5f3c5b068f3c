//! Hand-written scanner for the PHP token grammar.

use crate::keywords::{is_cast_type, is_ident_char, is_ident_start, is_keyword};
use crate::traits::Tokenizer;
use pm_core::{Token, TokenKind, TokenStream};

/// Operators longer than one character, longest first.
const OPERATORS: &[&str] = &[
    "===", "!==", "<=>", "**=", "...", "<<=", ">>=", "??=", "?->",
    "::", "->", "=>", "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "**", "++", "--",
    "+=", "-=", "*=", "/=", ".=", "%=", "&=", "|=", "^=", "<<", ">>",
];

/// Default lexer adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpLexer;

impl Tokenizer for PhpLexer {
    fn tokenize<'a>(&self, source: &'a str) -> TokenStream<'a> {
        let tokens = Scanner::new(source).run();
        tracing::trace!(tokens = tokens.len(), bytes = source.len(), "tokenized");
        TokenStream::new(tokens)
    }

    fn supported_extensions(&self) -> Vec<String> {
        vec![".php".into()]
    }
}

/// Where an interpolated body stops.
#[derive(Debug, Clone, Copy)]
enum Body<'a> {
    /// Double-quoted or backtick string; holds the closing byte.
    Quoted(u8),
    Heredoc { label: &'a str, interpolate: bool },
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, tokens: Vec::new() }
    }

    fn run(mut self) -> Vec<Token<'a>> {
        while self.pos < self.bytes.len() {
            self.lex_inline_html();
            self.lex_code();
        }
        self.tokens
    }

    // ========== Helpers ==========

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// Push `start..pos` as a token; empty ranges are dropped.
    fn push(&mut self, kind: TokenKind, start: usize) {
        if self.pos > start {
            self.tokens.push(Token::new(kind, &self.src[start..self.pos]));
        }
    }

    fn advance_and_push(&mut self, kind: TokenKind, len: usize) {
        let start = self.pos;
        self.pos = (self.pos + len).min(self.bytes.len());
        self.push(kind, start);
    }

    fn last_significant(&self) -> Option<&Token<'a>> {
        self.tokens.iter().rev().find(|t| !t.kind.is_trivia())
    }

    fn eat_ident(&mut self) {
        while self.peek(0).is_some_and(is_ident_char) {
            self.pos += 1;
        }
    }

    fn eat_digits(&mut self) {
        while self.peek(0).is_some_and(|b| b.is_ascii_digit() || b == b'_') {
            self.pos += 1;
        }
    }

    fn eat_newline(&mut self) {
        if self.starts_with("\r\n") {
            self.pos += 2;
        } else if matches!(self.peek(0), Some(b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn at_line_start(&self) -> bool {
        self.pos > 0 && matches!(self.bytes[self.pos - 1], b'\n' | b'\r')
    }

    fn rest_as_html(&mut self) {
        let start = self.pos;
        self.pos = self.bytes.len();
        self.push(TokenKind::InlineHtml, start);
    }

    // ========== Markup ==========

    fn lex_inline_html(&mut self) {
        let start = self.pos;
        let mut from = self.pos;
        while let Some(offset) = find(&self.bytes[from..], b"<?") {
            let at = from + offset;
            if let Some(len) = self.open_tag_len(at) {
                self.pos = at;
                self.push(TokenKind::InlineHtml, start);
                let kind = if self.bytes[at + 2] == b'=' {
                    TokenKind::OpenTagWithEcho
                } else {
                    TokenKind::OpenTag
                };
                self.advance_and_push(kind, len);
                return;
            }
            from = at + 1;
        }
        self.rest_as_html();
    }

    fn open_tag_len(&self, at: usize) -> Option<usize> {
        let rest = &self.bytes[at..];
        if rest.get(2) == Some(&b'=') {
            return Some(3);
        }
        if rest.len() >= 5 && rest[2..5].eq_ignore_ascii_case(b"php") {
            return match rest.get(5) {
                None => Some(5),
                Some(b'\r') if rest.get(6) == Some(&b'\n') => Some(7),
                Some(b' ' | b'\t' | b'\n' | b'\r') => Some(6),
                _ => None,
            };
        }
        None
    }

    // ========== Code ==========

    fn lex_code(&mut self) {
        let mut halting = false;
        while self.pos < self.bytes.len() {
            if self.starts_with("?>") {
                let start = self.pos;
                self.pos += 2;
                self.eat_newline();
                self.push(TokenKind::CloseTag, start);
                if halting {
                    self.rest_as_html();
                }
                return;
            }
            self.lex_token();
            match self.tokens.last().map(|t| (t.kind, t.text)) {
                Some((TokenKind::Punct, ";")) if halting => {
                    self.rest_as_html();
                    return;
                }
                Some((TokenKind::Keyword, text)) if text.eq_ignore_ascii_case("__halt_compiler") => {
                    halting = true;
                }
                _ => {}
            }
        }
    }

    /// Lex exactly one code token at `pos`.
    fn lex_token(&mut self) {
        let start = self.pos;
        let b = self.bytes[self.pos];
        match b {
            _ if is_space(b) => {
                while self.peek(0).is_some_and(is_space) {
                    self.pos += 1;
                }
                self.push(TokenKind::Whitespace, start);
            }
            b'#' if self.peek(1) == Some(b'[') => self.advance_and_push(TokenKind::AttributeStart, 2),
            b'#' => self.lex_line_comment(),
            b'/' if self.peek(1) == Some(b'/') => self.lex_line_comment(),
            b'/' if self.peek(1) == Some(b'*') => self.lex_block_comment(),
            b'$' if self.peek(1).is_some_and(is_ident_start) => {
                self.pos += 1;
                self.eat_ident();
                self.push(TokenKind::Variable, start);
            }
            b'\'' => self.lex_single_quoted(start),
            b'"' => self.lex_double_quoted(start),
            b'`' => self.lex_backtick(),
            b'<' if self.starts_with("<<<") && self.try_heredoc() => {}
            b'(' if self.try_cast() => {}
            b'\\' => self.advance_and_push(TokenKind::NsSeparator, 1),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            _ if is_ident_start(b) => self.lex_word(),
            _ => self.lex_operator(),
        }
    }

    fn lex_line_comment(&mut self) {
        let start = self.pos;
        while let Some(b) = self.peek(0) {
            match b {
                b'\n' | b'\r' => {
                    self.eat_newline();
                    break;
                }
                b'?' if self.peek(1) == Some(b'>') => break,
                _ => self.pos += 1,
            }
        }
        self.push(TokenKind::Comment, start);
    }

    fn lex_block_comment(&mut self) {
        let start = self.pos;
        let doc = self.starts_with("/**") && self.peek(3).is_some_and(is_space);
        self.pos += 2;
        match find(&self.bytes[self.pos..], b"*/") {
            Some(offset) => self.pos += offset + 2,
            None => self.pos = self.bytes.len(),
        }
        let kind = if doc { TokenKind::DocComment } else { TokenKind::Comment };
        self.push(kind, start);
    }

    fn lex_word(&mut self) {
        let start = self.pos;
        self.eat_ident();
        let word = &self.src[start..self.pos];
        if word.eq_ignore_ascii_case("b") {
            match self.peek(0) {
                Some(b'\'') => return self.lex_single_quoted(start),
                Some(b'"') => return self.lex_double_quoted(start),
                _ => {}
            }
        }
        // Reserved words are plain names after `->`, `::` and `function`.
        let member_name = self.last_significant().is_some_and(|t| {
            matches!(t.kind, TokenKind::ObjectOperator | TokenKind::DoubleColon)
                || (t.kind == TokenKind::Keyword && t.text.eq_ignore_ascii_case("function"))
        });
        let kind = if member_name {
            TokenKind::Word
        } else if word.eq_ignore_ascii_case("and") {
            TokenKind::LogicalAnd
        } else if word.eq_ignore_ascii_case("or") {
            TokenKind::LogicalOr
        } else if is_keyword(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Word
        };
        self.push(kind, start);
    }

    fn lex_number(&mut self) {
        let start = self.pos;
        if self.peek(0) == Some(b'0') && matches!(self.peek(1), Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O')) {
            self.pos += 2;
            while self.peek(0).is_some_and(|b| b.is_ascii_hexdigit() || b == b'_') {
                self.pos += 1;
            }
        } else {
            self.eat_digits();
            if self.peek(0) == Some(b'.') && self.peek(1) != Some(b'.') {
                self.pos += 1;
                self.eat_digits();
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
                if self.peek(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1 + sign;
                    self.eat_digits();
                }
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn lex_operator(&mut self) {
        if let Some(op) = OPERATORS.iter().find(|op| self.starts_with(op)) {
            let kind = match *op {
                "::" => TokenKind::DoubleColon,
                "->" | "?->" => TokenKind::ObjectOperator,
                _ => TokenKind::Operator,
            };
            self.advance_and_push(kind, op.len());
            return;
        }
        let kind = if self.bytes[self.pos].is_ascii_punctuation() {
            TokenKind::Punct
        } else {
            TokenKind::Other
        };
        self.advance_and_push(kind, 1);
    }

    fn try_cast(&mut self) -> bool {
        let start = self.pos;
        let mut i = self.pos + 1;
        while matches!(self.bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let word_start = i;
        while self.bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic()) {
            i += 1;
        }
        let word = &self.src[word_start..i];
        while matches!(self.bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        if self.bytes.get(i) == Some(&b')') && is_cast_type(word) {
            self.pos = i + 1;
            self.push(TokenKind::Cast, start);
            return true;
        }
        false
    }

    // ========== Strings ==========

    /// `start` may precede `pos` by a `b` prefix.
    fn lex_single_quoted(&mut self, start: usize) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                b'\'' => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.push(TokenKind::ConstantString, start);
    }

    /// A string without interpolation collapses into one `ConstantString`.
    fn lex_double_quoted(&mut self, start: usize) {
        let mark = self.tokens.len();
        self.pos += 1;
        self.push(TokenKind::Punct, start);
        let closed = self.lex_body(Body::Quoted(b'"'));
        let plain = self.tokens[mark + 1..].iter().all(|t| t.kind == TokenKind::StringPart);
        if plain {
            if closed {
                self.pos += 1;
            }
            self.tokens.truncate(mark);
            self.push(TokenKind::ConstantString, start);
        } else if closed {
            self.advance_and_push(TokenKind::Punct, 1);
        }
    }

    fn lex_backtick(&mut self) {
        self.advance_and_push(TokenKind::Punct, 1);
        if self.lex_body(Body::Quoted(b'`')) {
            self.advance_and_push(TokenKind::Punct, 1);
        }
    }

    fn try_heredoc(&mut self) -> bool {
        let start = self.pos;
        let mut i = self.pos + 3;
        while matches!(self.bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let quote = match self.bytes.get(i) {
            Some(&q @ (b'\'' | b'"')) => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        let label_start = i;
        if !self.bytes.get(i).is_some_and(|b| is_ident_start(*b)) {
            return false;
        }
        while self.bytes.get(i).is_some_and(|b| is_ident_char(*b)) {
            i += 1;
        }
        let label_end = i;
        if let Some(q) = quote {
            if self.bytes.get(i) != Some(&q) {
                return false;
            }
            i += 1;
        }
        match (self.bytes.get(i), self.bytes.get(i + 1)) {
            (Some(b'\r'), Some(b'\n')) => i += 2,
            (Some(b'\n' | b'\r'), _) => i += 1,
            _ => return false,
        }
        let label = &self.src[label_start..label_end];
        self.pos = i;
        self.push(TokenKind::StartHeredoc, start);
        let interpolate = quote != Some(b'\'');
        if !self.lex_body(Body::Heredoc { label, interpolate }) {
            tracing::debug!(label, "heredoc runs to end of input");
        }
        true
    }

    /// End of the closing label if one starts at `pos`.
    fn closing_label_end(&self, label: &str) -> Option<usize> {
        let mut i = self.pos;
        while matches!(self.bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let end = i + label.len();
        let found = self.bytes[i..].starts_with(label.as_bytes())
            && !self.bytes.get(end).is_some_and(|b| is_ident_char(*b));
        found.then_some(end)
    }

    /// Lex string or heredoc content up to its terminator. Returns whether the
    /// terminator was found; a quoted terminator is left unconsumed, a heredoc
    /// label is pushed as `EndHeredoc`.
    fn lex_body(&mut self, body: Body<'a>) -> bool {
        let text_kind = match body {
            Body::Quoted(b'"') => TokenKind::StringPart,
            _ => TokenKind::HeredocText,
        };
        let interpolate = match body {
            Body::Heredoc { interpolate, .. } => interpolate,
            Body::Quoted(_) => true,
        };
        let mut text_start = self.pos;
        while self.pos < self.bytes.len() {
            if let Body::Heredoc { label, .. } = body {
                if self.at_line_start() {
                    if let Some(end) = self.closing_label_end(label) {
                        self.push(text_kind, text_start);
                        let label_start = self.pos;
                        self.pos = end;
                        self.push(TokenKind::EndHeredoc, label_start);
                        return true;
                    }
                }
            }
            let b = self.bytes[self.pos];
            if matches!(body, Body::Quoted(q) if q == b) {
                self.push(text_kind, text_start);
                return true;
            }
            if !interpolate {
                self.pos += 1;
                continue;
            }
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                b'$' if self.peek(1).is_some_and(is_ident_start) => {
                    self.push(text_kind, text_start);
                    self.lex_simple_interpolation(text_kind);
                    text_start = self.pos;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.push(text_kind, text_start);
                    self.advance_and_push(TokenKind::DollarOpenCurly, 2);
                    let name_start = self.pos;
                    self.eat_ident();
                    if self.pos > name_start && matches!(self.peek(0), Some(b'}' | b'[')) {
                        self.push(TokenKind::StringVarName, name_start);
                    } else {
                        self.pos = name_start;
                    }
                    self.lex_nested_code();
                    text_start = self.pos;
                }
                b'{' if self.peek(1) == Some(b'$') => {
                    self.push(text_kind, text_start);
                    self.advance_and_push(TokenKind::CurlyOpen, 1);
                    self.lex_nested_code();
                    text_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        self.push(text_kind, text_start);
        false
    }

    /// `$name`, `$name[key]` or `$name->prop` inside a string.
    fn lex_simple_interpolation(&mut self, text_kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.eat_ident();
        self.push(TokenKind::Variable, start);

        if self.peek(0) == Some(b'[') {
            let (saved_pos, saved_len) = (self.pos, self.tokens.len());
            self.advance_and_push(TokenKind::Punct, 1);
            let key_start = self.pos;
            match self.peek(0) {
                Some(b'$') if self.peek(1).is_some_and(is_ident_start) => {
                    self.pos += 1;
                    self.eat_ident();
                    self.push(TokenKind::Variable, key_start);
                }
                Some(b) if is_ident_start(b) => {
                    self.eat_ident();
                    self.push(text_kind, key_start);
                }
                Some(b'-' | b'0'..=b'9') => {
                    if self.peek(0) == Some(b'-') {
                        self.pos += 1;
                    }
                    let digits = self.pos;
                    self.eat_digits();
                    if self.pos > digits {
                        self.push(TokenKind::Number, key_start);
                    } else {
                        self.pos = key_start;
                    }
                }
                _ => {}
            }
            if self.pos > key_start && self.peek(0) == Some(b']') {
                self.advance_and_push(TokenKind::Punct, 1);
            } else {
                self.pos = saved_pos;
                self.tokens.truncate(saved_len);
            }
        } else {
            let arrow = if self.starts_with("->") {
                2
            } else if self.starts_with("?->") {
                3
            } else {
                0
            };
            if arrow > 0 && self.peek(arrow).is_some_and(is_ident_start) {
                self.advance_and_push(TokenKind::ObjectOperator, arrow);
                let name_start = self.pos;
                self.eat_ident();
                self.push(TokenKind::Word, name_start);
            }
        }
    }

    /// Code inside `{$ ... }` or `${ ... }`, through the matching `}`.
    fn lex_nested_code(&mut self) {
        let mut depth = 1usize;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'}' {
                depth -= 1;
                self.advance_and_push(TokenKind::Punct, 1);
                if depth == 0 {
                    return;
                }
                continue;
            }
            self.lex_token();
            if self.tokens.last().is_some_and(|t| t.is_punct("{")) {
                depth += 1;
            }
        }
    }
}
