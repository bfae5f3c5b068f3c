//! Lossless token model shared by the lexer and every rewriting pass.

use serde::Serialize;
use std::fmt;

/// Classification of a token.
///
/// The set is closed for the passes: anything a pass does not special-case is
/// written back verbatim, so `Other` is always safe for bytes the lexer cannot
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Markup outside `<?php ... ?>`.
    InlineHtml,
    /// `<?php` plus one trailing whitespace character.
    OpenTag,
    /// `<?=`
    OpenTagWithEcho,
    /// `?>` plus one trailing newline.
    CloseTag,
    Whitespace,
    /// `//`, `#` and `/* */` comments.
    Comment,
    /// `/** */`
    DocComment,
    /// `$name`
    Variable,
    /// Bare identifier: function, constant, class or label name.
    Word,
    /// Reserved word other than `and` / `or`.
    Keyword,
    /// Word-form `and`.
    LogicalAnd,
    /// Word-form `or`.
    LogicalOr,
    /// `\`
    NsSeparator,
    /// `::`
    DoubleColon,
    /// `->` and `?->`
    ObjectOperator,
    /// Any other operator longer than one character.
    Operator,
    /// Single-character punctuation or operator.
    Punct,
    /// `(int)`, `(string)`, ...
    Cast,
    /// `#[`
    AttributeStart,
    Number,
    /// Complete quoted literal without interpolation.
    ConstantString,
    /// Literal text inside an interpolated double-quoted string.
    StringPart,
    /// Literal text inside a heredoc, nowdoc or backtick body.
    HeredocText,
    /// `<<<LABEL` plus its line break.
    StartHeredoc,
    /// Closing label of a heredoc/nowdoc, including its indentation.
    EndHeredoc,
    /// `${` inside an interpolated string.
    DollarOpenCurly,
    /// `{` opening a `{$...}` interpolation.
    CurlyOpen,
    /// `name` in a `${name}` interpolation.
    StringVarName,
    Other,
}

impl TokenKind {
    /// Whitespace and comments: invisible to look-behind scans.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment | Self::DocComment)
    }

    /// Operators whose surrounding whitespace can always be dropped.
    pub fn is_space_optional(self) -> bool {
        matches!(
            self,
            Self::Operator | Self::DoubleColon | Self::ObjectOperator | Self::DollarOpenCurly
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One classified slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub index: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str) -> Self {
        Self { kind, text, index: 0 }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Single-character punctuation with exactly this text.
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }
}

/// Ordered, gapless token sequence for one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    /// Build a stream, renumbering `index` to the token's position.
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = i;
        }
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token<'a>> {
        self.tokens.iter()
    }

    /// Concatenated token texts. Equals the lexer input for a lossless lexer.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(self.tokens.iter().map(|t| t.text.len()).sum());
        for token in &self.tokens {
            out.push_str(token.text);
        }
        out
    }

    /// Nearest token before `index` that is not whitespace or a comment.
    pub fn prev_significant(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
    }

    /// Nearest token after `index` that is not whitespace or a comment.
    pub fn next_significant(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens
            .get(index + 1..)
            .and_then(|rest| rest.iter().find(|t| !t.kind.is_trivia()))
    }
}

impl<'s, 'a> IntoIterator for &'s TokenStream<'a> {
    type Item = &'s Token<'a>;
    type IntoIter = std::slice::Iter<'s, Token<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
