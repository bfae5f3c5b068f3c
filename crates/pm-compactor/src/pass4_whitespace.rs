//! Pass 4: whitespace compaction.
//!
//! Whitespace runs collapse to one space or vanish, depending on the tokens
//! around them. Heredoc labels shrink to a short placeholder, and line breaks
//! inside double-quoted literals become escape sequences.

use crate::glue::would_fuse;
use pm_core::{Token, TokenKind, TokenStream};
use tracing::{debug, warn};

/// Escape raw newlines, carriage returns and tabs as `\n`, `\r`, `\t`.
///
/// When the character follows an odd run of backslashes, the last backslash
/// was literal; it is doubled so it stays literal in the escaped form.
pub fn escape_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut backslashes = 0usize;
    for c in text.chars() {
        let escaped = match c {
            '\n' => Some('n'),
            '\r' => Some('r'),
            '\t' => Some('t'),
            _ => None,
        };
        match escaped {
            Some(e) => {
                if backslashes % 2 == 1 {
                    out.push('\\');
                }
                out.push('\\');
                out.push(e);
                backslashes = 0;
            }
            None => {
                out.push(c);
                backslashes = if c == '\\' { backslashes + 1 } else { 0 };
            }
        }
    }
    out
}

fn is_double_quoted(text: &str) -> bool {
    text.trim_start_matches(['b', 'B']).starts_with('"')
}

/// Whether a body line (after indentation) begins with `label` as a whole word.
fn line_starts_with_label(line: &str, label: &str) -> bool {
    line.trim_start_matches([' ', '\t'])
        .strip_prefix(label)
        .is_some_and(|rest| {
            !rest
                .chars()
                .next()
                .is_some_and(|c| c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii())
        })
}

/// Shortest placeholder label that no body line starts with.
pub fn choose_placeholder(body: &str) -> String {
    let clashes = |label: &str| body.split(['\n', '\r']).any(|l| line_starts_with_label(l, label));
    if !clashes("S") {
        return "S".to_string();
    }
    (0usize..)
        .map(|n| format!("S{n}"))
        .find(|label| !clashes(label))
        .unwrap_or_else(|| "S".to_string())
}

/// Body text and end index of the heredoc opened at `start`.
fn heredoc_body(tokens: &[Token<'_>], start: usize) -> Option<(String, usize)> {
    let mut depth = 0usize;
    let mut body = String::new();
    for (j, t) in tokens.iter().enumerate().skip(start + 1) {
        match t.kind {
            TokenKind::StartHeredoc => depth += 1,
            TokenKind::EndHeredoc if depth == 0 => return Some((body, j)),
            TokenKind::EndHeredoc => depth -= 1,
            _ => {}
        }
        body.push_str(t.text);
    }
    None
}

struct Compactor<'s, 'a> {
    tokens: &'s [Token<'a>],
    out: String,
    suppress: bool,
    echo_region: bool,
    last_terminator: Option<&'a str>,
    paren_depth: usize,
    labels: Vec<(usize, String)>,
}

impl<'s, 'a> Compactor<'s, 'a> {
    fn new(tokens: &'s [Token<'a>], capacity: usize) -> Self {
        Self {
            tokens,
            out: String::with_capacity(capacity),
            suppress: false,
            echo_region: false,
            last_terminator: None,
            paren_depth: 0,
            labels: Vec::new(),
        }
    }

    fn run(mut self) -> String {
        let mut i = 0;
        while i < self.tokens.len() {
            i = self.step(i) + 1;
        }
        self.out
    }

    /// Emit token `i`; returns the index of the last token consumed.
    fn step(&mut self, i: usize) -> usize {
        let token = self.tokens[i];
        if !matches!(token.kind, TokenKind::Whitespace | TokenKind::Punct) {
            self.last_terminator = None;
        }
        match token.kind {
            TokenKind::Whitespace => self.whitespace(i),
            kind if kind.is_space_optional() => {
                self.out.push_str(token.text);
                self.suppress = true;
            }
            TokenKind::InlineHtml => {
                self.out.push_str(token.text);
                self.suppress = false;
            }
            TokenKind::OpenTag => {
                self.out
                    .push_str(token.text.trim_end_matches([' ', '\t', '\r', '\n']));
                self.out.push(' ');
                self.echo_region = false;
                self.suppress = true;
            }
            TokenKind::OpenTagWithEcho => {
                self.out.push_str(token.text);
                self.echo_region = true;
                self.suppress = true;
            }
            TokenKind::CloseTag => {
                if self.echo_region {
                    let kept = self.out.trim_end_matches([';', ' ']).len();
                    self.out.truncate(kept);
                } else if !self.out.ends_with(char::is_whitespace) {
                    self.out.push(' ');
                }
                self.out.push_str(token.text);
                self.echo_region = false;
                self.suppress = false;
            }
            TokenKind::ConstantString | TokenKind::StringPart => {
                if token.kind == TokenKind::StringPart || is_double_quoted(token.text) {
                    self.out.push_str(&escape_line_breaks(token.text));
                } else {
                    self.out.push_str(token.text);
                }
                self.suppress = true;
            }
            TokenKind::HeredocText => {
                self.out.push_str(token.text);
                self.suppress = true;
            }
            TokenKind::StartHeredoc => self.start_heredoc(i),
            TokenKind::EndHeredoc => return self.end_heredoc(i),
            TokenKind::Punct => self.punct(token),
            _ => {
                self.out.push_str(token.text);
                self.suppress = false;
            }
        }
        i
    }

    fn whitespace(&mut self, i: usize) {
        let Some(next) = self.tokens.get(i + 1) else {
            return;
        };
        let wanted = !self.suppress
            && (next.kind != TokenKind::Punct || next.text == "$")
            && !next.kind.is_space_optional();
        if wanted || would_fuse(self.out.chars().last(), next.text) {
            self.out.push(' ');
        }
        self.suppress = false;
    }

    fn punct(&mut self, token: Token<'a>) {
        match token.text {
            "(" => self.paren_depth += 1,
            ")" => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }
        let terminator = matches!(token.text, ";" | ":");
        let repeated = terminator && self.paren_depth == 0 && self.last_terminator == Some(token.text);
        if !repeated {
            self.out.push_str(token.text);
        }
        self.last_terminator = terminator.then_some(token.text);
        self.suppress = true;
    }

    fn start_heredoc(&mut self, i: usize) {
        let token = self.tokens[i];
        let Some((body, end)) = heredoc_body(self.tokens, i) else {
            warn!("unterminated heredoc, leaving the rest of the source unchanged");
            self.out.push_str(token.text);
            self.suppress = true;
            return;
        };
        let label = choose_placeholder(&body);
        self.out.push_str("<<<");
        if token.text.contains('\'') {
            self.out.push('\'');
            self.out.push_str(&label);
            self.out.push('\'');
        } else {
            self.out.push_str(&label);
        }
        self.out.push('\n');
        self.labels.push((end, label));
        self.suppress = true;
    }

    fn end_heredoc(&mut self, i: usize) -> usize {
        let token = self.tokens[i];
        let closes_current = self.labels.last().is_some_and(|(end, _)| *end == i);
        let label = if closes_current {
            self.labels.pop().map(|(_, l)| l)
        } else {
            None
        };
        let Some(label) = label else {
            self.out.push_str(token.text);
            self.suppress = false;
            return i;
        };
        let indent_len = token.text.len() - token.text.trim_start_matches([' ', '\t']).len();
        self.out.push_str(&token.text[..indent_len]);
        self.out.push_str(&label);
        self.suppress = true;

        let mut j = i + 1;
        while self.tokens.get(j).is_some_and(|t| t.kind == TokenKind::Whitespace) {
            j += 1;
        }
        match self.tokens.get(j) {
            Some(t) if t.is_punct(";") => {
                self.out.push(';');
                self.last_terminator = Some(t.text);
                j
            }
            Some(t) if t.kind == TokenKind::CloseTag => {
                self.out.push(';');
                i
            }
            None => {
                self.out.push(';');
                i
            }
            Some(_) => {
                self.out.push('\n');
                i
            }
        }
    }
}

/// Rewrite `stream` with insignificant whitespace removed.
pub fn rewrite(stream: &TokenStream<'_>) -> String {
    let original = crate::source_len(stream);
    let out = Compactor::new(stream.tokens(), original).run();
    debug!(before = original, after = out.len(), "remove-whitespace pass done");
    out
}
