//! Pass 2: variable renaming.
//!
//! Every local variable name gets the next short name from [`NameAlphabet`].
//! The mapping is per file, not per scope: one original name maps to one
//! replacement everywhere in the file.

use crate::alphabet::NameAlphabet;
use pm_core::{Token, TokenKind, TokenStream};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Keywords after which a variable names a property (or a function static), not a local.
/// `::` is handled by token kind.
const MODIFIERS: &[&str] = &[
    "protected", "private", "public", "static", "final", "var", "readonly", "abstract",
];

const SELF_REFERENCE: &str = "$this";

const SUPERGLOBALS: &[&str] = &[
    "$GLOBALS", "$_SERVER", "$_GET", "$_POST", "$_FILES", "$_COOKIE", "$_SESSION",
    "$_REQUEST", "$_ENV", "$http_response_header", "$argc", "$argv",
];

/// Original variable name to replacement, plus the names generation must avoid.
#[derive(Debug, Clone)]
pub struct RenameTable {
    names: HashMap<String, String>,
    reserved: HashSet<String>,
    order: Vec<String>,
    next: usize,
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameTable {
    /// A table seeded with `$this` and the superglobals, all mapped to themselves.
    pub fn new() -> Self {
        let mut table = Self {
            names: HashMap::new(),
            reserved: HashSet::new(),
            order: Vec::new(),
            next: 0,
        };
        table.pin(SELF_REFERENCE);
        for name in SUPERGLOBALS {
            table.pin(name);
        }
        table
    }

    /// Keep `name` unchanged and never hand it out as a replacement.
    pub fn pin(&mut self, name: &str) {
        self.names.insert(name.to_string(), name.to_string());
        self.reserved.insert(name.trim_start_matches('$').to_string());
    }

    pub fn is_pinned(&self, name: &str) -> bool {
        self.names.contains_key(name) && self.reserved.contains(name.trim_start_matches('$'))
    }

    /// Replacement for `original`, assigning the next free name on first sight.
    pub fn rename(&mut self, original: &str) -> &str {
        if !self.names.contains_key(original) {
            let replacement = self.next_name();
            self.names.insert(original.to_string(), replacement);
            self.order.push(original.to_string());
        }
        &self.names[original]
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.names.get(original).map(String::as_str)
    }

    fn next_name(&mut self) -> String {
        let alphabet = NameAlphabet::get();
        loop {
            let candidate = alphabet.name(self.next);
            self.next += 1;
            if !self.reserved.contains(&candidate) {
                return format!("${candidate}");
            }
        }
    }

    /// Number of renamed (not pinned) names.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Renamed names in first-seen order.
    pub fn renamed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|o| (o.as_str(), self.names[o].as_str()))
    }

    /// Renamed names only, without the pinned identities.
    pub fn into_map(self) -> HashMap<String, String> {
        let mut names = self.names;
        self.order
            .into_iter()
            .filter_map(|o| names.remove_entry(&o))
            .collect()
    }
}

/// What happened to one variable occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occurrence {
    Rename,
    /// Left alone here only: property declarations and static accesses.
    Keep,
    /// Left alone everywhere in the file.
    Pin,
}

fn is_modifier(token: &Token<'_>) -> bool {
    MODIFIERS.iter().any(|m| token.text.eq_ignore_ascii_case(m))
}

fn is_type_part(token: &Token<'_>) -> bool {
    match token.kind {
        TokenKind::Word | TokenKind::NsSeparator => true,
        TokenKind::Keyword => {
            token.text.eq_ignore_ascii_case("array") || token.text.eq_ignore_ascii_case("callable")
        }
        TokenKind::Punct => matches!(token.text, "?" | "|" | "&"),
        _ => false,
    }
}

/// Index of the nearest significant token before `index`.
fn prev_index(stream: &TokenStream<'_>, index: usize) -> Option<usize> {
    stream.prev_significant(index).map(|t| t.index)
}

/// First significant token of the statement holding `index`, or `None` when
/// `index` sits inside an unclosed bracket. Leading attributes are skipped.
fn statement_head<'s, 'a>(stream: &'s TokenStream<'a>, index: usize) -> Option<&'s Token<'a>> {
    let tokens = stream.tokens();
    let mut depth = 0usize;
    let mut outer_close = None;
    let mut j = index;
    while j > 0 {
        j -= 1;
        let t = &tokens[j];
        match (t.kind, t.text) {
            (TokenKind::Punct, ")" | "]") => {
                if depth == 0 {
                    outer_close = Some(j);
                }
                depth += 1;
            }
            (TokenKind::AttributeStart, _) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(close) = outer_close {
                        return stream.next_significant(close);
                    }
                }
            }
            (TokenKind::Punct, "(" | "[") => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            (TokenKind::Punct, ";" | "{" | "}") | (TokenKind::OpenTag | TokenKind::CloseTag, _)
                if depth == 0 =>
            {
                return stream.next_significant(j);
            }
            _ => {}
        }
    }
    tokens.iter().find(|t| !t.kind.is_trivia())
}

/// Classify a run of modifiers ending at `last` (inclusive).
fn classify_modifiers(stream: &TokenStream<'_>, last: usize) -> Occurrence {
    let tokens = stream.tokens();
    let mut first = last;
    while let Some(p) = prev_index(stream, first) {
        if !is_modifier(&tokens[p]) {
            break;
        }
        first = p;
    }
    let before = prev_index(stream, first).map(|p| &tokens[p]);
    // Promoted constructor parameter: also a plain local in the body.
    if before.is_some_and(|b| b.is_punct("(") || b.is_punct(",")) {
        return Occurrence::Pin;
    }
    let only_static = (first..=last)
        .filter(|&k| !tokens[k].kind.is_trivia())
        .all(|k| tokens[k].text.eq_ignore_ascii_case("static"));
    if only_static {
        Occurrence::Pin
    } else {
        Occurrence::Keep
    }
}

fn classify(stream: &TokenStream<'_>, index: usize) -> Occurrence {
    let tokens = stream.tokens();
    let Some(prev) = prev_index(stream, index) else {
        return Occurrence::Rename;
    };
    let p = &tokens[prev];

    if p.is(TokenKind::DoubleColon) {
        return Occurrence::Keep;
    }
    if is_modifier(p) {
        return classify_modifiers(stream, prev);
    }
    if p.text.eq_ignore_ascii_case("global") {
        return Occurrence::Pin;
    }
    if is_type_part(p) {
        let mut start = prev;
        while let Some(q) = prev_index(stream, start) {
            if !is_type_part(&tokens[q]) {
                break;
            }
            start = q;
        }
        if let Some(q) = prev_index(stream, start) {
            if is_modifier(&tokens[q]) {
                return classify_modifiers(stream, q);
            }
        }
        return Occurrence::Rename;
    }
    if p.is_punct(",") {
        if let Some(head) = statement_head(stream, index) {
            if head.text.eq_ignore_ascii_case("global") {
                return Occurrence::Pin;
            }
            if head.text.eq_ignore_ascii_case("static") {
                let after = stream.next_significant(head.index);
                let is_declaration = after.is_some_and(|a| a.is(TokenKind::Variable));
                if is_declaration {
                    return Occurrence::Pin;
                }
            } else if is_modifier(head) {
                return Occurrence::Keep;
            }
        }
    }
    Occurrence::Rename
}

/// Result of the renaming pass.
#[derive(Debug, Clone, Default)]
pub struct RenameOutcome {
    pub output: String,
    pub table: RenameTable,
    /// Renamed names that occur in more than one function body.
    pub reused_across_functions: Vec<String>,
}

/// Rewrite `stream` with every renamable variable shortened.
pub fn rewrite(stream: &TokenStream<'_>) -> RenameOutcome {
    let occurrences: Vec<Occurrence> = stream
        .iter()
        .map(|t| match t.kind {
            TokenKind::Variable => classify(stream, t.index),
            _ => Occurrence::Rename,
        })
        .collect();

    let mut table = RenameTable::new();
    for (token, occurrence) in stream.iter().zip(&occurrences) {
        if token.is(TokenKind::Variable) && *occurrence == Occurrence::Pin {
            table.pin(token.text);
        }
    }

    let mut out = String::with_capacity(crate::source_len(stream));
    let mut function = 0usize;
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut reused: Vec<String> = Vec::new();

    for (token, occurrence) in stream.iter().zip(&occurrences) {
        match token.kind {
            TokenKind::Keyword
                if token.text.eq_ignore_ascii_case("function")
                    || token.text.eq_ignore_ascii_case("fn") =>
            {
                function += 1;
                out.push_str(token.text);
            }
            TokenKind::Variable if *occurrence == Occurrence::Rename => {
                out.push_str(table.rename(token.text));
                if !table.is_pinned(token.text) {
                    track_reuse(token.text, function, &mut first_seen, &mut reused);
                }
            }
            TokenKind::StringVarName => {
                let key = format!("${}", token.text);
                let replacement = table.rename(&key);
                out.push_str(&replacement[1..]);
                if !table.is_pinned(&key) {
                    track_reuse(&key, function, &mut first_seen, &mut reused);
                }
            }
            _ => out.push_str(token.text),
        }
    }

    for name in &reused {
        debug!(
            name = %name,
            replacement = table.get(name).unwrap_or(""),
            "name shared across function bodies"
        );
    }
    debug!(renamed = table.len(), "rename-variable pass done");

    RenameOutcome {
        output: out,
        table,
        reused_across_functions: reused,
    }
}

fn track_reuse(
    name: &str,
    function: usize,
    first_seen: &mut HashMap<String, usize>,
    reused: &mut Vec<String>,
) {
    match first_seen.get(name) {
        None => {
            first_seen.insert(name.to_string(), function);
        }
        Some(&f) if f != function && !reused.iter().any(|r| r == name) => {
            reused.push(name.to_string());
        }
        Some(_) => {}
    }
}
