//! Pass 3: comment stripping.
//!
//! Plain comments disappear. A doc comment carrying handler annotations is
//! rebuilt from those annotations alone; any other doc comment disappears.

use crate::glue::would_fuse;
use pm_core::{TokenKind, TokenStream};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Doc-comment annotations that survive stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Priority,
    NotHandler,
    SoftDepend,
    HandleCancelled,
}

impl Directive {
    pub const ALL: [Directive; 4] = [
        Directive::Priority,
        Directive::NotHandler,
        Directive::SoftDepend,
        Directive::HandleCancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::NotHandler => "notHandler",
            Self::SoftDepend => "softDepend",
            Self::HandleCancelled => "handleCancelled",
        }
    }

    /// `@priority` and `@softDepend` are meaningless without an argument.
    pub fn requires_argument(self) -> bool {
        matches!(self, Self::Priority | Self::SoftDepend)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retained annotation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub directive: Directive,
    pub argument: Option<String>,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "@{} {}", self.directive, arg),
            None => write!(f, "@{}", self.directive),
        }
    }
}

// A line starts with `*` or `/**`, then the tag; the argument is one word.
static PATTERNS: LazyLock<Vec<(Directive, Regex)>> = LazyLock::new(|| {
    Directive::ALL
        .iter()
        .map(|&d| {
            let argument = if d.requires_argument() {
                r"[\t ]+(\w+)"
            } else {
                r"\b(?:[\t ]+(\w+))?"
            };
            let pattern = format!(r"(?m)^[\t ]*(?:/\*\*|\*)[\t ]*@{}{}", d.as_str(), argument);
            (d, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Annotations in `comment`, grouped by directive in a fixed order.
pub fn extract_annotations(comment: &str) -> Vec<Annotation> {
    let mut found = Vec::new();
    for (directive, re) in PATTERNS.iter() {
        for caps in re.captures_iter(comment) {
            found.push(Annotation {
                directive: *directive,
                argument: caps.get(1).map(|m| m.as_str().to_string()),
            });
        }
    }
    found
}

/// Minimal doc comment holding exactly `annotations`.
pub fn render_annotations(annotations: &[Annotation]) -> String {
    let mut out = String::from("/**\n");
    for annotation in annotations {
        out.push_str(" * ");
        out.push_str(&annotation.to_string());
        out.push('\n');
    }
    out.push_str(" */");
    out
}

/// Rewrite `stream` without comments, keeping annotation doc comments.
pub fn rewrite(stream: &TokenStream<'_>) -> String {
    let mut out = String::with_capacity(crate::source_len(stream));
    let mut removed = 0usize;
    let mut retained = 0usize;

    for (i, token) in stream.iter().enumerate() {
        let annotations = match token.kind {
            TokenKind::Comment => Vec::new(),
            TokenKind::DocComment => extract_annotations(token.text),
            _ => {
                out.push_str(token.text);
                continue;
            }
        };
        if annotations.is_empty() {
            let next = stream.get(i + 1).map_or("", |t| t.text);
            if would_fuse(out.chars().last(), next) {
                out.push(' ');
            }
            removed += 1;
        } else {
            out.push_str(&render_annotations(&annotations));
            retained += 1;
        }
    }

    debug!(removed, retained, "remove-comment pass done");
    out
}
