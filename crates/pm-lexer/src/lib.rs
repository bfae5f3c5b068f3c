//! Lossless tokenizer for PHP-style source.
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts always reproduces the input, malformed or not.

pub mod keywords;
pub mod php;
pub mod traits;

pub use php::PhpLexer;
pub use traits::Tokenizer;

use pm_core::TokenStream;

/// Tokenize with the default [`PhpLexer`].
pub fn tokenize(source: &str) -> TokenStream<'_> {
    PhpLexer.tokenize(source)
}

#[cfg(test)]
mod tests;
