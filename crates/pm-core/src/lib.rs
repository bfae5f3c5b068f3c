//! Shared model for the phpmin source minifier: tokens, transform options,
//! the global-symbol oracle and the error type.

pub mod config;
pub mod error;
pub mod symbols;
pub mod token;

pub use config::TransformOptions;
pub use error::{MinifyError, Result};
pub use symbols::{NoSymbols, SymbolOracle, SymbolTable};
pub use token::{Token, TokenKind, TokenStream};
