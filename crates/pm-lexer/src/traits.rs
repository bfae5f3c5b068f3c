use pm_core::TokenStream;
use std::path::Path;

/// Trait for lexer adapters feeding the rewriting passes.
pub trait Tokenizer: Send + Sync {
    /// Split `source` into an ordered, gapless token stream.
    fn tokenize<'a>(&self, source: &'a str) -> TokenStream<'a>;

    /// Supported file extensions.
    fn supported_extensions(&self) -> Vec<String>;

    /// Check if a file should be tokenized (and therefore rewritten).
    fn can_tokenize(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let ext_with_dot = format!(".{}", ext.to_ascii_lowercase());
        self.supported_extensions().contains(&ext_with_dot)
    }
}
