//! Short-name generator for renamed variables.

use std::sync::LazyLock;

static ALPHABET: LazyLock<NameAlphabet> = LazyLock::new(NameAlphabet::build);

/// Character tables for replacement names, built once per process.
#[derive(Debug)]
pub struct NameAlphabet {
    first: Vec<char>,
    rest: Vec<char>,
}

impl NameAlphabet {
    fn build() -> Self {
        let first: Vec<char> = ('a'..='z').chain('A'..='Z').chain(['_']).collect();
        let rest: Vec<char> = ('0'..='9').chain(first.iter().copied()).collect();
        Self { first, rest }
    }

    pub fn get() -> &'static NameAlphabet {
        &ALPHABET
    }

    pub fn first_chars(&self) -> &[char] {
        &self.first
    }

    pub fn continuation_chars(&self) -> &[char] {
        &self.rest
    }

    /// Name number `index` in generation order: `a`..`z`, `A`..`Z`, `_`,
    /// `a0`, `a1`, ..., `a_`, `b0`, ... Distinct indices give distinct names.
    pub fn name(&self, index: usize) -> String {
        let (f, r) = (self.first.len(), self.rest.len());
        let mut remaining = index;
        let mut block = f;
        let mut len = 1;
        while remaining >= block {
            remaining -= block;
            block = block.saturating_mul(r);
            len += 1;
        }
        let mut suffix = Vec::with_capacity(len - 1);
        for _ in 1..len {
            suffix.push(self.rest[remaining % r]);
            remaining /= r;
        }
        let mut name = String::with_capacity(len);
        name.push(self.first[remaining]);
        name.extend(suffix.iter().rev());
        name
    }
}
