// SPDX-License-Identifier: PMPL-1.0-or-later
//! Query tokenization.
//!
//! PPL input is split on single spaces. Consecutive spaces yield empty tokens,
//! which are ordinary empty-prefix positions rather than errors. The last token
//! is always the prefix the user is still typing.

/// A tokenized query, borrowing from the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'q> {
    query: &'q str,
    tokens: Vec<&'q str>,
}

/// Split `query` into space-delimited tokens.
pub fn tokenize(query: &str) -> Tokens<'_> {
    Tokens {
        query,
        tokens: query.split(' ').collect(),
    }
}

impl<'q> Tokens<'q> {
    /// The full query this token sequence was produced from.
    pub fn query(&self) -> &'q str {
        self.query
    }

    /// Number of tokens, counting the trailing prefix.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: splitting never produces zero tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The token being completed.
    pub fn prefix(&self) -> &'q str {
        self.tokens.last().copied().unwrap_or("")
    }

    /// The last completed token (`tokens[len-2]`).
    pub fn previous(&self) -> Option<&'q str> {
        self.back(1)
    }

    /// The token `n` positions before the prefix; `back(0)` is the prefix.
    pub fn back(&self, n: usize) -> Option<&'q str> {
        let len = self.tokens.len();
        if n < len {
            Some(self.tokens[len - 1 - n])
        } else {
            None
        }
    }

    /// Token at an absolute position.
    pub fn get(&self, position: usize) -> Option<&'q str> {
        self.tokens.get(position).copied()
    }

    /// The query with the prefix removed, i.e. everything a completion keeps.
    pub fn head(&self) -> &'q str {
        &self.query[..self.query.len() - self.prefix().len()]
    }

    /// The head with the single separating space dropped, for completions
    /// that attach to the previous token (`fields a,` or `sum(bytes)`).
    pub fn glued_head(&self) -> &'q str {
        let head = self.head();
        head.strip_suffix(' ').unwrap_or(head)
    }

    /// Iterate over all tokens.
    pub fn iter(&self) -> impl Iterator<Item = &'q str> + '_ {
        self.tokens.iter().copied()
    }
}
