//! Trained vocabulary: token frequencies plus the ordered merge history.

use crate::config::TrainerConfig;
use crate::constants::Token;
use crate::corpus::Corpus;
use crate::hash_table::FrequencyTable;
use crate::stats::Pair;

/// Token counts and the merges that produced them, the unit of persistence.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    tokens: FrequencyTable<Token>,
    merges: Vec<Pair>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::from_parts(FrequencyTable::new(), Vec::new())
    }

    pub fn from_parts(tokens: FrequencyTable<Token>, merges: Vec<Pair>) -> Self {
        Self { tokens, merges }
    }

    /// Raw token frequencies of a freshly segmented corpus, no merges yet.
    pub fn from_corpus(corpus: &Corpus, config: &TrainerConfig) -> Self {
        Self::from_parts(
            corpus.token_counts(config.vocab_capacity, config.load_threshold),
            Vec::new(),
        )
    }

    /// Record a merge, setting the merged token's count to `frequency`.
    pub(crate) fn record_merge(&mut self, pair: Pair, merged: Token, frequency: u64) {
        self.tokens.set(merged, frequency);
        self.merges.push(pair);
    }

    #[inline]
    pub fn count(&self, token: &str) -> Option<u64> {
        self.tokens.get(token)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    /// Number of distinct tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Merges in the order they were applied.
    #[inline]
    pub fn merges(&self) -> &[Pair] {
        &self.merges
    }

    #[inline]
    pub fn num_merges(&self) -> usize {
        self.merges.len()
    }

    #[inline]
    pub fn tokens(&self) -> &FrequencyTable<Token> {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut FrequencyTable<Token> {
        &mut self.tokens
    }

    /// `(token, count)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, u64)> + '_ {
        self.tokens.iter()
    }

    /// Entries by descending count, ties by token.
    pub fn sorted_by_count(&self) -> Vec<(&Token, u64)> {
        let mut entries: Vec<_> = self.tokens.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Same token→count set, regardless of table layout.
    pub fn same_entries(&self, other: &Vocabulary) -> bool {
        self.len() == other.len()
            && self
                .tokens
                .iter()
                .all(|(token, count)| other.count(token) == Some(count))
    }
}
