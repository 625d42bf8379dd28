//! Applying a selected pair to token sequences and recording the merge.

use crate::constants::Token;
use crate::corpus::{Corpus, TokenSequence};
use crate::stats::Pair;
use crate::vocabulary::Vocabulary;

/// Rewrite `sequence`, replacing non-overlapping occurrences of `pair`.
pub fn apply(sequence: &TokenSequence, pair: &Pair) -> TokenSequence {
    apply_with(sequence, pair, &pair.merged())
}

/// [`apply`] with the merged token already built.
///
/// Single left-to-right pass: a match emits `merged` and skips both
/// tokens, anything else is copied. Emitted tokens are never re-examined.
pub fn apply_with(sequence: &TokenSequence, pair: &Pair, merged: &Token) -> TokenSequence {
    let tokens = sequence.tokens();
    let n = tokens.len();
    let mut out: Vec<Token> = Vec::with_capacity(n);

    let mut i = 0;
    while i < n {
        if i + 1 < n && tokens[i] == pair.first && tokens[i + 1] == pair.second {
            out.push(merged.clone());
            i += 2; // skip both halves
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }

    TokenSequence::new(out)
}

/// Apply one round's winning pair to the corpus and the vocabulary.
///
/// The merged token's count is set to `frequency`, the pair's count in this
/// round's statistics, replacing whatever count the token held before.
/// Returns the merged token.
pub fn commit(corpus: &mut Corpus, vocab: &mut Vocabulary, pair: Pair, frequency: u64) -> Token {
    let merged = pair.merged();
    corpus.replace_all(&pair, &merged);
    vocab.record_merge(pair, merged.clone(), frequency);
    merged
}
