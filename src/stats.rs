//! Adjacent pair statistics and best-pair selection.

use std::fmt;

use rayon::prelude::*;

use crate::config::TrainerConfig;
use crate::constants::Token;
use crate::corpus::{Corpus, TokenSequence};
use crate::hash_table::FrequencyTable;

/// Starting bucket count for each worker's partial table when counting in parallel
const PARTIAL_TABLE_CAPACITY: usize = 1024;

/// Two adjacent tokens, the unit of a merge.
///
/// Kept as two fields so that no token content can make two different
/// pairs collide. Ordering compares `first`, then `second`, bytewise.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub first: Token,
    pub second: Token,
}

impl Pair {
    pub fn new(first: impl Into<Token>, second: impl Into<Token>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// The token produced by merging this pair.
    pub fn merged(&self) -> Token {
        let mut merged = Token::with_capacity(self.first.len() + self.second.len());
        merged.push_str(&self.first);
        merged.push_str(&self.second);
        merged
    }

    /// Parse the text-format rendering `first second`, splitting on the first space.
    pub fn parse(s: &str) -> Option<Self> {
        s.split_once(' ').map(|(first, second)| Self::new(first, second))
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

/// Frequency of every adjacent pair in the corpus.
pub type PairStats = FrequencyTable<Pair>;

#[inline]
fn count_sequence(table: &mut PairStats, seq: &TokenSequence) {
    for (a, b) in seq.pairs() {
        table.insert_or_increment(Pair::new(a.clone(), b.clone()));
    }
}

/// Count every adjacent pair across the corpus, overlapping windows included.
///
/// Sequences shorter than two tokens contribute nothing. With
/// `config.parallel` the count is a rayon map-reduce; the sums are identical.
pub fn compute_pair_stats(corpus: &Corpus, config: &TrainerConfig) -> PairStats {
    if config.parallel {
        return compute_pair_stats_parallel(corpus, config);
    }

    let mut stats = FrequencyTable::with_threshold(config.stats_capacity, config.load_threshold);
    for seq in corpus {
        count_sequence(&mut stats, seq);
    }
    stats
}

fn compute_pair_stats_parallel(corpus: &Corpus, config: &TrainerConfig) -> PairStats {
    let threshold = config.load_threshold;
    let partial = corpus
        .sequences()
        .par_iter()
        .fold(
            || FrequencyTable::with_threshold(PARTIAL_TABLE_CAPACITY, threshold),
            |mut table, seq| {
                count_sequence(&mut table, seq);
                table
            },
        )
        .reduce(
            || FrequencyTable::with_threshold(PARTIAL_TABLE_CAPACITY, threshold),
            |mut acc, table| {
                acc.merge_from(table);
                acc
            },
        );

    let mut stats = FrequencyTable::with_threshold(config.stats_capacity, threshold);
    stats.merge_from(partial);
    stats
}

/// Pick the pair with the greatest count.
///
/// Among equal counts the bytewise-smallest `(first, second)` wins, so the
/// choice never depends on table layout. `None` when there are no pairs.
pub fn select_best(stats: &PairStats) -> Option<(Pair, u64)> {
    let mut best: Option<(&Pair, u64)> = None;
    for (pair, count) in stats.iter() {
        match best {
            Some((best_pair, best_count))
                if count < best_count || (count == best_count && pair >= best_pair) => {}
            _ => best = Some((pair, count)),
        }
    }
    best.map(|(pair, count)| (pair.clone(), count))
}
