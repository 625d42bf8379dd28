//! Tokenized corpus held in memory across merge rounds.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::Token;
use crate::error::{Result, VocabError};
use crate::hash_table::FrequencyTable;
use crate::merge;
use crate::segmenter::Segmenter;
use crate::stats::Pair;

/// Ordered tokens of one molecule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    #[inline]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Adjacent `(tokens[i], tokens[i + 1])` windows, overlapping.
    #[inline]
    pub fn pairs(&self) -> impl Iterator<Item = (&Token, &Token)> + '_ {
        self.tokens.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.to_string()).collect()
    }
}

impl From<Vec<Token>> for TokenSequence {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl<'a> FromIterator<&'a str> for TokenSequence {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Token::from).collect())
    }
}

/// Every retained molecule's current token sequence.
///
/// The number of sequences is fixed once built; merge rounds replace
/// sequences but never add or remove them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    sequences: Vec<TokenSequence>,
}

/// Drop one trailing line terminator (`\n`, `\r\n`, or a lone `\r`).
fn strip_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

impl Corpus {
    /// Segment every non-blank line. Blank lines contribute no sequence;
    /// a non-blank line always does, even when nothing in it matches.
    pub fn build<I, L>(lines: I, segmenter: &Segmenter) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let sequences = lines
            .into_iter()
            .filter_map(|line| {
                let line = strip_newline(line.as_ref());
                if line.is_empty() {
                    None
                } else {
                    Some(segmenter.segment(line))
                }
            })
            .collect();
        Self { sequences }
    }

    /// Read and segment one molecule per line.
    ///
    /// Lines that are not valid UTF-8 are skipped like blank lines.
    pub fn from_reader<R: BufRead>(mut reader: R, segmenter: &Segmenter) -> Result<Self> {
        let mut sequences = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let Ok(line) = std::str::from_utf8(&buf) else {
                log::debug!("Skipping line {}: not valid UTF-8", line_no);
                continue;
            };
            let trimmed = strip_newline(line);
            if !trimmed.is_empty() {
                sequences.push(segmenter.segment(trimmed));
            }
        }
        Ok(Self { sequences })
    }

    /// Read and segment a corpus file.
    pub fn from_file(path: impl AsRef<Path>, segmenter: &Segmenter) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| VocabError::io(path, e))?;
        let corpus = Self::from_reader(BufReader::new(file), segmenter).map_err(|e| match e {
            VocabError::Read(err) => VocabError::io(path, err),
            other => other,
        })?;
        log::info!(
            "Read {} molecules ({} tokens) from {}",
            corpus.len(),
            corpus.total_tokens(),
            path.display()
        );
        Ok(corpus)
    }

    /// Segment a literal string, one molecule per line.
    pub fn from_text(text: &str, segmenter: &Segmenter) -> Self {
        Self::build(text.split('\n'), segmenter)
    }

    /// Number of retained molecules.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    #[inline]
    pub fn sequences(&self) -> &[TokenSequence] {
        &self.sequences
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenSequence> {
        self.sequences.iter()
    }

    /// Total tokens across all sequences.
    pub fn total_tokens(&self) -> usize {
        self.sequences.iter().map(TokenSequence::len).sum()
    }

    /// Occurrence count of every token, the initial vocabulary.
    pub fn token_counts(&self, capacity: usize, load_threshold: f32) -> FrequencyTable<Token> {
        let mut table = FrequencyTable::with_threshold(capacity, load_threshold);
        for seq in &self.sequences {
            for token in seq.tokens() {
                table.insert_or_increment(token.clone());
            }
        }
        table
    }

    /// Replace every sequence with its rewrite under `pair`.
    pub fn replace_all(&mut self, pair: &Pair, merged: &Token) {
        for seq in &mut self.sequences {
            if seq.len() >= 2 {
                *seq = merge::apply_with(seq, pair, merged);
            }
        }
    }
}

impl From<Vec<TokenSequence>> for Corpus {
    fn from(sequences: Vec<TokenSequence>) -> Self {
        Self { sequences }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a TokenSequence;
    type IntoIter = std::slice::Iter<'a, TokenSequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputFormat;

    fn selfies() -> Segmenter {
        Segmenter::new(InputFormat::Selfies).unwrap()
    }

    #[test]
    fn test_sequence_pairs() {
        let seq: TokenSequence = ["A", "B", "C"].into_iter().collect();
        let pairs: Vec<(&str, &str)> = seq.pairs().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        assert_eq!(pairs, vec![("A", "B"), ("B", "C")]);

        let single: TokenSequence = ["A"].into_iter().collect();
        assert_eq!(single.pairs().count(), 0);
    }

    #[test]
    fn test_build_skips_blank_lines() {
        let lines = ["[C][O]\n", "\n", "", "[N]\r\n", "CCO"];
        let corpus = Corpus::build(lines, &selfies());

        // "CCO" is not blank, so it is kept as an empty sequence
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.sequences()[0].to_strings(), vec!["[C]", "[O]"]);
        assert_eq!(corpus.sequences()[1].to_strings(), vec!["[N]"]);
        assert!(corpus.sequences()[2].is_empty());
        assert_eq!(corpus.total_tokens(), 3);
    }

    #[test]
    fn test_from_reader_matches_build() {
        let text = "[C][C]\n\n[C][N]\n[O]";
        let from_reader = Corpus::from_reader(text.as_bytes(), &selfies()).unwrap();
        let from_text = Corpus::from_text(text, &selfies());
        assert_eq!(from_reader, from_text);
        assert_eq!(from_reader.len(), 3);
    }

    #[test]
    fn test_from_reader_skips_invalid_utf8_lines() {
        let bytes: &[u8] = b"[C][C]\n# caf\xe9 [O]\n[C][N]\n";
        let corpus = Corpus::from_reader(bytes, &selfies()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.sequences()[0].to_strings(), vec!["[C]", "[C]"]);
        assert_eq!(corpus.sequences()[1].to_strings(), vec!["[C]", "[N]"]);
    }

    #[test]
    fn test_crlf_blank_lines_agree_across_builders() {
        let text = "[C][O]\r\n\r\n[N]\r\n";
        let from_text = Corpus::from_text(text, &selfies());
        let from_reader = Corpus::from_reader(text.as_bytes(), &selfies()).unwrap();

        assert_eq!(from_text.len(), 2);
        assert_eq!(from_text, from_reader);
        assert_eq!(strip_newline("[C]\r"), "[C]");
    }

    #[test]
    fn test_token_counts() {
        let corpus = Corpus::from_text("[C][C][C][N]\n[C][O]", &selfies());
        let counts = corpus.token_counts(16, 0.7);
        assert_eq!(counts.get("[C]"), Some(4));
        assert_eq!(counts.get("[N]"), Some(1));
        assert_eq!(counts.get("[O]"), Some(1));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_replace_all() {
        let mut corpus = Corpus::from_text("[C][C][C][N]\n[C]\n[N][C][C]", &selfies());
        let pair = Pair::new("[C]", "[C]");
        corpus.replace_all(&pair, &pair.merged());

        assert_eq!(corpus.sequences()[0].to_strings(), vec!["[C][C]", "[C]", "[N]"]);
        assert_eq!(corpus.sequences()[1].to_strings(), vec!["[C]"]);
        assert_eq!(corpus.sequences()[2].to_strings(), vec!["[N]", "[C][C]"]);
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Corpus::from_file("/nonexistent/corpus.txt", &selfies()).unwrap_err();
        assert!(matches!(err, VocabError::Io { .. }));
    }
}
