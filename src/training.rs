//! BPE vocabulary training loop.

use std::fs;
use std::path::Path;

use crate::config::{OutputPaths, TrainerConfig};
use crate::corpus::Corpus;
use crate::error::{Result, VocabError};
use crate::merge;
use crate::segmenter::Segmenter;
use crate::serialization::{save_json, save_text};
use crate::stats::{compute_pair_stats, select_best};
use crate::vocabulary::Vocabulary;

/// Result of one training run.
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    /// Final token counts and merge history
    pub vocabulary: Vocabulary,
    /// Molecules (non-blank lines) in the corpus
    pub molecules: usize,
    /// Merges actually applied, at most the requested budget
    pub merges_performed: u32,
    /// True when the corpus ran out of pairs before the budget was spent
    pub stopped_early: bool,
}

/// Core BPE training over an already segmented corpus.
///
/// Each round recounts every adjacent pair, merges the best one across the
/// whole corpus, and sets the merged token's count to that pair's frequency.
/// Rounds run strictly in sequence since each depends on the previous rewrite.
pub fn train_corpus(mut corpus: Corpus, config: &TrainerConfig) -> TrainingOutcome {
    let molecules = corpus.len();
    let mut vocab = Vocabulary::from_corpus(&corpus, config);
    log::info!(
        "Initial vocabulary: {} tokens from {} molecules",
        vocab.len(),
        molecules
    );

    let num_merges = config.num_merges;
    log::info!("Starting BPE training: {} merges to compute", num_merges);

    let mut merges_done = 0u32;
    let mut last_log_percent = 0u32;
    let mut stopped_early = false;

    while merges_done < num_merges {
        let stats = compute_pair_stats(&corpus, config);
        let Some((pair, frequency)) = select_best(&stats) else {
            log::info!("No adjacent pairs left after {} merges", merges_done);
            stopped_early = true;
            break;
        };
        drop(stats);

        log::debug!(
            "Merge {}/{}: best pair {} (frequency: {})",
            merges_done + 1,
            num_merges,
            pair,
            frequency
        );
        let merged = merge::commit(&mut corpus, &mut vocab, pair, frequency);
        merges_done += 1;

        // Log progress every 1%
        let current_percent = (u64::from(merges_done) * 100 / u64::from(num_merges)) as u32;
        if current_percent > last_log_percent {
            log::info!(
                "Progress: {}% ({}/{} merges) - Last merge: {} (frequency: {})",
                current_percent,
                merges_done,
                num_merges,
                merged,
                frequency
            );
            last_log_percent = current_percent;
        }
    }

    log::info!(
        "Finished training: {} merges completed, {} tokens in vocabulary",
        merges_done,
        vocab.len()
    );

    TrainingOutcome {
        vocabulary: vocab,
        molecules,
        merges_performed: merges_done,
        stopped_early,
    }
}

/// Trainer bound to one configuration and its compiled segmenter.
#[derive(Clone, Debug)]
pub struct Trainer {
    config: TrainerConfig,
    segmenter: Segmenter,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        let segmenter = Segmenter::new(config.format)?;
        Ok(Self { config, segmenter })
    }

    #[inline]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    #[inline]
    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn train(&self, corpus: Corpus) -> TrainingOutcome {
        train_corpus(corpus, &self.config)
    }

    /// Train on in-memory lines, one molecule per line.
    pub fn train_lines<I, L>(&self, lines: I) -> TrainingOutcome
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        self.train(Corpus::build(lines, &self.segmenter))
    }

    /// Train on a literal corpus string.
    pub fn train_text(&self, text: &str) -> TrainingOutcome {
        self.train(Corpus::from_text(text, &self.segmenter))
    }

    /// Train on a corpus file.
    pub fn train_file(&self, path: impl AsRef<Path>) -> Result<TrainingOutcome> {
        let path = path.as_ref();
        log::info!(
            "Training on {} with {} merges (format: {})",
            path.display(),
            self.config.num_merges,
            self.config.format
        );
        let corpus = Corpus::from_file(path, &self.segmenter)?;
        Ok(self.train(corpus))
    }

    /// Train on a corpus file and write both representations into `out_dir`.
    ///
    /// Files are named after the requested budget, not the merges performed.
    pub fn train_and_save(
        &self,
        corpus_path: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<(TrainingOutcome, OutputPaths)> {
        let outcome = self.train_file(corpus_path)?;
        let paths = self.save(&outcome.vocabulary, out_dir)?;
        Ok((outcome, paths))
    }

    /// Write `vocab` to the output locations for this configuration.
    pub fn save(&self, vocab: &Vocabulary, out_dir: impl AsRef<Path>) -> Result<OutputPaths> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir).map_err(|e| VocabError::io(out_dir, e))?;
        let paths = OutputPaths::new(out_dir, self.config.num_merges);
        save_text(vocab, &paths.text)?;
        save_json(vocab, &paths.json_base)?;
        Ok(paths)
    }
}
