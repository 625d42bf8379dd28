//! Byte-pair-encoding vocabulary trainer for molecular string corpora.
//!
//! Molecules in SMILES or SELFIES notation are split into atomic tokens,
//! then the most frequent adjacent pair is merged repeatedly until the
//! merge budget is spent or no pair is left. The result is a token
//! frequency table plus the ordered merge history, which can be written
//! as a plain-text file or as a pair of JSON files.
//!
//! ```no_run
//! use molvocgen::{InputFormat, Trainer, TrainerConfig};
//!
//! let trainer = Trainer::new(TrainerConfig::new(InputFormat::Smiles, 1000))?;
//! let (outcome, paths) = trainer.train_and_save("molecules.smi", "vocab")?;
//! println!("{} merges written to {}", outcome.merges_performed, paths.text.display());
//! # Ok::<(), molvocgen::VocabError>(())
//! ```

pub mod config;
pub mod constants;
pub mod corpus;
pub mod error;
pub mod hash_table;
pub mod merge;
pub mod segmenter;
pub mod serialization;
pub mod stats;
pub mod training;
pub mod vocabulary;

#[cfg(feature = "python")]
mod python;

pub use config::{InputFormat, OutputPaths, TrainerConfig};
pub use constants::{Token, SPECIAL_TOKENS};
pub use corpus::{Corpus, TokenSequence};
pub use error::{Result, VocabError};
pub use hash_table::{FrequencyTable, PolynomialState};
pub use segmenter::{segment, Segmenter};
pub use serialization::{load_json, load_text, save_json, save_text};
pub use stats::{compute_pair_stats, select_best, Pair, PairStats};
pub use training::{train_corpus, Trainer, TrainingOutcome};
pub use vocabulary::Vocabulary;
