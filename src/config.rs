//! Training configuration and output file naming.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_LOAD_THRESHOLD, DEFAULT_TABLE_CAPACITY, SELFIES_SYMBOL_PATTERN, SMILES_ATOM_PATTERN,
};
use crate::error::{Result, VocabError};
use crate::serialization::json_paths;

/// Molecular string notation of the corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputFormat {
    /// Atom-level SMILES
    Smiles,
    /// Bracketed SELFIES symbols
    #[default]
    Selfies,
}

impl InputFormat {
    /// Segmentation regex for this notation.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Smiles => SMILES_ATOM_PATTERN,
            Self::Selfies => SELFIES_SYMBOL_PATTERN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smiles => "smiles",
            Self::Selfies => "selfies",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = VocabError;

    /// Parses `"smiles"` or `"selfies"`, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "smiles" => Ok(Self::Smiles),
            "selfies" => Ok(Self::Selfies),
            _ => Err(VocabError::InvalidConfig(format!(
                "unknown input format {s:?} (expected \"smiles\" or \"selfies\")"
            ))),
        }
    }
}

/// Parameters of one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainerConfig {
    /// Notation used to segment corpus lines
    pub format: InputFormat,
    /// Merge budget; training may stop earlier when no pair is left
    pub num_merges: u32,
    /// Load factor at which tables double
    pub load_threshold: f32,
    /// Initial bucket count of the vocabulary table
    pub vocab_capacity: usize,
    /// Initial bucket count of each round's pair-statistics table
    pub stats_capacity: usize,
    /// Count pairs with rayon instead of a single thread
    pub parallel: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            format: InputFormat::default(),
            num_merges: 0,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            vocab_capacity: DEFAULT_TABLE_CAPACITY,
            stats_capacity: DEFAULT_TABLE_CAPACITY,
            parallel: false,
        }
    }
}

impl TrainerConfig {
    pub fn new(format: InputFormat, num_merges: u32) -> Self {
        Self {
            format,
            num_merges,
            ..Self::default()
        }
    }

    pub fn with_load_threshold(mut self, load_threshold: f32) -> Self {
        self.load_threshold = load_threshold;
        self
    }

    pub fn with_vocab_capacity(mut self, capacity: usize) -> Self {
        self.vocab_capacity = capacity;
        self
    }

    pub fn with_stats_capacity(mut self, capacity: usize) -> Self {
        self.stats_capacity = capacity;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject values the tables cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.load_threshold > 0.0 && self.load_threshold <= 1.0) {
            return Err(VocabError::InvalidConfig(format!(
                "load threshold must be in (0, 1], got {}",
                self.load_threshold
            )));
        }
        Ok(())
    }
}

/// Where a training run writes its vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<dir>/vocab_<n>.txt`
    pub text: PathBuf,
    /// `<dir>/vocab_<n>`, extended to `.json` and `_freq.json`
    pub json_base: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, num_merges: u32) -> Self {
        Self {
            text: dir.join(format!("vocab_{}.txt", num_merges)),
            json_base: dir.join(format!("vocab_{}", num_merges)),
        }
    }

    /// Every file a save writes: text, JSON index, JSON frequencies.
    pub fn files(&self) -> [PathBuf; 3] {
        let (vocab_json, freq_json) = json_paths(&self.json_base);
        [self.text.clone(), vocab_json, freq_json]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_parse() {
        assert_eq!("smiles".parse::<InputFormat>().unwrap(), InputFormat::Smiles);
        assert_eq!("SELFIES".parse::<InputFormat>().unwrap(), InputFormat::Selfies);
        assert!("inchi".parse::<InputFormat>().is_err());
        assert_eq!(InputFormat::default(), InputFormat::Selfies);
        assert_eq!(InputFormat::Smiles.to_string(), "smiles");
    }

    #[test]
    fn test_validate_threshold() {
        let config = TrainerConfig::new(InputFormat::Smiles, 10);
        assert!(config.validate().is_ok());
        assert!(config.clone().with_load_threshold(0.0).validate().is_err());
        assert!(config.clone().with_load_threshold(1.5).validate().is_err());
        assert!(config.with_load_threshold(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new(Path::new("out"), 500);
        assert_eq!(paths.text, Path::new("out").join("vocab_500.txt"));
        assert_eq!(paths.json_base, Path::new("out").join("vocab_500"));
        assert_eq!(
            paths.files(),
            [
                Path::new("out").join("vocab_500.txt"),
                Path::new("out").join("vocab_500.json"),
                Path::new("out").join("vocab_500_freq.json"),
            ]
        );
    }
}
