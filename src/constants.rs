//! Constants and type aliases for vocabulary training.

use compact_str::CompactString;

/// SMILES atom-level segmentation regex pattern
/// Matches:
/// - Bracketed atoms: [C@@H], [nH], [O-], etc.
/// - Two-char elements: Br, Cl (must come before B, C)
/// - Single-char elements: C, N, O, S, P, F, I, B
/// - Aromatic atoms: b, c, n, o, s, p
/// - Bonds: =, #, -, :, ~
/// - Stereochemistry: @, /, \
/// - Branches: (, )
/// - Disconnected: .
/// - Ring numbers: single digit or %XX
/// - Other: +, ?, >, *, $
pub const SMILES_ATOM_PATTERN: &str = r"(\[[^\]]+\]|Br?|Cl?|N|O|S|P|F|I|b|c|n|o|s|p|\(|\)|\.|=|#|-|\+|\\|/|:|~|@|\?|>|\*|\$|%[0-9]{2}|[0-9])";

/// SELFIES segmentation pattern: one bracketed symbol or the `.` separator.
pub const SELFIES_SYMBOL_PATTERN: &str = r"(\[[^\]]+\]|\.)";

/// Special tokens written at the head of the JSON vocabulary, in index order.
pub const SPECIAL_TOKENS: [&str; 5] = ["<s>", "<pad>", "</s>", "<unk>", "<mask>"];

/// Line separating the merge list from the vocabulary in the text format.
pub const VOCABULARY_MARKER: &str = "---VOCABULARY---";

/// Default bucket count for the vocabulary and pair-statistics tables
pub const DEFAULT_TABLE_CAPACITY: usize = 10_000;

/// Load factor at which a table doubles its bucket count
pub const DEFAULT_LOAD_THRESHOLD: f32 = 0.7;

/// Suffix appended to the JSON base name for the frequency companion file.
pub const FREQ_FILE_SUFFIX: &str = "_freq.json";

/// A single token: an atom, bracket group, bond symbol, or merged concatenation.
pub type Token = CompactString;
