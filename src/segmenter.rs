//! Splitting raw molecule strings into atomic tokens.

use fancy_regex::Regex;

use crate::config::InputFormat;
use crate::constants::Token;
use crate::corpus::TokenSequence;
use crate::error::Result;

/// Compiled segmentation pattern for one [`InputFormat`].
///
/// Scanning repeatedly takes the leftmost match and resumes after it.
/// Characters no alternative matches are dropped without error, so a
/// SMILES string segmented as SELFIES yields an empty sequence.
#[derive(Clone, Debug)]
pub struct Segmenter {
    format: InputFormat,
    pattern: Regex,
}

impl Segmenter {
    pub fn new(format: InputFormat) -> Result<Self> {
        Ok(Self {
            format,
            pattern: Regex::new(format.pattern())?,
        })
    }

    #[inline]
    pub fn format(&self) -> InputFormat {
        self.format
    }

    /// Segment one molecule string into its tokens.
    ///
    /// # Example outputs
    /// - SMILES `"CCO"` gives `["C", "C", "O"]`
    /// - SMILES `"[C@@H](O)C"` gives `["[C@@H]", "(", "O", ")", "C"]`
    /// - SELFIES `"[C][=O].[Na+]"` gives `["[C]", "[=O]", ".", "[Na+]"]`
    pub fn segment(&self, raw: &str) -> TokenSequence {
        let mut tokens = Vec::new();
        for m in self.pattern.find_iter(raw).flatten() {
            tokens.push(Token::from(m.as_str()));
        }
        TokenSequence::new(tokens)
    }
}

/// Segment a single string, compiling the pattern for this call only.
pub fn segment(raw: &str, format: InputFormat) -> Result<TokenSequence> {
    Ok(Segmenter::new(format)?.segment(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smiles(raw: &str) -> Vec<String> {
        let segmenter = Segmenter::new(InputFormat::Smiles).unwrap();
        segmenter.segment(raw).to_strings()
    }

    fn selfies(raw: &str) -> Vec<String> {
        let segmenter = Segmenter::new(InputFormat::Selfies).unwrap();
        segmenter.segment(raw).to_strings()
    }

    #[test]
    fn test_smiles_simple() {
        assert_eq!(smiles("CCO"), vec!["C", "C", "O"]);
    }

    #[test]
    fn test_smiles_halogen() {
        assert_eq!(smiles("CBr"), vec!["C", "Br"]);
        assert_eq!(smiles("CCl"), vec!["C", "Cl"]);
        // second letter does not complete a halogen
        assert_eq!(smiles("Bc"), vec!["B", "c"]);
        assert_eq!(smiles("CN"), vec!["C", "N"]);
    }

    #[test]
    fn test_smiles_bracket() {
        assert_eq!(smiles("[C@@H](O)C"), vec!["[C@@H]", "(", "O", ")", "C"]);
        assert_eq!(smiles("[nH]1cccc1"), vec!["[nH]", "1", "c", "c", "c", "c", "1"]);
    }

    #[test]
    fn test_smiles_ring_closure() {
        assert_eq!(smiles("C%12CC%12"), vec!["C", "%12", "C", "C", "%12"]);
        assert_eq!(smiles("c1ccccc1"), vec!["c", "1", "c", "c", "c", "c", "c", "1"]);
    }

    #[test]
    fn test_smiles_bonds_and_symbols() {
        assert_eq!(smiles("C=C#N"), vec!["C", "=", "C", "#", "N"]);
        assert_eq!(
            smiles(r"F/C=C\F"),
            vec!["F", "/", "C", "=", "C", "\\", "F"]
        );
        assert_eq!(smiles("[Na+].[Cl-]"), vec!["[Na+]", ".", "[Cl-]"]);
        assert_eq!(smiles("*C$C~C:C?C>C"), vec!["*", "C", "$", "C", "~", "C", ":", "C", "?", "C", ">", "C"]);
    }

    #[test]
    fn test_smiles_unmatched_characters_are_dropped() {
        // H, a, and whitespace belong to no alternative
        assert_eq!(smiles("CH4"), vec!["C", "4"]);
        assert_eq!(smiles("C a O"), vec!["C", "O"]);
        assert!(smiles("").is_empty());
    }

    #[test]
    fn test_selfies_symbols() {
        assert_eq!(selfies("[C][C][C][N]"), vec!["[C]", "[C]", "[C]", "[N]"]);
        assert_eq!(
            selfies("[C][=O].[Na+]"),
            vec!["[C]", "[=O]", ".", "[Na+]"]
        );
        assert_eq!(selfies("[C][Branch1][Ring1]"), vec!["[C]", "[Branch1]", "[Ring1]"]);
    }

    #[test]
    fn test_selfies_rejects_smiles_input() {
        assert!(selfies("CCO").is_empty());
        // an empty bracket pair is not a symbol
        assert_eq!(selfies("[][C]x"), vec!["[C]"]);
    }

    #[test]
    fn test_segmentation_is_idempotent() {
        let segmenter = Segmenter::new(InputFormat::Smiles).unwrap();
        let raw = "CC(=O)Oc1ccccc1C(=O)O";
        assert_eq!(segmenter.segment(raw), segmenter.segment(raw));
    }

    #[test]
    fn test_free_segment() {
        let seq = segment("[C][O]", InputFormat::Selfies).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(segment("[C][O]", InputFormat::Selfies).unwrap(), seq);
    }
}
