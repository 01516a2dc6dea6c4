use core::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of character alphabets known to the crate.
///
/// An alphabet fixes the number of states `k` of every matrix and vector tied
/// to a model, and the mapping between state indices and characters. Only the
/// two fully resolved alphabets ([`Alphabet::Dna`] and [`Alphabet::Protein`])
/// can carry a substitution model; the extended and IUPAC variants exist so
/// that callers can name them and get a proper rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// Nucleotides A, C, G, T.
    Dna,
    /// Nucleotides plus unknown and gap.
    DnaX,
    /// Nucleotides with IUPAC ambiguity codes.
    DnaI,
    /// The twenty standard amino acids.
    Protein,
    /// Amino acids plus unknown and gap.
    ProteinX,
    /// Amino acids plus unknown, gap and stop.
    ProteinS,
    /// Amino acids with IUPAC ambiguity codes.
    ProteinI,
}

const DNA: &[u8] = b"ACGT";
const DNA_X: &[u8] = b"ACGTN-";
const DNA_I: &[u8] = b"ACGTUWSMKRYBDHVN-?";
const PROTEIN: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";
const PROTEIN_X: &[u8] = b"ACDEFGHIKLMNPQRSTVWYX-";
const PROTEIN_S: &[u8] = b"ACDEFGHIKLMNPQRSTVWYX-*";
const PROTEIN_I: &[u8] = b"ACDEFGHIKLMNPQRSTVWYBJZX-*?";

impl Alphabet {
    /// Characters of the alphabet; the position of a character is its state index.
    #[inline]
    pub const fn characters(self) -> &'static [u8] {
        match self {
            Self::Dna => DNA,
            Self::DnaX => DNA_X,
            Self::DnaI => DNA_I,
            Self::Protein => PROTEIN,
            Self::ProteinX => PROTEIN_X,
            Self::ProteinS => PROTEIN_S,
            Self::ProteinI => PROTEIN_I,
        }
    }

    /// Number of states.
    #[inline]
    pub const fn size(self) -> usize {
        self.characters().len()
    }

    /// Whether a generator matrix can be built over this alphabet.
    #[inline]
    pub const fn is_standard(self) -> bool {
        matches!(self, Self::Dna | Self::Protein)
    }

    /// Character for a state index.
    #[inline]
    pub fn character(self, index: u8) -> Option<char> {
        self.characters().get(index as usize).map(|&b| b as char)
    }

    /// State index for a character (case-insensitive).
    pub fn index(self, c: char) -> Option<u8> {
        let upper = c.to_ascii_uppercase();
        self.characters()
            .iter()
            .position(|&b| b as char == upper)
            .map(|i| i as u8)
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dna => "DNA (nucleotides)",
            Self::DnaX => "DNAX (nucleotides; including gaps)",
            Self::DnaI => "DNAI (nucleotides; including gaps and IUPAC codes)",
            Self::Protein => "Protein (amino acids)",
            Self::ProteinX => "ProteinX (amino acids; including gaps)",
            Self::ProteinS => "ProteinS (amino acids; including gaps and stops)",
            Self::ProteinI => "ProteinI (amino acids; including gaps, stops and IUPAC codes)",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(Alphabet::Dna.size(), 4);
        assert_eq!(Alphabet::Protein.size(), 20);
        assert!(Alphabet::DnaX.size() > Alphabet::Dna.size());
        assert!(Alphabet::ProteinI.size() > Alphabet::ProteinS.size());
    }

    #[test]
    fn test_alphabet_is_standard() {
        assert!(Alphabet::Dna.is_standard());
        assert!(Alphabet::Protein.is_standard());
        assert!(!Alphabet::DnaX.is_standard());
        assert!(!Alphabet::DnaI.is_standard());
        assert!(!Alphabet::ProteinX.is_standard());
        assert!(!Alphabet::ProteinS.is_standard());
        assert!(!Alphabet::ProteinI.is_standard());
    }

    #[test]
    fn test_alphabet_character_index() {
        let dna = Alphabet::Dna;
        assert_eq!(dna.character(0), Some('A'));
        assert_eq!(dna.character(3), Some('T'));
        assert_eq!(dna.character(4), None);
        assert_eq!(dna.index('g'), Some(2));
        assert_eq!(dna.index('N'), None);

        let protein = Alphabet::Protein;
        for (i, &c) in protein.characters().iter().enumerate() {
            assert_eq!(protein.index(c as char), Some(i as u8));
        }
    }

    #[test]
    fn test_standard_prefix_is_shared() {
        // Extended alphabets keep the resolved characters at the same indices.
        assert_eq!(&Alphabet::DnaX.characters()[..4], Alphabet::Dna.characters());
        assert_eq!(
            &Alphabet::ProteinS.characters()[..20],
            Alphabet::Protein.characters()
        );
    }

    #[test]
    fn test_alphabet_serde_names() {
        let json = serde_json::to_string(&Alphabet::ProteinX).unwrap();
        assert_eq!(json, "\"protein_x\"");
        let back: Alphabet = serde_json::from_str("\"dna\"").unwrap();
        assert_eq!(back, Alphabet::Dna);
    }
}
