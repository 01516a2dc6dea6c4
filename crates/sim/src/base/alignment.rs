//! Multiple sequence alignments of simulated character states.
//!
//! An [`Alignment`] is an ordered mapping from sequence name to a vector of
//! state indices over one [`Alphabet`]. All sequences have the same length.
//! Order is significant: the simulator emits sequences in the tree's leaf
//! enumeration order and exporters write them in that order.

use serde::{Deserialize, Serialize};

use crate::base::Alphabet;
pub use crate::errors::AlignmentError;

/// Index of a character within its alphabet.
pub type State = u8;

/// A named sequence of states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedSequence {
    pub name: String,
    pub states: Vec<State>,
}

impl AlignedSequence {
    pub fn new(name: impl Into<String>, states: Vec<State>) -> Self {
        Self {
            name: name.into(),
            states,
        }
    }

    /// Render the states as characters of `alphabet`.
    ///
    /// Indices outside the alphabet are rendered as `?`.
    pub fn to_string_with(&self, alphabet: Alphabet) -> String {
        self.states
            .iter()
            .map(|&s| alphabet.character(s).unwrap_or('?'))
            .collect()
    }
}

/// An ordered set of equal-length sequences over one alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    alphabet: Alphabet,
    width: usize,
    sequences: Vec<AlignedSequence>,
}

impl Alignment {
    /// Create an alignment, checking that all sequences have equal length.
    ///
    /// The width is taken from the first sequence; an empty list yields an
    /// empty alignment of width zero.
    pub fn new(alphabet: Alphabet, sequences: Vec<AlignedSequence>) -> Result<Self, AlignmentError> {
        let width = sequences.first().map_or(0, |s| s.states.len());
        for seq in &sequences {
            if seq.states.len() != width {
                return Err(AlignmentError::UnequalLength {
                    name: seq.name.clone(),
                    expected: width,
                    found: seq.states.len(),
                });
            }
        }
        Ok(Self {
            alphabet,
            width,
            sequences,
        })
    }

    #[inline]
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Number of sites (columns).
    #[inline]
    pub fn n_sites(&self) -> usize {
        self.width
    }

    /// Number of sequences (rows).
    #[inline]
    pub fn n_sequences(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequences(&self) -> &[AlignedSequence] {
        &self.sequences
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignedSequence> {
        self.sequences.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(|s| s.name.as_str())
    }

    /// States of the sequence called `name`.
    pub fn get(&self, name: &str) -> Option<&[State]> {
        self.sequences
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.states.as_slice())
    }

    /// States of all sequences at one site, in sequence order.
    pub fn column(&self, site: usize) -> Option<Vec<State>> {
        if site >= self.width {
            return None;
        }
        Some(self.sequences.iter().map(|s| s.states[site]).collect())
    }

    /// Concatenate `other` to the right of `self`.
    ///
    /// Both alignments must list the same names in the same order.
    pub fn concat_sites(mut self, other: Alignment) -> Result<Self, AlignmentError> {
        self.check_alphabet(&other)?;
        if self.is_empty() {
            return Ok(other);
        }
        if other.is_empty() {
            return Ok(self);
        }
        if self.n_sequences() != other.n_sequences() {
            let index = self.n_sequences().min(other.n_sequences());
            return Err(AlignmentError::NameMismatch {
                index,
                left: name_at(&self, index),
                right: name_at(&other, index),
            });
        }
        for (index, (left, right)) in self.sequences.iter().zip(&other.sequences).enumerate() {
            if left.name != right.name {
                return Err(AlignmentError::NameMismatch {
                    index,
                    left: left.name.clone(),
                    right: right.name.clone(),
                });
            }
        }
        for (left, right) in self.sequences.iter_mut().zip(other.sequences) {
            left.states.extend(right.states);
        }
        self.width += other.width;
        Ok(self)
    }

    /// Stack `bottom` below `self`; both must have the same width.
    pub fn join(mut self, bottom: Alignment) -> Result<Self, AlignmentError> {
        self.check_alphabet(&bottom)?;
        if self.is_empty() {
            return Ok(bottom);
        }
        if bottom.is_empty() {
            return Ok(self);
        }
        if self.width != bottom.width {
            return Err(AlignmentError::WidthMismatch {
                top: self.width,
                bottom: bottom.width,
            });
        }
        self.sequences.extend(bottom.sequences);
        Ok(self)
    }

    fn check_alphabet(&self, other: &Alignment) -> Result<(), AlignmentError> {
        if self.alphabet != other.alphabet {
            return Err(AlignmentError::InconsistentAlphabet {
                left: self.alphabet,
                right: other.alphabet,
            });
        }
        Ok(())
    }
}

fn name_at(alignment: &Alignment, index: usize) -> String {
    alignment
        .sequences
        .get(index)
        .map_or_else(|| "<missing>".to_string(), |s| s.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna(entries: &[(&str, &[u8])]) -> Alignment {
        let seqs = entries
            .iter()
            .map(|(n, s)| AlignedSequence::new(*n, s.to_vec()))
            .collect();
        Alignment::new(Alphabet::Dna, seqs).unwrap()
    }

    #[test]
    fn test_alignment_new_rejects_unequal_length() {
        let seqs = vec![
            AlignedSequence::new("a", vec![0, 1, 2]),
            AlignedSequence::new("b", vec![0, 1]),
        ];
        let err = Alignment::new(Alphabet::Dna, seqs).unwrap_err();
        assert_eq!(
            err,
            AlignmentError::UnequalLength {
                name: "b".to_string(),
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_alignment_accessors() {
        let aln = dna(&[("a", &[0, 1, 2, 3]), ("b", &[3, 2, 1, 0])]);
        assert_eq!(aln.n_sites(), 4);
        assert_eq!(aln.n_sequences(), 2);
        assert_eq!(aln.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(aln.get("b"), Some(&[3, 2, 1, 0][..]));
        assert_eq!(aln.get("c"), None);
        assert_eq!(aln.column(1), Some(vec![1, 2]));
        assert_eq!(aln.column(4), None);
        assert_eq!(aln.sequences()[0].to_string_with(Alphabet::Dna), "ACGT");
    }

    #[test]
    fn test_concat_sites() {
        let left = dna(&[("a", &[0, 0]), ("b", &[1, 1])]);
        let right = dna(&[("a", &[2]), ("b", &[3])]);
        let joined = left.concat_sites(right).unwrap();
        assert_eq!(joined.n_sites(), 3);
        assert_eq!(joined.get("a"), Some(&[0, 0, 2][..]));
        assert_eq!(joined.get("b"), Some(&[1, 1, 3][..]));
    }

    #[test]
    fn test_concat_sites_name_mismatch() {
        let left = dna(&[("a", &[0]), ("b", &[1])]);
        let right = dna(&[("b", &[2]), ("a", &[3])]);
        assert!(matches!(
            left.concat_sites(right),
            Err(AlignmentError::NameMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_join_stacks_bottom_below_top() {
        let top = dna(&[("a", &[0, 1])]);
        let bottom = dna(&[("b", &[2, 3]), ("c", &[3, 3])]);
        let joined = top.join(bottom).unwrap();
        assert_eq!(joined.n_sequences(), 3);
        assert_eq!(joined.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        // The bottom rows are kept, not a second copy of the top rows.
        assert_eq!(joined.get("b"), Some(&[2, 3][..]));
        assert_eq!(joined.get("c"), Some(&[3, 3][..]));
    }

    #[test]
    fn test_join_width_mismatch() {
        let top = dna(&[("a", &[0, 1])]);
        let bottom = dna(&[("b", &[2])]);
        assert_eq!(
            top.join(bottom).unwrap_err(),
            AlignmentError::WidthMismatch { top: 2, bottom: 1 }
        );
    }

    #[test]
    fn test_join_alphabet_mismatch() {
        let top = dna(&[("a", &[0])]);
        let bottom =
            Alignment::new(Alphabet::Protein, vec![AlignedSequence::new("b", vec![5])]).unwrap();
        assert!(matches!(
            top.join(bottom),
            Err(AlignmentError::InconsistentAlphabet { .. })
        ));
    }
}
