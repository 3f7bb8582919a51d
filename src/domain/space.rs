//! Combinatorial model of an identifier space.
//!
//! A space is a prefix plus one alphabet per root position. Index vectors
//! address slots in the space like the wheels of an odometer: the rightmost
//! position is the least significant.

use serde::Serialize;

use super::alphabet::CharClass;
use super::identifier::Identifier;

/// Ordered per-position alphabets. Every entry is non-empty and duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AlphabetSpec(Vec<Vec<char>>);

impl AlphabetSpec {
    /// Resolve one alphabet per class.
    #[must_use]
    pub fn from_classes(classes: &[CharClass], sans_vowel: bool) -> Self {
        Self(
            classes
                .iter()
                .map(|class| class.alphabet(sans_vowel))
                .collect(),
        )
    }

    /// Number of root positions.
    #[must_use]
    pub fn root_length(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the per-position alphabets, left to right.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = &[char]> + ExactSizeIterator {
        self.0.iter().map(Vec::as_slice)
    }

    /// Canonical textual form, positions separated by `/`.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|alphabet| alphabet.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Product of all per-position alphabet sizes.
///
/// Saturates at `u64::MAX` instead of wrapping; a saturated count means the
/// space is effectively unbounded.
#[must_use]
pub fn total_permutations(alphabets: &AlphabetSpec) -> u64 {
    alphabets
        .positions()
        .try_fold(1u64, |acc, alphabet| acc.checked_mul(alphabet.len() as u64))
        .unwrap_or(u64::MAX)
}

/// Odometer increment of `indices` over `alphabets`.
///
/// Returns `true` iff every position carried, i.e. the vector wrapped back to
/// all zeros and a full cycle of the space has been walked.
pub fn increment(indices: &mut [usize], alphabets: &AlphabetSpec) -> bool {
    for (index, alphabet) in indices.iter_mut().zip(alphabets.positions()).rev() {
        *index += 1;
        if *index < alphabet.len() {
            return false;
        }
        *index = 0;
    }
    true
}

/// A prefix bound to its alphabets, with the derived permutation count.
#[derive(Debug, Clone)]
pub struct SpaceModel {
    prefix: String,
    alphabets: AlphabetSpec,
    total: u64,
}

impl SpaceModel {
    /// Create a space model.
    #[must_use]
    pub fn new(prefix: impl Into<String>, alphabets: AlphabetSpec) -> Self {
        let total = total_permutations(&alphabets);
        Self {
            prefix: prefix.into(),
            alphabets,
            total,
        }
    }

    /// Identifier prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Per-position alphabets.
    #[must_use]
    pub const fn alphabets(&self) -> &AlphabetSpec {
        &self.alphabets
    }

    /// Total number of distinct identifiers (saturating).
    #[must_use]
    pub const fn total_permutations(&self) -> u64 {
        self.total
    }

    /// Whether the permutation count saturated.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.total == u64::MAX
    }

    /// Odometer increment; see [`increment`].
    pub fn increment(&self, indices: &mut [usize]) -> bool {
        increment(indices, &self.alphabets)
    }

    /// Index vector of the slot at `offset` (taken modulo the space size).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn indices_at(&self, offset: u64) -> Vec<usize> {
        let mut rest = offset;
        let mut indices = vec![0; self.alphabets.root_length()];
        for (index, alphabet) in indices.iter_mut().zip(self.alphabets.positions()).rev() {
            let radix = alphabet.len() as u64;
            *index = (rest % radix) as usize;
            rest /= radix;
        }
        indices
    }

    /// Offset of the slot addressed by `indices`, saturating at `u64::MAX`.
    #[must_use]
    pub fn offset_of(&self, indices: &[usize]) -> u64 {
        indices
            .iter()
            .zip(self.alphabets.positions())
            .try_fold(0u64, |acc, (&index, alphabet)| {
                acc.checked_mul(alphabet.len() as u64)?
                    .checked_add(index as u64)
            })
            .unwrap_or(u64::MAX)
    }

    /// Display name of the slot addressed by `indices`.
    #[must_use]
    pub fn render(&self, indices: &[usize]) -> String {
        let mut name = String::with_capacity(self.prefix.len() + indices.len());
        name.push_str(&self.prefix);
        name.extend(
            indices
                .iter()
                .zip(self.alphabets.positions())
                .map(|(&index, alphabet)| alphabet[index]),
        );
        name
    }

    /// Build the identifier for `indices`.
    #[must_use]
    pub fn identifier(&self, indices: Vec<usize>) -> Identifier {
        let name = self.render(&indices);
        Identifier::new(self.prefix.clone(), indices, name)
    }

    /// Identifier at `offset`.
    #[must_use]
    pub fn identifier_at(&self, offset: u64) -> Identifier {
        self.identifier(self.indices_at(offset))
    }
}
