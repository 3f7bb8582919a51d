//! Minted identifier value type and its ordering relation.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A persistent identifier: prefix plus one alphabet index per root position.
///
/// The name is derived from the indices when the identifier is built by a
/// [`SpaceModel`](super::space::SpaceModel). Equality and hashing only look at
/// the name.
#[derive(Debug, Clone)]
pub struct Identifier {
    prefix: String,
    indices: Vec<usize>,
    name: String,
}

impl Identifier {
    pub(crate) const fn new(prefix: String, indices: Vec<usize>, name: String) -> Self {
        Self {
            prefix,
            indices,
            name,
        }
    }

    /// Full display name, prefix included.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Variable part of the name.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.name[self.prefix.len()..]
    }

    /// Per-position alphabet indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Consume the identifier, keeping only its name.
    #[must_use]
    pub fn into_name(self) -> String {
        self.name
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_names(&self.name, &other.name)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Compare two identifier names.
///
/// Shorter names sort first; names of equal length compare character by
/// character with [`compare_chars`].
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .count()
        .cmp(&b.chars().count())
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .map(|(x, y)| compare_chars(x, y))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

/// Compare two identifier characters.
///
/// A digit is less than any letter. Letters compare case-insensitively, and
/// the same letter sorts lowercase before uppercase. Anything else falls back
/// to code-point order.
///
/// Letters are case-folded on purpose so the order matches the interleaved
/// `aAbB…` alphabets and stays transitive.
#[must_use]
pub fn compare_chars(a: char, b: char) -> Ordering {
    match (a.is_ascii_digit(), b.is_ascii_digit()) {
        (true, false) if b.is_ascii_alphabetic() => return Ordering::Less,
        (false, true) if a.is_ascii_alphabetic() => return Ordering::Greater,
        _ => {}
    }

    if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() {
        let (lower_a, lower_b) = (a.to_ascii_lowercase(), b.to_ascii_lowercase());
        if lower_a != lower_b {
            return lower_a.cmp(&lower_b);
        }
        // Same letter: lowercase first.
        return b.is_ascii_lowercase().cmp(&a.is_ascii_lowercase());
    }

    a.cmp(&b)
}
