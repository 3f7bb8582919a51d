//! Character classes and the alphabets they resolve to.
//!
//! Every root position of an identifier draws from one [`CharClass`]. The
//! order of characters inside a resolved alphabet is significant: it is the
//! order sequential minting walks through, and it agrees with
//! [`compare_chars`](crate::domain::identifier::compare_chars).

use serde::{Deserialize, Serialize};

/// Letters dropped when vowel exclusion is on.
const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

/// Character class of a single root position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    /// `0-9`.
    #[default]
    Digits,
    /// `a-z`.
    Lowercase,
    /// `A-Z`.
    Uppercase,
    /// Both cases, interleaved `aAbB..zZ`.
    Mixedcase,
    /// Digits followed by lowercase letters.
    LowerExtended,
    /// Digits followed by uppercase letters.
    UpperExtended,
    /// Digits followed by interleaved letters of both cases.
    MixedExtended,
}

impl CharClass {
    /// Parse a free-form char map code (`d`, `l`, `u`, `m`, `e`).
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'd' => Some(Self::Digits),
            'l' => Some(Self::Lowercase),
            'u' => Some(Self::Uppercase),
            'm' => Some(Self::Mixedcase),
            'e' => Some(Self::MixedExtended),
            _ => None,
        }
    }

    /// Resolve this class to its concrete, ordered character sequence.
    #[must_use]
    pub fn alphabet(self, sans_vowel: bool) -> Vec<char> {
        let digits = '0'..='9';
        let lower = letters(sans_vowel);
        match self {
            Self::Digits => digits.collect(),
            Self::Lowercase => lower.collect(),
            Self::Uppercase => lower.map(|c| c.to_ascii_uppercase()).collect(),
            Self::Mixedcase => lower.flat_map(both_cases).collect(),
            Self::LowerExtended => digits.chain(lower).collect(),
            Self::UpperExtended => digits
                .chain(lower.map(|c| c.to_ascii_uppercase()))
                .collect(),
            Self::MixedExtended => digits.chain(lower.flat_map(both_cases)).collect(),
        }
    }
}

impl std::fmt::Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digits => write!(f, "digits"),
            Self::Lowercase => write!(f, "lowercase"),
            Self::Uppercase => write!(f, "uppercase"),
            Self::Mixedcase => write!(f, "mixedcase"),
            Self::LowerExtended => write!(f, "lower_extended"),
            Self::UpperExtended => write!(f, "upper_extended"),
            Self::MixedExtended => write!(f, "mixed_extended"),
        }
    }
}

/// Parse a free-form char map such as `"ddlle"` into one class per position.
///
/// # Errors
///
/// Returns the first character that is not one of `d`, `l`, `u`, `m`, `e`.
pub fn parse_char_map(char_map: &str) -> Result<Vec<CharClass>, char> {
    char_map
        .chars()
        .map(|c| CharClass::from_code(c).ok_or(c))
        .collect()
}

fn letters(sans_vowel: bool) -> impl Iterator<Item = char> + Clone {
    ('a'..='z').filter(move |c| !(sans_vowel && VOWELS.contains(c)))
}

fn both_cases(c: char) -> [char; 2] {
    [c, c.to_ascii_uppercase()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(CharClass::Digits.alphabet(true).len(), 10);
        assert_eq!(CharClass::Digits.alphabet(false).len(), 10);
        assert_eq!(CharClass::Lowercase.alphabet(true).len(), 20);
        assert_eq!(CharClass::Lowercase.alphabet(false).len(), 26);
        assert_eq!(CharClass::Uppercase.alphabet(true).len(), 20);
        assert_eq!(CharClass::Mixedcase.alphabet(true).len(), 40);
        assert_eq!(CharClass::Mixedcase.alphabet(false).len(), 52);
        assert_eq!(CharClass::LowerExtended.alphabet(false).len(), 36);
        assert_eq!(CharClass::UpperExtended.alphabet(true).len(), 30);
        assert_eq!(CharClass::MixedExtended.alphabet(true).len(), 50);
        assert_eq!(CharClass::MixedExtended.alphabet(false).len(), 62);
    }

    #[test]
    fn test_vowels_removed_in_both_cases() {
        let mixed: String = CharClass::MixedExtended.alphabet(true).into_iter().collect();
        for vowel in "aeiouyAEIOUY".chars() {
            assert!(!mixed.contains(vowel), "{vowel} should be excluded");
        }
        assert!(mixed.starts_with("0123456789bBcCdD"));
    }

    #[test]
    fn test_mixed_alphabet_is_interleaved() {
        let mixed: String = CharClass::Mixedcase.alphabet(false).into_iter().collect();
        assert!(mixed.starts_with("aAbBcC"));
        assert!(mixed.ends_with("zZ"));
    }

    #[test]
    fn test_parse_char_map() {
        assert_eq!(
            parse_char_map("dlume").unwrap(),
            vec![
                CharClass::Digits,
                CharClass::Lowercase,
                CharClass::Uppercase,
                CharClass::Mixedcase,
                CharClass::MixedExtended,
            ]
        );
        assert_eq!(parse_char_map("ddx"), Err('x'));
        assert!(parse_char_map("").unwrap().is_empty());
    }

    #[test]
    fn test_class_serde_names() {
        let class: CharClass = serde_json::from_str("\"lower_extended\"").unwrap();
        assert_eq!(class, CharClass::LowerExtended);
        assert_eq!(class.to_string(), "lower_extended");
    }
}
