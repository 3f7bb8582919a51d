//! Mint configuration types.
//!
//! A [`MintConfiguration`] is what users store and override; its
//! [`Fingerprint`] is the resolved, comparable shape of the identifier space
//! it describes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::alphabet::{CharClass, parse_char_map};
use super::space::{AlphabetSpec, SpaceModel};
use crate::error::{AppError, Result};

/// Maximum prefix length.
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum number of root positions.
pub const MAX_ROOT_LENGTH: usize = 32;

/// How identifiers are drawn from the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Dense, offset-resuming enumeration.
    Sequential,
    /// Uniform per-position sampling with a deterministic collision walk.
    Random,
}

impl Strategy {
    /// Lowercase name, used as a log field and metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of a minting request.
///
/// With `char_map` unset, every one of the `root_length` positions uses
/// `token_type`. With `char_map` set (e.g. `"ddlle"`), each character picks
/// the class of one position and `token_type`/`root_length` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfiguration {
    /// Fixed prefix, up to 20 ASCII alphanumerics.
    #[serde(default)]
    pub prefix: String,

    /// Character class of every position when no char map is given.
    #[serde(default)]
    pub token_type: CharClass,

    /// Number of root positions when no char map is given.
    #[serde(default = "default_root_length")]
    pub root_length: usize,

    /// Free-form per-position class codes over `d`, `l`, `u`, `m`, `e`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_map: Option<String>,

    /// Exclude `a e i o u y` from letter ranges.
    #[serde(default = "default_sans_vowel")]
    pub sans_vowel: bool,

    /// Random instead of sequential issuance.
    #[serde(default)]
    pub random: bool,
}

const fn default_root_length() -> usize {
    5
}

const fn default_sans_vowel() -> bool {
    true
}

impl Default for MintConfiguration {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            token_type: CharClass::Digits,
            root_length: default_root_length(),
            char_map: None,
            sans_vowel: default_sans_vowel(),
            random: false,
        }
    }
}

impl MintConfiguration {
    /// Sequential configuration over a char map.
    #[must_use]
    pub fn custom(prefix: impl Into<String>, char_map: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            char_map: Some(char_map.into()),
            ..Self::default()
        }
    }

    /// Sequential configuration with `root_length` positions of one class.
    #[must_use]
    pub fn auto(prefix: impl Into<String>, token_type: CharClass, root_length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            token_type,
            root_length,
            ..Self::default()
        }
    }

    /// Builder-style vowel exclusion toggle.
    #[must_use]
    pub const fn with_sans_vowel(mut self, sans_vowel: bool) -> Self {
        self.sans_vowel = sans_vowel;
        self
    }

    /// Builder-style randomness toggle.
    #[must_use]
    pub const fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Issuance strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        if self.random {
            Strategy::Random
        } else {
            Strategy::Sequential
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.classes().map(|_| ())
    }

    /// Character class of every root position.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] if the prefix, char map or root
    /// length is malformed.
    pub fn classes(&self) -> Result<Vec<CharClass>> {
        if self.prefix.len() > MAX_PREFIX_LENGTH
            || !self.prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(AppError::bad_parameter("prefix", &self.prefix));
        }

        match &self.char_map {
            Some(char_map) => {
                if char_map.is_empty() || char_map.len() > MAX_ROOT_LENGTH {
                    return Err(AppError::bad_parameter("char_map", char_map));
                }
                parse_char_map(char_map).map_err(|_| AppError::bad_parameter("char_map", char_map))
            }
            None => {
                if self.root_length == 0 || self.root_length > MAX_ROOT_LENGTH {
                    return Err(AppError::bad_parameter(
                        "root_length",
                        self.root_length.to_string(),
                    ));
                }
                Ok(vec![self.token_type; self.root_length])
            }
        }
    }

    /// Resolve the fingerprint of the space this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadParameter`] if the configuration is malformed.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let classes = self.classes()?;
        Ok(Fingerprint::new(
            self.prefix.clone(),
            AlphabetSpec::from_classes(&classes, self.sans_vowel),
            self.random,
        ))
    }
}

/// Comparable shape of an identifier space.
///
/// Two fingerprints are equal iff prefix, per-position alphabets and the
/// randomness flag all match. Configurations that spell the same space
/// differently (`token_type = digits, root_length = 2` and `char_map = "dd"`)
/// share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    prefix: String,
    alphabets: AlphabetSpec,
    random: bool,
}

impl Fingerprint {
    /// Create a fingerprint.
    #[must_use]
    pub const fn new(prefix: String, alphabets: AlphabetSpec, random: bool) -> Self {
        Self {
            prefix,
            alphabets,
            random,
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

    /// Issuance strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        if self.random {
            Strategy::Random
        } else {
            Strategy::Sequential
        }
    }

    /// Space model for this fingerprint.
    #[must_use]
    pub fn space(&self) -> SpaceModel {
        SpaceModel::new(self.prefix.clone(), self.alphabets.clone())
    }

    /// Stable key for persisted bookkeeping (name-based UUID).
    #[must_use]
    pub fn storage_key(&self) -> String {
        let canonical = format!(
            "{}|{}|{}",
            self.prefix,
            self.strategy(),
            self.alphabets.canonical()
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, canonical.as_bytes()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = MintConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy(), Strategy::Sequential);
        assert_eq!(config.classes().unwrap().len(), 5);
    }

    #[test]
    fn test_prefix_validation() {
        assert!(MintConfiguration::custom("ark99", "d").validate().is_ok());
        assert!(MintConfiguration::custom("a".repeat(20), "d").validate().is_ok());

        let err = MintConfiguration::custom("a".repeat(21), "d")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::BadParameter { field: "prefix", .. }));

        let err = MintConfiguration::custom("ark:/", "d").validate().unwrap_err();
        assert!(matches!(err, AppError::BadParameter { field: "prefix", .. }));
    }

    #[test]
    fn test_char_map_validation() {
        let too_long = "d".repeat(MAX_ROOT_LENGTH + 1);
        for bad in ["", "ddx", "DD", too_long.as_str()] {
            let err = MintConfiguration::custom("", bad).validate().unwrap_err();
            match err {
                AppError::BadParameter { field, value } => {
                    assert_eq!(field, "char_map");
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_root_length_validation() {
        let err = MintConfiguration::auto("", CharClass::Digits, 0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BadParameter {
                field: "root_length",
                ..
            }
        ));
    }

    #[test]
    fn test_equivalent_configurations_share_fingerprint() {
        let auto = MintConfiguration::auto("x", CharClass::Digits, 2);
        let custom = MintConfiguration::custom("x", "dd");
        assert_eq!(auto.fingerprint().unwrap(), custom.fingerprint().unwrap());
        assert_eq!(
            auto.fingerprint().unwrap().storage_key(),
            custom.fingerprint().unwrap().storage_key()
        );

        // Vowel exclusion does not change a digit alphabet.
        let with_vowels = MintConfiguration::custom("x", "dd").with_sans_vowel(false);
        assert_eq!(
            with_vowels.fingerprint().unwrap(),
            custom.fingerprint().unwrap()
        );
    }

    #[test]
    fn test_fingerprint_distinguishes_shape() {
        let base = MintConfiguration::custom("x", "dd").fingerprint().unwrap();
        let longer = MintConfiguration::custom("x", "ddd").fingerprint().unwrap();
        let other_prefix = MintConfiguration::custom("y", "dd").fingerprint().unwrap();
        let random = MintConfiguration::custom("x", "dd")
            .with_random(true)
            .fingerprint()
            .unwrap();
        let letters = MintConfiguration::custom("x", "ll").fingerprint().unwrap();

        for other in [&longer, &other_prefix, &random, &letters] {
            assert_ne!(&base, other);
            assert_ne!(base.storage_key(), other.storage_key());
        }
    }

    #[test]
    fn test_configuration_serde_defaults() {
        let config: MintConfiguration = serde_json::from_str(r#"{"char_map": "dl"}"#).unwrap();
        assert_eq!(config.prefix, "");
        assert!(config.sans_vowel);
        assert!(!config.random);
        assert_eq!(config.char_map.as_deref(), Some("dl"));
    }
}
