//! Secure password generator.
//!
//! Characters are drawn independently and uniformly from the union of the
//! enabled character classes using the thread-local CSPRNG (ChaCha seeded
//! from the OS).  Requested spaces are mixed in with a uniform shuffle, so
//! every arrangement of space positions is equally likely.

use rand::seq::SliceRandom;
use rand::Rng;
use zeroize::Zeroize;

use crate::errors::{GeneratorError, Result};

/// Shortest password the generator produces.
pub const MIN_LENGTH: usize = 1;

/// Longest password the generator produces.
pub const MAX_LENGTH: usize = 128;

/// Length used when nothing else is configured.
pub const DEFAULT_LENGTH: usize = 32;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
/// The 32 printable ASCII punctuation characters.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Everything `generate_password` needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub whitespaces: usize,
    pub use_lower: bool,
    pub use_upper: bool,
    pub use_digits: bool,
    pub use_punctuation: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            whitespaces: 0,
            use_lower: true,
            use_upper: true,
            use_digits: true,
            use_punctuation: true,
        }
    }
}

impl GeneratorOptions {
    /// Check the options without generating anything.
    ///
    /// Inputs are never clamped: anything out of range is an error.
    pub fn validate(&self) -> std::result::Result<(), GeneratorError> {
        if !(self.use_lower || self.use_upper || self.use_digits || self.use_punctuation) {
            return Err(GeneratorError::NoCharacterClass);
        }

        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(GeneratorError::InvalidLength {
                length: self.length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }

        let max = max_number_of_whitespaces(self.length);
        if self.whitespaces > max {
            return Err(GeneratorError::TooManyWhitespaces {
                requested: self.whitespaces,
                max,
            });
        }

        Ok(())
    }

    /// The active alphabet, in class order.
    pub fn alphabet(&self) -> Vec<char> {
        let classes = [
            (self.use_lower, LOWERCASE),
            (self.use_upper, UPPERCASE),
            (self.use_digits, DIGITS),
            (self.use_punctuation, PUNCTUATION),
        ];

        classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, set)| set.chars())
            .collect()
    }
}

/// Upper bound on the number of spaces for a password of `length`.
///
/// Half the length, rounded down: at least half of every password is
/// drawn from the alphabet, and a one-character password has no spaces.
pub fn max_number_of_whitespaces(length: usize) -> usize {
    length / 2
}

/// Generate a password according to `options`.
pub fn generate_password(options: &GeneratorOptions) -> Result<String> {
    options.validate()?;

    let alphabet = options.alphabet();
    let mut rng = rand::rng();

    let drawn = options.length - options.whitespaces;
    let mut chars: Vec<char> = (0..drawn)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect();
    chars.extend(std::iter::repeat(' ').take(options.whitespaces));
    chars.shuffle(&mut rng);

    let password: String = chars.iter().collect();
    chars.zeroize();

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EpmError;

    fn options(length: usize, whitespaces: usize) -> GeneratorOptions {
        GeneratorOptions {
            length,
            whitespaces,
            ..GeneratorOptions::default()
        }
    }

    #[test]
    fn default_options_match_dialog_defaults() {
        let o = GeneratorOptions::default();
        assert_eq!(o.length, 32);
        assert_eq!(o.whitespaces, 0);
        assert!(o.use_lower && o.use_upper && o.use_digits && o.use_punctuation);
    }

    #[test]
    fn output_has_exact_length_and_space_count() {
        for length in MIN_LENGTH..=MAX_LENGTH {
            for whitespaces in [0, max_number_of_whitespaces(length) / 2, max_number_of_whitespaces(length)] {
                let pw = generate_password(&options(length, whitespaces)).unwrap();
                assert_eq!(pw.chars().count(), length);
                assert_eq!(pw.chars().filter(|c| *c == ' ').count(), whitespaces);
            }
        }
    }

    #[test]
    fn only_enabled_classes_are_used() {
        let digits_only = GeneratorOptions {
            length: 64,
            whitespaces: 3,
            use_lower: false,
            use_upper: false,
            use_digits: true,
            use_punctuation: false,
        };
        let pw = generate_password(&digits_only).unwrap();
        assert!(pw.chars().all(|c| c == ' ' || c.is_ascii_digit()));

        let punct_only = GeneratorOptions {
            use_digits: false,
            use_punctuation: true,
            ..digits_only
        };
        let pw = generate_password(&punct_only).unwrap();
        assert!(pw.chars().all(|c| c == ' ' || PUNCTUATION.contains(c)));
    }

    #[test]
    fn all_classes_disabled_is_rejected_for_any_length() {
        for length in [0, 1, 32, 128, 129] {
            let o = GeneratorOptions {
                length,
                whitespaces: 0,
                use_lower: false,
                use_upper: false,
                use_digits: false,
                use_punctuation: false,
            };
            let result = generate_password(&o);
            assert!(matches!(
                result,
                Err(EpmError::InvalidConfiguration(GeneratorError::NoCharacterClass))
            ));
        }
    }

    #[test]
    fn length_out_of_range_is_rejected() {
        for length in [0, MAX_LENGTH + 1] {
            let result = generate_password(&options(length, 0));
            assert!(matches!(
                result,
                Err(EpmError::InvalidConfiguration(GeneratorError::InvalidLength { .. }))
            ));
        }
    }

    #[test]
    fn one_whitespace_over_the_cap_is_rejected() {
        for length in MIN_LENGTH..=MAX_LENGTH {
            let max = max_number_of_whitespaces(length);
            let result = generate_password(&options(length, max + 1));
            assert!(matches!(
                result,
                Err(EpmError::InvalidConfiguration(
                    GeneratorError::TooManyWhitespaces { requested, max: m }
                )) if requested == max + 1 && m == max
            ));
        }
    }

    #[test]
    fn whitespace_cap_is_monotonic_and_leaves_characters() {
        let mut previous = 0;
        for length in MIN_LENGTH..=MAX_LENGTH {
            let max = max_number_of_whitespaces(length);
            assert!(max >= previous);
            assert!(max < length);
            previous = max;
        }
        assert_eq!(max_number_of_whitespaces(1), 0);
    }

    #[test]
    fn spaces_land_in_every_position() {
        let mut seen = [false; 4];
        for _ in 0..500 {
            let pw = generate_password(&options(4, 1)).unwrap();
            let pos = pw.chars().position(|c| c == ' ').unwrap();
            seen[pos] = true;
        }
        assert!(seen.iter().all(|s| *s), "space positions seen: {seen:?}");
    }

    #[test]
    fn alphabet_has_expected_size() {
        assert_eq!(GeneratorOptions::default().alphabet().len(), 26 + 26 + 10 + 32);
        assert_eq!(PUNCTUATION.chars().count(), 32);
    }

    #[test]
    fn consecutive_passwords_differ() {
        let a = generate_password(&GeneratorOptions::default()).unwrap();
        let b = generate_password(&GeneratorOptions::default()).unwrap();
        assert_ne!(a, b);
    }
}
