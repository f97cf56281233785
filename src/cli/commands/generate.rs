//! `epm generate`: print a random password without touching any database.

use crate::cli::load_settings;
use crate::errors::Result;
use crate::generator::{generate_password, GeneratorOptions};

/// Command-line overrides for the configured generator defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateArgs {
    pub length: Option<usize>,
    pub spaces: Option<usize>,
    pub no_lower: bool,
    pub no_upper: bool,
    pub no_digits: bool,
    pub no_punctuation: bool,
}

impl GenerateArgs {
    /// Apply these overrides on top of `base`.
    pub fn apply(&self, mut base: GeneratorOptions) -> GeneratorOptions {
        if let Some(length) = self.length {
            base.length = length;
        }
        if let Some(spaces) = self.spaces {
            base.whitespaces = spaces;
        }
        base.use_lower &= !self.no_lower;
        base.use_upper &= !self.no_upper;
        base.use_digits &= !self.no_digits;
        base.use_punctuation &= !self.no_punctuation;
        base
    }
}

/// Execute the `generate` command.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    let options = args.apply(load_settings()?.generator_options());
    let password = zeroize::Zeroizing::new(generate_password(&options)?);
    println!("{}", password.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_keeps_base() {
        let base = GeneratorOptions::default();
        let applied = GenerateArgs::default().apply(base);
        assert_eq!(applied, base);
    }

    #[test]
    fn overrides_replace_length_and_classes() {
        let args = GenerateArgs {
            length: Some(12),
            spaces: Some(2),
            no_punctuation: true,
            ..GenerateArgs::default()
        };
        let applied = args.apply(GeneratorOptions::default());
        assert_eq!(applied.length, 12);
        assert_eq!(applied.whitespaces, 2);
        assert!(applied.use_lower);
        assert!(!applied.use_punctuation);
    }
}
