//! Command-line argument handling
//!
//! Arguments are flag/value pairs: a flag is a token that starts with `-`
//! followed by a non-digit character, and its value (if any) is the next
//! token that is not itself a flag. Unknown flags are accepted and ignored by
//! the driver; repeated flags keep the last value seen.

use std::collections::HashMap;
use std::path::PathBuf;

/// Parsed flag/value pairs from the command line
#[derive(Debug, Default)]
pub struct ArgumentParser {
    /// flag → optional value
    flags: HashMap<String, Option<String>>,
}

impl ArgumentParser {
    /// Parses the provided tokens into flag/value pairs.
    ///
    /// # Arguments
    ///
    /// * `args` - the command-line tokens, excluding the program name
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut flags: HashMap<String, Option<String>> = HashMap::new();
        let mut current: Option<String> = None;

        for arg in args {
            let arg = arg.into();
            if is_flag(&arg) {
                flags.insert(arg.clone(), None);
                current = Some(arg);
            } else if let Some(flag) = current.take() {
                flags.insert(flag, Some(arg));
            }
            // A value with no preceding flag is ignored.
        }

        Self { flags }
    }

    /// Returns true if the flag was present on the command line
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    /// Returns the value associated with a flag, if any
    pub fn get_string(&self, flag: &str) -> Option<&str> {
        self.flags.get(flag).and_then(|value| value.as_deref())
    }

    /// Returns the value for a flag as a path, or the default when the flag
    /// has no value
    pub fn get_path(&self, flag: &str, default: &str) -> PathBuf {
        self.get_string(flag).unwrap_or(default).into()
    }

    /// Returns the value for a flag parsed as an integer, or the default when
    /// the flag has no value or the value does not parse
    pub fn get_usize(&self, flag: &str, default: usize) -> usize {
        self.get_string(flag)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    /// Returns the number of distinct flags parsed
    pub fn num_flags(&self) -> usize {
        self.flags.len()
    }
}

/// A flag starts with `-` and its second character is not a digit, so that
/// negative numbers can appear as values.
fn is_flag(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-')
        && chars
            .next()
            .is_some_and(|c| !c.is_ascii_digit() && c != '.')
}
