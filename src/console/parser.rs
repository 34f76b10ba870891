//! Command line parsing
//!
//! Tokens are separated by spaces or tabs. Command and keyword matching is
//! by abbreviation: the typed token matches any name it is a prefix of.

use heapless::Vec;

use super::ConsoleError;
use crate::config::MAX_ARGS;

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split a line into its command token and the rest.
///
/// The token ends at the first space or tab. The rest starts after the
/// separator run.
pub fn split_command(line: &str) -> (&str, &str) {
    match line.find(is_separator) {
        Some(end) => (&line[..end], line[end..].trim_start_matches(is_separator)),
        None => (line, ""),
    }
}

/// True if `typed` abbreviates `name` (non-empty prefix, case-sensitive).
///
/// `"h"` and `"help"` abbreviate `"help"`; `"helpme"` and `""` do not.
#[inline]
pub fn abbreviates(typed: &str, name: &str) -> bool {
    !typed.is_empty() && name.as_bytes().starts_with(typed.as_bytes())
}

/// Parsed command with up to `MAX_ARGS` arguments
#[derive(Debug, Clone)]
pub struct ParsedCommand<'a> {
    /// The command name (first token)
    pub command: &'a str,
    /// Arguments; extra tokens are dropped
    pub args: Vec<&'a str, MAX_ARGS>,
}

impl<'a> ParsedCommand<'a> {
    /// Create empty command
    pub const fn empty() -> Self {
        Self {
            command: "",
            args: Vec::new(),
        }
    }

    /// Get argument by index (0-based)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied()
    }

    /// Number of arguments
    pub fn argc(&self) -> usize {
        self.args.len()
    }
}

/// Parse a command line into command and arguments
pub fn parse_line(line: &str) -> ParsedCommand<'_> {
    let mut parts = line.split(is_separator).filter(|p| !p.is_empty());

    let mut cmd = ParsedCommand::empty();
    cmd.command = parts.next().unwrap_or("");
    for arg in parts {
        if cmd.args.push(arg).is_err() {
            break;
        }
    }

    cmd
}

/// Parse a numeric argument.
///
/// `0x` selects hexadecimal, otherwise the value must start with a decimal
/// digit. Conversion stops at the first character that is not a digit of
/// the selected base.
pub fn parse_value(s: &str) -> Result<u32, ConsoleError> {
    if let Some(hex) = s.strip_prefix("0x") {
        return Ok(leading_digits(hex, 16));
    }

    match s.chars().next() {
        Some(c) if c.is_ascii_digit() => Ok(leading_digits(s, 10)),
        _ => Err(ConsoleError::InvalidValue),
    }
}

fn leading_digits(s: &str, radix: u32) -> u32 {
    s.chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc.wrapping_mul(radix).wrapping_add(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_tab() {
        assert_eq!(split_command("stats\theap"), ("stats", "heap"));
    }

    #[test]
    fn test_split_leading_separator_gives_empty_token() {
        assert_eq!(split_command(" help"), ("", "help"));
    }

    #[test]
    fn test_abbreviates() {
        assert!(abbreviates("h", "help"));
        assert!(abbreviates("help", "help"));
        assert!(!abbreviates("helpme", "help"));
        assert!(!abbreviates("", "help"));
        assert!(!abbreviates("Help", "help"));
    }
}
