//! Escaping of values interpolated into external queries.
//!
//! Quote, backslash, and NUL characters in interpolated values must never
//! reach the external database unescaped.

use serde::{Deserialize, Serialize};

/// Quoting convention of the external database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuotingStyle {
    /// ANSI quoting: embedded single quotes are doubled.
    #[default]
    Ansi,
    /// Sybase-style backslash quoting.
    Backslash,
}

impl QuotingStyle {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotingStyle::Ansi => "ansi",
            QuotingStyle::Backslash => "backslash",
        }
    }
}

impl std::fmt::Display for QuotingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuotingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ansi" => Ok(QuotingStyle::Ansi),
            "backslash" | "sybase" => Ok(QuotingStyle::Backslash),
            _ => Err(format!("Unknown quoting style: {s}")),
        }
    }
}

/// Escape a value for interpolation into a single-quoted SQL literal.
#[must_use]
pub fn escape_value(value: &str, style: QuotingStyle) -> String {
    match style {
        QuotingStyle::Backslash => value
            .replace('\\', "\\\\")
            .replace('\'', "\\'")
            .replace('"', "\\\"")
            .replace('\0', "\\0"),
        // ANSI has no escape for NUL inside a literal; strip it.
        QuotingStyle::Ansi => value.replace('\0', "").replace('\'', "''"),
    }
}

/// Escape an SQL identifier for use inside double quotes.
#[must_use]
pub fn escape_identifier(identifier: &str) -> String {
    identifier.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_doubles_single_quotes() {
        assert_eq!(escape_value("O'Brien", QuotingStyle::Ansi), "O''Brien");
    }

    #[test]
    fn test_ansi_strips_nul() {
        assert_eq!(escape_value("a\0b", QuotingStyle::Ansi), "ab");
    }

    #[test]
    fn test_backslash_escapes_metacharacters() {
        assert_eq!(
            escape_value("a'b\"c\\d\0e", QuotingStyle::Backslash),
            "a\\'b\\\"c\\\\d\\0e"
        );
    }

    #[test]
    fn test_backslash_escapes_backslash_first() {
        // A pre-escaped quote must not survive as an escape sequence.
        assert_eq!(escape_value("\\'", QuotingStyle::Backslash), "\\\\\\'");
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("plain"), "plain");
        assert_eq!(escape_identifier("we\"ird"), "we\"\"ird");
    }

    #[test]
    fn test_quoting_style_roundtrip() {
        for style in [QuotingStyle::Ansi, QuotingStyle::Backslash] {
            let parsed: QuotingStyle = style.as_str().parse().unwrap();
            assert_eq!(style, parsed);
        }
    }
}
