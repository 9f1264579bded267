//! # Double-Quote Escaping (`common::escape`)
//!
//! File: cli/src/common/escape.rs
//!
//! ## Overview
//!
//! Every positional argument and option value in a generated command line is
//! written as `"<escaped value>"`. Inside POSIX double quotes exactly four
//! characters keep a special meaning: `"`, `\`, `$` and `` ` ``. Prefixing each of
//! them with a backslash makes the shell hand the original text to the program
//! as a single, unexpanded argument. Newlines need no treatment inside double
//! quotes.
//!
//! The trust boundary is the quoted token: values are safe, but the command
//! name itself is emitted verbatim and must come from trusted code.
//!
use std::fmt::Display;

/// Characters that must be backslash-prefixed inside a double-quoted token.
const SPECIAL: [char; 4] = ['"', '\\', '$', '`'];

/// Escapes `value` for embedding between a pair of double quotes.
pub fn escape(value: impl Display) -> String {
    let raw = value.to_string();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes `value` and wraps it in double quotes.
pub fn quote(value: impl Display) -> String {
    format!("\"{}\"", escape(value))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(escape("book.epub"), "book.epub");
        assert_eq!(escape("My Library/Book (1).epub"), "My Library/Book (1).epub");
    }

    #[test]
    fn test_quotes_and_backslashes_are_prefixed() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\books"), r"C:\\books");
        assert_eq!(escape(r#"\""#), r#"\\\""#);
    }

    #[test]
    fn test_expansion_characters_are_prefixed() {
        assert_eq!(escape("$HOME"), "\\$HOME");
        assert_eq!(escape("`id`"), "\\`id\\`");
    }

    #[test]
    fn test_non_string_values_are_coerced() {
        assert_eq!(escape(42), "42");
        assert_eq!(escape(true), "true");
        assert_eq!(escape(1.5), "1.5");
    }

    #[test]
    fn test_quote_wraps_escaped_value() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote(""), "\"\"");
    }

    /// Feeds quoted values through a real `sh` and checks they come back intact.
    #[cfg(unix)]
    #[test]
    fn test_shell_round_trip() {
        let samples = [
            r#"plain"#,
            r#"with "double" quotes"#,
            r#"back\slash and \" mixed"#,
            r#"trailing backslash\"#,
            "dollar $HOME and $(id) and ${x}",
            "back`tick`",
            "multi\nline",
            "single 'quotes' stay",
            "semi; colon && pipe | glob *",
        ];
        for sample in samples {
            let script = format!("printf '%s' {}", quote(sample));
            let output = std::process::Command::new("sh")
                .arg("-c")
                .arg(&script)
                .output()
                .expect("sh should be available on unix test hosts");
            assert!(output.status.success(), "script failed: {}", script);
            assert_eq!(String::from_utf8_lossy(&output.stdout), sample);
        }
    }
}
