//! # Command Line Serialization (`common::command`)
//!
//! File: cli/src/common/command.rs
//!
//! ## Overview
//!
//! This module turns a call description (a command name, positional arguments
//! and named options) into the single command-line string that is handed to
//! the shell. The output is deterministic: the same call always produces the
//! same string, and every argument or option value is double-quoted and
//! escaped with [`escape`](super::escape).
//!
//! ## Architecture
//!
//! - **`OptionValue`**: the closed set of option shapes: a bare flag, a single
//!   value, or an ordered list of values (one flag per element).
//! - **`CallOptions`**: an insertion-ordered option map. Flags are emitted in
//!   the order keys were first inserted.
//! - **`kebab_case`**: turns `camelCase` option keys into `kebab-case` flags.
//! - **`build_command`**: the serializer itself, including the default
//!   `--library-path` for library-aware commands.
//!
//! ## Generated Grammar
//!
//! ```text
//! command ["arg1"] ["arg2"] ... [--opt "v1"] [--opt "v2"] [-x "v"] [--flag]
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use calibrs::common::command::{build_command, CallOptions};
//!
//! let options = CallOptions::new()
//!     .with("authors", vec!["A", "B"])
//!     .flag("dontSaveCover");
//! let line = build_command("ebook-convert", ["in.epub", "out.mobi"], &options, "");
//! assert_eq!(
//!     line,
//!     r#"ebook-convert "in.epub" "out.mobi" --authors "A" --authors "B" --dont-save-cover"#
//! );
//! ```
//!
use super::escape::quote;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::Display;

/// Commands starting with this prefix accept `--library-path`.
pub const LIBRARY_AWARE_PREFIX: &str = "calibredb";

/// Option key that carries the library location.
pub const LIBRARY_PATH_FLAG: &str = "library-path";

/// Value attached to a named option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A bare flag with no value, e.g. `--dry-run`.
    Flag,
    /// A single value, e.g. `--title "Dune"`.
    Value(String),
    /// A repeatable option; the flag is emitted once per element in order.
    /// `None` elements emit the bare flag.
    Values(Vec<Option<String>>),
}

macro_rules! option_value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Value(value.to_string())
                }
            }
        )*
    };
}

option_value_from_scalar!(
    &str, String, &String, char, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32,
    f64,
);

impl<T: Display> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::Values(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

impl<T: Display, const N: usize> From<[T; N]> for OptionValue {
    fn from(values: [T; N]) -> Self {
        OptionValue::Values(values.into_iter().map(|v| Some(v.to_string())).collect())
    }
}

/// `None` becomes a bare flag.
impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionValue::Flag, Into::into)
    }
}

/// Insertion-ordered mapping from option key to value.
///
/// Keys are stored as given (usually `camelCase`) and converted to
/// `kebab-case` only when the command line is rendered. Re-inserting a key
/// replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions(IndexMap<String, OptionValue>);

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder shorthand for a bare flag.
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.with(key, OptionValue::Flag)
    }

    /// Sets `key`, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Adds another occurrence of `key`, turning it into a repeatable option.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            Entry::Occupied(mut slot) => {
                let merged = match std::mem::replace(slot.get_mut(), OptionValue::Flag) {
                    OptionValue::Flag => OptionValue::Values(vec![None, Some(value)]),
                    OptionValue::Value(first) => OptionValue::Values(vec![Some(first), Some(value)]),
                    OptionValue::Values(mut all) => {
                        all.push(Some(value));
                        OptionValue::Values(all)
                    }
                };
                *slot.get_mut() = merged;
            }
            Entry::Vacant(slot) => {
                slot.insert(OptionValue::Value(value));
            }
        }
    }

    /// Adds another bare occurrence of `key`; a repeated flag is emitted once
    /// per occurrence.
    pub fn append_flag(&mut self, key: impl Into<String>) {
        match self.0.entry(key.into()) {
            Entry::Occupied(mut slot) => {
                let merged = match std::mem::replace(slot.get_mut(), OptionValue::Flag) {
                    OptionValue::Flag => OptionValue::Values(vec![None, None]),
                    OptionValue::Value(first) => OptionValue::Values(vec![Some(first), None]),
                    OptionValue::Values(mut all) => {
                        all.push(None);
                        OptionValue::Values(all)
                    }
                };
                *slot.get_mut() = merged;
            }
            Entry::Vacant(slot) => {
                slot.insert(OptionValue::Flag);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for CallOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = CallOptions::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

/// Converts a `camelCase` key into `kebab-case`.
///
/// Acronym runs stay together (`coverURL` → `cover-url`, `HTMLTitle` →
/// `html-title`). Keys without upper-case letters are returned unchanged, so
/// the transform is idempotent.
pub fn kebab_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('-') {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower);
                if boundary {
                    out.push('-');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `-k` for single-character keys, `--some-key` otherwise.
fn flag_for(key: &str) -> String {
    let name = kebab_case(key);
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name)
    }
}

fn push_option(tokens: &mut Vec<String>, key: &str, value: &OptionValue) {
    let flag = flag_for(key);
    let mut push_one = |element: Option<&str>| match element {
        Some(v) => tokens.push(format!("{} {}", flag, quote(v))),
        None => tokens.push(flag.clone()),
    };
    match value {
        OptionValue::Flag => push_one(None),
        OptionValue::Value(v) => push_one(Some(v.as_str())),
        OptionValue::Values(values) => {
            for v in values {
                push_one(v.as_deref());
            }
        }
    }
}

/// Builds the full command line for one call.
///
/// Tokens are joined with single spaces: the command (verbatim), then each
/// positional argument quoted, then each option in insertion order. When
/// `command` is library-aware and `library_path` is non-empty, a
/// `--library-path` option is emitted first; a caller option for the same flag
/// takes its place instead of producing a duplicate. If the caller spelled that
/// key more than once (`libraryPath` and `library-path`), the last one wins.
pub fn build_command<I, A>(command: &str, args: I, options: &CallOptions, library_path: &str) -> String
where
    I: IntoIterator<Item = A>,
    A: Display,
{
    let mut tokens = vec![command.to_string()];
    tokens.extend(args.into_iter().map(|arg| quote(arg)));

    let explicit_library = options
        .iter()
        .filter(|(key, _)| kebab_case(key) == LIBRARY_PATH_FLAG)
        .last();
    let inject_library = command.starts_with(LIBRARY_AWARE_PREFIX) && !library_path.is_empty();

    if inject_library {
        match explicit_library {
            Some((key, value)) => push_option(&mut tokens, key, value),
            None => push_option(
                &mut tokens,
                LIBRARY_PATH_FLAG,
                &OptionValue::Value(library_path.to_string()),
            ),
        }
    }

    for (key, value) in options.iter() {
        if inject_library && kebab_case(key) == LIBRARY_PATH_FLAG {
            continue;
        }
        push_option(&mut tokens, key, value);
    }

    tokens.join(" ")
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const NO_ARGS: [&str; 0] = [];

    #[test]
    fn test_positional_arguments_only() {
        let line = build_command(
            "ebook-convert",
            ["book.epub", "book.mobi"],
            &CallOptions::new(),
            "",
        );
        assert_eq!(line, r#"ebook-convert "book.epub" "book.mobi""#);
    }

    #[test]
    fn test_bare_command() {
        assert_eq!(
            build_command("calibredb list", NO_ARGS, &CallOptions::new(), ""),
            "calibredb list"
        );
    }

    #[test]
    fn test_repeated_option_values_keep_order() {
        let options = CallOptions::new().with("authors", vec!["A", "B"]);
        let line = build_command("ebook-meta", ["x.epub"], &options, "");
        assert_eq!(line, r#"ebook-meta "x.epub" --authors "A" --authors "B""#);
    }

    #[test]
    fn test_single_character_key_uses_short_flag() {
        let options = CallOptions::new().with("s", "title");
        assert_eq!(
            build_command("calibredb list", NO_ARGS, &options, ""),
            r#"calibredb list -s "title""#
        );
    }

    #[test]
    fn test_flag_without_value() {
        let options = CallOptions::new().flag("dontNotifyGui").with("limit", 5);
        assert_eq!(
            build_command("cmd", NO_ARGS, &options, ""),
            r#"cmd --dont-notify-gui --limit "5""#
        );
    }

    #[test]
    fn test_none_becomes_flag() {
        let options = CallOptions::new().with("asHtml", None::<&str>);
        assert_eq!(build_command("cmd", NO_ARGS, &options, ""), "cmd --as-html");
    }

    #[test]
    fn test_absent_elements_in_sequence_emit_bare_flags() {
        let options = CallOptions::new().with(
            "v",
            OptionValue::Values(vec![None, Some("x".into()), None]),
        );
        assert_eq!(
            build_command("cmd", NO_ARGS, &options, ""),
            r#"cmd -v -v "x" -v"#
        );
    }

    #[test]
    fn test_empty_sequence_emits_nothing() {
        let options = CallOptions::new().with("tags", Vec::<String>::new());
        assert_eq!(build_command("cmd", NO_ARGS, &options, ""), "cmd");
    }

    #[test]
    fn test_options_follow_insertion_order() {
        let options = CallOptions::new()
            .with("zeta", 1)
            .with("alpha", 2)
            .with("mid", 3);
        assert_eq!(
            build_command("cmd", NO_ARGS, &options, ""),
            r#"cmd --zeta "1" --alpha "2" --mid "3""#
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let options = CallOptions::new().with("title", r#"The "Best" \ Book"#);
        assert_eq!(
            build_command("ebook-meta", [r#"a"b.epub"#], &options, ""),
            r#"ebook-meta "a\"b.epub" --title "The \"Best\" \\ Book""#
        );
    }

    #[test]
    fn test_library_path_injected_for_library_aware_commands() {
        let line = build_command("calibredb add", ["new.epub"], &CallOptions::new(), "/lib");
        assert_eq!(line, r#"calibredb add "new.epub" --library-path "/lib""#);
    }

    #[test]
    fn test_library_path_comes_before_caller_options() {
        let options = CallOptions::new().with("search", "author:X");
        assert_eq!(
            build_command("calibredb list", NO_ARGS, &options, "/lib"),
            r#"calibredb list --library-path "/lib" --search "author:X""#
        );
    }

    #[test]
    fn test_explicit_library_path_overrides_default() {
        let options = CallOptions::new()
            .with("fields", "title")
            .with("libraryPath", "/other");
        let line = build_command("calibredb list", NO_ARGS, &options, "/lib");
        assert_eq!(
            line,
            r#"calibredb list --library-path "/other" --fields "title""#
        );
        assert_eq!(line.matches("--library-path").count(), 1);
    }

    #[test]
    fn test_kebab_key_also_overrides_default() {
        let options = CallOptions::new().with("library-path", "/other");
        assert_eq!(
            build_command("calibredb list", NO_ARGS, &options, "/lib"),
            r#"calibredb list --library-path "/other""#
        );
    }

    #[test]
    fn test_last_spelling_of_library_path_wins() {
        let options = CallOptions::new()
            .with("libraryPath", "/first")
            .with("search", "x")
            .with("library-path", "/second");
        let line = build_command("calibredb list", NO_ARGS, &options, "/lib");
        assert_eq!(
            line,
            r#"calibredb list --library-path "/second" --search "x""#
        );
        assert_eq!(line.matches("--library-path").count(), 1);
    }

    #[test]
    fn test_no_injection_without_library_or_for_other_commands() {
        assert_eq!(
            build_command("calibredb list", NO_ARGS, &CallOptions::new(), ""),
            "calibredb list"
        );
        assert_eq!(
            build_command("ebook-convert", NO_ARGS, &CallOptions::new(), "/lib"),
            "ebook-convert"
        );
    }

    #[test]
    fn test_explicit_library_path_on_other_commands_is_kept_in_place() {
        let options = CallOptions::new().with("a", 1).with("libraryPath", "/x");
        assert_eq!(
            build_command("ebook-convert", NO_ARGS, &options, "/lib"),
            r#"ebook-convert -a "1" --library-path "/x""#
        );
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("libraryPath"), "library-path");
        assert_eq!(kebab_case("dontSaveCover"), "dont-save-cover");
        assert_eq!(kebab_case("coverURL"), "cover-url");
        assert_eq!(kebab_case("HTMLTitle"), "html-title");
        assert_eq!(kebab_case("pdfPageNumbers2x"), "pdf-page-numbers2x");
        assert_eq!(kebab_case("s"), "s");
        assert_eq!(kebab_case("with_underscore"), "with_underscore");
    }

    #[test]
    fn test_kebab_case_is_idempotent() {
        for key in ["libraryPath", "outputProfile", "coverURL", "a", "already-kebab"] {
            let once = kebab_case(key);
            assert_eq!(kebab_case(&once), once);
        }
    }

    #[test]
    fn test_append_flag_repeats_bare_flag() {
        let mut options = CallOptions::new();
        options.append_flag("v");
        assert_eq!(options.get("v"), Some(&OptionValue::Flag));
        options.append_flag("v");
        options.append_flag("v");
        assert_eq!(options.get("v"), Some(&OptionValue::Values(vec![None, None, None])));
        assert_eq!(build_command("tool", NO_ARGS, &options, ""), "tool -v -v -v");
    }

    #[test]
    fn test_append_builds_repeatable_option_in_place() {
        let mut options = CallOptions::new().with("first", 1);
        options.append("tag", "a");
        options.insert("last", 2);
        options.append("tag", "b");
        options.append("tag", "c");
        assert_eq!(
            options.get("tag"),
            Some(&OptionValue::Values(vec![
                Some("a".into()),
                Some("b".into()),
                Some("c".into())
            ]))
        );
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["first", "tag", "last"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut options: CallOptions = [("a", "1"), ("b", "2")].into_iter().collect();
        options.insert("a", "3");
        assert_eq!(
            build_command("cmd", NO_ARGS, &options, ""),
            r#"cmd -a "3" -b "2""#
        );
    }
}
