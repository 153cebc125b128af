//! Pieces of JIRA's wiki markup used to build reports.

use std::fmt::Display;

/// Characters which JIRA interprets as markup in free text.
const RESERVED: &[char] = &['-', '*', '_', '?', '[', ']', '{', '}'];

/// Escape the characters JIRA would otherwise treat as markup so text can be dropped into a
/// table cell.
///
/// This isn't perfect, and in the general case there is no way of doing this.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `[label|url]`
pub(crate) fn link(label: impl Display, url: &str) -> String {
    format!("[{label}|{url}]")
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    /// Open issues are red, finished ones green, anything in between blue.
    pub(crate) fn for_status(status: &str) -> Self {
        match status {
            "Open" | "OPEN" => Self::Red,
            "Resolved" | "Closed" | "CLOSED" => Self::Green,
            _ => Self::Blue,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        };
        write!(f, "{name}")
    }
}

/// The status, colored by [`Color::for_status`].
pub(crate) fn status(status: &str) -> String {
    let color = Color::for_status(status);
    format!("{{color:{color}}}{status}{{color}}")
}

/// `{panel}text{panel}`
pub(crate) fn panel(text: &str) -> String {
    format!("{{panel}}{text}{{panel}}")
}

#[cfg(test)]
mod test_escape {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn reserved_characters() {
        assert_eq!(escape("a-b_c"), r"a\-b\_c");
        assert_eq!(escape("-*_?[]{}"), r"\-\*\_\?\[\]\{\}");
    }

    #[rstest]
    #[case("")]
    #[case("Plain text, with punctuation!")]
    #[case("Ünïcödé ✓ 日本語")]
    #[case(r"back\slash|pipe")]
    fn unchanged(#[case] text: &str) {
        assert_eq!(escape(text), text);
    }

    #[test]
    fn mixed_unicode() {
        assert_eq!(escape("ß-[ü]"), r"ß\-\[ü\]");
    }
}
