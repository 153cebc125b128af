use std::{cmp::Ordering, fmt::Display, str::FromStr};

use itertools::Itertools;
use miette::Diagnostic;

/// A [Semantic Version](https://semver.org). Build metadata is validated while parsing but not
/// kept, since it never takes part in precedence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Version {
    pub(crate) major: u64,
    pub(crate) minor: u64,
    pub(crate) patch: u64,
    pub(crate) pre: Option<Prerelease>,
}

impl Version {
    /// Parse a fix version label from an issue tracker. Labels like `1.1` aren't valid semantic
    /// versions, so if the strict parse fails, parse again with `.0` appended.
    pub(crate) fn from_label(label: &str) -> Result<Self, Error> {
        Self::from_str(label)
            .or_else(|err| Self::from_str(&format!("{label}.0")).map_err(|_| err))
            .map_err(|source| Error::InvalidFixVersion {
                label: label.to_string(),
                source,
            })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (Some(pre), Some(other_pre)) => pre.cmp(other_pre),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, build) = s
            .split_once('+')
            .map_or((s, None), |(rest, build)| (rest, Some(build)));
        if let Some(build) = build {
            for identifier in build.split('.') {
                validate_identifier(identifier, "build metadata")?;
            }
        }
        let (version, pre) = rest
            .split_once('-')
            .map_or((rest, None), |(version, pre)| (version, Some(pre)));
        let [major, minor, patch]: [u64; 3] = version
            .split('.')
            .map(parse_numeric)
            .collect::<Result<Vec<_>, _>>()?
            .try_into()
            .map_err(|_| ParseError("Version must have exactly 3 parts".to_string()))?;
        Ok(Self {
            major,
            minor,
            patch,
            pre: pre.map(Prerelease::from_str).transpose()?,
        })
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

/// The dot-separated identifiers after the `-` in a version (e.g., `rc.1` in `1.0.0-rc.1`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Prerelease(Vec<Identifier>);

impl FromStr for Prerelease {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(|identifier| {
                validate_identifier(identifier, "prerelease")?;
                if identifier.bytes().all(|byte| byte.is_ascii_digit()) {
                    parse_numeric(identifier).map(Identifier::Numeric)
                } else {
                    Ok(Identifier::AlphaNumeric(identifier.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl Ord for Prerelease {
    /// Identifiers are compared left to right; when one list is a prefix of the other, the
    /// shorter one has lower precedence. `Vec`'s lexicographic ordering does exactly that.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Prerelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Prerelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

/// Numeric identifiers always have lower precedence than alphanumeric ones, which is the order
/// the variants are declared in.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(number) => write!(f, "{number}"),
            Self::AlphaNumeric(text) => write!(f, "{text}"),
        }
    }
}

fn parse_numeric(part: &str) -> Result<u64, ParseError> {
    if part.len() > 1 && part.starts_with('0') {
        return Err(ParseError(format!(
            "Numeric part {part:?} must not have leading zeros"
        )));
    }
    if !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseError(format!("{part:?} is not a number")));
    }
    part.parse::<u64>().map_err(|err| ParseError(err.to_string()))
}

fn validate_identifier(identifier: &str, context: &str) -> Result<(), ParseError> {
    if identifier.is_empty() {
        return Err(ParseError(format!("Empty {context} identifier")));
    }
    if let Some(invalid) = identifier
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
    {
        return Err(ParseError(format!(
            "Invalid character {invalid:?} in {context} identifier {identifier:?}"
        )));
    }
    Ok(())
}

/// Pick the single version an issue sorts by: the smallest of its fix versions, or `0.0.0` if
/// it has none. Every label must parse, including the first.
pub(crate) fn min_fix_version<S: AsRef<str>>(labels: &[S]) -> Result<Version, Error> {
    itertools::process_results(
        labels
            .iter()
            .map(|label| Version::from_label(label.as_ref())),
        |versions| versions.min(),
    )
    .map(Option::unwrap_or_default)
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct ParseError(String);

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Invalid semantic version {label:?}: {source}")]
    #[diagnostic(
        code(semver::invalid_fix_version),
        help("Fix versions must be semantic versions, or MAJOR.MINOR which is read as MAJOR.MINOR.0")
    )]
    InvalidFixVersion {
        label: String,
        #[source]
        source: ParseError,
    },
}

#[cfg(test)]
mod test_parse {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn full_version() {
        let version = Version::from_str("1.2.3-rc.1+build.5").unwrap();
        assert_eq!(version.to_string(), "1.2.3-rc.1");
    }

    #[rstest]
    #[case("1.2")]
    #[case("1.2.3.4")]
    #[case("01.2.3")]
    #[case("1.2.x")]
    #[case("1.2.3-")]
    #[case("1.2.3-rc..1")]
    #[case("1.2.3-rc.01")]
    #[case("1.2.3+")]
    #[case("")]
    fn invalid(#[case] text: &str) {
        assert!(Version::from_str(text).is_err(), "{text} should not parse");
    }

    #[test]
    fn label_fallback() {
        assert_eq!(
            Version::from_label("1.1").unwrap(),
            Version::from_label("1.1.0").unwrap()
        );
    }

    #[test]
    fn label_error_names_label() {
        let err = Version::from_label("next").unwrap_err();
        assert!(err.to_string().contains("\"next\""), "{err}");
    }
}

#[cfg(test)]
mod test_precedence {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1.0.0", "2.0.0")]
    #[case("2.0.0", "2.1.0")]
    #[case("2.1.0", "2.1.1")]
    #[case("1.0.0-alpha", "1.0.0")]
    #[case("1.0.0-alpha", "1.0.0-alpha.1")]
    #[case("1.0.0-alpha.1", "1.0.0-alpha.beta")]
    #[case("1.0.0-alpha.beta", "1.0.0-beta")]
    #[case("1.0.0-beta.2", "1.0.0-beta.11")]
    #[case("1.0.0-beta.11", "1.0.0-rc.1")]
    #[case("1.9.0", "1.10.0")]
    fn less_than(#[case] lower: &str, #[case] higher: &str) {
        let lower = Version::from_str(lower).unwrap();
        let higher = Version::from_str(higher).unwrap();
        assert!(lower < higher, "{lower} should be less than {higher}");
    }

    #[test]
    fn build_metadata_ignored() {
        assert_eq!(
            Version::from_str("1.0.0+a").unwrap(),
            Version::from_str("1.0.0+b").unwrap()
        );
    }
}

#[cfg(test)]
mod test_min_fix_version {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn no_labels() {
        let labels: [&str; 0] = [];
        assert_eq!(min_fix_version(&labels).unwrap(), Version::default());
    }

    #[test]
    fn picks_smallest() {
        assert_eq!(
            min_fix_version(&["2.0.0", "1.5.0", "1.9.0"]).unwrap(),
            "1.5.0".parse::<Version>().unwrap()
        );
    }

    #[test]
    fn two_part_labels() {
        assert_eq!(
            min_fix_version(&["1.2", "1.1"]).unwrap(),
            min_fix_version(&["1.1.0"]).unwrap()
        );
    }

    #[test]
    fn invalid_first_label() {
        assert!(min_fix_version(&["backlog", "1.0.0"]).is_err());
    }

    #[test]
    fn invalid_later_label() {
        assert!(min_fix_version(&["1.0.0", "backlog"]).is_err());
    }
}
