use miette::Diagnostic;

use crate::semver;

pub(crate) mod github;
pub(crate) mod jira;
pub(crate) mod pages;

/// An issue returned by a JIRA search, reduced to what the report needs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct JiraIssue {
    /// Something like `MCUB-123`
    pub(crate) key: String,
    pub(crate) summary: String,
    /// The `self` link JIRA returns for the issue
    pub(crate) link: String,
    pub(crate) status: String,
    /// Raw fix version names, in the order JIRA lists them
    pub(crate) fix_versions: Vec<String>,
}

impl JiraIssue {
    /// The number after the `-` in the key.
    pub(crate) fn key_number(&self) -> Result<u64, Error> {
        key_number(&self.key)
    }

    /// The smallest fix version of this issue, `0.0.0` if there are none.
    pub(crate) fn min_fix_version(&self) -> Result<semver::Version, semver::Error> {
        semver::min_fix_version(&self.fix_versions)
    }
}

/// An issue returned by a GitHub search.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct GitHubIssue {
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) url: String,
    /// `OPEN` or `CLOSED`
    pub(crate) state: String,
}

/// Extract the issue number from a `PROJECT-123` style key so keys sort naturally.
pub(crate) fn key_number(key: &str) -> Result<u64, Error> {
    let (_, number) = key.split_once('-').ok_or_else(|| Error::MissingSeparator {
        key: key.to_string(),
    })?;
    number.parse().map_err(|_| Error::NonNumericKey {
        key: key.to_string(),
    })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Issue key {key:?} doesn't contain a '-'")]
    #[diagnostic(
        code(issues::missing_separator),
        help("JIRA issue keys look like PROJECT-123, the server returned something else")
    )]
    MissingSeparator { key: String },
    #[error("Issue key {key:?} doesn't end in an issue number")]
    #[diagnostic(
        code(issues::non_numeric_key),
        help("JIRA issue keys look like PROJECT-123, the server returned something else")
    )]
    NonNumericKey { key: String },
}
