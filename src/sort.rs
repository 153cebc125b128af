//! Ordering issues for a report.
//!
//! JIRA issues are grouped by fix version, and ordered by key number within each version. That
//! is done as two stable sorts: first by key number, then by version. The second sort keeps the
//! key order among issues with equal versions. Keep them as two passes, folding them into one
//! comparator makes it too easy to get the precedence backwards.

use miette::Diagnostic;

use crate::{
    issues,
    issues::{GitHubIssue, JiraIssue},
    semver,
};

/// Sort by the smallest fix version, then by the number in the key.
pub(crate) fn jira_issues(issues: Vec<JiraIssue>) -> Result<Vec<JiraIssue>, Error> {
    let issues = stable_sort_by_key(issues, JiraIssue::key_number)?;
    let issues = stable_sort_by_key(issues, JiraIssue::min_fix_version)?;
    Ok(issues)
}

/// GitHub has no fix versions, so these are only sorted by issue number.
pub(crate) fn github_issues(mut issues: Vec<GitHubIssue>) -> Vec<GitHubIssue> {
    issues.sort_by_key(|issue| issue.number);
    issues
}

/// Like [`slice::sort_by_key`], but the key is computed once per item and computing it may fail.
fn stable_sort_by_key<T, K, E, F>(items: Vec<T>, key: F) -> Result<Vec<T>, E>
where
    K: Ord,
    F: Fn(&T) -> Result<K, E>,
{
    let mut keyed = items
        .into_iter()
        .map(|item| key(&item).map(|key| (key, item)))
        .collect::<Result<Vec<_>, E>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Key(#[from] issues::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] semver::Error),
}
