//! Render sorted issues as a JIRA markup table.

use std::io::{self, Write};

use itertools::Itertools;

use crate::{
    config,
    issues::{GitHubIssue, JiraIssue},
    markup::{escape, link, panel, status},
};

/// Write a table of JIRA issues followed by the query that found them.
pub(crate) fn jira<W: Write>(
    out: &mut W,
    project: &config::Jira,
    issues: &[JiraIssue],
) -> io::Result<()> {
    writeln!(
        out,
        "Issues at [https://{host}/projects/{key}]\n",
        host = project.host,
        key = project.key
    )?;
    writeln!(out, "||Issue||Description||Vers||Status||")?;
    for issue in issues {
        writeln!(
            out,
            "|{}|{}|{}|{}|",
            link(&issue.key, &issue.link),
            escape(&issue.summary),
            fix_versions(&issue.fix_versions),
            status(&issue.status)
        )?;
    }
    writeln!(out, "\nQuery: {}", panel(&project.query))
}

/// Write a table of GitHub issues.
pub(crate) fn github<W: Write>(
    out: &mut W,
    project: &config::GitHub,
    issues: &[GitHubIssue],
) -> io::Result<()> {
    writeln!(out, "Issues at [https://github.com/{}/]\n", project.repo)?;
    writeln!(out, "||Issue||Description||Status||")?;
    for issue in issues {
        writeln!(
            out,
            "|{}|{}|{}|",
            link(issue.number, &issue.url),
            escape(&issue.title),
            status(&issue.state)
        )?;
    }
    Ok(())
}

/// The raw names, comma separated. JIRA collapses empty cells, so no versions is a single space.
fn fix_versions(names: &[String]) -> String {
    if names.is_empty() {
        String::from(" ")
    } else {
        names.iter().join(",")
    }
}
