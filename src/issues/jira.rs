use std::io::Write;

use log::info;
use miette::Diagnostic;
use reqwest::{blocking::Client, header::AUTHORIZATION};
use serde::Deserialize;

use super::{
    pages::{self, fetch_all, Cursor, Page, Remaining, SearchPages},
    JiraIssue,
};
use crate::{
    app_config,
    app_config::{netrc_login, Login},
    config::Jira,
    report, sort,
    state::RunType,
};

/// The only fields the report needs, fetching everything is slow.
const FIELDS: &str = "summary,status,fixVersions";

/// Search JIRA for every issue matching the project's query and write them as a report, ordered
/// by fix version and then key.
pub(crate) fn report<W: Write>(project: &Jira, state: RunType<&mut W>) -> Result<(), Error> {
    let (run_type, stdout) = state.take();

    if let RunType::DryRun(()) = run_type {
        writeln!(
            stdout,
            "Would search {host} for issues matching: {query}",
            host = project.host,
            query = project.query
        )?;
        writeln!(
            stdout,
            "Would write a report of those issues sorted by fix version, then by key"
        )?;
        return Ok(());
    }

    let login = netrc_login(&project.host)?;
    let mut search = Search::new(project, &login)?;
    let issues = fetch_all(&mut search)?;
    info!("Found {} issues on {}", issues.len(), project.host);
    let issues = sort::jira_issues(issues)?;
    report::jira(stdout, project, &issues)?;
    Ok(())
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Unable to write report: {0}")]
    Stdout(#[from] std::io::Error),
    #[error("Problem communicating with JIRA while {activity}: {inner}")]
    #[diagnostic(
        code(issues::jira::api),
        help("Check your network connection, the host name, and the credentials in .netrc")
    )]
    Api {
        activity: &'static str,
        #[source]
        inner: Box<reqwest::Error>,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    AppConfig(#[from] app_config::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Sort(#[from] sort::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pages(#[from] pages::Error),
}

/// One JQL search, fetched a page at a time with `startAt`.
struct Search<'a> {
    client: Client,
    url: String,
    auth: String,
    query: &'a str,
    page_size: u64,
}

impl<'a> Search<'a> {
    fn new(project: &'a Jira, login: &Login) -> Result<Self, Error> {
        let client = Client::builder().build().map_err(|inner| Error::Api {
            activity: "creating a client",
            inner: Box::new(inner),
        })?;
        Ok(Self {
            client,
            url: format!("https://{}/rest/api/2/search", project.host),
            auth: login.basic_auth(),
            query: project.query.as_str(),
            page_size: project.page_size,
        })
    }
}

impl SearchPages for Search<'_> {
    type Issue = JiraIssue;
    type Error = Error;

    fn fetch_page(&mut self, cursor: &Cursor) -> Result<Page<JiraIssue>, Error> {
        let start_at = cursor.offset().to_string();
        let max_results = self.page_size.to_string();
        let response = self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, &self.auth)
            .query(&[
                ("jql", self.query),
                ("startAt", start_at.as_str()),
                ("maxResults", max_results.as_str()),
                ("fields", FIELDS),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|inner| Error::Api {
                activity: "searching for issues",
                inner: Box::new(inner),
            })?;
        let search_response: SearchResponse = response.json().map_err(|inner| Error::Api {
            activity: "parsing search results",
            inner: Box::new(inner),
        })?;
        Ok(search_response.into())
    }
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    total: u64,
    issues: Vec<ResponseIssue>,
}

impl From<SearchResponse> for Page<JiraIssue> {
    fn from(response: SearchResponse) -> Self {
        Page {
            issues: response.issues.into_iter().map(JiraIssue::from).collect(),
            remaining: Remaining::Total(response.total),
        }
    }
}

#[derive(Deserialize, Debug)]
struct ResponseIssue {
    key: String,
    #[serde(rename = "self")]
    link: String,
    fields: IssueFields,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct IssueFields {
    summary: String,
    status: Status,
    #[serde(default)]
    fix_versions: Option<Vec<FixVersion>>,
}

#[derive(Deserialize, Debug)]
struct Status {
    name: String,
}

#[derive(Deserialize, Debug)]
struct FixVersion {
    name: String,
}

impl From<ResponseIssue> for JiraIssue {
    fn from(issue: ResponseIssue) -> Self {
        let IssueFields {
            summary,
            status,
            fix_versions,
        } = issue.fields;
        JiraIssue {
            key: issue.key,
            summary,
            link: issue.link,
            status: status.name,
            fix_versions: fix_versions
                .unwrap_or_default()
                .into_iter()
                .map(|version| version.name)
                .collect(),
        }
    }
}
