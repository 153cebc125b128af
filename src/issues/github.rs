use std::io::Write;

use log::info;
use miette::Diagnostic;
use reqwest::{blocking::Client, header::AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;

use super::{
    pages::{self, fetch_all, Cursor, Page, Remaining, SearchPages},
    GitHubIssue,
};
use crate::{app_config, app_config::github_token, config, report, sort, state::RunType};

const API_URL: &str = "https://api.github.com/graphql";

const SEARCH_QUERY: &str = r"
query($query: String!, $first: Int!, $cursor: String) {
  search(query: $query, type: ISSUE, first: $first, after: $cursor) {
    edges {
      node {
        ... on Issue {
          title
          url
          state
          number
        }
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
  }
}
";

/// Search GitHub for the project's issues and write them as a report, ordered by number.
pub(crate) fn report<W: Write>(
    project: &config::GitHub,
    state: RunType<&mut W>,
) -> Result<(), Error> {
    let (run_type, stdout) = state.take();
    let query = search_text(project);

    if let RunType::DryRun(()) = run_type {
        writeln!(stdout, "Would search GitHub for issues matching: {query}")?;
        writeln!(
            stdout,
            "Would write a report of those issues sorted by issue number"
        )?;
        return Ok(());
    }

    let token = github_token()?;
    let mut search = Search::new(&token, &query, project.page_size)?;
    let issues = fetch_all(&mut search)?;
    info!("Found {} issues in {}", issues.len(), project.repo);
    let issues = sort::github_issues(issues);
    report::github(stdout, project, &issues)?;
    Ok(())
}

/// The GitHub search syntax for issues in the repo assigned to the user.
fn search_text(project: &config::GitHub) -> String {
    format!(
        "assignee:{assignee} is:issue repo:{repo}",
        assignee = project.assignee,
        repo = project.repo
    )
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Unable to write report: {0}")]
    Stdout(#[from] std::io::Error),
    #[error("Could not communicate with GitHub while {context}: {source}")]
    #[diagnostic(
        code(issues::github::api),
        help("Check your network connection and that GITHUB_TOKEN is valid")
    )]
    Api {
        source: Box<reqwest::Error>,
        context: &'static str,
    },
    #[error("GitHub returned an error: {0}")]
    #[diagnostic(code(issues::github::graphql))]
    GraphQl(String),
    #[error("Could not deserialize response from GitHub into JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Received unexpected data from GitHub: {0}")]
    #[diagnostic(
        code(issues::github::unexpected_response),
        help("It's possible GitHub has updated their API, please report this issue")
    )]
    UnexpectedApiResponse(String),
    #[error(transparent)]
    #[diagnostic(transparent)]
    AppConfig(#[from] app_config::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pages(#[from] pages::Error),
}

/// One issue search, fetched a page at a time with GraphQL cursors.
struct Search<'a> {
    client: Client,
    auth: String,
    query: &'a str,
    page_size: u64,
}

impl<'a> Search<'a> {
    fn new(token: &str, query: &'a str, page_size: u64) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!("jirasync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Api {
                source: Box::new(source),
                context: "creating a client",
            })?;
        Ok(Self {
            client,
            auth: format!("bearer {token}"),
            query,
            page_size,
        })
    }
}

impl SearchPages for Search<'_> {
    type Issue = GitHubIssue;
    type Error = Error;

    fn fetch_page(&mut self, cursor: &Cursor) -> Result<Page<GitHubIssue>, Error> {
        let json_value: Value = self
            .client
            .post(API_URL)
            .header(AUTHORIZATION, &self.auth)
            .json(&serde_json::json!({
                "query": SEARCH_QUERY,
                "variables": {
                    "query": self.query,
                    "first": self.page_size,
                    "cursor": cursor.after(),
                }
            }))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<Value>)
            .map_err(|source| Error::Api {
                source: Box::new(source),
                context: "searching for issues",
            })?;
        decode_github_response(&json_value)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseSearch {
    edges: Vec<ResponseEdge>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct ResponseEdge {
    node: ResponseIssue,
}

#[derive(Deserialize)]
struct ResponseIssue {
    number: u64,
    title: String,
    url: String,
    state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

fn decode_github_response(json_value: &Value) -> Result<Page<GitHubIssue>, Error> {
    if let Some(errors) = json_value.get("errors") {
        return Err(Error::GraphQl(errors.to_string()));
    }
    let Some(search) = json_value.pointer("/data/search") else {
        return Err(Error::UnexpectedApiResponse(json_value.to_string()));
    };
    let search: ResponseSearch = serde_json::from_value(search.clone())?;
    let remaining = match (search.page_info.has_next_page, search.page_info.end_cursor) {
        (false, _) => Remaining::Done,
        (true, Some(end_cursor)) => Remaining::Next(end_cursor),
        (true, None) => {
            return Err(Error::UnexpectedApiResponse(String::from(
                "hasNextPage was true without an endCursor",
            )))
        }
    };
    let issues = search
        .edges
        .into_iter()
        .map(|edge| GitHubIssue {
            number: edge.node.number,
            title: edge.node.title,
            url: edge.node.url,
            state: edge.node.state,
        })
        .collect();
    Ok(Page { issues, remaining })
}


#[cfg(test)]
mod test_report {
    use super::*;

    #[test]
    fn dry_run_describes_search() {
        let project = config::GitHub {
            description: String::new(),
            assignee: String::from("someone"),
            repo: String::from("owner/repo"),
            page_size: 100,
        };
        let mut stdout = Vec::new();
        report(&project, RunType::DryRun(&mut stdout)).unwrap();
        assert_eq!(
            String::from_utf8(stdout).unwrap(),
            "Would search GitHub for issues matching: assignee:someone is:issue repo:owner/repo\n\
             Would write a report of those issues sorted by issue number\n"
        );
    }
}
