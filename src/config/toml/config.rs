use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Loads a `crate::Config` from a TOML file.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ConfigLoader {
    /// Every project that can be reported on, by the name used to select it
    pub(crate) projects: IndexMap<String, Project>,
}

/// Where a project's issues live and how to find them.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Project {
    Jira(Jira),
    GitHub(GitHub),
}

impl Project {
    pub(crate) fn description(&self) -> &str {
        match self {
            Self::Jira(jira) => &jira.description,
            Self::GitHub(github) => &github.description,
        }
    }
}

/// A JQL search against a JIRA instance.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct Jira {
    /// Shown when listing projects
    pub(crate) description: String,
    /// The host name of the JIRA instance, also used to find credentials in `.netrc`
    pub(crate) host: String,
    /// The JIRA project key, used to link to the project in the report header
    pub(crate) key: String,
    /// The JQL to search for, reported verbatim at the bottom of the report
    pub(crate) query: String,
    #[serde(default = "Jira::default_page_size")]
    pub(crate) page_size: u64,
}

impl Jira {
    const fn default_page_size() -> u64 {
        50
    }
}

/// Issues in a GitHub repository assigned to one user.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct GitHub {
    /// Shown when listing projects
    pub(crate) description: String,
    /// The GitHub login issues must be assigned to
    pub(crate) assignee: String,
    /// `owner/name` of the repository
    pub(crate) repo: String,
    #[serde(default = "GitHub::default_page_size")]
    pub(crate) page_size: u64,
}

impl GitHub {
    /// The most GitHub's search will return at once
    pub(crate) const MAX_PAGE_SIZE: u64 = 100;

    const fn default_page_size() -> u64 {
        Self::MAX_PAGE_SIZE
    }
}
