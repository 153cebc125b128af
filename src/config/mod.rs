use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::config::toml::ConfigLoader;

mod toml;

pub(crate) use self::toml::{GitHub, Jira, Project};

/// A valid config, loaded from a file or the built-in defaults.
#[derive(Debug)]
pub(crate) struct Config {
    /// Every project that can be reported on, by the name used to select it
    pub(crate) projects: IndexMap<String, Project>,
}

impl Config {
    const CONFIG_PATH: &'static str = "jirasync.toml";

    /// Load the config from `path`, or from `jirasync.toml` if no path is given. If there is no
    /// `jirasync.toml`, use the built-in projects.
    ///
    /// ## Errors
    /// 1. An explicit `path` can't be read
    /// 2. The file is not valid TOML or doesn't describe any projects
    /// 3. A project asks for pages of zero issues, or more than GitHub will return
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, Error> {
        let (path, source_code) = match path {
            Some(path) => {
                let source_code = fs::read_to_string(path).map_err(|source| Error::Read {
                    path: path.into(),
                    source,
                })?;
                (path, source_code)
            }
            None => {
                let path = Path::new(Self::CONFIG_PATH);
                let Ok(source_code) = fs::read_to_string(path) else {
                    log::debug!("No `{}` found, using built-in projects", Self::CONFIG_PATH);
                    return Ok(Self::default());
                };
                (path, source_code)
            }
        };
        log::debug!("Loading projects from {}", path.display());

        let loader: ConfigLoader = ::toml::from_str(&source_code)
            .map_err(|source| Error::toml(path, &source_code, &source))?;
        if loader.projects.is_empty() {
            return Err(Error::NoProjects { path: path.into() });
        }
        for (name, project) in &loader.projects {
            let (page_size, max) = match project {
                Project::Jira(jira) => (jira.page_size, None),
                Project::GitHub(github) => (github.page_size, Some(GitHub::MAX_PAGE_SIZE)),
            };
            if page_size == 0 || max.is_some_and(|max| page_size > max) {
                return Err(Error::PageSize {
                    path: path.into(),
                    project: name.clone(),
                    page_size,
                });
            }
        }
        Ok(Self {
            projects: loader.projects,
        })
    }

    /// Write every project name and its description, sorted by name, for when the user didn't
    /// pick a valid one.
    pub(crate) fn write_project_list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let longest = self.projects.keys().map(String::len).max().unwrap_or(0);
        writeln!(out, "Possible projects:")?;
        for (name, project) in self.projects.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)) {
            writeln!(out, "    {name:<longest$}: {}", project.description())?;
        }
        Ok(())
    }
}

impl Default for Config {
    /// The projects this tool was originally written for.
    fn default() -> Self {
        let mut projects = IndexMap::new();
        projects.insert(
            String::from("mcuboot"),
            Project::Jira(Jira {
                description: String::from("The MCUboot project JIRA"),
                host: String::from("runtimeco.atlassian.net"),
                key: String::from("MCUB"),
                query: String::from(
                    "(fixVersion = 1.1 OR fixVersion = 1.2) AND \
                     assignee = currentUser() \
                     ORDER BY priority DESC, updated DESC",
                ),
                page_size: 50,
            }),
        );
        projects.insert(
            String::from("zephyr"),
            Project::GitHub(GitHub {
                description: String::from("Zephyr issues on GitHub"),
                assignee: String::from("d3zd3z"),
                repo: String::from("zephyrproject-rtos/zephyr"),
                page_size: 100,
            }),
        );
        Self { projects }
    }
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Could not read config file {path}: {source}")]
    #[diagnostic(code(config::read), help("Check that the file passed with --config exists"))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config file {path}, line {line}: {message}")]
    #[diagnostic(code(config::toml), help("Check the TOML is valid."))]
    Toml {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("Config file {path} does not define any projects")]
    #[diagnostic(
        code(config::no_projects),
        help("Add at least one project under the `projects` key.")
    )]
    NoProjects { path: PathBuf },
    #[error("Project {project} in {path} has an invalid page_size of {page_size}")]
    #[diagnostic(
        code(config::page_size),
        help("page_size must be at least 1, and at most 100 for GitHub projects")
    )]
    PageSize {
        path: PathBuf,
        project: String,
        page_size: u64,
    },
}

impl Error {
    /// Keep only the first line of the parser's message, and the line it points at.
    fn toml(path: &Path, source_code: &str, source: &::toml::de::Error) -> Self {
        let offset = source.span().map_or(0, |span| span.start);
        let line = source_code
            .get(..offset)
            .map_or(0, |before| before.matches('\n').count())
            + 1;
        Self::Toml {
            path: path.into(),
            line,
            message: source.message().lines().next().unwrap_or_default().to_string(),
        }
    }
}
