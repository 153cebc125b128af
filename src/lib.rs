use std::{
    io::{stderr, stdout},
    path::PathBuf,
};

use clap::{arg, command, value_parser, ArgMatches, Command};
use miette::{Diagnostic, Result};

use crate::{
    config::{Config, Project},
    state::RunType,
};

mod app_config;
mod config;
mod issues;
mod markup;
mod report;
mod semver;
mod sort;
mod state;

/// Parse the command line, then report on the selected project.
///
/// ## Errors
/// Anything that goes wrong is fatal: the project can't be found, credentials are missing, a
/// request fails, or the issues returned can't be sorted.
pub fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    let config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let project = select_project(&config, &matches)?;
    let mut stdout = stdout().lock();
    let state = if matches.get_flag("dry-run") {
        RunType::DryRun(&mut stdout)
    } else {
        RunType::Real(&mut stdout)
    };

    match project {
        Project::Jira(jira) => issues::jira::report(jira, state).map_err(Error::from)?,
        Project::GitHub(github) => issues::github::report(github, state).map_err(Error::from)?,
    }
    Ok(())
}

fn build_cli() -> Command {
    command!()
        .arg(arg!([project] "The name of the project to report on"))
        .arg(
            arg!(--config <PATH> "Read projects from this file instead of jirasync.toml")
                .value_parser(value_parser!(PathBuf))
                .env("JIRASYNC_CONFIG"),
        )
        .arg(arg!(--"dry-run" "Describe the search and report without making any requests"))
}

/// The project named on the command line. If it's missing or unknown, list the ones that exist.
fn select_project<'a>(config: &'a Config, matches: &ArgMatches) -> Result<&'a Project, Error> {
    let Some(name) = matches.get_one::<String>("project") else {
        config.write_project_list(&mut stderr())?;
        return Err(Error::NoProject);
    };
    config.projects.get(name).ok_or_else(|| {
        if let Err(err) = config.write_project_list(&mut stderr()) {
            return Error::Stderr(err);
        }
        Error::UnknownProject(name.clone())
    })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
enum Error {
    #[error("Must specify a project as the sole argument")]
    #[diagnostic(code(no_project), help("Pass one of the listed project names"))]
    NoProject,
    #[error("Unknown project {0:?}")]
    #[diagnostic(code(unknown_project), help("Pass one of the listed project names"))]
    UnknownProject(String),
    #[error("Unable to list projects: {0}")]
    Stderr(#[from] std::io::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Jira(#[from] issues::jira::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    GitHub(#[from] issues::github::Error),
}

#[cfg(test)]
mod test_cli {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test]
    fn dry_run_flag() {
        let matches = build_cli().get_matches_from(["jirasync", "--dry-run", "zephyr"]);
        assert!(matches.get_flag("dry-run"));
        assert_eq!(
            matches.get_one::<String>("project").map(String::as_str),
            Some("zephyr")
        );
    }

    #[test]
    fn select_known_project() {
        let config = Config::default();
        let matches = build_cli().get_matches_from(["jirasync", "mcuboot"]);
        assert!(matches!(
            select_project(&config, &matches),
            Ok(Project::Jira(_))
        ));
    }

    #[test]
    fn select_unknown_project() {
        let config = Config::default();
        let matches = build_cli().get_matches_from(["jirasync", "nope"]);
        assert!(matches!(
            select_project(&config, &matches),
            Err(Error::UnknownProject(name)) if name == "nope"
        ));
    }

    #[test]
    fn select_no_project() {
        let config = Config::default();
        let matches = build_cli().get_matches_from(["jirasync"]);
        assert!(matches!(
            select_project(&config, &matches),
            Err(Error::NoProject)
        ));
    }
}
