//! Credentials for the issue trackers, which live outside of `jirasync.toml`.

use std::{env, fs::File, io::BufReader, path::PathBuf};

use base64::{prelude::BASE64_STANDARD as base64, Engine};
use miette::Diagnostic;
use netrc::Netrc;

/// A user name and password for one host, from `.netrc`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Login {
    pub(crate) user: String,
    pub(crate) password: String,
}

impl Login {
    /// The value of an `Authorization` header for basic auth.
    pub(crate) fn basic_auth(&self) -> String {
        format!(
            "Basic {}",
            base64.encode(format!("{}:{}", self.user, self.password))
        )
    }
}

/// Find the login for `host` in `$NETRC`, or `~/.netrc` if that isn't set.
pub(crate) fn netrc_login(host: &str) -> Result<Login, Error> {
    let path = netrc_path()?;
    log::debug!("Looking for {host} in {}", path.display());
    let file = File::open(&path).map_err(|source| Error::ReadNetrc {
        path: path.clone(),
        source,
    })?;
    let netrc = Netrc::parse(BufReader::new(file)).map_err(|err| match err {
        netrc::Error::Io(source) => Error::ReadNetrc {
            path: path.clone(),
            source,
        },
        netrc::Error::Parse(message, line) => Error::ParseNetrc {
            path: path.clone(),
            message,
            line,
        },
    })?;
    find_login(netrc, host, path)
}

/// The personal access token GitHub requests are made with.
pub(crate) fn github_token() -> Result<String, Error> {
    env::var("GITHUB_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
        .ok_or(Error::MissingGitHubToken)
}

fn netrc_path() -> Result<PathBuf, Error> {
    if let Some(path) = env::var_os("NETRC") {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".netrc"))
        .ok_or(Error::NoHomeDir)
}

/// An exact `machine` match wins, otherwise the `default` entry is used if there is one.
fn find_login(netrc: Netrc, host: &str, path: PathBuf) -> Result<Login, Error> {
    let Netrc { hosts, default, .. } = netrc;
    let machine = hosts
        .into_iter()
        .find_map(|(name, machine)| (name == host).then_some(machine))
        .or(default)
        .ok_or_else(|| Error::MissingHost {
            host: host.to_string(),
            path: path.clone(),
        })?;
    match machine.password {
        Some(password) if !machine.login.is_empty() => Ok(Login {
            user: machine.login,
            password,
        }),
        _ => Err(Error::IncompleteEntry {
            host: host.to_string(),
            path,
        }),
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Could not determine the home directory to find .netrc in")]
    #[diagnostic(
        code(app_config::no_home_dir),
        help("Set the NETRC environment variable to the path of your .netrc file")
    )]
    NoHomeDir,
    #[error("Could not read {path}: {source}")]
    #[diagnostic(
        code(app_config::read_netrc),
        help("JIRA credentials are read from a .netrc file")
    )]
    ReadNetrc {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path} at line {line}: {message}")]
    #[diagnostic(code(app_config::parse_netrc))]
    ParseNetrc {
        path: PathBuf,
        message: String,
        line: usize,
    },
    #[error("Unable to find host {host} in {path}")]
    #[diagnostic(
        code(app_config::missing_host),
        help("Add a line like `machine <host> login <user> password <api token>`")
    )]
    MissingHost { host: String, path: PathBuf },
    #[error("The entry for {host} in {path} needs both a login and a password")]
    #[diagnostic(code(app_config::incomplete_entry))]
    IncompleteEntry { host: String, path: PathBuf },
    #[error("GITHUB_TOKEN must be set to query GitHub")]
    #[diagnostic(
        code(app_config::missing_github_token),
        help("Create a personal access token at https://github.com/settings/tokens")
    )]
    MissingGitHubToken,
}

#[cfg(test)]
mod test_netrc {
    use pretty_assertions::assert_eq;

    use super::*;

    const NETRC: &str = "\
machine runtimeco.atlassian.net
    login someone@example.com
    password s3cret

machine other.example.com login other password pw account acct
machine nopass.example.com login someone
default login anonymous password guest
";

    fn lookup(contents: &str, host: &str) -> Result<Login, Error> {
        let netrc = Netrc::parse(contents.as_bytes()).unwrap();
        find_login(netrc, host, PathBuf::from("netrc"))
    }

    #[test]
    fn exact_machine() {
        assert_eq!(
            lookup(NETRC, "runtimeco.atlassian.net").unwrap(),
            Login {
                user: String::from("someone@example.com"),
                password: String::from("s3cret"),
            }
        );
    }

    #[test]
    fn single_line_entry() {
        assert_eq!(lookup(NETRC, "other.example.com").unwrap().user, "other");
    }

    #[test]
    fn default_entry() {
        assert_eq!(
            lookup(NETRC, "unknown.example.com").unwrap(),
            Login {
                user: String::from("anonymous"),
                password: String::from("guest"),
            }
        );
    }

    #[test]
    fn missing_password() {
        assert!(matches!(
            lookup(NETRC, "nopass.example.com"),
            Err(Error::IncompleteEntry { host, .. }) if host == "nopass.example.com"
        ));
    }

    #[test]
    fn no_match_without_default() {
        assert!(matches!(
            lookup("machine a.example.com login a password b\n", "b.example.com"),
            Err(Error::MissingHost { host, .. }) if host == "b.example.com"
        ));
    }

    #[test]
    fn basic_auth() {
        let login = Login {
            user: String::from("user"),
            password: String::from("pass"),
        };
        assert_eq!(login.basic_auth(), "Basic dXNlcjpwYXNz");
    }
}
