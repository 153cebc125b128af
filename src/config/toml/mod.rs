mod config;

pub(super) use config::ConfigLoader;
pub(crate) use config::{GitHub, Jira, Project};
