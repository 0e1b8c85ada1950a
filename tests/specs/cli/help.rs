//! CLI surface: usage/help text and version reporting.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    Project::empty().pynodex().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_usage() {
    Project::empty().pynodex().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn start_help_shows_usage() {
    Project::empty().pynodex().args(&["start", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn daemon_help_shows_subcommands() {
    Project::empty()
        .pynodex()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn version_shows_version() {
    Project::empty().pynodex().args(&["--version"]).passes().stdout_has("0.2");
}
