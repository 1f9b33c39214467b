//! CLI parse tests.
//!
//! Values that also have an env fallback (GITHUB_*) are always passed
//! explicitly so the tests behave the same inside CI runners.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn command(args: &[&str]) -> CliCommand {
    parse(args).command
}
