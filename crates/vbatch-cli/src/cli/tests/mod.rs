//! CLI parse tests, split per subcommand family.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

pub(super) fn parse_err(args: &[&str]) -> clap::error::ErrorKind {
    Cli::try_parse_from(args).unwrap_err().kind()
}

#[test]
fn command_tree_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
