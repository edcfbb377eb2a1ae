//! Command-line interface for prodlog.
//!
//! This module provides the CLI structure for the `prodlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, CategoryArg, ConfigCommand, DeleteCommand, ExportCommand, ListCommand,
    OutputFormatArg, ShowCommand,
};

/// prodlog - Production data entry
///
/// Records production entries (date, shift, model, quantities, reworks and
/// per-category counts) in a CSV file, lists them, and deletes them.
#[derive(Debug, Parser)]
#[command(name = "prodlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data file to use instead of the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Increase verbosity (-v for store activity, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a new production entry
    Add(AddCommand),

    /// Show the production data table
    List(ListCommand),

    /// Show one entry in detail
    Show(ShowCommand),

    /// Delete an entry by row number or id
    Delete(DeleteCommand),

    /// Write all entries to a CSV file
    Export(ExportCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::logging::Verbosity;
    use crate::record::{Category, CategoryCounts, DownTime};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "prodlog");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["prodlog", "-q", "list"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["prodlog", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["prodlog", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["prodlog", "-vv", "list"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_add_with_flags() {
        let cli = parse(&[
            "prodlog",
            "add",
            "--date",
            "2025-04-01",
            "--shift",
            "shift a (desi & komsah)",
            "-m",
            "Shox",
            "-n",
            "100",
            "-r",
            "10",
            "--down-time",
            "45 minutes",
            "--category",
            "T&H=5,1,0",
            "--category",
            "PNC=2,0,0",
        ]);
        let Command::Add(cmd) = cli.command else {
            panic!("expected add command");
        };

        assert_eq!(cmd.date, chrono::NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(cmd.shift.as_deref(), Some("shift a (desi & komsah)"));
        assert_eq!(cmd.quantity, Some(100));
        assert_eq!(cmd.reworks, Some(10));
        assert_eq!(cmd.down_time, Some(DownTime::from_minutes(45)));
        assert_eq!(cmd.categories.len(), 2);
        assert_eq!(cmd.categories[1].category, Category::Pnc);
        assert_eq!(cmd.categories[1].counts, CategoryCounts::new(2, 0, 0));
        assert!(!cmd.interactive);
    }

    #[test]
    fn test_parse_add_rejects_negative_quantity() {
        assert!(Cli::try_parse_from(["prodlog", "add", "-n", "-3"]).is_err());
    }

    #[test]
    fn test_parse_add_interactive() {
        let cli = parse(&["prodlog", "add", "-i"]);
        assert!(matches!(cli.command, Command::Add(AddCommand { interactive: true, .. })));
    }

    #[test]
    fn test_parse_list() {
        let cli = parse(&["prodlog", "list", "--last", "5", "--format", "json"]);
        let Command::List(cmd) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(cmd.last, Some(5));
        assert_eq!(cmd.format, OutputFormatArg::Json);
    }

    #[test]
    fn test_parse_list_default_format() {
        let cli = parse(&["prodlog", "list"]);
        assert!(matches!(
            cli.command,
            Command::List(ListCommand { format: OutputFormatArg::Table, last: None })
        ));
    }

    #[test]
    fn test_parse_delete_requires_target() {
        assert!(Cli::try_parse_from(["prodlog", "delete"]).is_err());
        assert!(Cli::try_parse_from(["prodlog", "delete", "--index", "1", "--id", "2"]).is_err());

        let cli = parse(&["prodlog", "delete", "--index", "3"]);
        assert!(matches!(
            cli.command,
            Command::Delete(DeleteCommand { index: Some(3), id: None })
        ));
    }

    #[test]
    fn test_parse_show() {
        let cli = parse(&["prodlog", "show", "12", "--json"]);
        assert!(matches!(cli.command, Command::Show(ShowCommand { id: 12, json: true })));
    }

    #[test]
    fn test_parse_export() {
        let cli = parse(&["prodlog", "export", "out.csv"]);
        let Command::Export(cmd) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(cmd.path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_parse_with_config_and_data() {
        let cli = parse(&[
            "prodlog",
            "-c",
            "/custom/config.toml",
            "list",
            "--data",
            "/tmp/line2.csv",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/line2.csv")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["prodlog", "config", "validate", "-f", "x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
