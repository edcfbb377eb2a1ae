//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Subcommand, ValueEnum};

use crate::form::EntryForm;
use crate::record::{Category, CategoryCounts, DownTime};

/// Add command arguments.
///
/// Fields left out take the form defaults: today's date, the first option of
/// each list, and zero for every count.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Production date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Shift label
    #[arg(long)]
    pub shift: Option<String>,

    /// Time slot, e.g. "9 AM"
    #[arg(short, long)]
    pub time: Option<String>,

    /// Model label
    #[arg(short, long)]
    pub model: Option<String>,

    /// Material label
    #[arg(long)]
    pub material: Option<String>,

    /// Size label
    #[arg(short, long)]
    pub size: Option<String>,

    /// Units produced
    #[arg(short = 'n', long)]
    pub quantity: Option<u32>,

    /// Units sent to rework
    #[arg(short, long)]
    pub reworks: Option<u32>,

    /// Down time, e.g. "30" or "30 minutes"
    #[arg(long, value_parser = parse_down_time)]
    pub down_time: Option<DownTime>,

    /// Category counts as LABEL=P,R,L (repeatable), e.g. "T&H=10,2,0"
    #[arg(long = "category", value_name = "LABEL=P,R,L", value_parser = parse_category)]
    pub categories: Vec<CategoryArg>,

    /// Prompt for every field, using the flags above as defaults
    #[arg(short, long)]
    pub interactive: bool,
}

impl AddCommand {
    /// The draft entry described by the flags.
    #[must_use]
    pub fn to_form(&self) -> EntryForm {
        let mut form = EntryForm {
            date: self.date,
            shift: self.shift.clone(),
            time: self.time.clone(),
            model: self.model.clone(),
            material: self.material.clone(),
            size: self.size.clone(),
            quantity: self.quantity,
            reworks: self.reworks,
            down_time: self.down_time,
            ..EntryForm::default()
        };
        for arg in &self.categories {
            form.categories.set(arg.category, arg.counts);
        }
        form
    }
}

/// One `--category` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryArg {
    /// The category being set.
    pub category: Category,
    /// Its counts.
    pub counts: CategoryCounts,
}

fn parse_category(value: &str) -> Result<CategoryArg, String> {
    let (label, counts) = value
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=P,R,L, got '{value}'"))?;
    Ok(CategoryArg {
        category: label.parse().map_err(|e: crate::Error| e.to_string())?,
        counts: counts.parse().map_err(|e: crate::Error| e.to_string())?,
    })
}

fn parse_down_time(value: &str) -> Result<DownTime, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show the last N entries
    #[arg(short, long)]
    pub last: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Record id
    pub id: u64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["index", "id"])))]
pub struct DeleteCommand {
    /// Row number as shown by `list`
    #[arg(long)]
    pub index: Option<usize>,

    /// Record id
    #[arg(long)]
    pub id: Option<u64>,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Destination CSV file
    pub path: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format argument for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormatArg {
    /// Aligned table
    #[default]
    Table,
    /// One line per entry
    Plain,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

impl From<OutputFormatArg> for crate::table::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => Self::Table,
            OutputFormatArg::Plain => Self::Plain,
            OutputFormatArg::Json => Self::Json,
            OutputFormatArg::Csv => Self::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OutputFormat;

    #[test]
    fn test_output_format_arg_conversion() {
        assert_eq!(OutputFormat::from(OutputFormatArg::Table), OutputFormat::Table);
        assert_eq!(OutputFormat::from(OutputFormatArg::Plain), OutputFormat::Plain);
        assert_eq!(OutputFormat::from(OutputFormatArg::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(OutputFormatArg::Csv), OutputFormat::Csv);
    }

    #[test]
    fn test_parse_category() {
        let arg = parse_category("T&H=10,2,0").unwrap();
        assert_eq!(arg.category, Category::TAndH);
        assert_eq!(arg.counts, CategoryCounts::new(10, 2, 0));

        let arg = parse_category("wsprint=1,1,1").unwrap();
        assert_eq!(arg.category, Category::WsPrint);
    }

    #[test]
    fn test_parse_category_errors() {
        assert!(parse_category("T&H").unwrap_err().contains("LABEL=P,R,L"));
        assert!(parse_category("XX=1,2,3").unwrap_err().contains("unknown category"));
        assert!(parse_category("CS=1,2").is_err());
    }

    #[test]
    fn test_parse_down_time() {
        assert_eq!(parse_down_time("30").unwrap(), DownTime::from_minutes(30));
        assert_eq!(
            parse_down_time("30 minutes").unwrap(),
            DownTime::from_minutes(30)
        );
        assert!(parse_down_time("half an hour").is_err());
    }

    #[test]
    fn test_to_form() {
        let cmd = AddCommand {
            date: NaiveDate::from_ymd_opt(2025, 1, 31),
            shift: None,
            time: Some("8 AM".to_string()),
            model: Some("Ride".to_string()),
            material: None,
            size: None,
            quantity: Some(40),
            reworks: Some(4),
            down_time: Some(DownTime::from_minutes(60)),
            categories: vec![CategoryArg {
                category: Category::Dfm,
                counts: CategoryCounts::new(3, 0, 1),
            }],
            interactive: false,
        };
        let form = cmd.to_form();

        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(form.shift, None);
        assert_eq!(form.time.as_deref(), Some("8 AM"));
        assert_eq!(form.quantity, Some(40));
        assert_eq!(
            form.categories.get(Category::Dfm),
            CategoryCounts::new(3, 0, 1)
        );
        assert_eq!(form.categories.get(Category::Cs), CategoryCounts::default());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
